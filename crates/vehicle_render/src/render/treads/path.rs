//! Tread path generation
//!
//! Solves a roller chain into a closed loop of evenly spaced placement
//! points. Rollers contribute arcs between their solved contact angles;
//! the gaps between rollers contribute straight runs, or catenary curves
//! when the run hangs between near-top contacts and a droop constant is
//! set.

use crate::foundation::math::utils;
use crate::render::entity::TreadDescriptor;
use crate::render::error::RenderError;
use crate::render::renderable::RenderableObject;
use crate::render::treads::roller::TreadRoller;
use crate::render::treads::PathPoint;

/// How close to straight-up (in degrees, either side) both contact angles
/// of a gap must be for catenary droop to apply. Droop only makes sense on
/// the hanging top run; angled runs stay taut.
pub const CATENARY_ANGLE_TOLERANCE_DEG: f64 = 10.0;

fn angle_near_top(angle: f64) -> bool {
    let wrapped = angle % 360.0;
    wrapped < CATENARY_ANGLE_TOLERANCE_DEG || wrapped > 360.0 - CATENARY_ANGLE_TOLERANCE_DEG
}

/// Build the roller chain for a tread descriptor and solve all contact
/// angles.
///
/// After solving, each roller's arc runs from `start_angle` up to
/// `end_angle`; the first roller's arc is pinned to end at 180 (straight
/// down) and wraps through a full turn, closing the loop.
pub fn solve_roller_chain(
    model_id: &str,
    objects: &[RenderableObject],
    descriptor: &TreadDescriptor,
) -> Result<Vec<TreadRoller>, RenderError> {
    if descriptor.roller_names.is_empty() {
        return Err(RenderError::MissingTreadPath {
            model: model_id.to_string(),
            slot: descriptor.placement_slot,
        });
    }
    let mut rollers = Vec::with_capacity(descriptor.roller_names.len());
    for name in &descriptor.roller_names {
        let object = objects.iter().find(|object| &object.name == name).ok_or_else(|| {
            RenderError::MissingRoller {
                model: model_id.to_string(),
                roller: name.clone(),
            }
        })?;
        rollers.push(TreadRoller::from_object(object));
    }

    // Pairwise outer-tangent pass. Each pair shares one tangent angle:
    // it is where the tread leaves this roller and meets the next.
    let count = rollers.len();
    for i in 0..count {
        let next = (i + 1) % count;
        let tangent = rollers[i].tangent_angle_to(&rollers[next]);
        rollers[i].set_end_angle(tangent);
        rollers[next].set_start_angle(tangent);
    }

    // Continuity pass. The walk steps angles upward, so each roller's end
    // must land at or after its start; the first roller's end is pinned to
    // the bottom of the loop and its arc gets the extra full turn.
    rollers[0].set_end_angle(180.0);
    for i in 1..count {
        let start = if i == 1 {
            180.0
        } else {
            rollers[i - 1].end_angle
        };
        let mut end = rollers[i].end_angle;
        while end < start - 30.0 {
            end += 360.0;
        }
        while end > start + 330.0 {
            end -= 360.0;
        }
        if end < start {
            // Concave contact: the tread never actually wraps this roller,
            // it just grazes it. Collapse the arc to a single point.
            let midpoint = end + (start - end) / 2.0;
            rollers[i].set_start_angle(midpoint);
            rollers[i].set_end_angle(midpoint);
        } else {
            rollers[i].set_start_angle(start);
            rollers[i].set_end_angle(end);
        }
    }
    let loop_closure = rollers[count - 1].end_angle;
    rollers[0].set_start_angle(loop_closure);
    Ok(rollers)
}

fn gap_length(roller: &TreadRoller, next: &TreadRoller, droop: f64) -> f64 {
    let straight = (next.start_y - roller.end_y).hypot(next.start_z - roller.end_z);
    if droop > 0.0 && angle_near_top(roller.end_angle) && angle_near_top(next.start_angle) {
        2.0 * droop * ((straight / 2.0) / droop).sinh()
    } else {
        straight
    }
}

/// Generate the closed loop of tread placement points for a descriptor.
///
/// Points are spaced by the resolved link spacing: the requested spacing
/// stretched just enough that a whole number of links fits the loop. Each
/// point carries the link pitch angle; the loop is closed, with the last
/// point connecting back to the first.
pub fn generate_tread_points(
    model_id: &str,
    objects: &[RenderableObject],
    descriptor: &TreadDescriptor,
) -> Result<Vec<PathPoint>, RenderError> {
    let rollers = solve_roller_chain(model_id, objects, descriptor)?;
    let count = rollers.len();
    let droop = descriptor.droop_constant;

    let mut total_length = 0.0;
    for (i, roller) in rollers.iter().enumerate() {
        let mut angle_delta = roller.end_angle - roller.start_angle;
        if i == 0 {
            angle_delta += 360.0;
        }
        total_length += std::f64::consts::TAU * roller.radius * angle_delta / 360.0;
        total_length += gap_length(roller, &rollers[(i + 1) % count], droop);
    }

    // Stretch the requested spacing so the loop holds close to a whole
    // number of links.
    let spacing = descriptor.spacing;
    let delta_dist = spacing + (total_length % spacing) / (total_length / spacing);
    log::debug!(
        "Tread path for {} slot {}: {} rollers, length {:.3}, {:.0} links at {:.4}",
        model_id,
        descriptor.placement_slot,
        count,
        total_length,
        total_length / delta_dist,
        delta_dist
    );

    let mut points = Vec::new();
    let mut leftover_path_length = 0.0;
    let mut y_point = 0.0;
    let mut z_point = 0.0;
    for (i, roller) in rollers.iter().enumerate() {
        let mut current_angle = roller.start_angle;
        let mut angle_delta = roller.end_angle - roller.start_angle;
        if i == 0 {
            angle_delta += 360.0;
        }
        let mut roller_path_length = std::f64::consts::TAU * roller.radius * angle_delta / 360.0;

        if i == 0 {
            // Seed the walk with the first roller's starting contact point.
            let (y, z) = roller.point_at(current_angle);
            y_point = y;
            z_point = z;
            points.push(PathPoint {
                y: y_point,
                z: z_point,
                angle: current_angle + 180.0,
            });
        }

        // Arc section.
        if delta_dist - leftover_path_length < roller_path_length {
            if leftover_path_length > 0.0 {
                // Back up by the leftover so the first link on this roller
                // lands one full spacing after the last emitted point.
                current_angle -= 360.0 * leftover_path_length / roller.circumference;
                roller_path_length += leftover_path_length;
                leftover_path_length = 0.0;
            }
            while roller_path_length > delta_dist {
                roller_path_length -= delta_dist;
                current_angle += 360.0 * (delta_dist / roller.circumference);
                let (y, z) = roller.point_at(current_angle);
                y_point = y;
                z_point = z;
                points.push(PathPoint {
                    y: y_point,
                    z: z_point,
                    angle: current_angle + 180.0,
                });
            }
        }

        // Gap section to the next roller. Links in the gap pitch at the
        // departure tangent angle.
        current_angle = roller.end_angle;
        let next = &rollers[(i + 1) % count];
        let straight = (next.start_y - roller.end_y).hypot(next.start_z - roller.end_z);
        let normalized_y = (next.start_y - roller.end_y) / straight;
        let normalized_z = (next.start_z - roller.end_z) / straight;
        let mut extra_path_length = roller_path_length + leftover_path_length;

        if droop > 0.0 && angle_near_top(roller.end_angle) && angle_near_top(next.start_angle) {
            let catenary_length = 2.0 * droop * ((straight / 2.0) / droop).sinh();
            let catenary_edge_y = droop * ((straight / 2.0) / droop).cosh();
            let mut catenary_position = -catenary_length / 2.0;
            let mut remaining = catenary_length;
            while remaining + extra_path_length > delta_dist {
                if extra_path_length > 0.0 {
                    catenary_position += delta_dist - extra_path_length;
                    remaining -= delta_dist - extra_path_length;
                    extra_path_length = 0.0;
                } else {
                    catenary_position += delta_dist;
                    remaining -= delta_dist;
                }
                // Invert the arc-length parametrization to get the
                // horizontal catenary coordinate, then drop the chain's
                // endpoints to the roller contact height.
                let normalized = catenary_position / droop;
                let arcsinh = if catenary_position == 0.0 {
                    0.0
                } else {
                    (normalized + (normalized * normalized + 1.0).sqrt()).ln()
                };
                let fraction = (catenary_position + catenary_length / 2.0) / catenary_length;
                let catenary_z = droop * arcsinh;
                let catenary_y = droop * (catenary_z / droop).cosh();
                y_point = roller.end_y + normalized_y * fraction + catenary_y - catenary_edge_y;
                z_point = roller.end_z + catenary_z + straight / 2.0;
                points.push(PathPoint {
                    y: y_point,
                    z: z_point,
                    angle: current_angle + 180.0
                        - utils::rad_to_deg((catenary_position / droop).asin()),
                });
            }
            leftover_path_length = remaining;
        } else {
            let mut remaining = straight;
            while remaining + extra_path_length > delta_dist {
                if extra_path_length > 0.0 {
                    y_point = roller.end_y + normalized_y * (delta_dist - extra_path_length);
                    z_point = roller.end_z + normalized_z * (delta_dist - extra_path_length);
                    remaining -= delta_dist - extra_path_length;
                    extra_path_length = 0.0;
                } else {
                    y_point += normalized_y * delta_dist;
                    z_point += normalized_z * delta_dist;
                    remaining -= delta_dist;
                }
                points.push(PathPoint {
                    y: y_point,
                    z: z_point,
                    angle: current_angle + 180.0,
                });
            }
            leftover_path_length = remaining;
        }
    }
    Ok(points)
}
