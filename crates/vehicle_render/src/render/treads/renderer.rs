//! Per-frame tread rendering
//!
//! Draws one tread link per path point, phase-shifted along the path by the
//! tread's accumulated rotation so the links appear to crawl around the
//! loop. Multi-object tread patterns draw each link object only on its
//! slots of the repeating cycle.

use crate::foundation::math::{utils, Mat4, Mat4Ext};
use crate::render::entity::TreadDescriptor;
use crate::render::error::RenderError;
use crate::render::renderable::RenderableObject;
use crate::render::treads::PathPoint;

/// Fraction of one link spacing the tread has advanced, in [0, 1).
///
/// `rotation` is the monotonic tread rotation in degrees; one degree of
/// rotation is 1/360 of a block of linear travel.
pub fn movement_fraction(rotation: f64, spacing: f64) -> f64 {
    let linear = rotation / 360.0;
    let mut fraction = (linear % spacing) / spacing;
    if fraction < 0.0 {
        fraction += 1.0;
    }
    fraction
}

/// Which path slots this object occupies in a cyclic tread pattern.
///
/// `order` lists the link object names making up one cycle. The returned
/// mask has one entry per cycle slot, true where `object_name` should draw
/// this frame; the mask rotates as the tread advances so each object
/// visits every slot in turn.
pub fn cycle_mask(order: &[String], object_name: &str, rotation: f64, spacing: f64) -> Vec<bool> {
    let count = order.len();
    let cycle_length = count as f64 * spacing;
    let linear = rotation / 360.0;
    let mut offset = (count as f64 * ((linear % cycle_length) / cycle_length)).floor() as i64;
    if offset < 0 {
        offset += count as i64;
    }
    let mut mask = vec![false; count];
    for (i, name) in order.iter().enumerate() {
        mask[(i + offset as usize) % count] = name == object_name;
    }
    mask
}

/// Render one tread object along a solved path.
///
/// `object.transform` must hold the tread's base transform; the walk
/// composes per-link translations and pitch rotations on top of it. Links
/// are interpolated toward the next point by the movement fraction, so the
/// tread animates smoothly between path slots.
pub fn render_treads(
    object: &mut RenderableObject,
    points: &[PathPoint],
    descriptor: &TreadDescriptor,
    backend: &mut dyn crate::render::api::RenderBackend,
) -> Result<(), RenderError> {
    if points.is_empty() {
        return Ok(());
    }
    let fraction = movement_fraction(descriptor.rotation, descriptor.spacing);
    let mask = descriptor
        .tread_order
        .as_ref()
        .filter(|order| !order.is_empty())
        .map(|order| cycle_mask(order, &object.name, descriptor.rotation, descriptor.spacing));

    if descriptor.undo_local_offset {
        // Tread mounted directly on the hull: the path is authored in hull
        // space, so back the part's own offset out first.
        object.transform.apply_translation(
            0.0,
            -descriptor.local_offset.y,
            -descriptor.local_offset.z,
        );
    }
    object.transform.apply_translation(0.0, points[0].y, points[0].z);

    for i in 0..points.len() {
        let point = points[i];
        let next = points[(i + 1) % points.len()];
        // The seam edge closes the loop; its angle continues past the full
        // turn the path accumulated.
        let raw_delta = if i == points.len() - 1 {
            (next.angle + 360.0) - point.angle
        } else {
            next.angle - point.angle
        };
        let angle_delta = utils::wrap_delta_degrees(raw_delta);
        let y_delta = next.y - point.y;
        let z_delta = next.z - point.z;

        if let Some(mask) = &mask {
            if !mask[i % mask.len()] {
                object.transform.apply_translation(0.0, y_delta, z_delta);
                continue;
            }
        }

        object
            .transform
            .apply_translation(0.0, y_delta * fraction, z_delta * fraction);
        if point.angle != 0.0 || angle_delta != 0.0 {
            let base = object.transform;
            let pitch = Mat4::rotation_x_degrees(point.angle + angle_delta * fraction);
            object.transform.apply_transform(&pitch);
            object.render(backend)?;
            object.transform = base;
        } else {
            object.render(backend)?;
        }
        object
            .transform
            .apply_translation(0.0, y_delta * (1.0 - fraction), z_delta * (1.0 - fraction));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Point3, Vec3};
    use crate::render::api::{AnimatedTexture, BackendResult, BufferToken, RenderBackend, TextureImage};
    use crate::render::entity::TextDef;
    use crate::render::renderable::{ColorRgb, Vertex};
    use approx::assert_relative_eq;

    #[derive(Default)]
    struct CapturingBackend {
        draws: Vec<Mat4>,
    }

    impl RenderBackend for CapturingBackend {
        fn bind_texture(&mut self, _identifier: &str, _image: Option<&TextureImage>) -> bool {
            true
        }

        fn bind_animated_texture(&mut self, _identifier: &str, _frames: &AnimatedTexture) -> bool {
            true
        }

        fn upload_and_draw(
            &mut self,
            object: &RenderableObject,
            cached: Option<BufferToken>,
        ) -> BackendResult<Option<BufferToken>> {
            self.draws.push(object.transform);
            Ok(cached)
        }

        fn release_buffer(&mut self, _token: BufferToken) {}

        fn query_lighting_at(&self, _position: &Point3) -> u32 {
            0
        }

        fn query_ambient_brightness(&self, _position: &Point3) -> f64 {
            0.0
        }

        fn draw_text(&mut self, _text: &str, _transform: &Mat4, _def: &TextDef) -> BackendResult<()> {
            Ok(())
        }
    }

    fn link_object(name: &str) -> RenderableObject {
        let vertices = vec![Vertex::new([0.0, 1.0, 0.0], [0.0, 0.0], [0.0, 0.0, 0.0])];
        RenderableObject::new(name, "skin", ColorRgb::WHITE, vertices, true)
    }

    /// A 2x2 square path with flat link pitch, for exact position checks.
    fn square_points() -> Vec<PathPoint> {
        vec![
            PathPoint { y: 0.0, z: 0.0, angle: 360.0 },
            PathPoint { y: 0.0, z: 2.0, angle: 450.0 },
            PathPoint { y: 2.0, z: 2.0, angle: 540.0 },
            PathPoint { y: 2.0, z: 0.0, angle: 630.0 },
        ]
    }

    fn descriptor(rotation: f64, order: Option<Vec<&str>>) -> TreadDescriptor {
        TreadDescriptor {
            path_model: "tank.obj".to_string(),
            placement_slot: 0,
            spacing: 2.0,
            droop_constant: 0.0,
            roller_names: vec![],
            tread_order: order.map(|names| names.iter().map(|s| s.to_string()).collect()),
            rotation,
            local_offset: Vec3::zeros(),
            undo_local_offset: false,
            is_spare: false,
        }
    }

    #[test]
    fn test_movement_fraction_wraps_negative() {
        assert_relative_eq!(movement_fraction(180.0, 2.0), 0.25, epsilon = 1e-9);
        assert_relative_eq!(movement_fraction(-180.0, 2.0), 0.75, epsilon = 1e-9);
        // A whole number of links is phase zero.
        assert_relative_eq!(movement_fraction(1440.0, 2.0), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_cycle_mask_rotates_with_tread() {
        let order: Vec<String> = vec!["link_a".into(), "link_b".into()];
        // At rest, link_a draws its own slot.
        assert_eq!(cycle_mask(&order, "link_a", 0.0, 2.0), vec![true, false]);
        assert_eq!(cycle_mask(&order, "link_b", 0.0, 2.0), vec![false, true]);
        // One link of travel swaps the slots.
        let one_link = 2.0 * 360.0;
        assert_eq!(cycle_mask(&order, "link_a", one_link, 2.0), vec![false, true]);
        // Reverse travel wraps the offset instead of going negative.
        assert_eq!(cycle_mask(&order, "link_a", -one_link, 2.0), vec![false, true]);
    }

    #[test]
    fn test_every_point_draws_one_link() {
        let mut backend = CapturingBackend::default();
        let mut object = link_object("link");
        let points = square_points();
        render_treads(&mut object, &points, &descriptor(0.0, None), &mut backend).unwrap();
        assert_eq!(backend.draws.len(), points.len());
    }

    #[test]
    fn test_links_land_on_path_points_at_phase_zero() {
        let mut backend = CapturingBackend::default();
        let mut object = link_object("link");
        let points = square_points();
        render_treads(&mut object, &points, &descriptor(0.0, None), &mut backend).unwrap();
        for (draw, point) in backend.draws.iter().zip(&points) {
            let origin = draw.transform_point(&Point3::origin());
            assert_relative_eq!(origin.y, point.y, epsilon = 1e-9);
            assert_relative_eq!(origin.z, point.z, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_phase_advances_links_toward_next_point() {
        let mut backend = CapturingBackend::default();
        let mut object = link_object("link");
        let points = square_points();
        // Half a link of travel: spacing 2.0 means 360 degrees of rotation.
        render_treads(&mut object, &points, &descriptor(360.0, None), &mut backend).unwrap();
        let origin = backend.draws[0].transform_point(&Point3::origin());
        assert_relative_eq!(origin.y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(origin.z, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_seam_edge_is_walked() {
        let mut backend = CapturingBackend::default();
        let mut object = link_object("link");
        let points = square_points();
        render_treads(&mut object, &points, &descriptor(0.0, None), &mut backend).unwrap();
        // The last link renders at the last point and the walk returns to
        // the first point afterward, closing the loop.
        let origin = backend.draws[3].transform_point(&Point3::origin());
        assert_relative_eq!(origin.y, 2.0, epsilon = 1e-9);
        assert_relative_eq!(origin.z, 0.0, epsilon = 1e-9);
        let closed = object.transform.transform_point(&Point3::origin());
        assert_relative_eq!(closed.y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(closed.z, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_tread_order_draws_only_matching_slots() {
        let points = square_points();
        let mut backend = CapturingBackend::default();
        let mut object = link_object("link_a");
        render_treads(
            &mut object,
            &points,
            &descriptor(0.0, Some(vec!["link_a", "link_b"])),
            &mut backend,
        )
        .unwrap();
        // Alternating pattern: link_a draws slots 0 and 2 of the 4 points.
        assert_eq!(backend.draws.len(), 2);
        let first = backend.draws[0].transform_point(&Point3::origin());
        assert_relative_eq!(first.z, points[0].z, epsilon = 1e-9);
        let second = backend.draws[1].transform_point(&Point3::origin());
        assert_relative_eq!(second.z, points[2].z, epsilon = 1e-9);
    }
}
