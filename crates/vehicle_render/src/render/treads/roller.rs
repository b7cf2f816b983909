//! Tread roller geometry
//!
//! A roller is derived from the bounding box of a named model sub-object:
//! the mesh is assumed to be a cylinder spinning about the X axis, so the
//! YZ extents give the center and radius. Angles follow the path convention
//! where 0 degrees is straight up (+Y), 90 is +Z, and values increase
//! going over the top toward the rear.

use crate::foundation::math::utils;
use crate::render::renderable::RenderableObject;

/// One roller in a tread path, with its solved contact arc.
#[derive(Debug, Clone)]
pub struct TreadRoller {
    /// Name of the source model object
    pub name: String,
    /// Roller center, vertical
    pub center_y: f64,
    /// Roller center, longitudinal
    pub center_z: f64,
    /// Roller radius
    pub radius: f64,
    /// Roller circumference
    pub circumference: f64,
    /// Angle where the tread meets this roller, degrees
    pub start_angle: f64,
    /// Angle where the tread leaves this roller, degrees
    pub end_angle: f64,
    /// Contact point where the tread meets, vertical
    pub start_y: f64,
    /// Contact point where the tread meets, longitudinal
    pub start_z: f64,
    /// Contact point where the tread leaves, vertical
    pub end_y: f64,
    /// Contact point where the tread leaves, longitudinal
    pub end_z: f64,
}

impl TreadRoller {
    /// Derive a roller from a model object's vertex bounds.
    pub fn from_object(object: &RenderableObject) -> Self {
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        let mut min_z = f64::INFINITY;
        let mut max_z = f64::NEG_INFINITY;
        for vertex in &object.vertices {
            min_y = min_y.min(vertex.position[1] as f64);
            max_y = max_y.max(vertex.position[1] as f64);
            min_z = min_z.min(vertex.position[2] as f64);
            max_z = max_z.max(vertex.position[2] as f64);
        }
        let radius = (max_z - min_z) / 2.0;
        Self {
            name: object.name.clone(),
            center_y: (min_y + max_y) / 2.0,
            center_z: (min_z + max_z) / 2.0,
            radius,
            circumference: std::f64::consts::TAU * radius,
            start_angle: 0.0,
            end_angle: 0.0,
            start_y: 0.0,
            start_z: 0.0,
            end_y: 0.0,
            end_z: 0.0,
        }
    }

    /// Point on the roller rim at `angle` degrees, as (y, z).
    pub fn point_at(&self, angle: f64) -> (f64, f64) {
        let radians = utils::deg_to_rad(angle);
        (
            self.center_y + self.radius * radians.cos(),
            self.center_z + self.radius * radians.sin(),
        )
    }

    /// Set where the tread meets this roller and update the contact point.
    pub fn set_start_angle(&mut self, angle: f64) {
        self.start_angle = angle;
        let (y, z) = self.point_at(angle);
        self.start_y = y;
        self.start_z = z;
    }

    /// Set where the tread leaves this roller and update the contact point.
    pub fn set_end_angle(&mut self, angle: f64) {
        self.end_angle = angle;
        let (y, z) = self.point_at(angle);
        self.end_y = y;
        self.end_z = z;
    }

    /// Angle of the common external tangent toward `next`, in degrees.
    ///
    /// Both rollers leave/meet the connecting tread run at this same angle,
    /// so the caller applies it as this roller's end and the next roller's
    /// start. The tread walks rollers in increasing-angle order, so the
    /// outer tangent sits 90 degrees behind the center-to-center direction,
    /// corrected by the radius difference for unequal rollers.
    pub fn tangent_angle_to(&self, next: &TreadRoller) -> f64 {
        let delta_y = next.center_y - self.center_y;
        let delta_z = next.center_z - self.center_z;
        let center_distance = delta_y.hypot(delta_z);
        let center_angle = utils::rad_to_deg(delta_z.atan2(delta_y));
        let tangent_correction =
            utils::rad_to_deg(((next.radius - self.radius) / center_distance).asin());
        center_angle - 90.0 - tangent_correction
    }
}
