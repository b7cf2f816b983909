//! Tread path solving and rendering
//!
//! Treads are rendered procedurally: the roller sub-objects of the model
//! define a closed loop, [`roller`] solves each roller's contact arc against
//! its neighbors, [`path`] walks the loop emitting evenly spaced placement
//! points, [`cache`] shares those points across entities, and [`renderer`]
//! draws one link per point each frame.

pub mod cache;
pub mod path;
pub mod renderer;
pub mod roller;

pub use cache::TreadPointCache;
pub use path::{generate_tread_points, CATENARY_ANGLE_TOLERANCE_DEG};
pub use renderer::render_treads;
pub use roller::TreadRoller;

/// One placement point on a tread path.
///
/// Coordinates are in the roller chain's local YZ plane; `angle` is the
/// link pitch in degrees, already offset by the +180 the path frame
/// requires. Points form a closed loop: the last connects back to the
/// first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    /// Vertical offset
    pub y: f64,
    /// Longitudinal offset
    pub z: f64,
    /// Link pitch in degrees
    pub angle: f64,
}
