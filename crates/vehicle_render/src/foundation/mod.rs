//! Foundation utilities shared across the rendering and simulation crates

pub mod logging;
pub mod math;
