//! # Vehicle Guns
//!
//! Tick-based state machine for vehicle-mounted guns: aim tracking with
//! clamped or free-spinning mounts, windup, firing cooldown, reload, and
//! autonomous target acquisition. Renders nothing itself; pairs with
//! `vehicle_render` through the shared math types and the animation
//! accumulators guns expose.
//!
//! The simulation is side-aware: both sides run the same updates, but
//! ammo only changes on the server so rounds are never double-consumed.

#![warn(missing_docs)]

pub mod gun;
pub mod provider;
pub mod registry;
pub mod snapshot;

pub use gun::{BulletType, Gun, GunDefinition, TARGET_SEARCH_RADIUS};
pub use provider::{
    ControllerKind, GunEvent, GunProvider, ProjectileSink, ProjectileSpawn, Side, TargetInfo,
};
pub use registry::GunRegistry;
pub use snapshot::GunSnapshot;
