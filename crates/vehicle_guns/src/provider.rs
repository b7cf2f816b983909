//! Environment contracts for gun simulation
//!
//! Guns do not own the world. Each tick they ask a [`GunProvider`] who is
//! controlling them and what can be shot at, and push their outputs
//! (sounds, particles, projectiles) into fire-and-forget sinks.

use vehicle_render::foundation::math::{Point3, Vec3};

/// Which half of the simulation a component runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Rendering side; never mutates authoritative state
    Client,
    /// Authoritative simulation side
    Server,
}

/// Who is controlling a gun this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerKind {
    /// Nobody; the gun idles (and re-centers, if configured)
    None,
    /// A player aims and pulls the trigger directly
    Player,
    /// An NPC seat; the gun acquires targets on its own
    Autonomous,
}

/// A potential target for autonomous fire
#[derive(Debug, Clone)]
pub struct TargetInfo {
    /// Target position at its feet
    pub position: Point3,
    /// Target velocity per tick
    pub velocity: Vec3,
    /// Target eye height above its position
    pub eye_height: f64,
}

/// Per-tick view of the gun's environment
pub trait GunProvider {
    /// Current controller
    fn controller(&self) -> ControllerKind;

    /// Whether the trigger is held (player control)
    fn trigger_held(&self) -> bool;

    /// World position of the gun's pivot
    fn gun_position(&self) -> Point3;

    /// Point a player controller is aiming at
    fn aim_target(&self) -> Option<Point3>;

    /// Nearest hostile within `radius` of the gun, for autonomous fire
    fn nearest_hostile(&self, radius: f64) -> Option<TargetInfo>;
}

/// Sound/animation notifications emitted by gun updates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GunEvent {
    /// A round left the barrel
    Fired {
        /// Which muzzle fired
        muzzle_index: usize,
    },
    /// A reload was accepted and is in progress
    ReloadStarted,
    /// Queued rounds became available ammo
    ReloadComplete,
}

/// A projectile leaving a muzzle
#[derive(Debug, Clone)]
pub struct ProjectileSpawn {
    /// Id of the gun that fired
    pub gun_id: u64,
    /// Loaded bullet type id
    pub bullet: String,
    /// Spawn position in world space
    pub position: Point3,
    /// Normalized firing direction, dispersion applied
    pub direction: Vec3,
    /// Initial speed
    pub velocity: f64,
}

/// Receives spawned projectiles
pub trait ProjectileSink {
    /// Accept one spawned projectile
    fn spawn(&mut self, projectile: ProjectileSpawn);
}

impl ProjectileSink for Vec<ProjectileSpawn> {
    fn spawn(&mut self, projectile: ProjectileSpawn) {
        self.push(projectile);
    }
}
