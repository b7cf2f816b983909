//! Persisted gun state
//!
//! Guns persist as a flat field set. Restoring is tolerant of asset
//! changes: a saved round type that no longer exists just leaves the gun
//! unloaded instead of failing the whole load.

use serde::{Deserialize, Serialize};

use crate::gun::{BulletType, Gun};

/// Serializable gun state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GunSnapshot {
    /// Gun id, preserved so clients can adopt server-created guns
    pub id: u64,
    /// Saved yaw in degrees
    pub yaw: f64,
    /// Saved pitch in degrees
    pub pitch: f64,
    /// Rounds left in the magazine
    pub bullets_left: u32,
    /// Lifetime rounds fired
    pub bullets_fired: u32,
    /// Loaded round type id, if any
    pub loaded_bullet: Option<String>,
}

impl Gun {
    /// Capture the persisted fields.
    pub fn snapshot(&self) -> GunSnapshot {
        GunSnapshot {
            id: self.id,
            yaw: self.yaw,
            pitch: self.pitch,
            bullets_left: self.bullets_left(),
            bullets_fired: self.bullets_fired(),
            loaded_bullet: self.loaded_bullet().map(str::to_string),
        }
    }

    /// Apply a snapshot. `known_bullets` is the current round catalog; a
    /// loaded type missing from it restores as an unloaded gun.
    pub fn restore(&mut self, snapshot: &GunSnapshot, known_bullets: &[BulletType]) {
        self.id = snapshot.id;
        let loaded = match &snapshot.loaded_bullet {
            Some(saved) if known_bullets.iter().any(|bullet| &bullet.id == saved) => {
                Some(saved.clone())
            }
            Some(saved) => {
                log::warn!(
                    "Gun {} was loaded with unknown round {saved}; restoring empty",
                    snapshot.id
                );
                None
            }
            None => None,
        };
        let bullets_left = if loaded.is_some() {
            snapshot.bullets_left
        } else {
            0
        };
        self.restore_state(
            snapshot.yaw,
            snapshot.pitch,
            bullets_left,
            snapshot.bullets_fired,
            loaded,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gun::GunDefinition;
    use crate::provider::GunEvent;
    use vehicle_render::foundation::math::Vec3;

    fn definition() -> GunDefinition {
        GunDefinition {
            diameter: 50.0,
            length: 1000.0,
            capacity: 10,
            fire_delay: 5,
            reload_time: 1,
            windup_time: 0,
            muzzle_velocity: 100.0,
            yaw_min: -180.0,
            yaw_max: 180.0,
            pitch_min: -45.0,
            pitch_max: 45.0,
            default_yaw: 0.0,
            default_pitch: 0.0,
            fire_solo: false,
            resets_position: false,
            muzzles: vec![Vec3::zeros()],
        }
    }

    fn catalog() -> Vec<BulletType> {
        vec![BulletType {
            id: "shell_50mm".to_string(),
            diameter: 50.0,
            rounds: 10,
        }]
    }

    #[test]
    fn test_snapshot_round_trips_through_restore() {
        let mut gun = Gun::new(7, definition(), 1, 1);
        let mut events: Vec<GunEvent> = Vec::new();
        assert!(gun.try_reload(&catalog()[0], &mut events));
        gun.yaw = 12.0;
        let snapshot = gun.snapshot();

        let mut restored = Gun::new(0, definition(), 1, 1);
        restored.restore(&snapshot, &catalog());
        assert_eq!(restored.id, 7);
        assert_eq!(restored.yaw, 12.0);
        assert_eq!(restored.loaded_bullet(), Some("shell_50mm"));
        assert_eq!(restored.snapshot(), snapshot);
    }

    #[test]
    fn test_unknown_round_restores_as_unloaded() {
        let snapshot = GunSnapshot {
            id: 3,
            yaw: 0.0,
            pitch: 0.0,
            bullets_left: 6,
            bullets_fired: 40,
            loaded_bullet: Some("shell_discontinued".to_string()),
        };
        let mut gun = Gun::new(0, definition(), 1, 1);
        gun.restore(&snapshot, &catalog());
        assert_eq!(gun.loaded_bullet(), None);
        assert_eq!(gun.bullets_left(), 0);
        // Fired count survives; only the ammo reference is dropped.
        assert_eq!(gun.bullets_fired(), 40);
    }
}
