//! Per-side gun store
//!
//! Each simulation side owns one registry, passed explicitly to whatever
//! needs gun access. The server allocates fresh ids; clients adopt ids
//! from snapshots so both sides agree on identity.

use std::collections::HashMap;

use crate::gun::{BulletType, Gun, GunDefinition};
use crate::provider::Side;
use crate::snapshot::GunSnapshot;

/// Owned store of every gun on one side
pub struct GunRegistry {
    side: Side,
    guns: HashMap<u64, Gun>,
    next_id: u64,
}

impl GunRegistry {
    /// Create an empty registry for one side.
    pub fn new(side: Side) -> Self {
        Self {
            side,
            guns: HashMap::new(),
            next_id: 1,
        }
    }

    /// Which side this registry serves
    pub fn side(&self) -> Side {
        self.side
    }

    /// Create a gun with a fresh id. Server side only; clients adopt
    /// server state through [`GunRegistry::adopt`] instead.
    pub fn register(
        &mut self,
        definition: GunDefinition,
        gun_number: u32,
        total_guns: u32,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.guns
            .insert(id, Gun::new(id, definition, gun_number, total_guns));
        log::debug!("Registered gun {id} ({gun_number}/{total_guns})");
        id
    }

    /// Create a gun from a snapshot, keeping its id.
    pub fn adopt(
        &mut self,
        definition: GunDefinition,
        snapshot: &GunSnapshot,
        known_bullets: &[BulletType],
        gun_number: u32,
        total_guns: u32,
    ) {
        let mut gun = Gun::new(snapshot.id, definition, gun_number, total_guns);
        gun.restore(snapshot, known_bullets);
        // Keep id allocation ahead of adopted ids so later registration
        // never collides.
        self.next_id = self.next_id.max(snapshot.id + 1);
        self.guns.insert(snapshot.id, gun);
    }

    /// Look up a gun by id
    pub fn get(&self, id: u64) -> Option<&Gun> {
        self.guns.get(&id)
    }

    /// Look up a gun mutably by id
    pub fn get_mut(&mut self, id: u64) -> Option<&mut Gun> {
        self.guns.get_mut(&id)
    }

    /// Remove a gun, returning it if present
    pub fn remove(&mut self, id: u64) -> Option<Gun> {
        self.guns.remove(&id)
    }

    /// Iterate all guns mutably, for per-tick updates
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Gun> {
        self.guns.values_mut()
    }

    /// Number of registered guns
    pub fn len(&self) -> usize {
        self.guns.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.guns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    #[test]
    fn test_server_allocates_sequential_ids() {
        let mut registry = GunRegistry::new(Side::Server);
        let first = registry.register(definition(), 1, 2);
        let second = registry.register(definition(), 2, 2);
        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(registry.len(), 2);
        assert!(registry.get(first).is_some());
    }

    #[test]
    fn test_client_adopts_snapshot_ids() {
        let mut server = GunRegistry::new(Side::Server);
        let id = server.register(definition(), 1, 1);
        let snapshot = server.get(id).unwrap().snapshot();

        let mut client = GunRegistry::new(Side::Client);
        client.adopt(definition(), &snapshot, &[], 1, 1);
        assert_eq!(client.get(id).unwrap().id, id);

        // Later registration never reuses an adopted id.
        let fresh = client.register(definition(), 1, 1);
        assert!(fresh > id);
    }

    #[test]
    fn test_remove_drops_the_gun() {
        let mut registry = GunRegistry::new(Side::Server);
        let id = registry.register(definition(), 1, 1);
        assert!(registry.remove(id).is_some());
        assert!(registry.is_empty());
        assert!(registry.remove(id).is_none());
    }
}
