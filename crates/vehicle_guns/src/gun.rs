//! Gun state machine
//!
//! A gun is a set of overlapping counters, not a single state: windup,
//! firing cooldown, and reload all advance independently each tick, so a
//! gun can wind down while a reload finishes. Aim tracking runs every tick
//! regardless; firing only happens when every counter lines up.

use rand::Rng;

use vehicle_render::foundation::math::{rotate_degrees, utils, Vec3};

use crate::provider::{
    ControllerKind, GunEvent, GunProvider, ProjectileSink, ProjectileSpawn, Side,
};

/// Radius searched for hostile targets under autonomous control
pub const TARGET_SEARCH_RADIUS: f64 = 48.0;

/// Static configuration of a gun
#[derive(Debug, Clone)]
pub struct GunDefinition {
    /// Bore diameter in millimeters
    pub diameter: f64,
    /// Barrel length
    pub length: f64,
    /// Rounds the gun holds when fully loaded
    pub capacity: u32,
    /// Ticks between shots
    pub fire_delay: u32,
    /// Ticks a reload takes to complete
    pub reload_time: u32,
    /// Ticks of spool-up before the gun may fire
    pub windup_time: u32,
    /// Projectile speed
    pub muzzle_velocity: f64,
    /// Yaw clamp, low side
    pub yaw_min: f64,
    /// Yaw clamp, high side
    pub yaw_max: f64,
    /// Pitch clamp, low side
    pub pitch_min: f64,
    /// Pitch clamp, high side
    pub pitch_max: f64,
    /// Resting yaw when uncontrolled
    pub default_yaw: f64,
    /// Resting pitch when uncontrolled
    pub default_pitch: f64,
    /// Fire independently of sibling guns, skipping the desync offset
    pub fire_solo: bool,
    /// Return to the resting angles when nobody is controlling the gun
    pub resets_position: bool,
    /// Muzzle positions relative to the gun pivot
    pub muzzles: Vec<Vec3>,
}

impl GunDefinition {
    /// Aim tracking rate in degrees per tick. Smaller and shorter guns
    /// track faster.
    pub fn track_rate(&self) -> f64 {
        50.0 / self.diameter + 1.0 / self.length
    }

    /// Whether the mount spins freely instead of clamping yaw.
    pub fn is_full_rotation(&self) -> bool {
        self.yaw_min <= -180.0 && self.yaw_max >= 180.0
    }

    /// Shot dispersion half-spread in degrees.
    pub fn dispersion_degrees(&self) -> f64 {
        10.0 * self.diameter / (self.length * 1000.0)
    }
}

/// A loadable round type
#[derive(Debug, Clone, PartialEq)]
pub struct BulletType {
    /// Round identity, matched on reload and persisted
    pub id: String,
    /// Round diameter in millimeters
    pub diameter: f64,
    /// Rounds one reload of this type provides
    pub rounds: u32,
}

/// One mounted gun with its live state
#[derive(Debug, Clone)]
pub struct Gun {
    /// Unique id, server-allocated
    pub id: u64,
    /// Static configuration
    pub definition: GunDefinition,
    /// 1-based position within a multi-gun battery
    pub gun_number: u32,
    /// Battery size
    pub total_guns: u32,
    /// Current yaw in degrees
    pub yaw: f64,
    /// Current pitch in degrees
    pub pitch: f64,
    /// Spool-up animation accumulator; grows by the current windup each
    /// tick
    pub windup_rotation: f64,
    target_yaw: f64,
    target_pitch: f64,
    locked_on: bool,
    windup: u32,
    cooldown: u32,
    trigger_was_held: bool,
    bullets_left: u32,
    bullets_fired: u32,
    bullets_reloading: u32,
    reload_ticks: u32,
    loaded_bullet: Option<String>,
}

impl Gun {
    /// Create an idle gun at its resting angles.
    pub fn new(id: u64, definition: GunDefinition, gun_number: u32, total_guns: u32) -> Self {
        let yaw = definition.default_yaw;
        let pitch = definition.default_pitch;
        Self {
            id,
            definition,
            gun_number,
            total_guns,
            yaw,
            pitch,
            windup_rotation: 0.0,
            target_yaw: yaw,
            target_pitch: pitch,
            locked_on: false,
            windup: 0,
            cooldown: 0,
            trigger_was_held: false,
            bullets_left: 0,
            bullets_fired: 0,
            bullets_reloading: 0,
            reload_ticks: 0,
            loaded_bullet: None,
        }
    }

    /// Rounds currently available to fire
    pub fn bullets_left(&self) -> u32 {
        self.bullets_left
    }

    /// Total rounds fired over the gun's lifetime
    pub fn bullets_fired(&self) -> u32 {
        self.bullets_fired
    }

    /// Currently loaded round type, if any
    pub fn loaded_bullet(&self) -> Option<&str> {
        self.loaded_bullet.as_deref()
    }

    /// Whether a reload is in progress
    pub fn is_reloading(&self) -> bool {
        self.reload_ticks > 0
    }

    /// Whether autonomous fire considers the gun on target
    pub fn is_locked_on(&self) -> bool {
        self.locked_on
    }

    pub(crate) fn restore_state(
        &mut self,
        yaw: f64,
        pitch: f64,
        bullets_left: u32,
        bullets_fired: u32,
        loaded_bullet: Option<String>,
    ) {
        self.yaw = yaw;
        self.pitch = pitch;
        self.target_yaw = yaw;
        self.target_pitch = pitch;
        self.bullets_left = bullets_left;
        self.bullets_fired = bullets_fired;
        self.loaded_bullet = loaded_bullet;
    }

    /// Offer a reload. Returns false, with no state change, when the gun
    /// cannot accept it.
    ///
    /// A reload is accepted when no other reload is in progress, the round
    /// matches the loaded type (or the gun is empty and the diameter
    /// matches), and the new rounds fit the capacity.
    pub fn try_reload(&mut self, bullet: &BulletType, events: &mut Vec<GunEvent>) -> bool {
        if self.bullets_reloading > 0 {
            return false;
        }
        let compatible = match &self.loaded_bullet {
            Some(loaded) if self.bullets_left > 0 => loaded == &bullet.id,
            _ => bullet.diameter == self.definition.diameter,
        };
        if !compatible {
            return false;
        }
        if self.bullets_left + bullet.rounds > self.definition.capacity {
            return false;
        }
        self.bullets_reloading = bullet.rounds;
        self.reload_ticks = self.definition.reload_time.max(1);
        self.loaded_bullet = Some(bullet.id.clone());
        events.push(GunEvent::ReloadStarted);
        log::debug!("Gun {} reloading {} rounds of {}", self.id, bullet.rounds, bullet.id);
        true
    }

    /// Advance the gun one tick.
    ///
    /// Ammo is only mutated on the server; the client runs the same update
    /// for animation and sound but never consumes rounds.
    pub fn update(
        &mut self,
        side: Side,
        provider: &dyn GunProvider,
        events: &mut Vec<GunEvent>,
        projectiles: &mut dyn ProjectileSink,
    ) {
        let (aim_point, intent, require_lock) = match provider.controller() {
            ControllerKind::Player => (provider.aim_target(), provider.trigger_held(), false),
            ControllerKind::Autonomous => {
                match provider.nearest_hostile(TARGET_SEARCH_RADIUS) {
                    Some(target) => {
                        let aim = target.position
                            + Vec3::new(0.0, target.eye_height / 2.0, 0.0);
                        let distance = (aim - provider.gun_position()).norm();
                        // Lead by the target's travel over the projected
                        // flight time.
                        let lead = target.velocity
                            * (distance / self.definition.muzzle_velocity / 20.0 / 10.0);
                        (Some(aim + lead), true, true)
                    }
                    None => (None, false, true),
                }
            }
            ControllerKind::None => (None, false, false),
        };

        match aim_point {
            Some(point) => {
                let delta = point - provider.gun_position();
                self.target_yaw = utils::rad_to_deg(delta.x.atan2(delta.z));
                self.target_pitch = -utils::rad_to_deg(delta.y.atan2(delta.x.hypot(delta.z)));
            }
            None if self.definition.resets_position => {
                self.target_yaw = self.definition.default_yaw;
                self.target_pitch = self.definition.default_pitch;
            }
            None => {}
        }

        self.track_toward_target();

        // Windup spools while firing is intended, even on an empty gun,
        // and bleeds off otherwise.
        if intent {
            if self.windup < self.definition.windup_time {
                self.windup += 1;
            }
        } else if self.windup > 0 {
            self.windup -= 1;
        }
        self.windup_rotation += f64::from(self.windup);

        // A fresh trigger pull staggers this gun behind its battery
        // siblings so multi-barrel units fire in sequence.
        if intent && !self.trigger_was_held && !self.definition.fire_solo && self.total_guns > 1 {
            let stagger = self.definition.fire_delay * (self.gun_number - 1) / self.total_guns;
            self.cooldown = self.cooldown.max(stagger);
        }

        // The cooldown check uses the value at tick start, so the trigger
        // tick itself is not part of the delay.
        let can_fire = self.cooldown == 0;
        if self.cooldown > 0 {
            self.cooldown -= 1;
        }

        let on_target = !require_lock || self.locked_on;
        if intent
            && on_target
            && can_fire
            && self.windup == self.definition.windup_time
            && self.bullets_left > 0
        {
            self.fire(side, provider, events, projectiles);
        }

        if self.reload_ticks > 0 {
            self.reload_ticks -= 1;
            if self.reload_ticks == 0 {
                self.bullets_left += self.bullets_reloading;
                self.bullets_reloading = 0;
                events.push(GunEvent::ReloadComplete);
            }
        }

        self.trigger_was_held = intent;
    }

    fn track_toward_target(&mut self) {
        let rate = self.definition.track_rate();
        let full_rotation = self.definition.is_full_rotation();

        let (clamped_target_yaw, yaw_reachable) = if full_rotation {
            (self.target_yaw, true)
        } else {
            let clamped = self
                .target_yaw
                .clamp(self.definition.yaw_min, self.definition.yaw_max);
            (clamped, clamped == self.target_yaw)
        };
        let yaw_delta = if full_rotation {
            utils::clamped_yaw_delta(self.yaw, clamped_target_yaw)
        } else {
            clamped_target_yaw - self.yaw
        };
        self.yaw += yaw_delta.clamp(-rate, rate);
        if full_rotation {
            self.yaw = utils::wrap_delta_degrees(self.yaw);
        }

        let clamped_target_pitch = self
            .target_pitch
            .clamp(self.definition.pitch_min, self.definition.pitch_max);
        let pitch_reachable = clamped_target_pitch == self.target_pitch;
        let pitch_delta = clamped_target_pitch - self.pitch;
        self.pitch += pitch_delta.clamp(-rate, rate);

        self.locked_on = yaw_reachable
            && pitch_reachable
            && yaw_delta.abs() <= rate
            && pitch_delta.abs() <= rate;
    }

    fn fire(
        &mut self,
        side: Side,
        provider: &dyn GunProvider,
        events: &mut Vec<GunEvent>,
        projectiles: &mut dyn ProjectileSink,
    ) {
        let muzzle_count = self.definition.muzzles.len();
        let muzzle_index = if muzzle_count == self.definition.capacity as usize && muzzle_count > 0
        {
            // One muzzle per round: fire them in order as the magazine
            // empties.
            (self.definition.capacity - self.bullets_left) as usize % muzzle_count
        } else if muzzle_count > 0 {
            self.bullets_fired as usize % muzzle_count
        } else {
            0
        };
        self.cooldown = self.definition.fire_delay;
        events.push(GunEvent::Fired { muzzle_index });

        if side != Side::Server {
            return;
        }
        self.bullets_left -= 1;
        self.bullets_fired += 1;

        let bullet = match &self.loaded_bullet {
            Some(bullet) => bullet.clone(),
            None => return,
        };
        let mut rng = rand::thread_rng();
        let spread = self.definition.dispersion_degrees();
        let yaw = self.yaw + (rng.gen::<f64>() - 0.5) * spread;
        let pitch = self.pitch + (rng.gen::<f64>() - 0.5) * spread;
        let angles = Vec3::new(pitch, yaw, 0.0);
        let direction = rotate_degrees(&Vec3::z(), &angles);
        let muzzle = self
            .definition
            .muzzles
            .get(muzzle_index)
            .copied()
            .unwrap_or_else(Vec3::zeros);
        let position = provider.gun_position() + rotate_degrees(&muzzle, &angles);
        projectiles.spawn(ProjectileSpawn {
            gun_id: self.id,
            bullet,
            position,
            direction,
            velocity: self.definition.muzzle_velocity,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::TargetInfo;
    use approx::assert_relative_eq;
    use vehicle_render::foundation::math::Point3;

    struct TestProvider {
        controller: ControllerKind,
        trigger: bool,
        aim: Option<Point3>,
        hostile: Option<TargetInfo>,
    }

    impl Default for TestProvider {
        fn default() -> Self {
            Self {
                controller: ControllerKind::Player,
                trigger: false,
                aim: None,
                hostile: None,
            }
        }
    }

    impl GunProvider for TestProvider {
        fn controller(&self) -> ControllerKind {
            self.controller
        }

        fn trigger_held(&self) -> bool {
            self.trigger
        }

        fn gun_position(&self) -> Point3 {
            Point3::origin()
        }

        fn aim_target(&self) -> Option<Point3> {
            self.aim
        }

        fn nearest_hostile(&self, _radius: f64) -> Option<TargetInfo> {
            self.hostile.clone()
        }
    }

    fn cannon() -> GunDefinition {
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

    fn shells(rounds: u32) -> BulletType {
        BulletType {
            id: "shell_50mm".to_string(),
            diameter: 50.0,
            rounds,
        }
    }

    fn loaded_gun(definition: GunDefinition, rounds: u32) -> Gun {
        let mut gun = Gun::new(1, definition, 1, 1);
        let mut events = Vec::new();
        assert!(gun.try_reload(&shells(rounds), &mut events));
        let provider = TestProvider::default();
        let mut projectiles: Vec<ProjectileSpawn> = Vec::new();
        gun.update(Side::Server, &provider, &mut events, &mut projectiles);
        assert_eq!(gun.bullets_left(), rounds);
        gun
    }

    fn fired_count(events: &[GunEvent]) -> usize {
        events
            .iter()
            .filter(|event| matches!(event, GunEvent::Fired { .. }))
            .count()
    }

    #[test]
    fn test_fires_every_six_ticks_until_empty() {
        let mut gun = loaded_gun(cannon(), 10);
        let provider = TestProvider {
            trigger: true,
            ..Default::default()
        };
        let mut events = Vec::new();
        let mut projectiles: Vec<ProjectileSpawn> = Vec::new();

        // Shots land on ticks 0, 6, 12, ..., 54: five ticks of cooldown
        // plus the trigger tick itself.
        for tick in 0..55 {
            let before = fired_count(&events);
            gun.update(Side::Server, &provider, &mut events, &mut projectiles);
            let fired_this_tick = fired_count(&events) - before;
            assert_eq!(
                fired_this_tick,
                usize::from(tick % 6 == 0),
                "unexpected fire state at tick {tick}"
            );
        }
        assert_eq!(fired_count(&events), 10);
        assert_eq!(projectiles.len(), 10);
        assert_eq!(gun.bullets_left(), 0);
        assert_eq!(gun.bullets_fired(), 10);

        // Empty gun keeps ticking without firing or underflowing.
        for _ in 0..20 {
            gun.update(Side::Server, &provider, &mut events, &mut projectiles);
        }
        assert_eq!(fired_count(&events), 10);
        assert_eq!(gun.bullets_left(), 0);
    }

    #[test]
    fn test_client_never_consumes_ammo() {
        let mut gun = loaded_gun(cannon(), 10);
        let provider = TestProvider {
            trigger: true,
            ..Default::default()
        };
        let mut events = Vec::new();
        let mut projectiles: Vec<ProjectileSpawn> = Vec::new();
        for _ in 0..30 {
            gun.update(Side::Client, &provider, &mut events, &mut projectiles);
        }
        // The client still plays fire events for sound/animation.
        assert!(fired_count(&events) > 0);
        assert_eq!(gun.bullets_left(), 10);
        assert!(projectiles.is_empty());
    }

    #[test]
    fn test_reload_accept_and_reject_rules() {
        let mut events = Vec::new();

        // Matching diameter into an empty gun: accepted.
        let mut gun = Gun::new(1, cannon(), 1, 1);
        assert!(gun.try_reload(&shells(10), &mut events));
        assert_eq!(events, vec![GunEvent::ReloadStarted]);

        // A second reload while one is in progress: rejected.
        assert!(!gun.try_reload(&shells(10), &mut events));

        // Wrong diameter into an empty gun: rejected.
        let mut gun = Gun::new(2, cannon(), 1, 1);
        let wrong = BulletType {
            id: "shell_30mm".to_string(),
            diameter: 30.0,
            rounds: 10,
        };
        assert!(!gun.try_reload(&wrong, &mut events));
        assert_eq!(gun.loaded_bullet(), None);

        // Different type while compatible rounds remain: rejected.
        let mut gun = loaded_gun(cannon(), 5);
        let other = BulletType {
            id: "shell_50mm_he".to_string(),
            diameter: 50.0,
            rounds: 5,
        };
        assert!(!gun.try_reload(&other, &mut events));
        assert_eq!(gun.loaded_bullet(), Some("shell_50mm"));

        // Same type tops up, but never past capacity.
        assert!(!gun.try_reload(&shells(6), &mut events));
        assert_eq!(gun.bullets_left(), 5);
        let mut events = Vec::new();
        assert!(gun.try_reload(&shells(5), &mut events));
        let provider = TestProvider::default();
        let mut projectiles: Vec<ProjectileSpawn> = Vec::new();
        gun.update(Side::Server, &provider, &mut events, &mut projectiles);
        assert_eq!(gun.bullets_left(), 10);
        assert!(events.contains(&GunEvent::ReloadComplete));
    }

    #[test]
    fn test_empty_gun_accepts_new_type_of_matching_diameter() {
        let mut gun = loaded_gun(cannon(), 1);
        let provider = TestProvider {
            trigger: true,
            ..Default::default()
        };
        let mut events = Vec::new();
        let mut projectiles: Vec<ProjectileSpawn> = Vec::new();
        gun.update(Side::Server, &provider, &mut events, &mut projectiles);
        assert_eq!(gun.bullets_left(), 0);

        let other = BulletType {
            id: "shell_50mm_he".to_string(),
            diameter: 50.0,
            rounds: 10,
        };
        assert!(gun.try_reload(&other, &mut events));
        assert_eq!(gun.loaded_bullet(), Some("shell_50mm_he"));
    }

    #[test]
    fn test_windup_gates_fire_and_accumulates_rotation() {
        let mut definition = cannon();
        definition.windup_time = 3;
        let mut gun = loaded_gun(definition, 10);
        let provider = TestProvider {
            trigger: true,
            ..Default::default()
        };
        let mut events = Vec::new();
        let mut projectiles: Vec<ProjectileSpawn> = Vec::new();

        gun.update(Side::Server, &provider, &mut events, &mut projectiles);
        gun.update(Side::Server, &provider, &mut events, &mut projectiles);
        assert_eq!(fired_count(&events), 0);
        gun.update(Side::Server, &provider, &mut events, &mut projectiles);
        assert_eq!(fired_count(&events), 1);
        // Spool turns: 1 + 2 + 3.
        assert_relative_eq!(gun.windup_rotation, 6.0, epsilon = 1e-9);

        // Released trigger winds back down.
        let idle = TestProvider::default();
        gun.update(Side::Server, &idle, &mut events, &mut projectiles);
        assert_relative_eq!(gun.windup_rotation, 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_gun_spools_windup_without_firing() {
        let mut definition = cannon();
        definition.windup_time = 3;
        let mut gun = Gun::new(1, definition, 1, 1);
        let provider = TestProvider {
            trigger: true,
            ..Default::default()
        };
        let mut events = Vec::new();
        let mut projectiles: Vec<ProjectileSpawn> = Vec::new();
        for _ in 0..5 {
            gun.update(Side::Server, &provider, &mut events, &mut projectiles);
        }
        // Spool turns: 1 + 2 + 3 + 3 + 3, with nothing to fire.
        assert_relative_eq!(gun.windup_rotation, 13.0, epsilon = 1e-9);
        assert_eq!(fired_count(&events), 0);
    }

    #[test]
    fn test_track_rate_from_caliber_and_length() {
        let mut definition = cannon();
        definition.diameter = 25.0;
        definition.length = 2.0;
        assert_relative_eq!(definition.track_rate(), 2.5, epsilon = 1e-9);
    }

    #[test]
    fn test_full_rotation_yaw_wraps_across_seam() {
        let mut definition = cannon();
        definition.diameter = 25.0;
        definition.length = 2.0;
        let mut gun = Gun::new(1, definition, 1, 1);
        gun.yaw = -179.0;
        let provider = TestProvider {
            aim: Some(Point3::new(
                utils::deg_to_rad(179.0).sin() * 10.0,
                0.0,
                utils::deg_to_rad(179.0).cos() * 10.0,
            )),
            ..Default::default()
        };
        let mut events = Vec::new();
        let mut projectiles: Vec<ProjectileSpawn> = Vec::new();
        gun.update(Side::Server, &provider, &mut events, &mut projectiles);
        // The short way from -179 to 179 crosses the seam.
        assert_relative_eq!(gun.yaw, 179.0, epsilon = 1e-6);
    }

    #[test]
    fn test_clamped_mount_never_locks_onto_out_of_arc_target() {
        let mut definition = cannon();
        definition.diameter = 5.0;
        definition.length = 2.0;
        definition.yaw_min = -30.0;
        definition.yaw_max = 30.0;
        let mut gun = Gun::new(1, definition, 1, 1);
        let mut events = Vec::new();
        assert!(gun.try_reload(&shells(10), &mut events));

        // Hostile at 90 degrees yaw, outside the arc.
        let provider = TestProvider {
            controller: ControllerKind::Autonomous,
            hostile: Some(TargetInfo {
                position: Point3::new(10.0, 0.0, 0.0),
                velocity: Vec3::zeros(),
                eye_height: 0.0,
            }),
            ..Default::default()
        };
        let mut projectiles: Vec<ProjectileSpawn> = Vec::new();
        for _ in 0..20 {
            gun.update(Side::Server, &provider, &mut events, &mut projectiles);
        }
        assert_relative_eq!(gun.yaw, 30.0, epsilon = 1e-6);
        assert!(!gun.is_locked_on());
        assert_eq!(fired_count(&events), 0);
    }

    #[test]
    fn test_autonomous_gun_locks_and_fires_at_reachable_target() {
        let mut definition = cannon();
        definition.diameter = 5.0;
        definition.length = 2.0;
        let mut gun = Gun::new(1, definition, 1, 1);
        let mut events = Vec::new();
        assert!(gun.try_reload(&shells(10), &mut events));

        let provider = TestProvider {
            controller: ControllerKind::Autonomous,
            hostile: Some(TargetInfo {
                position: Point3::new(0.0, 0.0, 10.0),
                velocity: Vec3::zeros(),
                eye_height: 2.0,
            }),
            ..Default::default()
        };
        let mut projectiles: Vec<ProjectileSpawn> = Vec::new();
        for _ in 0..10 {
            gun.update(Side::Server, &provider, &mut events, &mut projectiles);
        }
        assert!(gun.is_locked_on());
        assert!(fired_count(&events) > 0);
        // Aim point is mid-body: pitched slightly up toward eye height / 2.
        assert!(gun.pitch < 0.0);
        assert!(!projectiles.is_empty());
        let shot = &projectiles[0];
        assert_eq!(shot.bullet, "shell_50mm");
        assert_relative_eq!(shot.direction.norm(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_capacity_matched_muzzles_fire_in_order() {
        let mut definition = cannon();
        definition.capacity = 2;
        definition.fire_delay = 0;
        definition.muzzles = vec![Vec3::new(-1.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 1.0)];
        let mut gun = loaded_gun(definition, 2);
        let provider = TestProvider {
            trigger: true,
            ..Default::default()
        };
        let mut events = Vec::new();
        let mut projectiles: Vec<ProjectileSpawn> = Vec::new();
        gun.update(Side::Server, &provider, &mut events, &mut projectiles);
        gun.update(Side::Server, &provider, &mut events, &mut projectiles);
        let muzzles: Vec<usize> = events
            .iter()
            .filter_map(|event| match event {
                GunEvent::Fired { muzzle_index } => Some(*muzzle_index),
                _ => None,
            })
            .collect();
        assert_eq!(muzzles, vec![0, 1]);
    }

    #[test]
    fn test_round_robin_muzzles_cycle_by_shots_fired() {
        let mut definition = cannon();
        definition.fire_delay = 0;
        definition.muzzles = vec![
            Vec3::new(-1.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
        ];
        let mut gun = loaded_gun(definition, 10);
        let provider = TestProvider {
            trigger: true,
            ..Default::default()
        };
        let mut events = Vec::new();
        let mut projectiles: Vec<ProjectileSpawn> = Vec::new();
        for _ in 0..4 {
            gun.update(Side::Server, &provider, &mut events, &mut projectiles);
        }
        let muzzles: Vec<usize> = events
            .iter()
            .filter_map(|event| match event {
                GunEvent::Fired { muzzle_index } => Some(*muzzle_index),
                _ => None,
            })
            .collect();
        assert_eq!(muzzles, vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_battery_stagger_delays_later_guns() {
        // Second gun of two with fire delay 6 starts 3 ticks late.
        let mut gun = Gun::new(2, cannon(), 2, 2);
        gun.definition.fire_delay = 6;
        let mut events = Vec::new();
        assert!(gun.try_reload(&shells(10), &mut events));
        let provider = TestProvider {
            trigger: true,
            ..Default::default()
        };
        let mut projectiles: Vec<ProjectileSpawn> = Vec::new();
        let mut first_shot_tick = None;
        for tick in 0..10 {
            gun.update(Side::Server, &provider, &mut events, &mut projectiles);
            if first_shot_tick.is_none() && fired_count(&events) > 0 {
                first_shot_tick = Some(tick);
            }
        }
        // The stagger holds fire through ticks 0-2; the first shot lands
        // on tick 3.
        assert_eq!(first_shot_tick, Some(3));
    }

    #[test]
    fn test_uncontrolled_gun_returns_to_rest() {
        let mut definition = cannon();
        definition.diameter = 5.0;
        definition.length = 2.0;
        definition.resets_position = true;
        definition.default_yaw = 0.0;
        let mut gun = Gun::new(1, definition, 1, 1);
        gun.yaw = 40.0;
        let provider = TestProvider {
            controller: ControllerKind::None,
            ..Default::default()
        };
        let mut events = Vec::new();
        let mut projectiles: Vec<ProjectileSpawn> = Vec::new();
        for _ in 0..10 {
            gun.update(Side::Server, &provider, &mut events, &mut projectiles);
        }
        assert_relative_eq!(gun.yaw, 0.0, epsilon = 1e-6);
    }
}
