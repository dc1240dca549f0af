//! Enemy wave spawner
//!
//! Every `interval` seconds a wave of `min_wave..=max_wave` enemies is
//! placed around the player. Each attempt either picks a point in a cone in
//! front of the camera (accepted only if the camera's view of it is
//! blocked) or a point in a disc around the player (accepted only if the
//! camera cannot see it). Accepted points are snapped to the ground and the
//! navigation surface. A wave gives up after ten attempts per enemy.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tps_core::Countdown;
use tps_math::{flatten, radians, Quat, Vec3};

use crate::services::{CameraView, WorldServices};

/// Spawner tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    /// Seconds between waves
    pub interval: f32,
    /// Furthest spawn distance from the player
    pub radius: f32,
    /// Closest spawn distance from the player
    pub min_distance: f32,
    pub min_wave: u32,
    pub max_wave: u32,
    /// Probability of trying the camera cone first
    pub front_chance: f32,
    /// Half-angle of the camera cone in degrees
    pub front_half_angle: f32,
    /// Ground probes start this far above the candidate
    pub probe_height: f32,
    /// Search radius when snapping onto the navigation surface
    pub navigation_sample: f32,
    /// Spawned bodies start this far above the surface
    pub lift: f32,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            interval: 5.0,
            radius: 15.0,
            min_distance: 5.0,
            min_wave: 1,
            max_wave: 3,
            front_chance: 0.5,
            front_half_angle: 45.0,
            probe_height: 5.0,
            navigation_sample: 1.0,
            lift: 0.05,
        }
    }
}

/// Wave timer and placement rules
#[derive(Debug, Clone, PartialEq)]
pub struct EnemySpawner {
    config: SpawnerConfig,
    timer: Countdown,
    pending: bool,
    running: bool,
    waves: u64,
}

impl EnemySpawner {
    /// Stopped spawner
    pub fn new(config: SpawnerConfig) -> Self {
        Self {
            config,
            timer: Countdown::new(),
            pending: false,
            running: false,
            waves: 0,
        }
    }

    /// Start the wave loop. The first wave is due on the next tick.
    pub fn start(&mut self) {
        self.running = true;
        self.pending = true;
        self.timer.cancel();
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.pending = false;
        self.timer.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_interval(&mut self, interval: f32) {
        self.config.interval = interval.max(0.0);
    }

    pub fn set_wave_size(&mut self, min: u32, max: u32) {
        self.config.min_wave = min;
        self.config.max_wave = max.max(min);
    }

    pub fn config(&self) -> &SpawnerConfig {
        &self.config
    }

    /// Waves started since the last reset
    pub fn waves(&self) -> u64 {
        self.waves
    }

    /// Advance the wave timer. Returns true when a wave is due.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.running {
            return false;
        }
        let due = if self.pending {
            self.pending = false;
            true
        } else {
            self.timer.tick(dt)
        };
        if due {
            self.timer.start(self.config.interval);
            self.waves += 1;
        }
        due
    }

    /// Pick spawn points for one wave
    pub fn plan_wave<R: Rng + ?Sized>(
        &self,
        player: Vec3,
        camera: &CameraView,
        services: &dyn WorldServices,
        rng: &mut R,
    ) -> Vec<Vec3> {
        let cfg = &self.config;
        let wanted = rng.gen_range(cfg.min_wave..=cfg.max_wave.max(cfg.min_wave)) as usize;
        let mut points = Vec::with_capacity(wanted);
        let mut attempts = 0;

        while points.len() < wanted && attempts < wanted * 10 {
            attempts += 1;
            if let Some(point) = self.try_point(player, camera, services, rng) {
                points.push(point);
            }
        }

        if points.len() < wanted {
            log::debug!("Wave placed {}/{} enemies after {} attempts", points.len(), wanted, attempts);
        }
        points
    }

    fn try_point<R: Rng + ?Sized>(
        &self,
        player: Vec3,
        camera: &CameraView,
        services: &dyn WorldServices,
        rng: &mut R,
    ) -> Option<Vec3> {
        let cfg = &self.config;
        let in_front = rng.gen::<f32>() < cfg.front_chance;

        let offset = if in_front {
            let yaw = rng.gen_range(-cfg.front_half_angle..=cfg.front_half_angle);
            let direction = Quat::from_rotation_y(radians(yaw)).rotate(flatten(camera.forward));
            direction * rng.gen_range(cfg.min_distance..=cfg.radius.max(cfg.min_distance))
        } else {
            inside_unit_circle(rng) * cfg.radius
        };

        if offset.length() < cfg.min_distance {
            return None;
        }

        let probe = player + offset + Vec3::new(0.0, cfg.probe_height, 0.0);
        let ground = probe.with_y(services.ground_below(probe)?);

        let allowed = if in_front {
            camera.is_in_front(ground) && services.is_blocked(camera, ground)
        } else {
            !services.is_visible(camera, ground)
        };
        if !allowed {
            return None;
        }

        let surface = services.sample_navigation(ground, cfg.navigation_sample)?;
        Some(surface + Vec3::new(0.0, cfg.lift, 0.0))
    }

    /// Stop and clear the wave count (session restart)
    pub fn reset(&mut self) {
        self.stop();
        self.waves = 0;
    }
}

impl Default for EnemySpawner {
    fn default() -> Self {
        Self::new(SpawnerConfig::default())
    }
}

/// Uniform point in the unit disc on the XZ plane
fn inside_unit_circle<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let x = rng.gen_range(-1.0f32..=1.0);
        let z = rng.gen_range(-1.0f32..=1.0);
        if x * x + z * z <= 1.0 {
            return Vec3::new(x, 0.0, z);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::FlatWorld;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_first_wave_is_immediate_then_every_interval() {
        let mut spawner = EnemySpawner::default();
        assert!(!spawner.tick(1.0));

        spawner.start();
        assert!(spawner.tick(0.0));
        assert!(!spawner.tick(4.0));
        assert!(spawner.tick(1.0));
        assert_eq!(spawner.waves(), 2);

        spawner.stop();
        assert!(!spawner.tick(10.0));
    }

    #[test]
    fn test_wave_points_respect_distance_and_visibility() {
        let world = FlatWorld::default();
        let camera = CameraView::new(Vec3::new(0.0, 2.0, -3.0), Vec3::Z);
        let spawner = EnemySpawner::default();
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..50 {
            for point in spawner.plan_wave(Vec3::ZERO, &camera, &world, &mut rng) {
                let flat = point.with_y(0.0);
                assert!(flat.length() >= 5.0 && flat.length() <= 15.0);
                assert!(!world.is_visible(&camera, point.with_y(0.0)));
                assert!((point.y - 0.05).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_blocked_cone_allows_front_spawns() {
        let world = FlatWorld::default().with_occluder(Vec3::new(0.0, 1.0, 3.0), 2.5);
        let camera = CameraView::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Z);
        let spawner = EnemySpawner::new(SpawnerConfig {
            front_chance: 1.0,
            min_wave: 3,
            max_wave: 3,
            ..Default::default()
        });
        let mut rng = StdRng::seed_from_u64(5);

        let points = spawner.plan_wave(Vec3::ZERO, &camera, &world, &mut rng);
        assert!(!points.is_empty());
        assert!(points.iter().all(|p| p.z > 0.0));
    }

    #[test]
    fn test_wave_size_bounds() {
        let mut spawner = EnemySpawner::default();
        spawner.set_wave_size(4, 2);
        assert_eq!(spawner.config().min_wave, 4);
        assert_eq!(spawner.config().max_wave, 4);
    }
}
