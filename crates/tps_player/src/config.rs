//! Player tuning

use serde::{Deserialize, Serialize};
use tps_combat::ShootingMethod;

/// Locomotion, aim and motor tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Speed while aiming
    pub walk_speed: f32,
    /// Speed while not aiming
    pub run_speed: f32,
    /// Starting and base max health
    pub max_health: i32,
    /// Gravity acceleration (negative = down)
    pub gravity: f32,
    /// Vertical velocity set on jump
    pub jump_velocity: f32,
    /// Vertical velocity held while grounded and falling
    pub ground_stick: f32,
    /// Facing turn rate when not aiming, degrees per second
    pub face_turn_degrees: f32,
    /// Seconds to ramp speed in Run
    pub run_ramp: f32,
    /// Seconds to ramp speed in Idle
    pub idle_ramp: f32,
    /// Seconds to ramp speed and aim weight in Aim and Reload
    pub aim_ramp: f32,
    /// Camera may swing this far left of the root before it turns, degrees
    pub aim_left_limit: f32,
    /// Camera may swing this far right of the root before it turns, degrees
    pub aim_right_limit: f32,
    /// Root turn rate while catching up with the camera, radians per second
    pub aim_turn_rate: f32,
    /// Turning stops below this angle, degrees
    pub aim_stop_degrees: f32,
    /// Aim constraint weight while the root is turning
    pub aim_turning_weight: f32,
    /// Strafe blend input smoothing rate
    pub input_smoothing: f32,
    /// Animation cross-fade duration
    pub crossfade: f32,
    /// Seconds between single-fire presses
    pub single_cooldown: f32,
    /// Seconds between burst presses
    pub burst_cooldown: f32,
    /// Fire events honoured per burst animation
    pub burst_rounds: u32,
    /// Health fraction at or below which the HUD warns
    pub danger_fraction: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            walk_speed: 1.5,
            run_speed: 3.0,
            max_health: 100,
            gravity: -9.81,
            jump_velocity: 3.0,
            ground_stick: -2.0,
            face_turn_degrees: 650.0,
            run_ramp: 0.5,
            idle_ramp: 0.5,
            aim_ramp: 0.7,
            aim_left_limit: -50.0,
            aim_right_limit: 75.0,
            aim_turn_rate: 5.0,
            aim_stop_degrees: 0.5,
            aim_turning_weight: 0.8,
            input_smoothing: 10.0,
            crossfade: 0.1,
            single_cooldown: 0.25,
            burst_cooldown: 0.5,
            burst_rounds: 3,
            danger_fraction: 0.3,
        }
    }
}

impl PlayerConfig {
    /// Minimum seconds between accepted presses of a method. Automatic fire
    /// is gated by the held trigger instead.
    pub fn cooldown(&self, method: ShootingMethod) -> f32 {
        match method {
            ShootingMethod::Auto => 0.0,
            ShootingMethod::Burst => self.burst_cooldown,
            ShootingMethod::Single => self.single_cooldown,
        }
    }

    /// Fire callbacks one press of a method is worth
    pub fn rounds_per_press(&self, method: ShootingMethod) -> u32 {
        match method {
            ShootingMethod::Auto => 0,
            ShootingMethod::Burst => self.burst_rounds,
            ShootingMethod::Single => 1,
        }
    }
}
