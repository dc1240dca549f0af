//! Shared player context and the helpers states build on

use tps_combat::{ShootingMethod, Stat};
use tps_math::{flatten, lerp, rotate_towards, signed_angle, Vec2, Vec3};

use crate::anim::AnimSink;
use crate::config::PlayerConfig;

/// Player states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerStateKey {
    Idle,
    Run,
    Jump,
    Aim,
    Reload,
    Dead,
}

/// Hand holding the rifle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GripHand {
    #[default]
    Right,
    /// Swapped for the magazine change
    Left,
}

/// Mutable record shared by every player state.
///
/// Input writes the intent flags; only the active state writes velocities
/// and per-state flags, and each state clears its own flags on exit.
#[derive(Debug, Clone)]
pub struct PlayerContext {
    pub config: PlayerConfig,

    // Intents
    pub move_input: Vec2,
    pub aiming: bool,
    pub shooting: bool,
    pub jump_requested: bool,
    pub reloading: bool,
    pub dead: bool,
    /// Cleared on death; input frames are ignored afterwards
    pub input_enabled: bool,

    // Locomotion
    pub grounded: bool,
    pub current_speed: f32,
    pub target_speed: f32,
    pub walk_speed: Stat,
    pub run_speed: Stat,
    /// Consumed by the motor once per tick
    pub horizontal_velocity: Vec3,
    pub vertical_velocity: f32,
    pub last_move_direction: Vec3,
    /// Root forward on the ground plane
    pub facing: Vec3,
    pub camera_forward: Vec3,

    // Shooting
    pub shooting_method: ShootingMethod,
    /// Seconds since the machine started
    pub elapsed: f32,
    /// Last accepted press per method (`ShootingMethod::index`)
    pub last_shot: [f32; 3],
    pub auto_shot: bool,
    /// Fire callbacks still owed by the shot animation in flight
    pub shots_armed: u32,

    // Reload
    pub grip: GripHand,
    pub reload_grip_pending: bool,
    pub reload_complete_pending: bool,

    pub aim_weight: f32,
    pub anim: AnimSink,
}

impl PlayerContext {
    /// Fresh context standing still, facing +Z
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            move_input: Vec2::ZERO,
            aiming: false,
            shooting: false,
            jump_requested: false,
            reloading: false,
            dead: false,
            input_enabled: true,
            grounded: true,
            current_speed: 0.0,
            target_speed: 0.0,
            walk_speed: Stat::new(config.walk_speed),
            run_speed: Stat::new(config.run_speed),
            horizontal_velocity: Vec3::ZERO,
            vertical_velocity: 0.0,
            last_move_direction: Vec3::Z,
            facing: Vec3::Z,
            camera_forward: Vec3::Z,
            shooting_method: ShootingMethod::Auto,
            elapsed: 0.0,
            last_shot: [f32::NEG_INFINITY; 3],
            auto_shot: false,
            shots_armed: 0,
            grip: GripHand::Right,
            reload_grip_pending: false,
            reload_complete_pending: false,
            aim_weight: 0.0,
            anim: AnimSink::default(),
            config,
        }
    }

    /// Whether any move axis is held
    pub fn is_moving(&self) -> bool {
        !self.move_input.is_zero()
    }

    /// Target speed from intents: zero when not moving, walk when aiming,
    /// run otherwise.
    pub fn refresh_target_speed(&mut self) {
        self.target_speed = if !self.is_moving() {
            0.0
        } else if self.aiming {
            self.walk_speed.value()
        } else {
            self.run_speed.value()
        };
    }

    /// Run or Idle depending on move input
    pub fn locomotion_state(&self) -> PlayerStateKey {
        if self.is_moving() {
            PlayerStateKey::Run
        } else {
            PlayerStateKey::Idle
        }
    }

    /// Camera forward flattened onto the ground plane
    pub fn camera_flat_forward(&self) -> Vec3 {
        flatten(self.camera_forward)
    }

    /// Camera right flattened onto the ground plane
    pub fn camera_flat_right(&self) -> Vec3 {
        Vec3::Y.cross(self.camera_flat_forward())
    }

    /// Camera-relative desired velocity at `speed`
    pub fn update_horizontal_velocity(&mut self, speed: f32) {
        let direction = (self.camera_flat_forward() * self.move_input.y
            + self.camera_flat_right() * self.move_input.x)
            .normalize_or_zero();
        if !direction.is_zero() {
            self.last_move_direction = direction;
        }
        self.horizontal_velocity = direction * speed;
    }
}

impl Default for PlayerContext {
    fn default() -> Self {
        Self::new(PlayerConfig::default())
    }
}

/// Time-based speed ramp restarted on state entry
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpeedRamp {
    duration: f32,
    elapsed: f32,
}

impl SpeedRamp {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            elapsed: 0.0,
        }
    }

    /// Start over
    pub fn restart(&mut self) {
        self.elapsed = 0.0;
    }

    /// Progress in `[0, 1]`
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).min(1.0)
    }

    /// Whether the ramp has run its course
    pub fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Lerp `current` toward `target` by the ramp's progress; once done, the
    /// target is tracked directly.
    pub fn step(&mut self, current: f32, target: f32, dt: f32) -> f32 {
        if self.is_done() {
            return target;
        }
        self.elapsed += dt;
        lerp(current, target, self.progress())
    }
}

/// Root-facing hysteresis while aiming.
///
/// The camera can swing inside `[left, right]` degrees of the baseline
/// without moving the root. Past that the root turns toward the camera
/// until it is within the stop tolerance, and the baseline snaps to the
/// camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootBaseline {
    baseline: Vec3,
    turning: bool,
}

impl RootBaseline {
    pub fn new(facing: Vec3) -> Self {
        Self {
            baseline: flatten(facing),
            turning: false,
        }
    }

    /// Re-anchor on the current facing
    pub fn reset(&mut self, facing: Vec3) {
        *self = Self::new(facing);
    }

    pub fn is_turning(&self) -> bool {
        self.turning
    }

    pub fn baseline(&self) -> Vec3 {
        self.baseline
    }

    /// Advance one tick. Rotates `ctx.facing` when turning and points the
    /// last move direction along the camera.
    pub fn update(&mut self, ctx: &mut PlayerContext, dt: f32) {
        let camera = ctx.camera_flat_forward();
        if camera.is_zero() {
            return;
        }
        ctx.last_move_direction = camera;

        let offset = signed_angle(self.baseline, camera, Vec3::Y);
        if !self.turning && (offset < ctx.config.aim_left_limit || offset > ctx.config.aim_right_limit) {
            self.turning = true;
        }

        if self.turning {
            ctx.facing = rotate_towards(flatten(ctx.facing), camera, dt * ctx.config.aim_turn_rate);
            let remaining = signed_angle(ctx.facing, camera, Vec3::Y);
            if remaining.abs() < ctx.config.aim_stop_degrees {
                self.baseline = camera;
                self.turning = false;
            }
        }
    }
}

/// Exponential-ish smoothing of the strafe blend inputs
pub(crate) fn smooth_input(smoothed: Vec2, target: Vec2, dt: f32, rate: f32) -> Vec2 {
    smoothed.lerp(target, (dt * rate).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use tps_math::radians;

    #[test]
    fn test_target_speed_rules() {
        let mut ctx = PlayerContext::default();
        ctx.refresh_target_speed();
        assert_eq!(ctx.target_speed, 0.0);

        ctx.move_input = Vec2::new(0.0, 1.0);
        ctx.refresh_target_speed();
        assert_eq!(ctx.target_speed, 3.0);

        ctx.aiming = true;
        ctx.refresh_target_speed();
        assert_eq!(ctx.target_speed, 1.5);
    }

    #[test]
    fn test_velocity_is_camera_relative() {
        let mut ctx = PlayerContext::default();
        ctx.camera_forward = Vec3::new(1.0, -0.5, 0.0);
        ctx.move_input = Vec2::new(0.0, 1.0);
        ctx.update_horizontal_velocity(2.0);
        assert_abs_diff_eq!(ctx.horizontal_velocity.x, 2.0, epsilon = 1e-5);
        assert_abs_diff_eq!(ctx.horizontal_velocity.y, 0.0, epsilon = 1e-5);

        // Strafing right with the camera looking down +Z moves along +X
        ctx.camera_forward = Vec3::Z;
        ctx.move_input = Vec2::new(1.0, 0.0);
        ctx.update_horizontal_velocity(1.0);
        assert_abs_diff_eq!(ctx.horizontal_velocity.x, 1.0, epsilon = 1e-5);
        assert_eq!(ctx.last_move_direction, ctx.horizontal_velocity);
    }

    #[test]
    fn test_zero_input_keeps_last_direction() {
        let mut ctx = PlayerContext::default();
        ctx.last_move_direction = Vec3::X;
        ctx.update_horizontal_velocity(3.0);
        assert_eq!(ctx.horizontal_velocity, Vec3::ZERO);
        assert_eq!(ctx.last_move_direction, Vec3::X);
    }

    #[test]
    fn test_speed_ramp_reaches_target() {
        let mut ramp = SpeedRamp::new(0.5);
        let mut speed = 0.0;
        for _ in 0..6 {
            speed = ramp.step(speed, 3.0, 0.1);
        }
        assert_abs_diff_eq!(speed, 3.0, epsilon = 1e-5);
        assert!(ramp.is_done());
        assert_eq!(ramp.step(speed, 4.5, 0.1), 4.5);
    }

    #[test]
    fn test_baseline_holds_inside_limits() {
        let mut ctx = PlayerContext::default();
        let mut baseline = RootBaseline::new(ctx.facing);
        // 45 degrees to the right: inside the +75 limit
        ctx.camera_forward = Vec3::new(1.0, 0.0, 1.0);
        baseline.update(&mut ctx, 0.1);
        assert!(!baseline.is_turning());
        assert_eq!(ctx.facing, Vec3::Z);
    }

    #[test]
    fn test_baseline_turns_past_left_limit_then_settles() {
        let mut ctx = PlayerContext::default();
        let mut baseline = RootBaseline::new(ctx.facing);
        // 60 degrees to the left: past the -50 limit
        let angle = radians(-60.0);
        ctx.camera_forward = Vec3::new(angle.sin(), 0.0, angle.cos());

        baseline.update(&mut ctx, 0.1);
        assert!(baseline.is_turning());
        assert!(ctx.facing.x < 0.0);

        for _ in 0..20 {
            baseline.update(&mut ctx, 0.1);
        }
        assert!(!baseline.is_turning());
        assert_abs_diff_eq!(signed_angle(ctx.facing, ctx.camera_flat_forward(), Vec3::Y), 0.0, epsilon = 0.5);
        assert_eq!(baseline.baseline(), ctx.camera_flat_forward());
    }
}
