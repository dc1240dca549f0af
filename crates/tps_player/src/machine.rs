//! Player state machine: input, states, motor and animation callbacks

use tps_combat::{ShootingMethod, Stat};
use tps_fsm::{CollisionPhase, Contact, FsmError, HookResult, StateMachine, StateMachineBuilder, Tick};
use tps_math::{radians, rotate_towards, Vec3};

use crate::anim::AnimCommand;
use crate::config::PlayerConfig;
use crate::context::{GripHand, PlayerContext, PlayerStateKey};
use crate::input::InputFrame;
use crate::states::{AimState, DeadState, IdleState, JumpState, ReloadState, RunState};

/// Key-frame callbacks raised by the animation collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerAnimEvent {
    /// A shot animation reached its muzzle frame
    ShootFire,
    /// The reload animation moved the rifle to the other hand
    ReloadGripSwap,
    /// The reload animation finished
    ReloadComplete,
}

/// Player FSM with its context, input mapping and character motor
pub struct PlayerStateMachine {
    fsm: StateMachine<PlayerStateKey, PlayerContext>,
    shoot_held: bool,
}

impl PlayerStateMachine {
    /// Build every state; the player starts in Idle
    pub fn new(config: PlayerConfig) -> Result<Self, FsmError> {
        let fsm = StateMachineBuilder::new(PlayerStateKey::Idle)
            .with_state(IdleState::new(config.idle_ramp))
            .with_state(RunState::new(config.run_ramp))
            .with_state(JumpState)
            .with_state(AimState::new(config.aim_ramp))
            .with_state(ReloadState::new(config.aim_ramp))
            .with_state(DeadState)
            .with_global_transition(PlayerStateKey::Dead, |ctx: &PlayerContext| ctx.dead)
            .build(PlayerContext::new(config))?;

        Ok(Self {
            fsm,
            shoot_held: false,
        })
    }

    /// Map one frame of intents onto the context. Returns the new shooting
    /// method when the switch was pressed and accepted.
    pub fn apply_input(&mut self, frame: &InputFrame) -> Option<ShootingMethod> {
        let ctx = self.fsm.context_mut();
        if !ctx.input_enabled {
            return None;
        }

        ctx.move_input = frame.move_input;
        ctx.aiming = frame.aim;
        if !frame.camera_forward.is_zero() {
            ctx.camera_forward = frame.camera_forward;
        }

        // Triggers only count while aiming
        let held = frame.shoot && frame.aim;
        match ctx.shooting_method {
            ShootingMethod::Auto => ctx.shooting = held,
            ShootingMethod::Burst | ShootingMethod::Single => {
                if held && !self.shoot_held {
                    ctx.shooting = true;
                } else if !frame.aim {
                    ctx.shooting = false;
                }
            }
        }
        self.shoot_held = held;

        ctx.jump_requested = frame.jump;
        if frame.reload {
            ctx.reloading = true;
        }
        ctx.refresh_target_speed();

        if frame.change_shooting_method && !held {
            ctx.shooting_method = ctx.shooting_method.next();
            log::debug!("Shooting method -> {:?}", ctx.shooting_method);
            return Some(ctx.shooting_method);
        }
        None
    }

    /// Mark the player dead; the Dead state takes over on the next tick
    pub fn kill(&mut self) {
        self.fsm.context_mut().dead = true;
    }

    /// Advance the FSM one frame
    pub fn tick(&mut self, dt: f32) -> Result<Tick<PlayerStateKey>, FsmError> {
        self.fsm.context_mut().elapsed += dt;
        self.fsm.tick(dt)
    }

    pub fn fixed_update(&mut self, dt: f32) {
        self.fsm.fixed_update(dt);
    }

    pub fn late_update(&mut self, dt: f32) {
        self.fsm.late_update(dt);
    }

    /// Forward a collision to the current state
    pub fn collision(&mut self, phase: CollisionPhase, contact: &Contact) -> HookResult {
        self.fsm.collision(phase, contact)
    }

    /// Character motor: face the move direction, apply gravity and consume
    /// the horizontal velocity. Returns this tick's displacement.
    pub fn integrate(&mut self, dt: f32) -> Vec3 {
        let ctx = self.fsm.context_mut();

        if !ctx.aiming && !ctx.dead && !ctx.last_move_direction.is_zero() {
            let step = radians(ctx.config.face_turn_degrees) * dt;
            ctx.facing = rotate_towards(ctx.facing, ctx.last_move_direction, step);
        }

        if ctx.grounded && ctx.vertical_velocity < 0.0 {
            ctx.vertical_velocity = ctx.config.ground_stick;
        } else if !ctx.grounded {
            ctx.vertical_velocity += ctx.config.gravity * dt;
        }

        let velocity = ctx.horizontal_velocity + Vec3::new(0.0, ctx.vertical_velocity, 0.0);
        ctx.horizontal_velocity = Vec3::ZERO;
        velocity * dt
    }

    /// Ground contact reported by the physics collaborator
    pub fn set_grounded(&mut self, grounded: bool) {
        self.fsm.context_mut().grounded = grounded;
    }

    /// Handle an animation key frame. Each callback is honoured at most as
    /// often as the animation in flight allows; duplicates return false.
    pub fn on_animation_event(&mut self, event: PlayerAnimEvent) -> bool {
        let state = self.fsm.current();
        let ctx = self.fsm.context_mut();
        let honoured = match event {
            PlayerAnimEvent::ShootFire => {
                if state != PlayerStateKey::Aim {
                    false
                } else if ctx.shooting_method == ShootingMethod::Auto {
                    ctx.auto_shot
                } else if ctx.shots_armed > 0 {
                    ctx.shots_armed -= 1;
                    true
                } else {
                    false
                }
            }
            PlayerAnimEvent::ReloadGripSwap => {
                if state == PlayerStateKey::Reload && ctx.reload_grip_pending {
                    ctx.reload_grip_pending = false;
                    ctx.grip = GripHand::Left;
                    true
                } else {
                    false
                }
            }
            PlayerAnimEvent::ReloadComplete => {
                if state == PlayerStateKey::Reload && ctx.reload_complete_pending {
                    ctx.reload_complete_pending = false;
                    ctx.reloading = false;
                    ctx.grip = GripHand::Right;
                    true
                } else {
                    false
                }
            }
        };
        if !honoured {
            log::trace!("Ignored {:?} in {:?}", event, state);
        }
        honoured
    }

    /// Stop automatic fire (magazine ran dry)
    pub fn release_trigger(&mut self) {
        self.fsm.context_mut().shooting = false;
    }

    /// Compound a movement-speed buff into walk and run speeds
    pub fn apply_speed_buff(&mut self, percent: f32) {
        let ctx = self.fsm.context_mut();
        ctx.walk_speed.apply_percent(percent);
        ctx.run_speed.apply_percent(percent);
        ctx.refresh_target_speed();
    }

    /// Current run speed
    pub fn run_speed(&self) -> Stat {
        self.fsm.context().run_speed
    }

    /// Current state
    pub fn state(&self) -> PlayerStateKey {
        self.fsm.current()
    }

    /// Previous state
    pub fn previous_state(&self) -> Option<PlayerStateKey> {
        self.fsm.previous()
    }

    /// Completed transitions
    pub fn transition_count(&self) -> u64 {
        self.fsm.transition_count()
    }

    pub fn is_dead(&self) -> bool {
        self.fsm.context().dead
    }

    pub fn context(&self) -> &PlayerContext {
        self.fsm.context()
    }

    pub fn context_mut(&mut self) -> &mut PlayerContext {
        self.fsm.context_mut()
    }

    /// Take the animation commands queued since the last drain
    pub fn drain_animations(&mut self) -> Vec<AnimCommand> {
        self.fsm.context_mut().anim.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::names;
    use approx::assert_abs_diff_eq;

    const DT: f32 = 0.1;

    fn player() -> PlayerStateMachine {
        let mut player = PlayerStateMachine::new(PlayerConfig::default()).unwrap();
        player.tick(DT).unwrap();
        player.drain_animations();
        player
    }

    fn count(commands: &[AnimCommand], wanted: &AnimCommand) -> usize {
        commands.iter().filter(|c| *c == wanted).count()
    }

    #[test]
    fn test_idle_to_run_is_one_transition() {
        let mut player = player();
        player.apply_input(&InputFrame::moving(0.0, 1.0));

        let tick = player.tick(DT).unwrap();
        assert_eq!(tick, Tick::Transitioned { from: PlayerStateKey::Idle, to: PlayerStateKey::Run });
        assert_eq!(player.transition_count(), 1);

        let grounded = AnimCommand::CrossFade { state: names::GROUNDED_MOVEMENT, duration: 0.1 };
        assert_eq!(count(&player.drain_animations(), &grounded), 1);

        // Next tick runs Run.update
        assert_eq!(player.tick(DT).unwrap(), Tick::Updated(PlayerStateKey::Run));
        assert!(player.context().current_speed > 0.0);
        assert!(player.context().horizontal_velocity.z > 0.0);
    }

    #[test]
    fn test_run_to_aim_enters_once() {
        let mut player = player();
        player.apply_input(&InputFrame::moving(0.0, 1.0));
        player.tick(DT).unwrap();
        player.apply_input(&InputFrame::moving(0.0, 1.0).with_aim(true));
        player.drain_animations();

        let tick = player.tick(DT).unwrap();
        assert_eq!(tick, Tick::Transitioned { from: PlayerStateKey::Run, to: PlayerStateKey::Aim });
        let strafe = AnimCommand::CrossFade { state: names::STRAFE, duration: 0.1 };
        assert_eq!(count(&player.drain_animations(), &strafe), 1);
        assert_eq!(player.context().target_speed, 1.5);

        player.tick(DT).unwrap();
        assert_eq!(player.state(), PlayerStateKey::Aim);
        assert_eq!(player.transition_count(), 2);
    }

    #[test]
    fn test_aim_release_returns_to_locomotion() {
        let mut player = player();
        player.apply_input(&InputFrame::default().with_aim(true));
        player.tick(DT).unwrap();
        assert_eq!(player.state(), PlayerStateKey::Aim);

        player.apply_input(&InputFrame::default());
        player.tick(DT).unwrap();
        assert_eq!(player.state(), PlayerStateKey::Idle);
        let commands = player.drain_animations();
        assert!(commands.contains(&AnimCommand::Play { state: names::AIM, layer: 1 }));
        assert!(commands.contains(&AnimCommand::SetLayerWeight { layer: 1, weight: 0.0 }));
    }

    #[test]
    fn test_jump_waits_for_landing() {
        let mut player = player();
        player.apply_input(&InputFrame::default().with_jump());
        player.tick(DT).unwrap();
        assert_eq!(player.state(), PlayerStateKey::Jump);
        assert_eq!(player.context().vertical_velocity, 3.0);

        // Still grounded on the take-off frame but rising
        player.apply_input(&InputFrame::default());
        player.tick(DT).unwrap();
        assert_eq!(player.state(), PlayerStateKey::Jump);

        player.set_grounded(false);
        let up = player.integrate(DT);
        assert!(up.y > 0.0);
        assert!(player.context().vertical_velocity < 3.0);

        player.context_mut().vertical_velocity = -1.0;
        player.set_grounded(true);
        player.tick(DT).unwrap();
        assert_eq!(player.state(), PlayerStateKey::Idle);
        assert!(!player.context().jump_requested);
    }

    #[test]
    fn test_reload_callbacks_are_honoured_once() {
        let mut player = player();
        player.apply_input(&InputFrame::default().with_reload());
        player.tick(DT).unwrap();
        assert_eq!(player.state(), PlayerStateKey::Reload);

        assert!(player.on_animation_event(PlayerAnimEvent::ReloadGripSwap));
        assert!(!player.on_animation_event(PlayerAnimEvent::ReloadGripSwap));
        assert_eq!(player.context().grip, GripHand::Left);

        // Aiming does not interrupt the reload
        player.apply_input(&InputFrame::default().with_aim(true));
        player.tick(DT).unwrap();
        assert_eq!(player.state(), PlayerStateKey::Reload);

        assert!(player.on_animation_event(PlayerAnimEvent::ReloadComplete));
        assert!(!player.on_animation_event(PlayerAnimEvent::ReloadComplete));
        player.tick(DT).unwrap();
        assert_eq!(player.state(), PlayerStateKey::Idle);
        assert_eq!(player.context().grip, GripHand::Right);
        assert!(!player.on_animation_event(PlayerAnimEvent::ReloadComplete));
    }

    #[test]
    fn test_reload_exits_to_locomotion_then_aim() {
        let mut player = player();
        player.apply_input(&InputFrame::default().with_reload());
        player.tick(DT).unwrap();
        assert_eq!(player.state(), PlayerStateKey::Reload);

        player.apply_input(&InputFrame::moving(0.0, 1.0).with_aim(true));
        player.tick(DT).unwrap();
        assert!(player.on_animation_event(PlayerAnimEvent::ReloadComplete));

        assert_eq!(
            player.tick(DT).unwrap(),
            Tick::Transitioned {
                from: PlayerStateKey::Reload,
                to: PlayerStateKey::Run
            }
        );
        assert_eq!(
            player.tick(DT).unwrap(),
            Tick::Transitioned {
                from: PlayerStateKey::Run,
                to: PlayerStateKey::Aim
            }
        );
    }

    #[test]
    fn test_single_shot_respects_cooldown() {
        let mut player = player();
        player.apply_input(&InputFrame::default().with_method_change());
        player.apply_input(&InputFrame::default().with_method_change());
        assert_eq!(player.context().shooting_method, ShootingMethod::Single);

        player.apply_input(&InputFrame::default().with_aim(true));
        player.tick(DT).unwrap();
        player.drain_animations();

        let single = AnimCommand::Play { state: names::SINGLE_SHOT, layer: 1 };
        player.apply_input(&InputFrame::default().with_aim(true).with_shoot(true));
        player.tick(DT).unwrap();
        assert_eq!(count(&player.drain_animations(), &single), 1);
        assert!(player.on_animation_event(PlayerAnimEvent::ShootFire));
        assert!(!player.on_animation_event(PlayerAnimEvent::ShootFire));

        // Second press inside 0.25 s is consumed and ignored
        player.apply_input(&InputFrame::default().with_aim(true));
        player.apply_input(&InputFrame::default().with_aim(true).with_shoot(true));
        player.tick(DT).unwrap();
        assert_eq!(count(&player.drain_animations(), &single), 0);
        assert!(!player.context().shooting);

        player.apply_input(&InputFrame::default().with_aim(true));
        player.tick(DT).unwrap();
        player.tick(DT).unwrap();
        player.apply_input(&InputFrame::default().with_aim(true).with_shoot(true));
        player.tick(DT).unwrap();
        assert_eq!(count(&player.drain_animations(), &single), 1);
    }

    #[test]
    fn test_auto_fire_follows_trigger() {
        let mut player = player();
        player.apply_input(&InputFrame::default().with_aim(true).with_shoot(true));
        player.tick(DT).unwrap();
        player.tick(DT).unwrap();
        assert!(player.context().auto_shot);
        assert!(player.on_animation_event(PlayerAnimEvent::ShootFire));
        assert!(player.on_animation_event(PlayerAnimEvent::ShootFire));

        player.apply_input(&InputFrame::default().with_aim(true));
        player.tick(DT).unwrap();
        assert!(!player.context().auto_shot);
        assert!(!player.on_animation_event(PlayerAnimEvent::ShootFire));
    }

    #[test]
    fn test_method_switch_blocked_while_firing() {
        let mut player = player();
        let frame = InputFrame::default().with_aim(true).with_shoot(true).with_method_change();
        assert_eq!(player.apply_input(&frame), None);
        assert_eq!(
            player.apply_input(&InputFrame::default().with_method_change()),
            Some(ShootingMethod::Burst)
        );
    }

    #[test]
    fn test_death_is_terminal_and_halts_input() {
        let mut player = player();
        player.apply_input(&InputFrame::moving(1.0, 0.0).with_aim(true));
        player.tick(DT).unwrap();

        player.kill();
        player.tick(DT).unwrap();
        assert_eq!(player.state(), PlayerStateKey::Dead);
        assert_eq!(player.context().horizontal_velocity, Vec3::ZERO);

        player.apply_input(&InputFrame::moving(0.0, 1.0).with_jump());
        for _ in 0..3 {
            assert_eq!(player.tick(DT).unwrap(), Tick::Updated(PlayerStateKey::Dead));
        }
        assert!(!player.context().input_enabled);
        assert!(!player.context().jump_requested);
    }

    #[test]
    fn test_motor_consumes_velocity_and_sticks_to_ground() {
        let mut player = player();
        player.apply_input(&InputFrame::moving(0.0, 1.0));
        player.tick(DT).unwrap();
        player.tick(DT).unwrap();

        player.context_mut().vertical_velocity = -5.0;
        let step = player.integrate(DT);
        assert!(step.z > 0.0);
        assert_abs_diff_eq!(step.y, -0.2, epsilon = 1e-5);
        assert_eq!(player.context().horizontal_velocity, Vec3::ZERO);
        assert_eq!(player.integrate(DT).z, 0.0);
    }

    #[test]
    fn test_motor_turns_toward_move_direction() {
        let mut player = player();
        player.apply_input(&InputFrame::moving(1.0, 0.0));
        player.tick(DT).unwrap();
        player.tick(DT).unwrap();
        // 65 degrees per 0.1 s step
        player.integrate(DT);
        player.integrate(DT);
        assert_abs_diff_eq!(player.context().facing.x, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_speed_buff_compounds() {
        let mut player = player();
        player.apply_speed_buff(5.0);
        player.apply_speed_buff(5.0);
        assert_abs_diff_eq!(player.run_speed().value(), 3.0 * 1.05 * 1.05, epsilon = 1e-5);
    }
}
