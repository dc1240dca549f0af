use tps_fsm::State;

use super::grounded_next;
use crate::anim::names;
use crate::context::{PlayerContext, PlayerStateKey, SpeedRamp};

/// Standing still, decelerating to zero
pub struct IdleState {
    ramp: SpeedRamp,
}

impl IdleState {
    pub fn new(ramp: f32) -> Self {
        Self {
            ramp: SpeedRamp::new(ramp),
        }
    }
}

impl State<PlayerStateKey, PlayerContext> for IdleState {
    fn key(&self) -> PlayerStateKey {
        PlayerStateKey::Idle
    }

    fn transitions(&self) -> Vec<PlayerStateKey> {
        vec![
            PlayerStateKey::Jump,
            PlayerStateKey::Reload,
            PlayerStateKey::Aim,
            PlayerStateKey::Run,
        ]
    }

    fn enter(&mut self, ctx: &mut PlayerContext) {
        self.ramp.restart();
        ctx.anim.cross_fade(names::GROUNDED_MOVEMENT, ctx.config.crossfade);
    }

    fn update(&mut self, ctx: &mut PlayerContext, dt: f32) {
        ctx.current_speed = self.ramp.step(ctx.current_speed, ctx.target_speed, dt);
        ctx.anim.set_float(names::SPEED, ctx.current_speed);
        ctx.update_horizontal_velocity(ctx.current_speed);
    }

    fn next_state(&self, ctx: &PlayerContext) -> PlayerStateKey {
        grounded_next(ctx, PlayerStateKey::Idle)
    }
}

/// Camera-relative running
pub struct RunState {
    ramp: SpeedRamp,
}

impl RunState {
    pub fn new(ramp: f32) -> Self {
        Self {
            ramp: SpeedRamp::new(ramp),
        }
    }
}

impl State<PlayerStateKey, PlayerContext> for RunState {
    fn key(&self) -> PlayerStateKey {
        PlayerStateKey::Run
    }

    fn transitions(&self) -> Vec<PlayerStateKey> {
        vec![
            PlayerStateKey::Jump,
            PlayerStateKey::Reload,
            PlayerStateKey::Aim,
            PlayerStateKey::Idle,
        ]
    }

    fn enter(&mut self, ctx: &mut PlayerContext) {
        self.ramp.restart();
        ctx.anim.cross_fade(names::GROUNDED_MOVEMENT, ctx.config.crossfade);
    }

    fn update(&mut self, ctx: &mut PlayerContext, dt: f32) {
        ctx.current_speed = self.ramp.step(ctx.current_speed, ctx.target_speed, dt);
        ctx.anim.set_float(names::SPEED, ctx.current_speed);
        ctx.update_horizontal_velocity(ctx.current_speed);
    }

    fn next_state(&self, ctx: &PlayerContext) -> PlayerStateKey {
        grounded_next(ctx, PlayerStateKey::Run)
    }
}
