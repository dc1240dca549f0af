use tps_fsm::State;
use tps_math::Vec2;

use crate::anim::{names, AIM_LAYER};
use crate::context::{smooth_input, GripHand, PlayerContext, PlayerStateKey, RootBaseline, SpeedRamp};

/// Magazine change while strafing. Left for Run/Idle when the
/// reload-complete callback clears the reload flag; a held aim re-enters Aim
/// from there on the next tick.
pub struct ReloadState {
    ramp: SpeedRamp,
    baseline: RootBaseline,
    smoothed: Vec2,
}

impl ReloadState {
    pub fn new(ramp: f32) -> Self {
        Self {
            ramp: SpeedRamp::new(ramp),
            baseline: RootBaseline::new(tps_math::Vec3::Z),
            smoothed: Vec2::ZERO,
        }
    }
}

impl State<PlayerStateKey, PlayerContext> for ReloadState {
    fn key(&self) -> PlayerStateKey {
        PlayerStateKey::Reload
    }

    fn transitions(&self) -> Vec<PlayerStateKey> {
        vec![PlayerStateKey::Run, PlayerStateKey::Idle]
    }

    fn enter(&mut self, ctx: &mut PlayerContext) {
        self.ramp.restart();
        self.baseline.reset(ctx.facing);
        ctx.anim.set_layer_weight(AIM_LAYER, 1.0);
        ctx.anim.cross_fade(names::STRAFE, ctx.config.crossfade);
        ctx.anim.cross_fade(names::RELOAD, ctx.config.crossfade);
        ctx.reload_grip_pending = true;
        ctx.reload_complete_pending = true;
    }

    fn update(&mut self, ctx: &mut PlayerContext, dt: f32) {
        ctx.current_speed = self.ramp.step(ctx.current_speed, ctx.target_speed, dt);
        self.smoothed = smooth_input(self.smoothed, ctx.move_input, dt, ctx.config.input_smoothing);
        ctx.anim.set_float(names::SPEED, ctx.current_speed);
        ctx.anim.set_float(names::INPUT_X, self.smoothed.x);
        ctx.anim.set_float(names::INPUT_Y, self.smoothed.y);

        ctx.update_horizontal_velocity(ctx.current_speed);
        self.baseline.update(ctx, dt);
    }

    fn exit(&mut self, ctx: &mut PlayerContext) {
        ctx.reloading = false;
        ctx.reload_grip_pending = false;
        ctx.reload_complete_pending = false;
        ctx.grip = GripHand::Right;
        ctx.anim.set_layer_weight(AIM_LAYER, 0.0);
        ctx.anim.play(names::AIM, AIM_LAYER);
    }

    fn next_state(&self, ctx: &PlayerContext) -> PlayerStateKey {
        if ctx.reloading {
            PlayerStateKey::Reload
        } else {
            ctx.locomotion_state()
        }
    }
}
