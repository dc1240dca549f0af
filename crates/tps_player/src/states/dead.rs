use tps_fsm::State;

use crate::anim::names;
use crate::context::{PlayerContext, PlayerStateKey};

/// Terminal
pub struct DeadState;

impl State<PlayerStateKey, PlayerContext> for DeadState {
    fn key(&self) -> PlayerStateKey {
        PlayerStateKey::Dead
    }

    fn enter(&mut self, ctx: &mut PlayerContext) {
        ctx.anim.cross_fade(names::DEATH, ctx.config.crossfade);
        if ctx.auto_shot {
            ctx.anim.set_bool(names::IS_AUTO_SHOT, false);
        }
        ctx.input_enabled = false;
        ctx.aiming = false;
        ctx.shooting = false;
        ctx.auto_shot = false;
        ctx.shots_armed = 0;
        ctx.reloading = false;
        ctx.jump_requested = false;
        ctx.current_speed = 0.0;
        ctx.target_speed = 0.0;
        ctx.horizontal_velocity = tps_math::Vec3::ZERO;
        ctx.vertical_velocity = 0.0;
        log::info!("Player died after {:.1}s", ctx.elapsed);
    }

    fn next_state(&self, _ctx: &PlayerContext) -> PlayerStateKey {
        PlayerStateKey::Dead
    }
}
