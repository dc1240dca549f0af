use tps_fsm::{Contact, HookResult, State};

use crate::anim::names;
use crate::context::{PlayerContext, PlayerStateKey};

/// Airborne; keeps steering at the speed held on take-off
pub struct JumpState;

impl State<PlayerStateKey, PlayerContext> for JumpState {
    fn key(&self) -> PlayerStateKey {
        PlayerStateKey::Jump
    }

    fn transitions(&self) -> Vec<PlayerStateKey> {
        vec![PlayerStateKey::Run, PlayerStateKey::Idle]
    }

    fn enter(&mut self, ctx: &mut PlayerContext) {
        ctx.anim.cross_fade(names::JUMP, ctx.config.crossfade);
        ctx.vertical_velocity = ctx.config.jump_velocity;
    }

    fn update(&mut self, ctx: &mut PlayerContext, _dt: f32) {
        ctx.update_horizontal_velocity(ctx.current_speed);
    }

    fn exit(&mut self, ctx: &mut PlayerContext) {
        ctx.jump_requested = false;
    }

    fn next_state(&self, ctx: &PlayerContext) -> PlayerStateKey {
        if ctx.grounded && ctx.vertical_velocity <= 0.0 {
            ctx.locomotion_state()
        } else {
            PlayerStateKey::Jump
        }
    }

    /// Landing on something whose surface faces up
    fn on_collision_enter(&mut self, ctx: &mut PlayerContext, contact: &Contact) -> HookResult {
        if contact.normal[1] > 0.7 && ctx.vertical_velocity <= 0.0 {
            ctx.grounded = true;
            HookResult::Handled
        } else {
            HookResult::NotSupported
        }
    }
}
