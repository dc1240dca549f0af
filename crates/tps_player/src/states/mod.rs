//! Player states
//!
//! | State  | Leaves for                                                   |
//! |--------|--------------------------------------------------------------|
//! | Idle   | Jump (pulse, grounded), Reload, Aim, Run (moving)            |
//! | Run    | Jump (pulse, grounded), Reload, Aim, Idle (stopped)          |
//! | Aim    | Reload, Run/Idle when aim is released                        |
//! | Jump   | Run/Idle once grounded and not rising                        |
//! | Reload | Run/Idle by move input, once the reload flag clears          |
//! | Dead   | never (entered through a global transition)                  |

mod aim;
mod dead;
mod grounded;
mod jump;
mod reload;

pub use aim::AimState;
pub use dead::DeadState;
pub use grounded::{IdleState, RunState};
pub use jump::JumpState;
pub use reload::ReloadState;

use crate::context::{PlayerContext, PlayerStateKey};

/// Shared exit policy of the grounded locomotion states
fn grounded_next(ctx: &PlayerContext, own: PlayerStateKey) -> PlayerStateKey {
    if ctx.jump_requested && ctx.grounded {
        PlayerStateKey::Jump
    } else if ctx.reloading {
        PlayerStateKey::Reload
    } else if ctx.aiming {
        PlayerStateKey::Aim
    } else {
        match (own, ctx.is_moving()) {
            (PlayerStateKey::Idle, true) => PlayerStateKey::Run,
            (PlayerStateKey::Run, false) => PlayerStateKey::Idle,
            _ => own,
        }
    }
}
