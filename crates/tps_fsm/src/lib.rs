//! # tps_fsm - Finite State Machines
//!
//! Generic state machine over trait-object states sharing one context.
//!
//! # Features
//!
//! - States keyed by any `Copy + Eq + Hash` key (usually an enum)
//! - Build-time validation of the initial state, duplicate keys and
//!   declared transition targets
//! - Global transitions checked before the current state's own policy
//! - Exit then enter on every switch, never `update` on the switching tick
//! - Optional collision hooks that report [`HookResult::NotSupported`]
//!
//! # Example
//!
//! ```ignore
//! use tps_fsm::prelude::*;
//!
//! let mut fsm = StateMachineBuilder::new(Mode::Idle)
//!     .with_state(Idle)
//!     .with_state(Run)
//!     .with_global_transition(Mode::Dead, |ctx: &Ctx| ctx.is_dead)
//!     .build(Ctx::default())?;
//!
//! fsm.context_mut().move_input = 1.0;
//! match fsm.tick(dt)? {
//!     Tick::Transitioned { from, to } => log::debug!("{:?} -> {:?}", from, to),
//!     Tick::Updated(_) => {}
//! }
//! ```

pub mod error;
pub mod machine;
pub mod state;

pub mod prelude {
    pub use crate::error::FsmError;
    pub use crate::machine::{StateMachine, StateMachineBuilder, Tick};
    pub use crate::state::{CollisionPhase, Contact, HookResult, State, StateKey};
}

pub use prelude::*;
