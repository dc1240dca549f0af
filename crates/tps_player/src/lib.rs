//! # tps_player - Player State Set
//!
//! Third-person rifle character built on `tps_fsm`.
//!
//! # Features
//!
//! - Six states: Idle, Run, Jump, Aim, Reload, Dead (global, terminal)
//! - Camera-relative locomotion with time-based speed ramps
//! - Root-facing hysteresis while aiming
//! - Three shooting methods with per-method cooldowns
//! - Animation commands queued in an [`AnimSink`] instead of driving an animator
//! - Animation key-frame callbacks guarded against duplicates
//! - Character motor: facing, gravity and ground stick
//!
//! # Example
//!
//! ```ignore
//! use tps_player::prelude::*;
//!
//! let mut player = PlayerStateMachine::new(PlayerConfig::default())?;
//! player.apply_input(&InputFrame::moving(0.0, 1.0).with_aim(true));
//! player.tick(dt)?;
//! let step = player.integrate(dt);
//! for command in player.drain_animations() {
//!     animator.apply(command);
//! }
//! ```

pub mod anim;
pub mod config;
pub mod context;
pub mod input;
pub mod machine;
pub mod states;

pub mod prelude {
    pub use crate::anim::{names, AnimCommand, AnimSink, AIM_LAYER};
    pub use crate::config::PlayerConfig;
    pub use crate::context::{GripHand, PlayerContext, PlayerStateKey, RootBaseline, SpeedRamp};
    pub use crate::input::InputFrame;
    pub use crate::machine::{PlayerAnimEvent, PlayerStateMachine};
    pub use crate::states::{AimState, DeadState, IdleState, JumpState, ReloadState, RunState};
}

pub use prelude::*;
