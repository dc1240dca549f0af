//! State machine errors

use thiserror::Error;

/// Errors raised while building or driving a state machine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsmError {
    /// The configured initial state has no registered state object
    #[error("Initial state {0} is not registered")]
    MissingInitialState(String),

    /// Two state objects report the same key
    #[error("State {0} registered twice")]
    DuplicateState(String),

    /// A state (or global transition) declares a target that is not registered
    #[error("State {from} declares transition to unregistered state {to}")]
    UnregisteredTarget { from: String, to: String },

    /// A transition was requested at runtime to an unregistered state
    #[error("Transition to unregistered state {0}")]
    UnknownState(String),

    /// A transition was requested while another one was in progress
    #[error("Transition {from} -> {to} requested while already transitioning")]
    ReentrantTransition { from: String, to: String },
}

/// Result type for state machine operations
pub type Result<T> = std::result::Result<T, FsmError>;
