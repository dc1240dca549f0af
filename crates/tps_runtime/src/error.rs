//! Session error types

use thiserror::Error;
use tps_fsm::FsmError;
use tps_pool::PoolError;

/// Errors raised while building or driving a session
#[derive(Debug, Error)]
pub enum SessionError {
    /// The player state machine could not be built
    #[error("Player state machine: {0}")]
    Fsm(#[from] FsmError),

    /// A pool could not be created or a handle was rejected
    #[error("Pool: {0}")]
    Pool(#[from] PoolError),

    /// Config file could not be read
    #[error("Config IO: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for `SessionConfig`
    #[error("Config parse: {0}")]
    Parse(#[from] serde_json::Error),

    /// Config values are inconsistent
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl SessionError {
    /// Configuration errors are fatal to session creation
    pub fn is_config_error(&self) -> bool {
        match self {
            Self::Pool(e) => e.is_config_error(),
            Self::Fsm(_) | Self::Io(_) | Self::Parse(_) | Self::InvalidConfig(_) => true,
        }
    }
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
