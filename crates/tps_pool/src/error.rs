//! Pool error types

use thiserror::Error;

/// Errors raised by pools and the pool registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// Capacity settings are inconsistent (configuration error)
    #[error("Invalid pool capacity: {0}")]
    InvalidCapacity(String),

    /// A template id was registered twice (configuration error)
    #[error("Pool template already registered: {0}")]
    DuplicateTemplate(String),

    /// No pool exists for the requested template
    #[error("Unknown pool template: {0}")]
    UnknownTemplate(String),

    /// Handle belongs to a previous occupant of the slot
    #[error("Stale pool handle (slot {index}, generation {generation})")]
    StaleHandle { index: u32, generation: u32 },

    /// Instance is already back in the free ring
    #[error("Pooled instance in slot {0} released twice")]
    DoubleRelease(u32),
}

impl PoolError {
    /// Configuration errors are fatal at init; the rest are recoverable
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidCapacity(_) | Self::DuplicateTemplate(_))
    }
}

/// Result type for pool operations
pub type Result<T> = std::result::Result<T, PoolError>;
