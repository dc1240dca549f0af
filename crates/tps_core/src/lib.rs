//! # tps_core - Core Primitives
//!
//! Foundation types shared by every gameplay crate:
//! - Generational handles for pooled and scheduled resources
//! - Cooperative, cancelable timers polled once per tick
//!
//! Nothing here spawns threads or suspends control flow. A delayed action is
//! a due time stored in a [`TimerQueue`] (or a [`Countdown`] owned by the
//! entity itself) and is resolved when the owner polls it.

pub mod handle;
pub mod timer;

pub use handle::*;
pub use timer::*;

/// Prelude for common imports
pub mod prelude {
    pub use crate::handle::{Handle, HandleAllocator};
    pub use crate::timer::{Countdown, TimerHandle, TimerQueue};
}
