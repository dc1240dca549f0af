//! # tps_pool - Entity Pooling
//!
//! Recycles transient gameplay entities (enemies, pickups, effects) instead
//! of building and dropping them every spawn.
//!
//! # Features
//!
//! - `EntityPool<T>`: free ring, bounded growth, deterministic fail-soft
//!   reclaim of the oldest active instance when exhausted
//! - Generational handles: stale and double releases are detected, logged
//!   and rejected without corrupting accounting
//! - `PoolRegistry<K, T>`: one pool per template id, bulk reset
//! - `WeightedSelector<K>`: cumulative-ratio spawn selection
//!
//! # Example
//!
//! ```ignore
//! use tps_pool::prelude::*;
//!
//! let mut enemies: PoolRegistry<String, Enemy> = PoolRegistry::new();
//! enemies.register("spider".into(), PoolConfig::new(5, 20), || Enemy::new("spider"))?;
//!
//! let selector = WeightedSelector::new().with_entry("spider".to_string(), 3);
//! if let Some(enemy) = enemies.spawn_weighted(&selector, &mut rng) {
//!     // ... later
//!     enemies.release(enemy)?;
//! }
//! ```

pub mod error;
pub mod pool;
pub mod registry;
pub mod selector;

pub mod prelude {
    pub use crate::error::PoolError;
    pub use crate::pool::{EntityPool, PoolConfig, PoolStats, Pooled};
    pub use crate::registry::{PoolRegistry, PooledRef};
    pub use crate::selector::{WeightedEntry, WeightedSelector};
}

pub use prelude::*;
