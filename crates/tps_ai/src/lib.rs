//! # tps_ai - Enemy Behaviour
//!
//! Chasing melee enemies recycled through `tps_pool`.
//!
//! # Features
//!
//! - `Navigation` service trait with a straight-line `DirectNavigation`
//! - `EnemyController`: chase, turn, attack on cooldown, knockback
//! - Death sequence: drop roll, fade, deferred pool release
//! - `EnemyManager`: per-archetype pools, weighted spawns, damage routing,
//!   grenade splash, kill-all, difficulty-scaled enemy damage
//!
//! # Example
//!
//! ```ignore
//! use tps_ai::prelude::*;
//!
//! let mut enemies = EnemyManager::new(10.0, 0.3);
//! enemies.register(EnemyArchetype::new("Zombie").with_spawn_ratio(3))?;
//!
//! let zombie = enemies.spawn_random(spawn_point, &mut rng);
//! let attackers = enemies.update(player_position, now, dt);
//! ```

pub mod controller;
pub mod enemy;
pub mod manager;
pub mod navigation;

pub mod prelude {
    pub use crate::controller::{
        names, ControllerTuning, DeathPhase, EnemyAnim, EnemyAnimEvent, EnemyController, EnemyState,
    };
    pub use crate::enemy::{Enemy, EnemyArchetype};
    pub use crate::manager::{DamageReport, EnemyKilled, EnemyManager, EnemyRef};
    pub use crate::navigation::{DirectNavigation, Navigation};
}

pub use prelude::*;
