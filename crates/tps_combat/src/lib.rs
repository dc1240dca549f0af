//! # tps_combat - Health, Damage and Weapons
//!
//! Combat model shared by the player and enemies.
//!
//! # Features
//!
//! - `Damageable`: integer health clamped to `[0, max]` on every write
//! - `Regeneration`: fractional per-second healing paid out in whole points
//! - `Stat`: base value with compounding percentage modifiers
//! - `Weapon`: magazine and reserve economy, three shooting methods,
//!   infinite-ammo flags
//! - Plain event structs published on the gameplay bus
//!
//! # Example
//!
//! ```ignore
//! use tps_combat::prelude::*;
//!
//! let mut health = Damageable::new(100);
//! match health.take_damage(120) {
//!     DamageOutcome::Killed => bus.publish(EnemyDied { score: 10 }),
//!     DamageOutcome::Damaged { current } => log::debug!("{} left", current),
//!     DamageOutcome::Ignored => {}
//! }
//! ```

pub mod damage;
pub mod events;
pub mod health;
pub mod stat;
pub mod weapon;

pub mod prelude {
    pub use crate::damage::{DamageInfo, DamageKind};
    pub use crate::events::{
        AmmoChanged, Damaged, EnemyDied, HealthChanged, HealthDanger, OutOfAmmo, ShootingModeChanged,
    };
    pub use crate::health::{DamageOutcome, Damageable, Regeneration};
    pub use crate::stat::Stat;
    pub use crate::weapon::{AmmoKind, GrenadeConfig, ShootingMethod, ShotKind, Weapon, WeaponConfig};
}

pub use prelude::*;
