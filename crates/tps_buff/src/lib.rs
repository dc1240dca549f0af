//! # tps_buff - Buff Pickups
//!
//! Turns "a pickup was consumed" into typed gameplay events.
//!
//! # Features
//!
//! - `BuffKind`: the eleven pickup kinds
//! - `BuffTable`: serde tuning table with the shipped defaults
//! - `BuffCoordinator`: subscribes to [`BuffConsumed`] and republishes
//!   [`BuffApplied`] plus one typed event per kind; owns the infinite-ammo
//!   timers, restarting them on re-pickup
//!
//! The coordinator never touches the player, weapon or enemies itself.
//! Whoever owns those subscribes to the typed events.
//!
//! # Example
//!
//! ```ignore
//! use tps_buff::prelude::*;
//!
//! let bus = Arc::new(EventBus::new());
//! let buffs = BuffCoordinator::attach(bus.clone(), BuffTable::default());
//! bus.subscribe(|e: &SpeedBuff| log::info!("speed +{}%", e.percent));
//!
//! bus.publish(BuffConsumed { kind: BuffKind::Speed });
//! buffs.tick(now);
//! ```

pub mod coordinator;
pub mod events;
pub mod kind;

pub mod prelude {
    pub use crate::coordinator::BuffCoordinator;
    pub use crate::events::{
        AmmoBuff, BuffApplied, BuffConsumed, BulletDamageBuff, GrenadeDamageBuff, HealthRegenBuff,
        InfiniteAmmoExpired, InfiniteAmmoStarted, InstantHealBuff, KillAllEnemies, MaxHealthBuff,
        ReloadSpeedBuff, SpeedBuff,
    };
    pub use crate::kind::{BuffDescriptor, BuffKind, BuffTable, Magnitude};
    pub use tps_combat::AmmoKind;
}

pub use prelude::*;
