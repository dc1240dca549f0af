//! # tps_runtime - Gameplay Session
//!
//! Assembles the player, enemies, pickups, buffs and effects into one
//! match driven by the host engine's frame callbacks.
//!
//! # Features
//!
//! - `Session`: owns the bus, the buff coordinator and the shared
//!   components; exposes input, `update`/`fixed_update`/`late_update`,
//!   collisions and animation key frames
//! - `GameClock`: match timer with per-second and per-minute events
//! - `EnemySpawner`: timed waves placed off-screen on walkable ground
//! - `PickupField` and `EffectPools`: pooled drops and transient effects
//! - `WorldServices`: the ground, raycast and navigation queries the host
//!   answers, with `FlatWorld` for headless runs
//! - `SessionConfig`: JSON file plus env overrides
//!
//! # Example
//!
//! ```ignore
//! use tps_runtime::prelude::*;
//!
//! let mut session = Session::new(SessionConfig::load(), Box::new(FlatWorld::default()))?;
//! session.bus().subscribe(|e: &EnemyDied| log::info!("+{}", e.score));
//!
//! loop {
//!     session.apply_input(&input);
//!     session.fixed_update(FIXED_DT);
//!     let report = session.update(dt)?;
//!     session.late_update(dt);
//! }
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod particles;
pub mod pickups;
pub mod player;
pub mod score;
pub mod services;
pub mod session;
pub mod spawner;
pub mod wiring;

pub mod prelude {
    pub use crate::clock::{ClockTick, GameClock};
    pub use crate::config::{default_roster, SessionConfig, CONFIG_PATHS};
    pub use crate::error::{Result, SessionError};
    pub use crate::events::{GameOver, MinutePassed, TimeElapsed};
    pub use crate::particles::{default_effect_table, effects, Effect, EffectEntry, EffectPools, EffectRef};
    pub use crate::pickups::{default_pickup_table, Pickup, PickupEntry, PickupField, PickupRef};
    pub use crate::player::{publish_notices, Notice, Player, Reaction};
    pub use crate::score::ScoreBoard;
    pub use crate::services::{CameraView, FlatWorld, Occluder, WorldServices};
    pub use crate::session::{Session, TickReport};
    pub use crate::spawner::{EnemySpawner, SpawnerConfig};
    pub use crate::wiring::{wire, World};
}

pub use prelude::*;
