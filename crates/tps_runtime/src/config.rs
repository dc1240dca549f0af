//! Session configuration
//!
//! Loading follows the usual order:
//! 1. Built-in defaults (the shipped tuning)
//! 2. The first JSON file found in the search list
//! 3. Environment overrides (`TPS_SEED`, `TPS_MATCH_MINUTES`, `TPS_DROP_CHANCE`)

use std::path::Path;

use serde::{Deserialize, Serialize};
use tps_ai::EnemyArchetype;
use tps_buff::BuffTable;
use tps_combat::WeaponConfig;
use tps_player::PlayerConfig;

use crate::error::{Result, SessionError};
use crate::particles::{default_effect_table, EffectEntry};
use crate::pickups::{default_pickup_table, PickupEntry};
use crate::spawner::SpawnerConfig;

/// Files tried by [`SessionConfig::load`], in order
pub const CONFIG_PATHS: [&str; 2] = ["tps.json", "config/tps.json"];

/// Everything a session needs to start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seed for spawns, drops and spawn selection
    pub seed: u64,
    /// Match length; surviving it wins
    pub match_minutes: f32,
    /// Enemy damage increase per minute, in percent
    pub difficulty_percent: f32,
    /// Damage one enemy attack deals at the start of the match
    pub enemy_damage: f32,
    /// Probability that a kill drops a pickup
    pub drop_chance: f32,
    /// Hitscan reach
    pub shot_range: f32,
    /// Hitscan hit radius around an enemy
    pub hit_radius: f32,
    /// Pickups within this distance of the player are collected
    pub pickup_radius: f32,
    /// Where the player spawns
    pub spawn_point: [f32; 3],
    pub player: PlayerConfig,
    pub weapon: WeaponConfig,
    pub buffs: BuffTable,
    pub enemies: Vec<EnemyArchetype>,
    pub pickups: Vec<PickupEntry>,
    pub effects: Vec<EffectEntry>,
    pub spawner: SpawnerConfig,

    /// File this config was read from
    #[serde(skip)]
    pub config_path: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            match_minutes: 20.0,
            difficulty_percent: 10.0,
            enemy_damage: 10.0,
            drop_chance: 0.3,
            shot_range: 110.0,
            hit_radius: 0.5,
            pickup_radius: 1.0,
            spawn_point: [0.0, 0.0, 0.0],
            player: PlayerConfig::default(),
            weapon: WeaponConfig::default(),
            buffs: BuffTable::default(),
            enemies: default_roster(),
            pickups: default_pickup_table(),
            effects: default_effect_table(),
            spawner: SpawnerConfig::default(),
            config_path: None,
        }
    }
}

/// The shipped enemy roster
pub fn default_roster() -> Vec<EnemyArchetype> {
    vec![
        EnemyArchetype::new("Zombie").with_health(100).with_speed(3.5).with_score(10).with_spawn_ratio(5),
        EnemyArchetype::new("Spider").with_health(60).with_speed(5.0).with_score(15).with_spawn_ratio(3),
        EnemyArchetype::new("Fish")
            .with_health(150)
            .with_speed(2.5)
            .with_score(25)
            .with_spawn_ratio(2)
            .with_knockback(0.5)
            .with_drop_height(0.5),
    ]
}

impl SessionConfig {
    /// Load from the first config file found, then apply env overrides
    pub fn load() -> Self {
        let mut config = Self::default();

        for path in CONFIG_PATHS {
            if !Path::new(path).exists() {
                continue;
            }
            match Self::from_file(path) {
                Ok(loaded) => {
                    config = loaded;
                    log::info!("Loaded session config from {}", path);
                    break;
                }
                Err(e) => log::warn!("Ignoring {}: {}", path, e),
            }
        }

        if let Some(seed) = env_parse::<u64>("TPS_SEED") {
            config.seed = seed;
            log::info!("Seed from env: {}", seed);
        }
        if let Some(minutes) = env_parse::<f32>("TPS_MATCH_MINUTES") {
            config.match_minutes = minutes;
            log::info!("Match length from env: {} min", minutes);
        }
        if let Some(chance) = env_parse::<f32>("TPS_DROP_CHANCE") {
            config.drop_chance = chance;
            log::info!("Drop chance from env: {}", chance);
        }

        config
    }

    /// Parse a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&text)?;
        config.config_path = Some(path.display().to_string());
        Ok(config)
    }

    /// Builder: fixed seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builder: replace the enemy roster
    pub fn with_enemies(mut self, enemies: Vec<EnemyArchetype>) -> Self {
        self.enemies = enemies;
        self
    }

    /// Builder: match length in minutes
    pub fn with_match_minutes(mut self, minutes: f32) -> Self {
        self.match_minutes = minutes;
        self
    }

    /// Builder: pickup probability per kill
    pub fn with_drop_chance(mut self, chance: f32) -> Self {
        self.drop_chance = chance;
        self
    }

    /// Builder: spawner tuning
    pub fn with_spawner(mut self, spawner: SpawnerConfig) -> Self {
        self.spawner = spawner;
        self
    }

    /// Reject values the session cannot run with
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(SessionError::InvalidConfig(msg));

        if !(0.0..=1.0).contains(&self.drop_chance) {
            return invalid(format!("drop_chance {} outside 0..=1", self.drop_chance));
        }
        if !(self.match_minutes >= 0.0) {
            return invalid(format!("match_minutes {} is negative", self.match_minutes));
        }
        if !(self.enemy_damage >= 0.0) {
            return invalid(format!("enemy_damage {} is negative", self.enemy_damage));
        }
        if !(self.shot_range > 0.0 && self.hit_radius > 0.0) {
            return invalid("shot_range and hit_radius must be positive".to_string());
        }
        if self.player.max_health <= 0 {
            return invalid(format!("player max_health {} must be positive", self.player.max_health));
        }
        if self.weapon.per_magazine <= 0 || self.weapon.grenade_cost <= 0 {
            return invalid("weapon per_magazine and grenade_cost must be positive".to_string());
        }
        if self.spawner.min_wave > self.spawner.max_wave {
            return invalid(format!(
                "spawner wave size {}..={} is empty",
                self.spawner.min_wave, self.spawner.max_wave
            ));
        }
        let spawner = &self.spawner;
        if !(spawner.radius > 0.0 && spawner.radius.is_finite()) {
            return invalid(format!("spawner radius {} must be positive", spawner.radius));
        }
        if !(spawner.min_distance >= 0.0 && spawner.min_distance <= spawner.radius) {
            return invalid(format!(
                "spawner min_distance {} outside 0..={}",
                spawner.min_distance, spawner.radius
            ));
        }
        if !(spawner.interval > 0.0) {
            return invalid("spawner interval must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&spawner.front_chance) {
            return invalid(format!("spawner front_chance {} outside 0..=1", spawner.front_chance));
        }
        if !(0.0..=180.0).contains(&spawner.front_half_angle) {
            return invalid(format!(
                "spawner front_half_angle {} outside 0..=180",
                spawner.front_half_angle
            ));
        }
        if !(spawner.probe_height >= 0.0 && spawner.probe_height.is_finite()) {
            return invalid(format!("spawner probe_height {} is negative", spawner.probe_height));
        }
        if !(spawner.navigation_sample >= 0.0 && spawner.navigation_sample.is_finite() && spawner.lift.is_finite()) {
            return invalid("spawner navigation_sample and lift must be finite".to_string());
        }
        for archetype in &self.enemies {
            if archetype.max_health <= 0 {
                return invalid(format!("enemy '{}' has no health", archetype.id));
            }
        }
        for effect in &self.effects {
            if effect.duration < 0.0 {
                return invalid(format!("effect '{}' has a negative duration", effect.id));
            }
        }
        Ok(())
    }

    /// Log the settings that shape a run
    pub fn print_summary(&self) {
        log::info!("Session Configuration:");
        log::info!("  Seed: {}, match: {} min", self.seed, self.match_minutes);
        log::info!(
            "  Enemies: {} archetypes, damage {} (+{}%/min), drop chance {}",
            self.enemies.len(),
            self.enemy_damage,
            self.difficulty_percent,
            self.drop_chance
        );
        log::info!(
            "  Spawner: every {}s, waves {}..={}",
            self.spawner.interval,
            self.spawner.min_wave,
            self.spawner.max_wave
        );
        if let Some(path) = &self.config_path {
            log::info!("  Config: {}", path);
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let value = std::env::var(key).ok()?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            log::warn!("Ignoring {}={:?}: not a valid value", key, value);
            None
        }
    }
}
