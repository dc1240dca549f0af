//! Pooled one-shot effects
//!
//! Effects are spawned by id at a point and go back to their pool on their
//! own once their duration has elapsed. Playback itself belongs to the
//! renderer; this only tracks lifetimes.

use serde::{Deserialize, Serialize};
use tps_core::Countdown;
use tps_math::Vec3;
use tps_pool::{PoolConfig, PoolRegistry, PoolStats, Pooled, PooledRef};

/// Effect ids the session spawns
pub mod effects {
    pub const BULLET_IMPACT: &str = "BulletImpact";
    pub const BLOOD_IMPACT: &str = "BloodImpact";
    pub const SMALL_EXPLOSION: &str = "SmallExplosion";
    pub const BUFF_PICKUP: &str = "BuffPickup";
}

/// Reference to a playing effect
pub type EffectRef = PooledRef<Effect>;

/// Pool settings for one effect id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectEntry {
    pub id: String,
    /// Seconds until the effect is released
    pub duration: f32,
    #[serde(default = "default_effect_pool")]
    pub pool: PoolConfig,
}

fn default_effect_pool() -> PoolConfig {
    PoolConfig::new(5, 20)
}

impl EffectEntry {
    pub fn new(id: impl Into<String>, duration: f32) -> Self {
        Self {
            id: id.into(),
            duration,
            pool: default_effect_pool(),
        }
    }
}

/// Effects the session expects to find
pub fn default_effect_table() -> Vec<EffectEntry> {
    vec![
        EffectEntry::new(effects::BULLET_IMPACT, 0.5),
        EffectEntry::new(effects::BLOOD_IMPACT, 0.5),
        EffectEntry::new(effects::SMALL_EXPLOSION, 1.0),
        EffectEntry::new(effects::BUFF_PICKUP, 1.0),
    ]
}

/// One playing effect
#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    duration: f32,
    position: Vec3,
    lifetime: Countdown,
}

impl Effect {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            position: Vec3::ZERO,
            lifetime: Countdown::new(),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Seconds until release
    pub fn remaining(&self) -> f32 {
        self.lifetime.remaining()
    }
}

impl Pooled for Effect {
    fn on_acquire(&mut self) {
        self.position = Vec3::ZERO;
        self.lifetime.start(self.duration);
    }

    fn on_release(&mut self) {
        self.lifetime.cancel();
    }
}

/// Effect pools by id
#[derive(Default)]
pub struct EffectPools {
    registry: PoolRegistry<String, Effect>,
}

impl EffectPools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_table(entries: &[EffectEntry]) -> tps_pool::error::Result<Self> {
        let mut pools = Self::new();
        for entry in entries {
            pools.register(entry)?;
        }
        Ok(pools)
    }

    pub fn register(&mut self, entry: &EffectEntry) -> tps_pool::error::Result<()> {
        let duration = entry.duration;
        self.registry
            .register(entry.id.clone(), entry.pool, move || Effect::new(duration))
    }

    /// Play an effect at `position`. Unknown ids warn and return `None`.
    pub fn spawn(&mut self, id: &str, position: Vec3) -> Option<EffectRef> {
        let r = self.registry.get(&id.to_string())?;
        if let Some(effect) = self.registry.get_mut(r) {
            effect.position = position;
        }
        log::trace!("Effect {} at ({:.1}, {:.1}, {:.1})", id, position.x, position.y, position.z);
        Some(r)
    }

    /// Advance lifetimes and release finished effects. Returns how many
    /// were released.
    pub fn tick(&mut self, dt: f32) -> usize {
        let finished: Vec<EffectRef> = self
            .registry
            .iter_active_mut()
            .filter_map(|(r, effect)| effect.lifetime.tick(dt).then_some(r))
            .collect();

        for &r in &finished {
            if let Err(e) = self.registry.release(r) {
                log::warn!("Failed to release effect {:?}: {}", r, e);
            }
        }
        finished.len()
    }

    pub fn get(&self, r: EffectRef) -> Option<&Effect> {
        self.registry.get_ref(r)
    }

    pub fn active_count(&self) -> usize {
        self.registry.active_count()
    }

    pub fn stats(&self, id: &str) -> Option<PoolStats> {
        self.registry.stats(&id.to_string())
    }

    pub fn reset(&mut self) {
        self.registry.reset();
    }
}
