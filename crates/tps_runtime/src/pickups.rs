//! Buff pickups lying in the world
//!
//! One pool per buff kind, chosen by spawn ratio when an enemy drops loot.
//! Consuming a pickup releases it; the session then publishes
//! `BuffConsumed` for the coordinator.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tps_buff::BuffKind;
use tps_math::Vec3;
use tps_pool::{PoolConfig, PoolRegistry, PoolStats, Pooled, PooledRef, WeightedSelector};

/// Reference to a pooled pickup
pub type PickupRef = PooledRef<Pickup>;

/// Spawn settings for one buff kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickupEntry {
    pub kind: BuffKind,
    /// Relative drop weight
    pub ratio: u32,
    #[serde(default = "default_pickup_pool")]
    pub pool: PoolConfig,
}

fn default_pickup_pool() -> PoolConfig {
    PoolConfig::new(5, 20)
}

impl PickupEntry {
    pub fn new(kind: BuffKind, ratio: u32) -> Self {
        Self {
            kind,
            ratio,
            pool: default_pickup_pool(),
        }
    }

    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }
}

/// Drop table shipped with the game: every kind equally likely except
/// kill-all, which is rare
pub fn default_pickup_table() -> Vec<PickupEntry> {
    BuffKind::ALL
        .iter()
        .map(|&kind| match kind {
            BuffKind::KillAllEnemies => PickupEntry::new(kind, 1),
            _ => PickupEntry::new(kind, 10),
        })
        .collect()
}

/// A buff waiting to be collected
#[derive(Debug, Clone, PartialEq)]
pub struct Pickup {
    kind: BuffKind,
    position: Vec3,
}

impl Pickup {
    pub fn new(kind: BuffKind) -> Self {
        Self {
            kind,
            position: Vec3::ZERO,
        }
    }

    pub fn kind(&self) -> BuffKind {
        self.kind
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }
}

impl Pooled for Pickup {
    fn on_acquire(&mut self) {
        self.position = Vec3::ZERO;
    }
}

/// Pickup pools by buff kind
#[derive(Default)]
pub struct PickupField {
    registry: PoolRegistry<BuffKind, Pickup>,
    selector: WeightedSelector<BuffKind>,
}

impl PickupField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a field from a drop table
    pub fn from_table(entries: &[PickupEntry]) -> tps_pool::error::Result<Self> {
        let mut field = Self::new();
        for entry in entries {
            field.register(*entry)?;
        }
        Ok(field)
    }

    pub fn register(&mut self, entry: PickupEntry) -> tps_pool::error::Result<()> {
        let kind = entry.kind;
        self.registry.register(kind, entry.pool, move || Pickup::new(kind))?;
        self.selector.push(kind, entry.ratio);
        Ok(())
    }

    /// Drop a specific kind
    pub fn spawn(&mut self, kind: BuffKind, position: Vec3) -> Option<PickupRef> {
        let r = self.registry.get(&kind)?;
        self.place(r, position);
        Some(r)
    }

    /// Drop a kind picked by ratio
    pub fn spawn_random<R: Rng + ?Sized>(&mut self, position: Vec3, rng: &mut R) -> Option<PickupRef> {
        let r = self.registry.spawn_weighted(&self.selector, rng)?;
        self.place(r, position);
        Some(r)
    }

    fn place(&mut self, r: PickupRef, position: Vec3) {
        if let Some(pickup) = self.registry.get_mut(r) {
            pickup.position = position;
            log::debug!("{:?} pickup at ({:.1}, {:.1}, {:.1})", pickup.kind, position.x, position.y, position.z);
        }
    }

    /// Collect a pickup: release it and report its kind. A stale or
    /// already-collected reference yields `None`.
    pub fn consume(&mut self, r: PickupRef) -> Option<(BuffKind, Vec3)> {
        let (kind, position) = {
            let pickup = self.registry.get_ref(r)?;
            (pickup.kind, pickup.position)
        };
        match self.registry.release(r) {
            Ok(()) => Some((kind, position)),
            Err(e) => {
                log::warn!("Pickup {:?} could not be consumed: {}", r, e);
                None
            }
        }
    }

    /// Pickups whose center lies within `radius` of `position`
    pub fn touching(&self, position: Vec3, radius: f32) -> Vec<PickupRef> {
        self.registry
            .iter_active()
            .filter(|(_, pickup)| pickup.position.distance(position) <= radius)
            .map(|(r, _)| r)
            .collect()
    }

    pub fn get(&self, r: PickupRef) -> Option<&Pickup> {
        self.registry.get_ref(r)
    }

    pub fn active_refs(&self) -> Vec<PickupRef> {
        self.registry.active_refs()
    }

    pub fn active_count(&self) -> usize {
        self.registry.active_count()
    }

    pub fn stats(&self, kind: BuffKind) -> Option<PoolStats> {
        self.registry.stats(&kind)
    }

    pub fn reset(&mut self) {
        self.registry.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_consume_releases_once() {
        let mut field = PickupField::from_table(&default_pickup_table()).unwrap();
        let r = field.spawn(BuffKind::Ammo, Vec3::new(1.0, 0.0, 2.0)).unwrap();
        assert_eq!(field.active_count(), 1);

        assert_eq!(field.consume(r), Some((BuffKind::Ammo, Vec3::new(1.0, 0.0, 2.0))));
        assert_eq!(field.active_count(), 0);
        assert_eq!(field.consume(r), None);
    }

    #[test]
    fn test_touching_uses_radius() {
        let mut field = PickupField::from_table(&[PickupEntry::new(BuffKind::Speed, 1)]).unwrap();
        let near = field.spawn(BuffKind::Speed, Vec3::new(0.5, 0.0, 0.0)).unwrap();
        field.spawn(BuffKind::Speed, Vec3::new(5.0, 0.0, 0.0)).unwrap();

        assert_eq!(field.touching(Vec3::ZERO, 1.0), vec![near]);
    }

    #[test]
    fn test_random_drop_only_picks_registered_kinds() {
        let mut field = PickupField::from_table(&[
            PickupEntry::new(BuffKind::InstantHeal, 3),
            PickupEntry::new(BuffKind::Ammo, 1),
        ])
        .unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let r = field.spawn_random(Vec3::ZERO, &mut rng).unwrap();
            let kind = field.get(r).unwrap().kind();
            assert!(matches!(kind, BuffKind::InstantHeal | BuffKind::Ammo));
            field.consume(r);
        }
    }

    #[test]
    fn test_duplicate_kind_is_config_error() {
        let result = PickupField::from_table(&[
            PickupEntry::new(BuffKind::Speed, 1),
            PickupEntry::new(BuffKind::Speed, 2),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_entry_from_json_defaults_pool() {
        let entry: PickupEntry = serde_json::from_str(r#"{ "kind": "Ammo", "ratio": 4 }"#).unwrap();
        assert_eq!(entry.pool, PoolConfig::new(5, 20));
    }
}
