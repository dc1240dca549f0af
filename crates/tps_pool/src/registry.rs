//! Pool registry - one pool per template id
//!
//! Managers for enemies, pickups and effects each own a registry keyed by
//! their template id type. Lookups of unknown templates are transient
//! failures: they are logged and yield `None`.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use rand::Rng;
use tps_core::Handle;

use crate::error::{PoolError, Result};
use crate::pool::{EntityPool, PoolConfig, PoolStats, Pooled};
use crate::selector::WeightedSelector;

/// Reference to an instance inside a [`PoolRegistry`]
pub struct PooledRef<T> {
    /// Index of the owning pool in registration order
    pool: u32,
    /// Handle inside that pool
    handle: Handle<T>,
}

impl<T> PooledRef<T> {
    /// Index of the owning pool (registration order)
    pub fn pool_index(&self) -> usize {
        self.pool as usize
    }

    /// Handle inside the owning pool
    pub fn handle(&self) -> Handle<T> {
        self.handle
    }

    /// Pack into a u64 id for collaborators that only carry integers
    /// (pool index in the top 16 bits, then generation and slot)
    pub fn to_bits(&self) -> u64 {
        (self.pool as u64) << 48 | (self.handle.generation() as u64 & 0xFFFF) << 32 | self.handle.index() as u64
    }
}

// Manual impls so refs stay Copy/Eq regardless of T
impl<T> Clone for PooledRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PooledRef<T> {}

impl<T> PartialEq for PooledRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.pool == other.pool && self.handle == other.handle
    }
}

impl<T> Eq for PooledRef<T> {}

impl<T> Hash for PooledRef<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pool.hash(state);
        self.handle.hash(state);
    }
}

impl<T> fmt::Debug for PooledRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PooledRef(pool {}, {:?})", self.pool, self.handle)
    }
}

/// Pools keyed by template id
pub struct PoolRegistry<K, T: Pooled> {
    pools: Vec<(K, EntityPool<T>)>,
    index: HashMap<K, usize>,
}

impl<K, T> PoolRegistry<K, T>
where
    K: Clone + Eq + Hash + fmt::Debug,
    T: Pooled,
{
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            pools: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a template. Duplicate ids and bad capacities are
    /// configuration errors.
    pub fn register(
        &mut self,
        id: K,
        config: PoolConfig,
        factory: impl FnMut() -> T + Send + 'static,
    ) -> Result<()> {
        if self.index.contains_key(&id) {
            return Err(PoolError::DuplicateTemplate(format!("{:?}", id)));
        }
        let pool = EntityPool::new(config, factory)?.named(format!("{:?}", id));
        self.index.insert(id.clone(), self.pools.len());
        self.pools.push((id, pool));
        Ok(())
    }

    /// Whether a live pool exists for the template
    pub fn contains(&self, id: &K) -> bool {
        self.index.contains_key(id)
    }

    /// Registered template ids in registration order
    pub fn templates(&self) -> impl Iterator<Item = &K> {
        self.pools.iter().map(|(id, _)| id)
    }

    /// Template id owning a reference
    pub fn template_of(&self, r: PooledRef<T>) -> Option<&K> {
        self.pools.get(r.pool as usize).map(|(id, _)| id)
    }

    /// Pool for a template
    pub fn pool(&self, id: &K) -> Option<&EntityPool<T>> {
        self.index.get(id).map(|&i| &self.pools[i].1)
    }

    /// Acquire an instance of a template. Unknown templates are logged and
    /// yield `None`.
    pub fn get(&mut self, id: &K) -> Option<PooledRef<T>> {
        let Some(&pool) = self.index.get(id) else {
            log::warn!("Spawn requested for unregistered template {:?}", id);
            return None;
        };
        let handle = self.pools[pool].1.get()?;
        Some(PooledRef {
            pool: pool as u32,
            handle,
        })
    }

    /// Pick a template with the selector (only registered templates are
    /// eligible) and acquire an instance of it.
    pub fn spawn_weighted<R: Rng + ?Sized>(
        &mut self,
        selector: &WeightedSelector<K>,
        rng: &mut R,
    ) -> Option<PooledRef<T>> {
        let id = selector.select(rng, |id| self.index.contains_key(id))?.clone();
        self.get(&id)
    }

    /// Release an instance back to its pool
    pub fn release(&mut self, r: PooledRef<T>) -> Result<()> {
        match self.pools.get_mut(r.pool as usize) {
            Some((_, pool)) => pool.release(r.handle),
            None => Err(PoolError::UnknownTemplate(format!("pool index {}", r.pool))),
        }
    }

    /// Borrow an active instance
    pub fn get_ref(&self, r: PooledRef<T>) -> Option<&T> {
        self.pools.get(r.pool as usize)?.1.get_ref(r.handle)
    }

    /// Mutably borrow an active instance
    pub fn get_mut(&mut self, r: PooledRef<T>) -> Option<&mut T> {
        self.pools.get_mut(r.pool as usize)?.1.get_mut(r.handle)
    }

    /// Whether the reference points at an active instance
    pub fn is_active(&self, r: PooledRef<T>) -> bool {
        self.get_ref(r).is_some()
    }

    /// All active references, pool by pool, oldest first within a pool
    pub fn active_refs(&self) -> Vec<PooledRef<T>> {
        self.pools
            .iter()
            .enumerate()
            .flat_map(|(i, (_, pool))| {
                pool.active_handles().into_iter().map(move |handle| PooledRef {
                    pool: i as u32,
                    handle,
                })
            })
            .collect()
    }

    /// Iterate active instances mutably
    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (PooledRef<T>, &mut T)> {
        self.pools.iter_mut().enumerate().flat_map(|(i, (_, pool))| {
            pool.iter_active_mut().map(move |(handle, item)| {
                (
                    PooledRef {
                        pool: i as u32,
                        handle,
                    },
                    item,
                )
            })
        })
    }

    /// Iterate active instances
    pub fn iter_active(&self) -> impl Iterator<Item = (PooledRef<T>, &T)> {
        self.pools.iter().enumerate().flat_map(|(i, (_, pool))| {
            pool.iter_active().map(move |(handle, item)| {
                (
                    PooledRef {
                        pool: i as u32,
                        handle,
                    },
                    item,
                )
            })
        })
    }

    /// Total active instances across all pools
    pub fn active_count(&self) -> usize {
        self.pools.iter().map(|(_, pool)| pool.active_count()).sum()
    }

    /// Accounting for one template
    pub fn stats(&self, id: &K) -> Option<PoolStats> {
        self.pool(id).map(EntityPool::stats)
    }

    /// Reset every pool (session restart)
    pub fn reset(&mut self) {
        for (_, pool) in &mut self.pools {
            pool.reset();
        }
    }
}

impl<K, T> Default for PoolRegistry<K, T>
where
    K: Clone + Eq + Hash + fmt::Debug,
    T: Pooled,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Kind {
        Grunt,
        Brute,
        Ghost,
    }

    struct Mob {
        kind: Kind,
        health: i32,
    }

    impl Pooled for Mob {
        fn on_acquire(&mut self) {
            self.health = 10;
        }
    }

    fn registry() -> PoolRegistry<Kind, Mob> {
        let mut registry = PoolRegistry::new();
        for kind in [Kind::Grunt, Kind::Brute] {
            registry
                .register(kind, PoolConfig::new(5, 50), move || Mob { kind, health: 0 })
                .unwrap();
        }
        registry
    }

    #[test]
    fn test_get_stamps_template_identity() {
        let mut registry = registry();
        let r = registry.get(&Kind::Brute).unwrap();
        assert_eq!(registry.get_ref(r).unwrap().kind, Kind::Brute);
        assert_eq!(registry.get_ref(r).unwrap().health, 10);
        assert_eq!(registry.template_of(r), Some(&Kind::Brute));
    }

    #[test]
    fn test_unknown_template_is_transient() {
        let mut registry = registry();
        assert!(registry.get(&Kind::Ghost).is_none());
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = registry();
        let err = registry
            .register(Kind::Grunt, PoolConfig::default(), || Mob { kind: Kind::Grunt, health: 0 })
            .unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_spawn_weighted_skips_unregistered() {
        let mut registry = registry();
        let selector = WeightedSelector::new()
            .with_entry(Kind::Ghost, 100)
            .with_entry(Kind::Grunt, 1);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let r = registry.spawn_weighted(&selector, &mut rng).unwrap();
            assert_eq!(registry.get_ref(r).unwrap().kind, Kind::Grunt);
        }
    }

    #[test]
    fn test_weighted_spawns_follow_ratio() {
        let mut registry = registry();
        let selector = WeightedSelector::new()
            .with_entry(Kind::Grunt, 3)
            .with_entry(Kind::Brute, 1);
        let mut rng = StdRng::seed_from_u64(11);
        let mut grunts = 0;
        for _ in 0..4_000 {
            let r = registry.spawn_weighted(&selector, &mut rng).unwrap();
            if registry.get_ref(r).unwrap().kind == Kind::Grunt {
                grunts += 1;
            }
            registry.release(r).unwrap();
        }
        assert!((grunts as i32 - 3_000).abs() < 140, "grunts: {}", grunts);
    }

    #[test]
    fn test_release_and_reset() {
        let mut registry = registry();
        let a = registry.get(&Kind::Grunt).unwrap();
        let b = registry.get(&Kind::Brute).unwrap();
        assert_eq!(registry.active_refs(), vec![a, b]);

        registry.release(a).unwrap();
        assert!(registry.release(a).is_err());
        assert_eq!(registry.active_count(), 1);

        registry.reset();
        assert_eq!(registry.active_count(), 0);
        assert!(!registry.is_active(b));
    }

    #[test]
    fn test_ref_bits_are_distinct() {
        let mut registry = registry();
        let a = registry.get(&Kind::Grunt).unwrap();
        let b = registry.get(&Kind::Brute).unwrap();
        assert_ne!(a.to_bits(), b.to_bits());
    }
}
