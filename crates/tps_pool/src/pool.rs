//! Entity pool - recycled instances of one template
//!
//! Instances are built once by the pool's factory (the one-time initializer
//! that stamps template identity) and then cycle between the free ring and
//! the active set. Every acquisition runs [`Pooled::on_acquire`], every
//! release runs [`Pooled::on_release`].
//!
//! Exhaustion policy: when the free ring is empty and the pool already holds
//! `max_capacity` instances, `get` forcibly reclaims the instance that has
//! been active the longest. The outcome depends only on acquisition order,
//! so it is deterministic. The reclaimed instance's old handle goes stale.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tps_core::Handle;

use crate::error::{PoolError, Result};

/// Lifecycle hooks for pooled instances
pub trait Pooled: Send + 'static {
    /// Reset every field mutated during a previous active lifetime.
    /// Runs on each acquisition, including forced reclaims.
    fn on_acquire(&mut self);

    /// Deactivate the instance (hide, disable collision, stop timers).
    fn on_release(&mut self) {}
}

/// One-time initializer for new instances
pub type Factory<T> = Box<dyn FnMut() -> T + Send>;

/// Capacity settings for a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Free-ring capacity reserved up front
    pub default_capacity: usize,
    /// Hard cap on active + free instances
    pub max_capacity: usize,
    /// Instances constructed eagerly at creation and on reset
    #[serde(default)]
    pub prewarm: usize,
}

impl PoolConfig {
    /// Create a config with the given capacities and no prewarm
    pub fn new(default_capacity: usize, max_capacity: usize) -> Self {
        Self {
            default_capacity,
            max_capacity,
            prewarm: 0,
        }
    }

    /// Set the number of eagerly built instances
    pub fn with_prewarm(mut self, prewarm: usize) -> Self {
        self.prewarm = prewarm;
        self
    }

    /// Check capacity consistency
    pub fn validate(&self) -> Result<()> {
        if self.max_capacity == 0 {
            return Err(PoolError::InvalidCapacity("max_capacity must be at least 1".into()));
        }
        if self.default_capacity > self.max_capacity {
            return Err(PoolError::InvalidCapacity(format!(
                "default_capacity {} exceeds max_capacity {}",
                self.default_capacity, self.max_capacity
            )));
        }
        if self.prewarm > self.max_capacity {
            return Err(PoolError::InvalidCapacity(format!(
                "prewarm {} exceeds max_capacity {}",
                self.prewarm, self.max_capacity
            )));
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new(5, 20)
    }
}

/// Snapshot of pool accounting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Instances currently handed out
    pub active: usize,
    /// Instances waiting in the free ring
    pub free: usize,
    /// Hard cap
    pub max_capacity: usize,
    /// Instances built by the factory since creation
    pub created: u64,
    /// Forced reclaims because the pool was exhausted
    pub reclaimed: u64,
    /// Releases rejected as stale or double
    pub rejected_releases: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Free,
    /// Active since the given acquisition sequence number
    Active(u64),
}

struct Slot<T> {
    item: T,
    generation: u32,
    state: SlotState,
}

/// Pool of recycled instances of a single template
pub struct EntityPool<T: Pooled> {
    name: String,
    config: PoolConfig,
    factory: Factory<T>,
    slots: Vec<Slot<T>>,
    /// Free slot indices, longest idle at the front
    free: VecDeque<u32>,
    /// Monotonic acquisition counter
    acquire_seq: u64,
    /// First generation used by slots created after a reset
    generation_base: u32,
    created: u64,
    reclaimed: u64,
    rejected_releases: u64,
}

impl<T: Pooled> EntityPool<T> {
    /// Create a pool. Fails on inconsistent capacities.
    pub fn new(config: PoolConfig, factory: impl FnMut() -> T + Send + 'static) -> Result<Self> {
        config.validate()?;
        let mut pool = Self {
            name: std::any::type_name::<T>().to_string(),
            config,
            factory: Box::new(factory),
            slots: Vec::with_capacity(config.default_capacity),
            free: VecDeque::with_capacity(config.default_capacity),
            acquire_seq: 0,
            generation_base: 0,
            created: 0,
            reclaimed: 0,
            rejected_releases: 0,
        };
        pool.prewarm();
        Ok(pool)
    }

    /// Set the name used in log messages
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Pool name used in log messages
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Capacity settings
    pub fn config(&self) -> PoolConfig {
        self.config
    }

    fn prewarm(&mut self) {
        while self.slots.len() < self.config.prewarm {
            let index = self.construct();
            self.free.push_back(index);
        }
    }

    fn construct(&mut self) -> u32 {
        let item = (self.factory)();
        self.slots.push(Slot {
            item,
            generation: self.generation_base,
            state: SlotState::Free,
        });
        self.created += 1;
        (self.slots.len() - 1) as u32
    }

    fn activate(&mut self, index: u32) -> Handle<T> {
        let seq = self.acquire_seq;
        self.acquire_seq += 1;

        let slot = &mut self.slots[index as usize];
        slot.generation = slot.generation.wrapping_add(1);
        slot.state = SlotState::Active(seq);
        slot.item.on_acquire();
        Handle::new(index, slot.generation)
    }

    /// Acquire an instance: free ring first, then growth up to the cap,
    /// then forced reclaim of the oldest active instance.
    pub fn get(&mut self) -> Option<Handle<T>> {
        if let Some(index) = self.free.pop_front() {
            return Some(self.activate(index));
        }

        if self.slots.len() < self.config.max_capacity {
            let index = self.construct();
            return Some(self.activate(index));
        }

        let oldest = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| match slot.state {
                SlotState::Active(seq) => Some((seq, i as u32)),
                SlotState::Free => None,
            })
            .min()
            .map(|(_, i)| i)?;

        log::warn!(
            "Pool '{}' exhausted at {} instances, reclaiming oldest active (slot {})",
            self.name,
            self.config.max_capacity,
            oldest
        );
        self.slots[oldest as usize].item.on_release();
        self.reclaimed += 1;
        Some(self.activate(oldest))
    }

    fn check(&self, handle: Handle<T>) -> Result<usize> {
        let stale = PoolError::StaleHandle {
            index: handle.index(),
            generation: handle.generation(),
        };
        let index = handle.index() as usize;
        match self.slots.get(index) {
            Some(slot) if slot.generation == handle.generation() => Ok(index),
            _ => Err(stale),
        }
    }

    /// Return an instance to the free ring. Stale and double releases are
    /// logged and rejected without touching pool accounting.
    pub fn release(&mut self, handle: Handle<T>) -> Result<()> {
        let result = self.check(handle).and_then(|index| {
            let slot = &mut self.slots[index];
            match slot.state {
                SlotState::Free => Err(PoolError::DoubleRelease(index as u32)),
                SlotState::Active(_) => {
                    slot.item.on_release();
                    slot.state = SlotState::Free;
                    self.free.push_back(index as u32);
                    Ok(())
                }
            }
        });

        if let Err(err) = &result {
            self.rejected_releases += 1;
            log::warn!("Pool '{}': release ignored: {}", self.name, err);
        }
        result
    }

    /// Release every active instance, drop all instances and rebuild.
    /// Every outstanding handle becomes stale.
    pub fn reset(&mut self) {
        let mut released = 0;
        for slot in &mut self.slots {
            if let SlotState::Active(_) = slot.state {
                slot.item.on_release();
                released += 1;
            }
        }

        let max_generation = self.slots.iter().map(|s| s.generation).max().unwrap_or(0);
        self.generation_base = self.generation_base.max(max_generation).wrapping_add(1);
        self.slots.clear();
        self.free.clear();
        self.prewarm();

        log::debug!("Pool '{}' reset ({} active instances reclaimed)", self.name, released);
    }

    /// Borrow an active instance
    pub fn get_ref(&self, handle: Handle<T>) -> Option<&T> {
        let index = self.check(handle).ok()?;
        let slot = &self.slots[index];
        matches!(slot.state, SlotState::Active(_)).then_some(&slot.item)
    }

    /// Mutably borrow an active instance
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        let index = self.check(handle).ok()?;
        let slot = &mut self.slots[index];
        match slot.state {
            SlotState::Active(_) => Some(&mut slot.item),
            SlotState::Free => None,
        }
    }

    /// Whether the handle refers to a currently active instance
    pub fn is_active(&self, handle: Handle<T>) -> bool {
        self.get_ref(handle).is_some()
    }

    /// Number of active instances
    pub fn active_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Number of instances in the free ring
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Active + free
    pub fn total(&self) -> usize {
        self.slots.len()
    }

    /// Handles of active instances, oldest acquisition first
    pub fn active_handles(&self) -> Vec<Handle<T>> {
        let mut active: Vec<(u64, Handle<T>)> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| match slot.state {
                SlotState::Active(seq) => Some((seq, Handle::new(i as u32, slot.generation))),
                SlotState::Free => None,
            })
            .collect();
        active.sort_by_key(|(seq, _)| *seq);
        active.into_iter().map(|(_, handle)| handle).collect()
    }

    /// Iterate active instances in slot order
    pub fn iter_active(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| match slot.state {
            SlotState::Active(_) => Some((Handle::new(i as u32, slot.generation), &slot.item)),
            SlotState::Free => None,
        })
    }

    /// Iterate active instances mutably in slot order
    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (Handle<T>, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(i, slot)| match slot.state {
            SlotState::Active(_) => Some((Handle::new(i as u32, slot.generation), &mut slot.item)),
            SlotState::Free => None,
        })
    }

    /// Accounting snapshot
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            active: self.active_count(),
            free: self.free_count(),
            max_capacity: self.config.max_capacity,
            created: self.created,
            reclaimed: self.reclaimed,
            rejected_releases: self.rejected_releases,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[derive(Debug)]
    struct Orb {
        template: u32,
        hits: u32,
        alpha: f32,
        visible: bool,
    }

    impl Orb {
        fn new(template: u32) -> Self {
            Self {
                template,
                hits: 7,
                alpha: 0.3,
                visible: false,
            }
        }
    }

    impl Pooled for Orb {
        fn on_acquire(&mut self) {
            self.hits = 0;
            self.alpha = 1.0;
            self.visible = true;
        }

        fn on_release(&mut self) {
            self.visible = false;
        }
    }

    fn pool(max: usize) -> EntityPool<Orb> {
        EntityPool::new(PoolConfig::new(max.min(2), max), || Orb::new(9)).unwrap()
    }

    #[test]
    fn test_get_release_reuses_longest_idle() {
        let mut pool = pool(4);
        let a = pool.get().unwrap();
        let b = pool.get().unwrap();
        pool.release(a).unwrap();
        pool.release(b).unwrap();

        let c = pool.get().unwrap();
        assert_eq!(c.index(), a.index());
        assert_eq!(pool.total(), 2);
        assert_eq!(pool.active_count(), 1);
        assert_eq!(pool.free_count(), 1);
    }

    #[test]
    fn test_acquired_instance_is_fresh() {
        let mut pool = pool(1);
        let a = pool.get().unwrap();
        {
            let orb = pool.get_mut(a).unwrap();
            orb.hits = 12;
            orb.alpha = 0.0;
        }
        pool.release(a).unwrap();
        assert!(!pool.slots[0].item.visible);

        let b = pool.get().unwrap();
        let orb = pool.get_ref(b).unwrap();
        assert_eq!(orb.template, 9);
        assert_eq!(orb.hits, 0);
        assert_eq!(orb.alpha, 1.0);
        assert!(orb.visible);
    }

    #[test]
    fn test_double_release_is_rejected() {
        let mut pool = pool(2);
        let a = pool.get().unwrap();
        pool.release(a).unwrap();

        assert_eq!(pool.release(a), Err(PoolError::DoubleRelease(a.index())));
        assert_eq!(pool.free_count(), 1);
        assert_eq!(pool.stats().rejected_releases, 1);
    }

    #[test]
    fn test_stale_handle_after_reuse() {
        let mut pool = pool(1);
        let a = pool.get().unwrap();
        pool.release(a).unwrap();
        let b = pool.get().unwrap();

        assert!(matches!(pool.release(a), Err(PoolError::StaleHandle { .. })));
        assert!(pool.get_ref(a).is_none());
        assert!(pool.is_active(b));
    }

    #[test]
    fn test_exhausted_pool_reclaims_oldest() {
        let mut pool = pool(2);
        let first = pool.get().unwrap();
        let second = pool.get().unwrap();
        pool.get_mut(first).unwrap().hits = 3;

        let third = pool.get().unwrap();
        assert_eq!(third.index(), first.index());
        assert!(!pool.is_active(first));
        assert!(pool.is_active(second));
        assert_eq!(pool.get_ref(third).unwrap().hits, 0);
        assert_eq!(pool.total(), 2);
        assert_eq!(pool.stats().reclaimed, 1);

        // Next reclaim takes the now-oldest
        let fourth = pool.get().unwrap();
        assert_eq!(fourth.index(), second.index());
    }

    #[test]
    fn test_reset_reclaims_everything() {
        let mut pool = EntityPool::new(PoolConfig::new(2, 4).with_prewarm(2), || Orb::new(1)).unwrap();
        assert_eq!(pool.free_count(), 2);

        let handles: Vec<_> = (0..3).map(|_| pool.get().unwrap()).collect();
        pool.reset();

        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.free_count(), 2);
        for handle in handles {
            assert!(!pool.is_active(handle));
            assert!(pool.release(handle).is_err());
        }

        let fresh = pool.get().unwrap();
        assert!(pool.is_active(fresh));
    }

    #[test]
    fn test_cap_holds_for_random_sequences() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut pool = pool(5);
        let mut held = Vec::new();

        for _ in 0..2_000 {
            if rng.gen_bool(0.6) {
                held.push(pool.get().unwrap());
            } else if !held.is_empty() {
                let i = rng.gen_range(0..held.len());
                let _ = pool.release(held.swap_remove(i));
            } else if rng.gen_bool(0.05) {
                pool.reset();
            }
            assert!(pool.active_count() + pool.free_count() <= 5);
            assert_eq!(pool.total(), pool.active_count() + pool.free_count());
        }
    }

    #[test]
    fn test_active_handles_in_acquisition_order() {
        let mut pool = pool(4);
        let a = pool.get().unwrap();
        let b = pool.get().unwrap();
        pool.release(a).unwrap();
        let c = pool.get().unwrap();
        assert_eq!(pool.active_handles(), vec![b, c]);
    }

    #[test]
    fn test_invalid_config() {
        assert!(PoolConfig::new(0, 0).validate().is_err());
        assert!(PoolConfig::new(10, 5).validate().is_err());
        assert!(PoolConfig::new(1, 2).with_prewarm(3).validate().is_err());
        assert!(EntityPool::new(PoolConfig::new(3, 1), || Orb::new(0)).is_err());
    }
}
