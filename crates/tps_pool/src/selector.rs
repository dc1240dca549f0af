//! Weighted spawn selection
//!
//! Cumulative-weight discrete distribution over `(id, ratio)` entries. Only
//! entries the caller marks eligible (typically: a live pool exists) take
//! part. A uniform integer draw in `[0, total)` picks the first entry whose
//! running sum exceeds the draw, so on exact boundaries the earlier entry
//! wins. Entry order therefore only matters at those boundaries.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// One selectable entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedEntry<K> {
    /// Template id
    pub id: K,
    /// Relative weight
    pub ratio: u32,
}

/// Picks template ids proportionally to integer ratios
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedSelector<K> {
    entries: Vec<WeightedEntry<K>>,
}

impl<K> WeightedSelector<K> {
    /// Create an empty selector
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Add an entry (builder form)
    pub fn with_entry(mut self, id: K, ratio: u32) -> Self {
        self.push(id, ratio);
        self
    }

    /// Add an entry
    pub fn push(&mut self, id: K, ratio: u32) {
        self.entries.push(WeightedEntry { id, ratio });
    }

    /// All entries in order
    pub fn entries(&self) -> &[WeightedEntry<K>] {
        &self.entries
    }

    /// Whether no entries are configured
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of eligible ratios
    pub fn total(&self, eligible: impl Fn(&K) -> bool) -> u64 {
        self.entries
            .iter()
            .filter(|e| eligible(&e.id))
            .map(|e| e.ratio as u64)
            .sum()
    }

    /// Resolve a draw in `[0, total)` to an entry by walking cumulative sums
    pub fn pick(&self, draw: u64, eligible: impl Fn(&K) -> bool) -> Option<&K> {
        let mut cumulative = 0u64;
        for entry in self.entries.iter().filter(|e| eligible(&e.id)) {
            cumulative += entry.ratio as u64;
            if draw < cumulative {
                return Some(&entry.id);
            }
        }
        None
    }

    /// Draw an eligible entry. Returns `None` (and logs) when the eligible
    /// weight is zero.
    pub fn select<R: Rng + ?Sized>(&self, rng: &mut R, eligible: impl Fn(&K) -> bool) -> Option<&K> {
        let total = self.total(&eligible);
        if total == 0 {
            log::warn!("Weighted selection skipped: no eligible weight among {} entries", self.entries.len());
            return None;
        }
        let draw = rng.gen_range(0..total);
        self.pick(draw, eligible)
    }
}

impl<K> Default for WeightedSelector<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> FromIterator<(K, u32)> for WeightedSelector<K> {
    fn from_iter<I: IntoIterator<Item = (K, u32)>>(iter: I) -> Self {
        let mut selector = Self::new();
        for (id, ratio) in iter {
            selector.push(id, ratio);
        }
        selector
    }
}
