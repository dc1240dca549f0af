//! Buffable numeric stat

use serde::{Deserialize, Serialize};

/// Base value plus accumulated modifiers.
///
/// Percentage modifiers multiply the current value, so two +10 % buffs give
/// `base * 1.1 * 1.1`, not `base * 1.2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    base: f32,
    value: f32,
}

impl Stat {
    /// Create an unmodified stat
    pub const fn new(base: f32) -> Self {
        Self { base, value: base }
    }

    /// Multiply the current value by `1 + percent / 100`
    pub fn apply_percent(&mut self, percent: f32) -> f32 {
        self.value *= 1.0 + percent / 100.0;
        self.value
    }

    /// Add a flat amount
    pub fn add(&mut self, amount: f32) -> f32 {
        self.value += amount;
        self.value
    }

    /// Drop all modifiers
    pub fn reset(&mut self) {
        self.value = self.base;
    }

    /// Modified value
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Modified value rounded to whole points
    pub fn value_i32(&self) -> i32 {
        self.value.round() as i32
    }

    /// Unmodified value
    pub fn base(&self) -> f32 {
        self.base
    }

    /// Ratio of modified to base value
    pub fn multiplier(&self) -> f32 {
        if self.base == 0.0 {
            return 1.0;
        }
        self.value / self.base
    }
}

impl Default for Stat {
    fn default() -> Self {
        Self::new(1.0)
    }
}
