//! Integer health with clamped writes

use serde::{Deserialize, Serialize};

use crate::damage::DamageInfo;

/// Result of a damage attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Nothing changed (non-positive amount, already dead or disabled)
    Ignored,
    /// Health dropped but stayed above zero
    Damaged { current: i32 },
    /// This hit took health to zero
    Killed,
}

impl DamageOutcome {
    /// Whether health changed
    pub fn is_applied(&self) -> bool {
        !matches!(self, Self::Ignored)
    }

    /// Whether this hit was the killing blow
    pub fn is_killed(&self) -> bool {
        matches!(self, Self::Killed)
    }
}

/// Health pool. `0 <= current <= max` holds after every write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Damageable {
    current: i32,
    max: i32,
    /// Disabled targets ignore damage (dying enemies)
    enabled: bool,
}

impl Damageable {
    /// Full health with the given maximum (at least 1)
    pub fn new(max: i32) -> Self {
        let max = max.max(1);
        Self {
            current: max,
            max,
            enabled: true,
        }
    }

    /// Apply damage. Returns `Ignored` for `amount <= 0`, dead or disabled
    /// targets; a killing blow is reported once.
    pub fn take_damage(&mut self, amount: i32) -> DamageOutcome {
        if amount <= 0 || !self.enabled || self.is_dead() {
            return DamageOutcome::Ignored;
        }
        self.current = (self.current - amount).max(0);
        if self.current == 0 {
            DamageOutcome::Killed
        } else {
            DamageOutcome::Damaged {
                current: self.current,
            }
        }
    }

    /// Apply a damage instance
    pub fn apply(&mut self, damage: &DamageInfo) -> DamageOutcome {
        self.take_damage(damage.amount)
    }

    /// Heal up to max. Returns the amount actually healed; dead targets
    /// stay dead.
    pub fn heal(&mut self, amount: i32) -> i32 {
        if amount <= 0 || self.is_dead() {
            return 0;
        }
        let before = self.current;
        self.current = self.current.saturating_add(amount).min(self.max);
        self.current - before
    }

    /// Set health directly (clamped to `0..=max`)
    pub fn set_current(&mut self, value: i32) {
        self.current = value.clamp(0, self.max);
    }

    /// Set the maximum (at least 1) and re-clamp current
    pub fn set_max(&mut self, max: i32) {
        self.max = max.max(1);
        self.current = self.current.min(self.max);
    }

    /// Grow (or shrink) max by a percentage of its current value. Living
    /// targets gain the same number of points they gained in max.
    pub fn scale_max(&mut self, percent: f32) -> i32 {
        let scaled = (self.max as f32 * (1.0 + percent / 100.0)).round() as i32;
        let delta = scaled.max(1) - self.max;
        self.max = scaled.max(1);
        if self.is_dead() {
            self.current = self.current.min(self.max);
        } else {
            self.current = (self.current + delta.max(0)).clamp(0, self.max);
        }
        self.max
    }

    /// Back to full health and re-enabled
    pub fn reset(&mut self) {
        self.current = self.max;
        self.enabled = true;
    }

    /// Stop accepting damage
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Whether damage is accepted
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Check if dead
    pub fn is_dead(&self) -> bool {
        self.current <= 0
    }

    /// Check if at full health
    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    /// Current health
    pub fn current(&self) -> i32 {
        self.current
    }

    /// Maximum health
    pub fn max(&self) -> i32 {
        self.max
    }

    /// Health as a fraction (0.0 - 1.0)
    pub fn fraction(&self) -> f32 {
        self.current as f32 / self.max as f32
    }
}

impl Default for Damageable {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Per-second healing paid out in whole points
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Regeneration {
    /// Health points per second
    rate: f32,
    #[serde(skip)]
    accumulated: f32,
}

impl Regeneration {
    /// Create with a starting rate
    pub fn new(rate: f32) -> Self {
        Self {
            rate: rate.max(0.0),
            accumulated: 0.0,
        }
    }

    /// Stack more regeneration
    pub fn add_rate(&mut self, rate: f32) {
        self.rate = (self.rate + rate).max(0.0);
    }

    /// Health points per second
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Advance by `dt`, returning the whole points to heal now
    pub fn tick(&mut self, dt: f32) -> i32 {
        if self.rate <= 0.0 {
            return 0;
        }
        self.accumulated += self.rate * dt.max(0.0);
        let whole = self.accumulated.floor().min(i32::MAX as f32);
        self.accumulated -= whole;
        if !self.accumulated.is_finite() {
            self.accumulated = 0.0;
        }
        whole as i32
    }

    /// Drop all regeneration
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overkill_clamps_and_reports_once() {
        let mut health = Damageable::new(100);
        assert_eq!(health.take_damage(120), DamageOutcome::Killed);
        assert_eq!(health.current(), 0);
        assert_eq!(health.take_damage(10), DamageOutcome::Ignored);
        assert_eq!(health.current(), 0);
    }

    #[test]
    fn test_non_positive_damage_is_noop() {
        let mut health = Damageable::new(100);
        assert_eq!(health.take_damage(0), DamageOutcome::Ignored);
        assert_eq!(health.take_damage(-5), DamageOutcome::Ignored);
        assert_eq!(health.current(), 100);
    }

    #[test]
    fn test_damage_sequence_stays_in_range() {
        let mut health = Damageable::new(50);
        for amount in [-3, 7, 0, 12, 200, 4, -100] {
            health.take_damage(amount);
            assert!(health.current() >= 0 && health.current() <= health.max());
        }
        assert!(health.is_dead());
    }

    #[test]
    fn test_disabled_target_ignores_damage() {
        let mut health = Damageable::new(30);
        health.disable();
        assert_eq!(health.take_damage(10), DamageOutcome::Ignored);
        health.reset();
        assert!(health.is_enabled());
        assert_eq!(health.take_damage(10), DamageOutcome::Damaged { current: 20 });
    }

    #[test]
    fn test_heal_clamps_to_max() {
        let mut health = Damageable::new(100);
        health.take_damage(30);
        assert_eq!(health.heal(50), 30);
        assert!(health.is_full());
    }

    #[test]
    fn test_heal_saturates_large_amounts() {
        let mut health = Damageable::new(100);
        health.take_damage(1);
        assert_eq!(health.heal(i32::MAX), 1);
        assert_eq!(health.current(), 100);

        let mut wide = Damageable::new(i32::MAX);
        wide.take_damage(10);
        assert_eq!(wide.heal(i32::MAX), 10);
        assert!(wide.is_full());
    }

    #[test]
    fn test_regeneration_survives_huge_rates() {
        let mut regen = Regeneration::new(f32::MAX);
        let first = regen.tick(10.0);
        assert_eq!(first, i32::MAX);
        assert!(regen.tick(1.0) > 0);

        let mut health = Damageable::new(100);
        health.take_damage(40);
        assert_eq!(health.heal(first), 40);
    }

    #[test]
    fn test_set_max_reclamps_current() {
        let mut health = Damageable::new(100);
        health.set_max(60);
        assert_eq!(health.current(), 60);
        health.set_max(0);
        assert_eq!(health.max(), 1);
        health.set_current(-4);
        assert_eq!(health.current(), 0);
    }

    #[test]
    fn test_scale_max_compounds() {
        let mut health = Damageable::new(100);
        health.take_damage(40);
        assert_eq!(health.scale_max(20.0), 120);
        assert_eq!(health.current(), 80);
        assert_eq!(health.scale_max(20.0), 144);
        assert_eq!(health.current(), 104);
    }

    #[test]
    fn test_regeneration_pays_whole_points() {
        let mut regen = Regeneration::default();
        assert_eq!(regen.tick(1.0), 0);
        regen.add_rate(1.0);
        assert_eq!(regen.tick(0.4), 0);
        assert_eq!(regen.tick(0.4), 0);
        assert_eq!(regen.tick(0.4), 1);
        regen.add_rate(1.0);
        assert_eq!(regen.tick(1.0), 2);
    }
}
