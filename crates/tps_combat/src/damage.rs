//! Damage types and information

use serde::{Deserialize, Serialize};

/// Types of damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DamageKind {
    /// Hitscan bullet
    #[default]
    Bullet,
    /// Grenade splash
    Explosive,
    /// Enemy bite / melee swing
    Melee,
}

/// Information about a damage instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageInfo {
    /// Damage amount in health points
    pub amount: i32,
    /// Type of damage
    pub kind: DamageKind,
    /// Entity that caused the damage (if any)
    pub source: Option<u64>,
    /// World position where damage was applied
    pub hit_point: Option<[f32; 3]>,
    /// Knockback force magnitude (0 = none)
    pub knockback: f32,
}

impl DamageInfo {
    /// Create new damage info
    pub fn new(amount: i32, kind: DamageKind) -> Self {
        Self {
            amount,
            kind,
            source: None,
            hit_point: None,
            knockback: 0.0,
        }
    }

    /// Bullet damage
    pub fn bullet(amount: i32) -> Self {
        Self::new(amount, DamageKind::Bullet)
    }

    /// Set the source entity
    pub fn with_source(mut self, entity: u64) -> Self {
        self.source = Some(entity);
        self
    }

    /// Set the hit point
    pub fn with_hit_point(mut self, point: [f32; 3]) -> Self {
        self.hit_point = Some(point);
        self
    }

    /// Set knockback
    pub fn with_knockback(mut self, force: f32) -> Self {
        self.knockback = force.max(0.0);
        self
    }

    /// Whether the hit pushes the target
    pub fn causes_knockback(&self) -> bool {
        self.knockback > 0.0
    }
}

impl Default for DamageInfo {
    fn default() -> Self {
        Self::new(0, DamageKind::Bullet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_info_builder() {
        let damage = DamageInfo::new(50, DamageKind::Explosive)
            .with_source(7)
            .with_hit_point([1.0, 0.0, 2.0])
            .with_knockback(5.0);

        assert_eq!(damage.amount, 50);
        assert_eq!(damage.source, Some(7));
        assert!(damage.causes_knockback());
        assert!(!DamageInfo::bullet(10).causes_knockback());
    }

    #[test]
    fn test_negative_knockback_is_ignored() {
        assert_eq!(DamageInfo::bullet(1).with_knockback(-3.0).knockback, 0.0);
    }
}
