//! Combat events published on the gameplay bus

use crate::weapon::ShootingMethod;

/// A target took damage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Damaged {
    /// Target entity id
    pub target: u64,
    pub current: i32,
    pub max: i32,
}

/// The player's health changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthChanged {
    pub current: i32,
    pub max: i32,
}

/// The player's health entered (`true`) or left (`false`) the danger band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthDanger(pub bool);

/// An enemy died; `score` is what killing it is worth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyDied {
    pub score: u32,
}

/// Magazine or reserve changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmmoChanged {
    /// Rounds in the magazine
    pub current: i32,
    /// Rounds in reserve
    pub remaining: i32,
}

/// The selected shooting method changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShootingModeChanged {
    /// `ShootingMethod::index()` of the new method
    pub index: usize,
}

/// A shot was requested without enough ammo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfAmmo {
    pub method: ShootingMethod,
}
