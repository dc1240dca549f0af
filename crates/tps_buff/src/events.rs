//! Buff events
//!
//! `BuffConsumed` is the only input. Everything else is published by the
//! coordinator in this order: `BuffApplied`, then the typed event.

use tps_combat::AmmoKind;

use crate::kind::BuffKind;

/// The player picked up a buff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuffConsumed {
    pub kind: BuffKind,
}

/// A buff took effect (HUD banner)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuffApplied {
    pub kind: BuffKind,
}

/// Movement speed +percent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedBuff {
    pub percent: f32,
}

/// Bullet damage +percent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BulletDamageBuff {
    pub percent: f32,
}

/// Grenade damage +percent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrenadeDamageBuff {
    pub percent: f32,
}

/// Max health +percent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxHealthBuff {
    pub percent: f32,
}

/// Reserve ammo +amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmmoBuff {
    pub amount: i32,
}

/// Reload animation speed +percent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReloadSpeedBuff {
    pub percent: f32,
}

/// Infinite ammo for `duration` seconds (restarted on re-pickup)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InfiniteAmmoStarted {
    pub ammo: AmmoKind,
    pub duration: f32,
}

/// Infinite ammo ran out. Published once per active period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfiniteAmmoExpired {
    pub ammo: AmmoKind,
}

/// Health regeneration +per_second
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthRegenBuff {
    pub per_second: f32,
}

/// Heal `amount` points now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstantHealBuff {
    pub amount: i32,
}

/// Kill every living enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KillAllEnemies;
