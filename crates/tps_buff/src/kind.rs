//! Buff kinds and tuning

use serde::{Deserialize, Serialize};
use tps_combat::AmmoKind;

/// Pickup kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuffKind {
    Speed,
    BulletDamage,
    GrenadeDamage,
    MaxHealth,
    Ammo,
    ReloadSpeed,
    InfinityBullet,
    InfinityGrenade,
    HealthRegen,
    InstantHeal,
    KillAllEnemies,
}

impl BuffKind {
    /// Every kind in declaration order
    pub const ALL: [BuffKind; 11] = [
        Self::Speed,
        Self::BulletDamage,
        Self::GrenadeDamage,
        Self::MaxHealth,
        Self::Ammo,
        Self::ReloadSpeed,
        Self::InfinityBullet,
        Self::InfinityGrenade,
        Self::HealthRegen,
        Self::InstantHeal,
        Self::KillAllEnemies,
    ];

    /// Ammo type made infinite by a timed buff
    pub fn infinite_ammo(self) -> Option<AmmoKind> {
        match self {
            Self::InfinityBullet => Some(AmmoKind::Bullet),
            Self::InfinityGrenade => Some(AmmoKind::Grenade),
            _ => None,
        }
    }

    /// Whether the buff runs out
    pub fn is_timed(self) -> bool {
        self.infinite_ammo().is_some()
    }
}

/// How strong a buff is
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Magnitude {
    /// Multiply the current value by `1 + p / 100`
    Percent(f32),
    /// Flat whole points
    Amount(i32),
    /// Per-second rate
    Rate(f32),
    /// No magnitude (kill all)
    None,
}

/// One dispatched buff. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuffDescriptor {
    pub kind: BuffKind,
    pub magnitude: Magnitude,
    /// Seconds until expiry for timed buffs
    pub duration: Option<f32>,
}

/// Buff tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuffTable {
    /// Movement speed, percent
    pub speed_percent: f32,
    /// Bullet damage, percent
    pub bullet_damage_percent: f32,
    /// Grenade damage, percent
    pub grenade_damage_percent: f32,
    /// Max health, percent
    pub max_health_percent: f32,
    /// Reserve rounds added
    pub ammo: i32,
    /// Reload animation speed, percent
    pub reload_speed_percent: f32,
    /// Infinite bullets, seconds
    pub infinite_bullet_secs: f32,
    /// Infinite grenades, seconds
    pub infinite_grenade_secs: f32,
    /// Health regeneration added, points per second
    pub regen_per_second: f32,
    /// Instant heal, points
    pub instant_heal: i32,
}

impl Default for BuffTable {
    fn default() -> Self {
        Self {
            speed_percent: 5.0,
            bullet_damage_percent: 10.0,
            grenade_damage_percent: 10.0,
            max_health_percent: 20.0,
            ammo: 100,
            reload_speed_percent: 10.0,
            infinite_bullet_secs: 10.0,
            infinite_grenade_secs: 10.0,
            regen_per_second: 1.0,
            instant_heal: 50,
        }
    }
}

impl BuffTable {
    /// Descriptor for a pickup of `kind`
    pub fn descriptor(&self, kind: BuffKind) -> BuffDescriptor {
        let (magnitude, duration) = match kind {
            BuffKind::Speed => (Magnitude::Percent(self.speed_percent), None),
            BuffKind::BulletDamage => (Magnitude::Percent(self.bullet_damage_percent), None),
            BuffKind::GrenadeDamage => (Magnitude::Percent(self.grenade_damage_percent), None),
            BuffKind::MaxHealth => (Magnitude::Percent(self.max_health_percent), None),
            BuffKind::Ammo => (Magnitude::Amount(self.ammo), None),
            BuffKind::ReloadSpeed => (Magnitude::Percent(self.reload_speed_percent), None),
            BuffKind::InfinityBullet => (Magnitude::None, Some(self.infinite_bullet_secs)),
            BuffKind::InfinityGrenade => (Magnitude::None, Some(self.infinite_grenade_secs)),
            BuffKind::HealthRegen => (Magnitude::Rate(self.regen_per_second), None),
            BuffKind::InstantHeal => (Magnitude::Amount(self.instant_heal), None),
            BuffKind::KillAllEnemies => (Magnitude::None, None),
        };
        BuffDescriptor {
            kind,
            magnitude,
            duration,
        }
    }
}
