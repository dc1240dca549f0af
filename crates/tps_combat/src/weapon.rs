//! Weapon ammo economy
//!
//! One rifle with three shooting methods. Automatic and burst fire spend one
//! round per hitscan bullet; single fire launches a grenade that costs
//! `grenade_cost` rounds. Rounds only leave the magazine on the shoot-fire
//! animation callback, so an animation interrupted before its key frame
//! costs nothing.

use serde::{Deserialize, Serialize};

use crate::events::AmmoChanged;
use crate::stat::Stat;

/// Shooting method, cycled by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShootingMethod {
    /// Looping fire while the trigger is held
    #[default]
    Auto,
    /// One burst animation per press
    Burst,
    /// One grenade per press
    Single,
}

impl ShootingMethod {
    /// All methods in cycling order
    pub const ALL: [ShootingMethod; 3] = [Self::Auto, Self::Burst, Self::Single];

    /// Position in cycling order (published to the HUD)
    pub fn index(self) -> usize {
        match self {
            Self::Auto => 0,
            Self::Burst => 1,
            Self::Single => 2,
        }
    }

    /// Next method, wrapping around
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Ammo type this method draws on
    pub fn ammo_kind(self) -> AmmoKind {
        match self {
            Self::Auto | Self::Burst => AmmoKind::Bullet,
            Self::Single => AmmoKind::Grenade,
        }
    }
}

/// Ammo types that can be made infinite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmmoKind {
    Bullet,
    Grenade,
}

/// Grenade splash settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrenadeConfig {
    /// Base damage to every enemy inside the radius
    pub damage: i32,
    /// Splash radius in world units
    pub radius: f32,
    /// Knockback force applied to survivors
    pub knockback: f32,
}

impl Default for GrenadeConfig {
    fn default() -> Self {
        Self {
            damage: 50,
            radius: 5.0,
            knockback: 5.0,
        }
    }
}

/// Weapon tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    /// Magazine size
    pub per_magazine: i32,
    /// Starting reserve
    pub reserve: i32,
    /// Base hitscan damage
    pub bullet_damage: i32,
    /// Rounds spent per grenade
    pub grenade_cost: i32,
    /// Grenade splash
    pub grenade: GrenadeConfig,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            per_magazine: 30,
            reserve: 90,
            bullet_damage: 10,
            grenade_cost: 10,
            grenade: GrenadeConfig::default(),
        }
    }
}

/// A shot that left the weapon
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShotKind {
    /// Hitscan bullet
    Bullet { damage: i32 },
    /// Grenade with splash
    Grenade {
        damage: i32,
        radius: f32,
        knockback: f32,
    },
}

/// Player rifle
#[derive(Debug, Clone, PartialEq)]
pub struct Weapon {
    config: WeaponConfig,
    /// Rounds in the magazine
    current: i32,
    /// Rounds in reserve
    remaining: i32,
    /// Hitscan damage (buffable)
    pub bullet_damage: Stat,
    /// Grenade damage (buffable)
    pub grenade_damage: Stat,
    /// Reload animation speed multiplier (buffable)
    pub reload_speed: Stat,
    infinite_bullets: bool,
    infinite_grenades: bool,
}

impl Weapon {
    /// Full magazine and reserve
    pub fn new(config: WeaponConfig) -> Self {
        Self {
            current: config.per_magazine,
            remaining: config.reserve,
            bullet_damage: Stat::new(config.bullet_damage as f32),
            grenade_damage: Stat::new(config.grenade.damage as f32),
            reload_speed: Stat::new(1.0),
            infinite_bullets: false,
            infinite_grenades: false,
            config,
        }
    }

    /// Tuning
    pub fn config(&self) -> &WeaponConfig {
        &self.config
    }

    /// Whether a press of `method` could fire right now
    pub fn can_fire(&self, method: ShootingMethod) -> bool {
        match method {
            ShootingMethod::Auto | ShootingMethod::Burst => self.infinite_bullets || self.current > 0,
            ShootingMethod::Single => self.infinite_grenades || self.current >= self.config.grenade_cost,
        }
    }

    /// Spend ammo for one shot of `method`. Returns `None` without spending
    /// anything when the magazine cannot pay for it.
    pub fn fire(&mut self, method: ShootingMethod) -> Option<ShotKind> {
        if !self.can_fire(method) {
            log::debug!("{:?} shot skipped: {} rounds loaded", method, self.current);
            return None;
        }
        match method {
            ShootingMethod::Auto | ShootingMethod::Burst => {
                if !self.infinite_bullets {
                    self.current -= 1;
                }
                Some(ShotKind::Bullet {
                    damage: self.bullet_damage.value_i32(),
                })
            }
            ShootingMethod::Single => {
                if !self.infinite_grenades {
                    self.current -= self.config.grenade_cost;
                }
                Some(ShotKind::Grenade {
                    damage: self.grenade_damage.value_i32(),
                    radius: self.config.grenade.radius,
                    knockback: self.config.grenade.knockback,
                })
            }
        }
    }

    /// Whether a reload would move any rounds
    pub fn can_reload(&self) -> bool {
        self.current < self.config.per_magazine && self.remaining > 0
    }

    /// Move rounds from reserve into the magazine. Returns how many moved.
    pub fn complete_reload(&mut self) -> i32 {
        let used = self.config.per_magazine - self.current;
        let moved = self.remaining.min(used).max(0);
        self.current += moved;
        self.remaining -= moved;
        moved
    }

    /// Add rounds to the reserve
    pub fn add_reserve(&mut self, amount: i32) {
        self.remaining += amount.max(0);
    }

    /// Toggle infinite ammo for one ammo type
    pub fn set_infinite(&mut self, kind: AmmoKind, on: bool) {
        match kind {
            AmmoKind::Bullet => self.infinite_bullets = on,
            AmmoKind::Grenade => self.infinite_grenades = on,
        }
    }

    /// Whether an ammo type is currently free
    pub fn is_infinite(&self, kind: AmmoKind) -> bool {
        match kind {
            AmmoKind::Bullet => self.infinite_bullets,
            AmmoKind::Grenade => self.infinite_grenades,
        }
    }

    /// Rounds in the magazine
    pub fn current(&self) -> i32 {
        self.current
    }

    /// Rounds in reserve
    pub fn remaining(&self) -> i32 {
        self.remaining
    }

    /// Snapshot for the HUD
    pub fn ammo(&self) -> AmmoChanged {
        AmmoChanged {
            current: self.current,
            remaining: self.remaining,
        }
    }

    /// Back to the configured loadout with no buffs
    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }
}

impl Default for Weapon {
    fn default() -> Self {
        Self::new(WeaponConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_cycle() {
        assert_eq!(ShootingMethod::Auto.next(), ShootingMethod::Burst);
        assert_eq!(ShootingMethod::Burst.next(), ShootingMethod::Single);
        assert_eq!(ShootingMethod::Single.next(), ShootingMethod::Auto);
        assert_eq!(ShootingMethod::Single.index(), 2);
    }

    #[test]
    fn test_bullets_spend_one_round() {
        let mut weapon = Weapon::default();
        assert_eq!(weapon.fire(ShootingMethod::Auto), Some(ShotKind::Bullet { damage: 10 }));
        weapon.fire(ShootingMethod::Burst);
        assert_eq!(weapon.current(), 28);
    }

    #[test]
    fn test_grenade_needs_full_cost() {
        let mut weapon = Weapon::default();
        for _ in 0..21 {
            weapon.fire(ShootingMethod::Auto);
        }
        assert_eq!(weapon.current(), 9);
        assert!(weapon.fire(ShootingMethod::Single).is_none());
        assert_eq!(weapon.current(), 9);
    }

    #[test]
    fn test_empty_magazine_fires_nothing() {
        let mut weapon = Weapon::default();
        for _ in 0..3 {
            assert!(weapon.fire(ShootingMethod::Single).is_some());
        }
        assert_eq!(weapon.current(), 0);
        assert!(weapon.fire(ShootingMethod::Auto).is_none());
    }

    #[test]
    fn test_reload_moves_min_of_used_and_reserve() {
        let mut weapon = Weapon::new(WeaponConfig {
            reserve: 5,
            ..Default::default()
        });
        for _ in 0..12 {
            weapon.fire(ShootingMethod::Auto);
        }
        assert!(weapon.can_reload());
        assert_eq!(weapon.complete_reload(), 5);
        assert_eq!(weapon.ammo(), AmmoChanged { current: 23, remaining: 0 });
        assert!(!weapon.can_reload());
    }

    #[test]
    fn test_infinite_ammo_skips_consumption() {
        let mut weapon = Weapon::default();
        weapon.set_infinite(AmmoKind::Grenade, true);
        for _ in 0..10 {
            assert!(weapon.fire(ShootingMethod::Single).is_some());
        }
        assert_eq!(weapon.current(), 30);
        weapon.fire(ShootingMethod::Auto);
        assert_eq!(weapon.current(), 29);
    }

    #[test]
    fn test_damage_buffs_reach_shots() {
        let mut weapon = Weapon::default();
        weapon.grenade_damage.apply_percent(10.0);
        weapon.grenade_damage.apply_percent(10.0);
        match weapon.fire(ShootingMethod::Single) {
            Some(ShotKind::Grenade { damage, .. }) => assert_eq!(damage, 61),
            other => panic!("expected grenade, got {:?}", other),
        }
    }
}
