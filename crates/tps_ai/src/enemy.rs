//! Pooled enemy instances and their archetypes

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tps_combat::{DamageInfo, DamageOutcome, Damageable};
use tps_math::{flatten, Quat, Vec3};
use tps_pool::{PoolConfig, Pooled};

use crate::controller::{ControllerTuning, EnemyAnim, EnemyAnimEvent, EnemyController, EnemyState};
use crate::navigation::Navigation;

/// Template for one kind of enemy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyArchetype {
    /// Template id (pool key)
    pub id: String,
    pub max_health: i32,
    /// Navigation speed
    pub move_speed: f32,
    /// Score awarded on death
    pub score: u32,
    /// Relative spawn weight
    pub spawn_ratio: u32,
    /// Reacts to grenade knockback
    pub knockback: bool,
    /// Seconds a knockback lasts
    pub knockback_duration: f32,
    /// Pickups drop this far above the body
    pub drop_height: f32,
    pub tuning: ControllerTuning,
    pub pool: PoolConfig,
}

impl EnemyArchetype {
    /// Archetype with default stats
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_health(mut self, max_health: i32) -> Self {
        self.max_health = max_health;
        self
    }

    pub fn with_speed(mut self, move_speed: f32) -> Self {
        self.move_speed = move_speed;
        self
    }

    pub fn with_score(mut self, score: u32) -> Self {
        self.score = score;
        self
    }

    pub fn with_spawn_ratio(mut self, ratio: u32) -> Self {
        self.spawn_ratio = ratio;
        self
    }

    /// Make the archetype react to splash knockback
    pub fn with_knockback(mut self, duration: f32) -> Self {
        self.knockback = true;
        self.knockback_duration = duration;
        self
    }

    pub fn with_drop_height(mut self, height: f32) -> Self {
        self.drop_height = height;
        self
    }

    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }
}

impl Default for EnemyArchetype {
    fn default() -> Self {
        Self {
            id: "Zombie".to_string(),
            max_health: 100,
            move_speed: 3.5,
            score: 10,
            spawn_ratio: 1,
            knockback: false,
            knockback_duration: 0.3,
            drop_height: 0.0,
            tuning: ControllerTuning::default(),
            pool: PoolConfig::new(5, 20),
        }
    }
}

/// One enemy: health and behaviour around a navigation agent
pub struct Enemy {
    archetype: Arc<EnemyArchetype>,
    health: Damageable,
    controller: EnemyController,
    attack_damage: f32,
}

impl Enemy {
    /// Build an instance of `archetype` (the pool's one-time initializer)
    pub fn new(archetype: Arc<EnemyArchetype>, nav: Box<dyn Navigation>) -> Self {
        Self {
            health: Damageable::new(archetype.max_health),
            controller: EnemyController::new(nav, archetype.tuning),
            attack_damage: 0.0,
            archetype,
        }
    }

    /// Place a freshly acquired enemy and stamp the current attack damage
    pub fn spawn_at(&mut self, position: Vec3, attack_damage: f32) {
        self.controller.warp(position, Quat::IDENTITY);
        self.attack_damage = attack_damage;
    }

    /// Apply a hit. A killing blow starts the death sequence; knockback is
    /// applied to survivors of archetypes that react to it.
    pub fn take_damage(&mut self, damage: &DamageInfo) -> DamageOutcome {
        if !self.controller.is_alive() {
            return DamageOutcome::Ignored;
        }
        let outcome = self.health.apply(damage);
        match outcome {
            DamageOutcome::Killed => {
                self.health.disable();
                self.controller.die();
            }
            DamageOutcome::Damaged { .. } => {
                self.controller.hurt();
                if damage.causes_knockback() && self.archetype.knockback {
                    let from = damage.hit_point.map(Vec3::from_array).unwrap_or(self.position());
                    let direction = flatten(self.position() - from);
                    self.controller
                        .knockback(direction * damage.knockback, self.archetype.knockback_duration);
                }
            }
            DamageOutcome::Ignored => {}
        }
        outcome
    }

    /// Kill outright regardless of remaining health
    pub fn kill(&mut self) -> DamageOutcome {
        let amount = self.health.current();
        self.take_damage(&DamageInfo::new(amount, tps_combat::DamageKind::Explosive))
    }

    pub fn update(&mut self, target: Vec3, now: f32, dt: f32) -> bool {
        self.controller.update(target, now, dt)
    }

    pub fn on_animation_event(&mut self, event: EnemyAnimEvent) -> bool {
        self.controller.on_animation_event(event)
    }

    pub fn archetype(&self) -> &EnemyArchetype {
        &self.archetype
    }

    pub fn id(&self) -> &str {
        &self.archetype.id
    }

    pub fn health(&self) -> &Damageable {
        &self.health
    }

    pub fn controller(&self) -> &EnemyController {
        &self.controller
    }

    pub fn state(&self) -> EnemyState {
        self.controller.state()
    }

    pub fn is_alive(&self) -> bool {
        self.controller.is_alive()
    }

    pub fn position(&self) -> Vec3 {
        self.controller.position()
    }

    /// Damage dealt by one attack
    pub fn attack_damage(&self) -> f32 {
        self.attack_damage
    }

    pub fn drain_animations(&mut self) -> Vec<EnemyAnim> {
        self.controller.drain_animations()
    }
}

impl Pooled for Enemy {
    fn on_acquire(&mut self) {
        self.health.reset();
        self.controller.reset();
        self.attack_damage = 0.0;
    }

    fn on_release(&mut self) {
        self.controller.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::DeathPhase;
    use crate::navigation::DirectNavigation;
    use tps_combat::DamageKind;

    fn enemy(archetype: EnemyArchetype) -> Enemy {
        let mut enemy = Enemy::new(Arc::new(archetype), Box::new(DirectNavigation::new(3.5)));
        enemy.on_acquire();
        enemy.spawn_at(Vec3::ZERO, 10.0);
        enemy
    }

    #[test]
    fn test_lethal_hit_starts_death_once() {
        let mut zombie = enemy(EnemyArchetype::default());
        assert_eq!(zombie.take_damage(&DamageInfo::bullet(120)), DamageOutcome::Killed);
        assert_eq!(zombie.state(), EnemyState::Dead(DeathPhase::Dying));
        assert_eq!(zombie.health().current(), 0);
        assert_eq!(zombie.take_damage(&DamageInfo::bullet(10)), DamageOutcome::Ignored);
    }

    #[test]
    fn test_knockback_only_for_reacting_archetypes() {
        let splash = DamageInfo::new(10, DamageKind::Explosive)
            .with_hit_point([0.0, 0.0, -1.0])
            .with_knockback(5.0);

        let mut zombie = enemy(EnemyArchetype::default());
        zombie.take_damage(&splash);
        assert!(!zombie.controller().is_knocked_back());

        let mut fish = enemy(EnemyArchetype::new("Fish").with_knockback(0.5));
        fish.take_damage(&splash);
        assert!(fish.controller().is_knocked_back());
        fish.update(Vec3::new(0.0, 0.0, -10.0), 0.0, 0.1);
        assert!(fish.position().z > 0.0);
    }

    #[test]
    fn test_reacquire_is_indistinguishable_from_fresh() {
        let mut fresh = Enemy::new(Arc::new(EnemyArchetype::default()), Box::new(DirectNavigation::new(3.5)));
        fresh.on_acquire();

        let mut zombie = enemy(EnemyArchetype::default());
        zombie.spawn_at(Vec3::new(4.0, 0.0, -2.0), 10.0);
        zombie.update(Vec3::new(10.0, 0.0, 10.0), 0.0, 0.5);
        assert_ne!(zombie.position(), fresh.position());
        zombie.kill();
        zombie.on_animation_event(EnemyAnimEvent::DeathHalf);
        zombie.on_release();

        zombie.on_acquire();
        assert!(zombie.is_alive());
        assert!(zombie.health().is_full());
        assert!(zombie.health().is_enabled());
        assert!(zombie.controller().collider_enabled());
        assert_eq!(zombie.controller().alpha(), 1.0);
        assert!(!zombie.controller().navigation().is_stopped());
        assert_eq!(zombie.position(), fresh.position());
        assert_eq!(zombie.controller().rotation(), fresh.controller().rotation());
        assert_eq!(zombie.controller().navigation().velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_archetype_from_partial_json() {
        let archetype: EnemyArchetype =
            serde_json::from_str(r#"{ "id": "Bee", "max_health": 40, "spawn_ratio": 2 }"#).unwrap();
        assert_eq!(archetype.id, "Bee");
        assert_eq!(archetype.score, 10);
        assert_eq!(archetype.tuning.attack_range, 2.0);
    }
}
