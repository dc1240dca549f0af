//! Enemy roster
//!
//! Owns one pool per archetype, the spawn selector and the shared enemy
//! damage stat. Damage routing, splash, kill-all and the drop roll live here
//! because they need the whole roster (and the session RNG).

use std::sync::Arc;

use rand::Rng;
use tps_combat::{DamageInfo, DamageOutcome, Stat};
use tps_math::Vec3;
use tps_pool::{PoolRegistry, PoolStats, PooledRef, WeightedSelector};

use crate::controller::{EnemyAnim, EnemyAnimEvent};
use crate::enemy::{Enemy, EnemyArchetype};
use crate::navigation::{DirectNavigation, Navigation};

/// Reference to a pooled enemy
pub type EnemyRef = PooledRef<Enemy>;

/// A killing blow
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyKilled {
    pub enemy: EnemyRef,
    pub archetype: String,
    pub score: u32,
    pub position: Vec3,
    /// Where a pickup should spawn, when the drop roll succeeded
    pub drop: Option<Vec3>,
}

/// Outcome of one hit on one enemy
#[derive(Debug, Clone, PartialEq)]
pub struct DamageReport {
    pub enemy: EnemyRef,
    pub outcome: DamageOutcome,
    pub current: i32,
    pub max: i32,
    pub killed: Option<EnemyKilled>,
}

/// Pooled enemies by archetype id
pub struct EnemyManager {
    registry: PoolRegistry<String, Enemy>,
    selector: WeightedSelector<String>,
    damage: Stat,
    drop_chance: f32,
}

impl EnemyManager {
    /// Empty roster. `base_damage` is what one enemy attack deals before
    /// difficulty increases; `drop_chance` is the pickup probability per kill.
    pub fn new(base_damage: f32, drop_chance: f32) -> Self {
        Self {
            registry: PoolRegistry::new(),
            selector: WeightedSelector::new(),
            damage: Stat::new(base_damage),
            drop_chance: drop_chance.clamp(0.0, 1.0),
        }
    }

    /// Register an archetype driven by straight-line navigation
    pub fn register(&mut self, archetype: EnemyArchetype) -> tps_pool::error::Result<()> {
        self.register_with_navigation(archetype, |archetype| {
            Box::new(DirectNavigation::new(archetype.move_speed)) as Box<dyn Navigation>
        })
    }

    /// Register an archetype with a custom navigation agent per instance
    pub fn register_with_navigation<F>(&mut self, archetype: EnemyArchetype, navigation: F) -> tps_pool::error::Result<()>
    where
        F: Fn(&EnemyArchetype) -> Box<dyn Navigation> + Send + 'static,
    {
        let id = archetype.id.clone();
        let ratio = archetype.spawn_ratio;
        let config = archetype.pool;
        let archetype = Arc::new(archetype);

        self.registry.register(id.clone(), config, move || {
            Enemy::new(archetype.clone(), navigation(archetype.as_ref()))
        })?;
        self.selector.push(id.clone(), ratio);
        log::debug!("Enemy archetype '{}' registered (ratio {})", id, ratio);
        Ok(())
    }

    /// Spawn a specific archetype. Unknown ids warn and return `None`.
    pub fn spawn(&mut self, id: &str, position: Vec3) -> Option<EnemyRef> {
        let r = self.registry.get(&id.to_string())?;
        self.place(r, position);
        Some(r)
    }

    /// Spawn an archetype picked by spawn ratio
    pub fn spawn_random<R: Rng + ?Sized>(&mut self, position: Vec3, rng: &mut R) -> Option<EnemyRef> {
        let r = self.registry.spawn_weighted(&self.selector, rng)?;
        self.place(r, position);
        Some(r)
    }

    fn place(&mut self, r: EnemyRef, position: Vec3) {
        let damage = self.damage.value();
        if let Some(enemy) = self.registry.get_mut(r) {
            enemy.spawn_at(position, damage);
            log::debug!("Spawned {} at ({:.1}, {:.1})", enemy.id(), position.x, position.z);
        }
    }

    /// Advance every enemy toward `target`, then release the ones whose fade
    /// finished. Returns the enemies that started an attack.
    pub fn update(&mut self, target: Vec3, now: f32, dt: f32) -> Vec<EnemyRef> {
        let mut attackers = Vec::new();
        let mut finished = Vec::new();
        for (r, enemy) in self.registry.iter_active_mut() {
            if enemy.update(target, now, dt) {
                attackers.push(r);
            }
            if enemy.controller().is_finished() {
                finished.push(r);
            }
        }

        for r in finished {
            if let Err(e) = self.registry.release(r) {
                log::warn!("Failed to release faded enemy {:?}: {}", r, e);
            }
        }
        attackers
    }

    /// Route a hit to one enemy
    pub fn damage<R: Rng + ?Sized>(&mut self, r: EnemyRef, damage: &DamageInfo, rng: &mut R) -> Option<DamageReport> {
        let drop_chance = self.drop_chance;
        let enemy = self.registry.get_mut(r)?;
        let outcome = enemy.take_damage(damage);
        Some(Self::report(r, enemy, outcome, drop_chance, rng))
    }

    fn report<R: Rng + ?Sized>(
        r: EnemyRef,
        enemy: &Enemy,
        outcome: DamageOutcome,
        drop_chance: f32,
        rng: &mut R,
    ) -> DamageReport {
        let killed = outcome.is_killed().then(|| {
            let position = enemy.position();
            let drop = (rng.gen::<f32>() < drop_chance)
                .then(|| position + Vec3::new(0.0, enemy.archetype().drop_height, 0.0));
            log::debug!("{} died (score {}, drop {})", enemy.id(), enemy.archetype().score, drop.is_some());
            EnemyKilled {
                enemy: r,
                archetype: enemy.id().to_string(),
                score: enemy.archetype().score,
                position,
                drop,
            }
        });
        DamageReport {
            enemy: r,
            outcome,
            current: enemy.health().current(),
            max: enemy.health().max(),
            killed,
        }
    }

    /// Damage every living enemy within `radius` of `center`. The hit point
    /// is the blast center so knockback points away from it.
    pub fn splash<R: Rng + ?Sized>(
        &mut self,
        center: Vec3,
        radius: f32,
        damage: &DamageInfo,
        rng: &mut R,
    ) -> Vec<DamageReport> {
        let targets: Vec<EnemyRef> = self
            .registry
            .iter_active()
            .filter(|(_, enemy)| enemy.is_alive() && enemy.position().distance(center) <= radius)
            .map(|(r, _)| r)
            .collect();

        let hit = damage.clone().with_hit_point(center.to_array());
        targets
            .into_iter()
            .filter_map(|r| self.damage(r, &hit, rng))
            .collect()
    }

    /// Kill every living enemy
    pub fn kill_all<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<EnemyKilled> {
        let drop_chance = self.drop_chance;
        let mut killed = Vec::new();
        for (r, enemy) in self.registry.iter_active_mut() {
            if !enemy.is_alive() {
                continue;
            }
            let outcome = enemy.kill();
            if let Some(k) = Self::report(r, enemy, outcome, drop_chance, rng).killed {
                killed.push(k);
            }
        }
        log::debug!("Kill-all took out {} enemies", killed.len());
        killed
    }

    /// Forward an animation key frame. `AttackHit` is honoured only when the
    /// enemy is alive and `target` is still within its attack range.
    pub fn on_animation_event(&mut self, r: EnemyRef, event: EnemyAnimEvent, target: Vec3) -> bool {
        let Some(enemy) = self.registry.get_mut(r) else {
            log::warn!("Animation event {:?} for inactive enemy {:?}", event, r);
            return false;
        };
        if event == EnemyAnimEvent::AttackHit {
            let in_range = enemy.position().distance(target) <= enemy.controller().tuning().attack_range;
            return in_range && enemy.on_animation_event(event);
        }
        enemy.on_animation_event(event)
    }

    /// Raise enemy damage by `percent` (compounding). Enemies spawned from
    /// now on hit harder.
    pub fn increase_damage(&mut self, percent: f32) -> f32 {
        let value = self.damage.apply_percent(percent);
        log::debug!("Enemy damage now {:.2}", value);
        value
    }

    /// Current enemy damage
    pub fn damage_stat(&self) -> Stat {
        self.damage
    }

    /// Return an enemy to its pool immediately
    pub fn despawn(&mut self, r: EnemyRef) -> bool {
        match self.registry.release(r) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Despawn of {:?} rejected: {}", r, e);
                false
            }
        }
    }

    pub fn get(&self, r: EnemyRef) -> Option<&Enemy> {
        self.registry.get_ref(r)
    }

    pub fn get_mut(&mut self, r: EnemyRef) -> Option<&mut Enemy> {
        self.registry.get_mut(r)
    }

    /// Active enemies, dying ones included
    pub fn active_refs(&self) -> Vec<EnemyRef> {
        self.registry.active_refs()
    }

    pub fn active_count(&self) -> usize {
        self.registry.active_count()
    }

    pub fn alive_count(&self) -> usize {
        self.registry.iter_active().filter(|(_, enemy)| enemy.is_alive()).count()
    }

    /// Closest living enemy within `range` of `origin` along `direction`
    /// (hitscan against a bounding radius)
    pub fn raycast(&self, origin: Vec3, direction: Vec3, range: f32, radius: f32) -> Option<(EnemyRef, Vec3)> {
        let direction = direction.normalize_or_zero();
        if direction.is_zero() {
            return None;
        }
        self.registry
            .iter_active()
            .filter(|(_, enemy)| enemy.is_alive() && enemy.controller().collider_enabled())
            .filter_map(|(r, enemy)| {
                let to_enemy = enemy.position() - origin;
                let along = to_enemy.dot(direction);
                if along < 0.0 || along > range {
                    return None;
                }
                let closest = origin + direction * along;
                (closest.distance(enemy.position()) <= radius).then_some((r, along, closest))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(r, _, point)| (r, point))
    }

    pub fn stats(&self, id: &str) -> Option<PoolStats> {
        self.registry.stats(&id.to_string())
    }

    pub fn archetypes(&self) -> impl Iterator<Item = &String> {
        self.registry.templates()
    }

    /// Animator instructions queued by every active enemy
    pub fn drain_animations(&mut self) -> Vec<(EnemyRef, EnemyAnim)> {
        let mut out = Vec::new();
        for (r, enemy) in self.registry.iter_active_mut() {
            out.extend(enemy.drain_animations().into_iter().map(|a| (r, a)));
        }
        out
    }

    /// Release everything and restore base damage (session restart)
    pub fn reset(&mut self) {
        self.registry.reset();
        self.damage.reset();
        log::info!("Enemy roster reset");
    }
}
