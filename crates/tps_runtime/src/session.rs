//! Gameplay session
//!
//! Owns the bus, the buff coordinator, the match clock, the spawner and
//! the shared gameplay components, and exposes the per-frame surface the
//! engine drives: input, the three tick phases, collisions and animation
//! key frames.
//!
//! # Frame order
//!
//! `update` runs clock, buff timers, player, spawner, enemies, effects and
//! pickups in that order. `fixed_update` moves the player against the
//! level; `late_update` finishes the frame.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tps_ai::{DamageReport, DeathPhase, EnemyAnim, EnemyAnimEvent, EnemyManager, EnemyRef, EnemyState};
use tps_buff::{BuffConsumed, BuffCoordinator, BuffKind};
use tps_combat::{DamageInfo, DamageKind, Damaged, HealthChanged, ShootingModeChanged, ShotKind};
use tps_event::{EventBus, SubscriberId};
use tps_fsm::{CollisionPhase, Contact, HookResult};
use tps_math::Vec3;
use tps_player::{AnimCommand, InputFrame, PlayerAnimEvent};

use crate::clock::GameClock;
use crate::config::SessionConfig;
use crate::error::Result;
use crate::events::GameOver;
use crate::particles::{effects, EffectPools};
use crate::pickups::{PickupField, PickupRef};
use crate::player::{Notice, Player, Reaction};
use crate::score::ScoreBoard;
use crate::services::WorldServices;
use crate::spawner::EnemySpawner;
use crate::wiring::{wire, World};

/// What one `update` produced that the engine may need to act on
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Enemies that started an attack; the hit lands on their `AttackHit`
    pub attackers: Vec<EnemyRef>,
    /// Enemies placed by the spawner this frame
    pub spawned: Vec<EnemyRef>,
    /// Pickups the player walked into
    pub collected: Vec<BuffKind>,
}

/// One match
pub struct Session {
    config: SessionConfig,
    bus: Arc<EventBus>,
    buffs: BuffCoordinator,
    world: World,
    services: Box<dyn WorldServices>,
    clock: GameClock,
    spawner: EnemySpawner,
    subscriptions: Vec<SubscriberId>,
    now: f64,
    outcome: Option<bool>,
    run: u32,
}

impl Session {
    /// Validate the config and build every component. Configuration
    /// errors are returned here and nowhere else.
    pub fn new(config: SessionConfig, services: Box<dyn WorldServices>) -> Result<Self> {
        config.validate()?;

        let bus = Arc::new(EventBus::new());
        let world = build_world(&config)?;
        let buffs = BuffCoordinator::attach(bus.clone(), config.buffs.clone());
        let subscriptions = wire(&bus, &world);

        let mut spawner = EnemySpawner::new(config.spawner);
        spawner.start();

        log::info!(
            "Session started: {} enemy archetypes, {} min match, seed {}",
            config.enemies.len(),
            config.match_minutes,
            config.seed
        );
        Ok(Self {
            clock: GameClock::new(config.match_minutes, config.difficulty_percent),
            config,
            bus,
            buffs,
            world,
            services,
            spawner,
            subscriptions,
            now: 0.0,
            outcome: None,
            run: 1,
        })
    }

    /// Publish the current ammo, health and shooting method so freshly
    /// subscribed HUD elements start in sync
    pub fn publish_hud(&self) {
        let (ammo, health, mode) = {
            let player = self.world.player.lock();
            (
                player.weapon().ammo(),
                HealthChanged {
                    current: player.health().current(),
                    max: player.health().max(),
                },
                ShootingModeChanged {
                    index: player.machine().context().shooting_method.index(),
                },
            )
        };
        self.bus.publish(ammo);
        self.bus.publish(health);
        self.bus.publish(mode);
    }

    /// Feed one frame of player intents
    pub fn apply_input(&mut self, frame: &InputFrame) {
        if self.is_over() {
            return;
        }
        let notices = {
            let mut player = self.world.player.lock();
            player.apply_input(frame);
            player.take_notices()
        };
        self.flush(notices);
    }

    /// Frame update
    pub fn update(&mut self, dt: f32) -> Result<TickReport> {
        let mut report = TickReport::default();
        if self.is_over() {
            return Ok(report);
        }
        self.now += f64::from(dt);

        let clock = self.clock.tick(dt);
        if let Some(second) = clock.second {
            self.bus.publish(second);
        }
        for minute in clock.minutes {
            log::info!("Minute {}: enemies +{}% damage", minute.minute, minute.percent);
            self.bus.publish(minute);
        }
        if clock.time_up {
            self.bus.publish(GameOver { won: true });
            self.end(true);
            return Ok(report);
        }

        self.buffs.tick(self.now);

        let (notices, position, camera) = {
            let mut player = self.world.player.lock();
            player.tick(dt)?;
            (player.take_notices(), player.position(), player.camera_view())
        };
        self.flush(notices);
        if self.is_over() {
            return Ok(report);
        }

        if self.spawner.tick(dt) {
            let points = {
                let mut rng = self.world.rng.lock();
                self.spawner
                    .plan_wave(position, &camera, self.services.as_ref(), &mut *rng)
            };
            let mut enemies = self.world.enemies.lock();
            let mut rng = self.world.rng.lock();
            report.spawned = points
                .into_iter()
                .filter_map(|point| enemies.spawn_random(point, &mut *rng))
                .collect();
            log::debug!("Wave {}: {} enemies", self.spawner.waves(), report.spawned.len());
        }

        report.attackers = self.world.enemies.lock().update(position, self.now as f32, dt);
        self.world.effects.lock().tick(dt);

        let touching = self.world.pickups.lock().touching(position, self.config.pickup_radius);
        report.collected = touching.into_iter().filter_map(|r| self.consume_pickup(r)).collect();

        Ok(report)
    }

    /// Physics step for the player
    pub fn fixed_update(&mut self, dt: f32) {
        if self.is_over() {
            return;
        }
        self.world.player.lock().fixed_update(dt, self.services.as_ref());
    }

    pub fn late_update(&mut self, dt: f32) {
        self.world.player.lock().late_update(dt);
    }

    /// Forward a collision on the player's body to its current state
    pub fn player_collision(&mut self, phase: CollisionPhase, contact: &Contact) -> HookResult {
        self.world.player.lock().collision(phase, contact)
    }

    /// Player animation key frame. Muzzle frames fire the weapon and
    /// resolve the shot against enemies and level geometry.
    pub fn player_animation_event(&mut self, event: PlayerAnimEvent) -> Reaction {
        let (reaction, notices, origin, direction) = {
            let mut player = self.world.player.lock();
            let reaction = player.on_animation_event(event);
            (reaction, player.take_notices(), player.aim_origin(), player.aim_direction())
        };
        self.flush(notices);

        if let Reaction::Shot(shot) = reaction {
            self.resolve_shot(shot, origin, direction);
        }
        reaction
    }

    fn resolve_shot(&mut self, shot: ShotKind, origin: Vec3, direction: Vec3) {
        let range = self.config.shot_range;
        let wall = self.services.raycast(origin, direction, range);
        let enemy = self
            .world
            .enemies
            .lock()
            .raycast(origin, direction, range, self.config.hit_radius)
            .filter(|(_, point)| wall.map_or(true, |w| origin.distance(w) >= origin.distance(*point)));

        match shot {
            ShotKind::Bullet { damage } => match enemy {
                Some((r, point)) => {
                    let info = DamageInfo::bullet(damage).with_hit_point(point.to_array());
                    let report = {
                        let mut enemies = self.world.enemies.lock();
                        let mut rng = self.world.rng.lock();
                        enemies.damage(r, &info, &mut *rng)
                    };
                    self.world.effects.lock().spawn(effects::BLOOD_IMPACT, point);
                    self.announce_damage(report.into_iter().collect());
                }
                None => {
                    if let Some(point) = wall {
                        self.world.effects.lock().spawn(effects::BULLET_IMPACT, point);
                    }
                }
            },
            ShotKind::Grenade {
                damage,
                radius,
                knockback,
            } => {
                let center = enemy
                    .map(|(_, point)| point)
                    .or(wall)
                    .unwrap_or(origin + direction.normalize_or_zero() * range);
                let info = DamageInfo::new(damage, DamageKind::Explosive).with_knockback(knockback);
                let reports = {
                    let mut enemies = self.world.enemies.lock();
                    let mut rng = self.world.rng.lock();
                    enemies.splash(center, radius, &info, &mut *rng)
                };
                self.world.effects.lock().spawn(effects::SMALL_EXPLOSION, center);
                log::debug!("Grenade at ({:.1}, {:.1}) hit {} enemies", center.x, center.z, reports.len());
                self.announce_damage(reports);
            }
        }
    }

    fn announce_damage(&self, reports: Vec<DamageReport>) {
        for report in reports {
            if report.outcome.is_applied() {
                self.bus.publish(Damaged {
                    target: report.enemy.to_bits(),
                    current: report.current,
                    max: report.max,
                });
            }
            if let Some(killed) = report.killed {
                self.world.announce_kills(&self.bus, vec![killed]);
            }
        }
    }

    /// Enemy animation key frame. A landed `AttackHit` damages the player.
    pub fn enemy_animation_event(&mut self, r: EnemyRef, event: EnemyAnimEvent) -> bool {
        if event == EnemyAnimEvent::AttackHit && self.is_over() {
            return false;
        }
        let target = self.world.player.lock().position();
        let (honoured, damage) = {
            let mut enemies = self.world.enemies.lock();
            let honoured = enemies.on_animation_event(r, event, target);
            (honoured, enemies.get(r).map(|enemy| enemy.attack_damage()))
        };

        if honoured && event == EnemyAnimEvent::AttackHit {
            if let Some(damage) = damage {
                let notices = {
                    let mut player = self.world.player.lock();
                    player.take_damage(damage.round() as i32);
                    player.take_notices()
                };
                self.flush(notices);
            }
        }
        honoured
    }

    /// Collect a pickup and hand its buff to the coordinator
    pub fn consume_pickup(&mut self, r: PickupRef) -> Option<BuffKind> {
        let (kind, position) = self.world.pickups.lock().consume(r)?;
        self.world.effects.lock().spawn(effects::BUFF_PICKUP, position);
        log::debug!("Collected {:?}", kind);
        self.bus.publish(BuffConsumed { kind });
        Some(kind)
    }

    /// Start over: release every pooled entity, cancel buff timers, drop
    /// all bus subscriptions (external ones included) and rewire
    pub fn restart(&mut self) -> Result<()> {
        self.bus.clear();
        self.buffs.reset();

        self.world.enemies.lock().reset();
        self.world.pickups.lock().reset();
        self.world.effects.lock().reset();
        self.world.score.lock().reset();
        {
            let mut player = self.world.player.lock();
            player.reset()?;
            player.set_position(Vec3::from_array(self.config.spawn_point));
        }
        *self.world.rng.lock() = StdRng::seed_from_u64(self.config.seed);

        self.buffs = BuffCoordinator::attach(self.bus.clone(), self.config.buffs.clone());
        self.subscriptions = wire(&self.bus, &self.world);

        self.clock.reset();
        self.spawner.reset();
        self.spawner.start();
        self.now = 0.0;
        self.outcome = None;
        self.run += 1;
        log::info!("Session restarted (run {})", self.run);
        Ok(())
    }

    fn flush(&mut self, notices: Vec<Notice>) {
        for notice in notices {
            notice.publish(&self.bus);
            if notice == Notice::Died {
                self.end(false);
            }
        }
    }

    fn end(&mut self, won: bool) {
        if self.outcome.is_some() {
            return;
        }
        self.outcome = Some(won);
        self.clock.stop();
        self.spawner.stop();
        let score = self.world.score.lock().score();
        log::info!(
            "Game over ({}) at {:.1}s, score {}",
            if won { "won" } else { "lost" },
            self.now,
            score
        );
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn buffs(&self) -> &BuffCoordinator {
        &self.buffs
    }

    /// Shared components (for engine glue and tests)
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Read the player under its lock
    pub fn with_player<R>(&self, f: impl FnOnce(&Player) -> R) -> R {
        f(&self.world.player.lock())
    }

    /// Read the enemy roster under its lock
    pub fn with_enemies<R>(&self, f: impl FnOnce(&EnemyManager) -> R) -> R {
        f(&self.world.enemies.lock())
    }

    pub fn player_position(&self) -> Vec3 {
        self.world.player.lock().position()
    }

    /// Enemies playing their death animation
    pub fn dying_enemies(&self) -> Vec<EnemyRef> {
        let enemies = self.world.enemies.lock();
        enemies
            .active_refs()
            .into_iter()
            .filter(|&r| {
                enemies
                    .get(r)
                    .is_some_and(|e| e.state() == EnemyState::Dead(DeathPhase::Dying))
            })
            .collect()
    }

    /// Closest living enemy to `position`
    pub fn nearest_enemy(&self, position: Vec3) -> Option<(EnemyRef, Vec3)> {
        let enemies = self.world.enemies.lock();
        enemies
            .active_refs()
            .into_iter()
            .filter_map(|r| enemies.get(r).filter(|e| e.is_alive()).map(|e| (r, e.position())))
            .min_by(|a, b| a.1.distance(position).total_cmp(&b.1.distance(position)))
    }

    pub fn pickups(&self) -> &Arc<Mutex<PickupField>> {
        &self.world.pickups
    }

    pub fn effects(&self) -> &Arc<Mutex<EffectPools>> {
        &self.world.effects
    }

    pub fn score(&self) -> ScoreBoard {
        *self.world.score.lock()
    }

    /// Animator commands the player queued since the last drain
    pub fn drain_player_animations(&mut self) -> Vec<AnimCommand> {
        self.world.player.lock().machine_mut().drain_animations()
    }

    /// Animator commands every enemy queued since the last drain
    pub fn drain_enemy_animations(&mut self) -> Vec<(EnemyRef, EnemyAnim)> {
        self.world.enemies.lock().drain_animations()
    }

    /// Seconds of match time
    pub fn elapsed(&self) -> f64 {
        self.clock.elapsed()
    }

    /// `Some(won)` once the match has ended
    pub fn outcome(&self) -> Option<bool> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// 1 for the first match, incremented by every restart
    pub fn run(&self) -> u32 {
        self.run
    }

    /// Wave spawner (start/stop, interval and wave size)
    pub fn spawner_mut(&mut self) -> &mut EnemySpawner {
        &mut self.spawner
    }

    /// Subscriptions the session made for its own components
    pub fn subscriptions(&self) -> &[SubscriberId] {
        &self.subscriptions
    }
}

fn build_world(config: &SessionConfig) -> Result<World> {
    let mut player = Player::new(config.player.clone(), config.weapon.clone())?;
    player.set_position(Vec3::from_array(config.spawn_point));

    let mut enemies = EnemyManager::new(config.enemy_damage, config.drop_chance);
    for archetype in &config.enemies {
        enemies.register(archetype.clone())?;
    }

    Ok(World {
        player: Arc::new(Mutex::new(player)),
        enemies: Arc::new(Mutex::new(enemies)),
        pickups: Arc::new(Mutex::new(PickupField::from_table(&config.pickups)?)),
        effects: Arc::new(Mutex::new(EffectPools::from_table(&config.effects)?)),
        score: Arc::new(Mutex::new(ScoreBoard::new())),
        rng: Arc::new(Mutex::new(StdRng::seed_from_u64(config.seed))),
    })
}
