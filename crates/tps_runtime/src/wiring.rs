//! Event wiring
//!
//! The gameplay components live behind `Arc<Mutex<_>>` so bus handlers can
//! reach them. Handlers take one lock at a time, mutate, collect whatever
//! must be announced, drop the lock and only then publish. Handlers hold a
//! `Weak` bus reference; the bus owns the handlers, not the other way round.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use rand::rngs::StdRng;
use tps_ai::{EnemyKilled, EnemyManager};
use tps_buff::{
    AmmoBuff, BulletDamageBuff, GrenadeDamageBuff, HealthRegenBuff, InfiniteAmmoExpired, InfiniteAmmoStarted,
    InstantHealBuff, KillAllEnemies, MaxHealthBuff, ReloadSpeedBuff, SpeedBuff,
};
use tps_combat::EnemyDied;
use tps_event::{EventBus, SubscriberId};

use crate::events::MinutePassed;
use crate::particles::EffectPools;
use crate::pickups::PickupField;
use crate::player::{publish_notices, Player};
use crate::score::ScoreBoard;

/// Components shared between the session and its bus handlers. When more
/// than one is locked at once the order is enemies, pickups, effects, rng.
#[derive(Clone)]
pub struct World {
    pub player: Arc<Mutex<Player>>,
    pub enemies: Arc<Mutex<EnemyManager>>,
    pub pickups: Arc<Mutex<PickupField>>,
    pub effects: Arc<Mutex<EffectPools>>,
    pub score: Arc<Mutex<ScoreBoard>>,
    pub rng: Arc<Mutex<StdRng>>,
}

impl World {
    /// Announce kills: `EnemyDied` per kill, then a pickup at each drop point
    pub fn announce_kills(&self, bus: &EventBus, killed: Vec<EnemyKilled>) {
        for kill in killed {
            bus.publish(EnemyDied { score: kill.score });
            if let Some(point) = kill.drop {
                let mut pickups = self.pickups.lock();
                pickups.spawn_random(point, &mut *self.rng.lock());
            }
        }
    }
}

/// Subscribe every consumer of typed buff, clock and kill events. Returns
/// the subscriptions in the order they were made.
pub fn wire(bus: &Arc<EventBus>, world: &World) -> Vec<SubscriberId> {
    let weak: Weak<EventBus> = Arc::downgrade(bus);
    let mut ids = Vec::new();

    let player = world.player.clone();
    ids.push(bus.subscribe(move |e: &SpeedBuff| player.lock().apply_speed_buff(e.percent)));

    let player = world.player.clone();
    ids.push(bus.subscribe(move |e: &BulletDamageBuff| {
        player.lock().boost_bullet_damage(e.percent);
    }));

    let player = world.player.clone();
    ids.push(bus.subscribe(move |e: &GrenadeDamageBuff| {
        player.lock().boost_grenade_damage(e.percent);
    }));

    let player = world.player.clone();
    ids.push(bus.subscribe(move |e: &ReloadSpeedBuff| {
        player.lock().boost_reload_speed(e.percent);
    }));

    let player = world.player.clone();
    ids.push(bus.subscribe(move |e: &InfiniteAmmoStarted| player.lock().set_infinite_ammo(e.ammo, true)));

    let player = world.player.clone();
    ids.push(bus.subscribe(move |e: &InfiniteAmmoExpired| player.lock().set_infinite_ammo(e.ammo, false)));

    let player = world.player.clone();
    ids.push(bus.subscribe(move |e: &HealthRegenBuff| player.lock().add_regeneration(e.per_second)));

    let (player, bus_ref) = (world.player.clone(), weak.clone());
    ids.push(bus.subscribe(move |e: &MaxHealthBuff| {
        let notices = {
            let mut player = player.lock();
            player.scale_max_health(e.percent);
            player.take_notices()
        };
        if let Some(bus) = bus_ref.upgrade() {
            publish_notices(&bus, notices);
        }
    }));

    let (player, bus_ref) = (world.player.clone(), weak.clone());
    ids.push(bus.subscribe(move |e: &AmmoBuff| {
        let notices = {
            let mut player = player.lock();
            player.add_ammo(e.amount);
            player.take_notices()
        };
        if let Some(bus) = bus_ref.upgrade() {
            publish_notices(&bus, notices);
        }
    }));

    let (player, bus_ref) = (world.player.clone(), weak.clone());
    ids.push(bus.subscribe(move |e: &InstantHealBuff| {
        let notices = {
            let mut player = player.lock();
            player.heal(e.amount);
            player.take_notices()
        };
        if let Some(bus) = bus_ref.upgrade() {
            publish_notices(&bus, notices);
        }
    }));

    let (shared, bus_ref) = (world.clone(), weak.clone());
    ids.push(bus.subscribe(move |_: &KillAllEnemies| {
        let killed = {
            let mut enemies = shared.enemies.lock();
            enemies.kill_all(&mut *shared.rng.lock())
        };
        log::info!("Kill-all buff took out {} enemies", killed.len());
        if let Some(bus) = bus_ref.upgrade() {
            shared.announce_kills(&bus, killed);
        }
    }));

    let enemies = world.enemies.clone();
    ids.push(bus.subscribe(move |e: &MinutePassed| {
        enemies.lock().increase_damage(e.percent);
    }));

    let score = world.score.clone();
    ids.push(bus.subscribe(move |e: &EnemyDied| {
        let total = score.lock().add_kill(e.score);
        log::debug!("Score {}", total);
    }));

    log::debug!("Wired {} gameplay handlers", ids.len());
    ids
}
