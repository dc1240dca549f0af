//! Session integration tests: a whole match driven through the public
//! frame surface, with a flat level and a fixed seed.

use std::sync::Arc;

use parking_lot::Mutex;
use tps_ai::EnemyAnimEvent;
use tps_buff::BuffKind;
use tps_combat::{AmmoChanged, Damaged, EnemyDied, HealthDanger};
use tps_math::Vec3;
use tps_player::{InputFrame, PlayerAnimEvent, PlayerStateKey};
use tps_runtime::prelude::*;

const DT: f32 = 1.0 / 60.0;

/// Session with the wave spawner stopped so tests place enemies themselves
fn quiet_session(config: SessionConfig) -> Session {
    let mut session = Session::new(config.with_seed(42), Box::new(FlatWorld::default())).unwrap();
    session.spawner_mut().stop();
    session
}

fn record<E: Copy + Send + Sync + 'static>(session: &Session) -> Arc<Mutex<Vec<E>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    session.bus().subscribe(move |e: &E| sink.lock().push(*e));
    seen
}

/// Aim at `target` with the trigger pressed and let the player settle into Aim
fn aim_and_press(session: &mut Session, target: Vec3) {
    let origin = session.with_player(|p| p.aim_origin());
    let frame = InputFrame::default()
        .with_camera((target - origin).normalize_or_zero())
        .with_aim(true)
        .with_shoot(true);
    session.apply_input(&frame);
    session.update(DT).unwrap();
    session.update(DT).unwrap();
    assert_eq!(session.with_player(|p| p.state()), PlayerStateKey::Aim);
}

#[test]
fn test_invalid_config_is_rejected() {
    let result = Session::new(
        SessionConfig::default().with_drop_chance(2.0),
        Box::new(FlatWorld::default()),
    );
    assert!(matches!(result, Err(SessionError::InvalidConfig(_))));
}

#[test]
fn test_negative_spawn_cone_is_rejected() {
    let mut config = SessionConfig::default();
    config.spawner.front_half_angle = -30.0;
    let result = Session::new(config, Box::new(FlatWorld::default()));
    assert!(matches!(result, Err(SessionError::InvalidConfig(_))));
}

#[test]
fn test_surviving_the_clock_wins() {
    let mut session = quiet_session(SessionConfig::default().with_match_minutes(1.0 / 60.0));
    let over = record::<GameOver>(&session);
    let seconds = record::<TimeElapsed>(&session);

    for _ in 0..20 {
        session.update(0.25).unwrap();
    }

    assert_eq!(session.outcome(), Some(true));
    assert_eq!(over.lock().as_slice(), &[GameOver { won: true }]);
    assert_eq!(seconds.lock().as_slice(), &[TimeElapsed { minutes: 0, seconds: 1 }]);
    assert_eq!(session.update(0.25).unwrap(), TickReport::default());
}

#[test]
fn test_enemy_attacks_can_kill_the_player() {
    let mut session = quiet_session(SessionConfig::default());
    let over = record::<GameOver>(&session);
    let danger = record::<HealthDanger>(&session);

    let enemy = session
        .world()
        .enemies
        .lock()
        .spawn("Zombie", Vec3::new(1.0, 0.0, 0.0))
        .unwrap();

    for _ in 0..10 {
        assert!(session.enemy_animation_event(enemy, EnemyAnimEvent::AttackHit));
    }

    assert!(session.with_player(|p| p.is_dead()));
    assert_eq!(session.outcome(), Some(false));
    assert_eq!(over.lock().as_slice(), &[GameOver { won: false }]);
    assert!(danger.lock().contains(&HealthDanger(true)));
    assert!(!session.enemy_animation_event(enemy, EnemyAnimEvent::AttackHit));
}

#[test]
fn test_attack_out_of_range_misses() {
    let mut session = quiet_session(SessionConfig::default());
    let enemy = session
        .world()
        .enemies
        .lock()
        .spawn("Zombie", Vec3::new(10.0, 0.0, 0.0))
        .unwrap();

    assert!(!session.enemy_animation_event(enemy, EnemyAnimEvent::AttackHit));
    assert_eq!(session.with_player(|p| p.health().current()), 100);
}

#[test]
fn test_bullet_hits_the_enemy_under_the_crosshair() {
    let mut config = SessionConfig::default();
    config.hit_radius = 1.0;
    let mut session = quiet_session(config);
    let damaged = record::<Damaged>(&session);

    let enemy = session
        .world()
        .enemies
        .lock()
        .spawn("Zombie", Vec3::new(0.0, 0.0, 10.0))
        .unwrap();
    aim_and_press(&mut session, Vec3::new(0.0, 0.5, 10.0));

    let reaction = session.player_animation_event(PlayerAnimEvent::ShootFire);
    assert_eq!(reaction, Reaction::Shot(tps_combat::ShotKind::Bullet { damage: 10 }));

    assert_eq!(
        damaged.lock().as_slice(),
        &[Damaged {
            target: enemy.to_bits(),
            current: 90,
            max: 100
        }]
    );
    assert_eq!(session.effects().lock().stats(effects::BLOOD_IMPACT).map(|s| s.active), Some(1));
}

#[test]
fn test_grenade_splashes_around_the_impact() {
    let mut config = SessionConfig::default();
    config.hit_radius = 1.0;
    let mut session = quiet_session(config);
    let damaged = record::<Damaged>(&session);

    {
        let mut enemies = session.world().enemies.lock();
        enemies.spawn("Zombie", Vec3::new(0.0, 0.0, 10.0)).unwrap();
        enemies.spawn("Zombie", Vec3::new(2.0, 0.0, 10.0)).unwrap();
        enemies.spawn("Zombie", Vec3::new(0.0, 0.0, -10.0)).unwrap();
    }

    // Auto -> Burst -> Single
    session.apply_input(&InputFrame::default().with_method_change());
    session.apply_input(&InputFrame::default().with_method_change());
    aim_and_press(&mut session, Vec3::new(0.0, 0.5, 10.0));

    let reaction = session.player_animation_event(PlayerAnimEvent::ShootFire);
    assert!(matches!(reaction, Reaction::Shot(tps_combat::ShotKind::Grenade { damage: 50, .. })));
    assert_eq!(session.with_player(|p| p.weapon().current()), 20);

    let hits = damaged.lock();
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|d| d.current == 50));
    assert_eq!(session.effects().lock().stats(effects::SMALL_EXPLOSION).map(|s| s.active), Some(1));
}

#[test]
fn test_kills_score_and_drop_pickups() {
    let mut config = SessionConfig::default().with_drop_chance(1.0);
    config.hit_radius = 1.0;
    config.weapon.bullet_damage = 100;
    let mut session = quiet_session(config);
    let deaths = record::<EnemyDied>(&session);

    session
        .world()
        .enemies
        .lock()
        .spawn("Zombie", Vec3::new(0.0, 0.0, 10.0))
        .unwrap();
    aim_and_press(&mut session, Vec3::new(0.0, 0.5, 10.0));
    session.player_animation_event(PlayerAnimEvent::ShootFire);

    assert_eq!(deaths.lock().as_slice(), &[EnemyDied { score: 10 }]);
    assert_eq!(session.score().score(), 10);
    assert_eq!(session.score().kills(), 1);
    assert_eq!(session.pickups().lock().active_count(), 1);
    assert_eq!(session.dying_enemies().len(), 1);
}

#[test]
fn test_walking_into_a_pickup_applies_its_buff() {
    let mut session = quiet_session(SessionConfig::default());
    let ammo = record::<AmmoChanged>(&session);

    session.pickups().lock().spawn(BuffKind::Ammo, Vec3::new(0.5, 0.0, 0.0)).unwrap();
    let report = session.update(DT).unwrap();

    assert_eq!(report.collected, vec![BuffKind::Ammo]);
    assert_eq!(session.with_player(|p| p.weapon().remaining()), 190);
    assert_eq!(ammo.lock().last().map(|a| a.remaining), Some(190));
    assert_eq!(session.pickups().lock().active_count(), 0);
    assert_eq!(session.effects().lock().stats(effects::BUFF_PICKUP).map(|s| s.active), Some(1));
}

#[test]
fn test_first_wave_spawns_on_the_first_update() {
    let mut session = Session::new(SessionConfig::default().with_seed(3), Box::new(FlatWorld::default())).unwrap();

    let report = session.update(DT).unwrap();

    assert_eq!(session.spawner_mut().waves(), 1);
    assert!(report.spawned.len() <= 3);
    assert_eq!(session.with_enemies(|e| e.alive_count()), report.spawned.len());
}

#[test]
fn test_restart_clears_the_match() {
    let mut session = quiet_session(SessionConfig::default());
    let external = record::<EnemyDied>(&session);

    session
        .world()
        .enemies
        .lock()
        .spawn("Zombie", Vec3::new(5.0, 0.0, 0.0))
        .unwrap();
    session.bus().publish(tps_buff::KillAllEnemies);
    assert_eq!(session.score().score(), 10);
    assert_eq!(external.lock().len(), 1);

    session.restart().unwrap();

    assert_eq!(session.run(), 2);
    assert_eq!(session.score(), ScoreBoard::default());
    assert_eq!(session.with_enemies(|e| e.active_count()), 0);
    assert_eq!(session.bus().subscriber_count::<EnemyDied>(), 1);
    assert!(session.outcome().is_none());

    // The session's own handlers are back, external ones are gone
    session.spawner_mut().stop();
    session
        .world()
        .enemies
        .lock()
        .spawn("Zombie", Vec3::new(5.0, 0.0, 0.0))
        .unwrap();
    session.bus().publish(tps_buff::KillAllEnemies);
    assert_eq!(session.score().score(), 10);
    assert_eq!(external.lock().len(), 1);
}

#[test]
fn test_input_after_game_over_is_ignored() {
    let mut session = quiet_session(SessionConfig::default().with_match_minutes(1.0 / 60.0));
    for _ in 0..20 {
        session.update(0.25).unwrap();
    }
    assert!(session.is_over());

    session.apply_input(&InputFrame::default().with_aim(true).with_shoot(true));
    assert!(!session.with_player(|p| p.machine().context().aiming));
}
