//! Headless match simulator
//!
//! Drives a session at 60 Hz with a scripted player that aims at the
//! nearest enemy and holds the trigger, standing in for the host engine's
//! animator by reporting the key frames it would.
//!
//! Run with: cargo run -p tps_runtime --bin tps-sim [seconds]

use tps_ai::EnemyAnimEvent;
use tps_combat::{EnemyDied, HealthChanged};
use tps_math::Vec3;
use tps_player::{InputFrame, PlayerAnimEvent, PlayerStateKey};
use tps_runtime::prelude::*;

const DT: f32 = 1.0 / 60.0;
const FIRE_INTERVAL: f32 = 0.1;
const RELOAD_TIME: f32 = 1.2;
const DEFAULT_SECONDS: f32 = 120.0;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let seconds = match std::env::args().nth(1) {
        Some(arg) => match arg.parse::<f32>() {
            Ok(s) if s > 0.0 => s,
            _ => {
                log::warn!("Ignoring duration {:?}, using {}s", arg, DEFAULT_SECONDS);
                DEFAULT_SECONDS
            }
        },
        None => DEFAULT_SECONDS,
    };

    let config = SessionConfig::load();
    config.print_summary();

    if let Err(e) = run(config, seconds) {
        log::error!("Simulation failed: {}", e);
        std::process::exit(1);
    }
}

/// Scripted animator timings
#[derive(Default)]
struct Animator {
    fire: f32,
    reload: f32,
}

fn run(config: SessionConfig, seconds: f32) -> Result<()> {
    let mut session = Session::new(config, Box::new(FlatWorld::default()))?;
    session.bus().subscribe(|e: &HealthChanged| log::debug!("Player health {}/{}", e.current, e.max));
    session.bus().subscribe(|e: &EnemyDied| log::debug!("Kill worth {}", e.score));
    session.publish_hud();

    let mut animator = Animator::default();
    let mut time = 0.0;
    let mut collected = 0;

    while time < seconds && !session.is_over() {
        let (origin, state, empty) = session.with_player(|p| {
            (p.aim_origin(), p.state(), p.weapon().current() == 0 && p.weapon().remaining() > 0)
        });

        let mut frame = InputFrame::default();
        if let Some((_, target)) = session.nearest_enemy(origin) {
            let aim = (target + Vec3::new(0.0, 1.0, 0.0) - origin).normalize_or_zero();
            frame = frame.with_camera(aim).with_aim(true).with_shoot(!empty);
        }
        if empty && state == PlayerStateKey::Aim {
            frame = frame.with_reload();
        }
        session.apply_input(&frame);
        session.fixed_update(DT);
        let report = session.update(DT)?;
        collected += report.collected.len();

        // Animator key frames
        match session.with_player(|p| p.state()) {
            PlayerStateKey::Aim => {
                animator.fire += DT;
                if animator.fire >= FIRE_INTERVAL {
                    animator.fire = 0.0;
                    session.player_animation_event(PlayerAnimEvent::ShootFire);
                }
            }
            PlayerStateKey::Reload => {
                animator.reload += DT;
                if animator.reload >= RELOAD_TIME {
                    animator.reload = 0.0;
                    session.player_animation_event(PlayerAnimEvent::ReloadComplete);
                }
            }
            _ => animator = Animator::default(),
        }
        for attacker in report.attackers {
            session.enemy_animation_event(attacker, EnemyAnimEvent::AttackHit);
        }
        for dying in session.dying_enemies() {
            session.enemy_animation_event(dying, EnemyAnimEvent::DeathHalf);
        }

        session.late_update(DT);
        session.drain_player_animations();
        session.drain_enemy_animations();
        time += DT;
    }

    let score = session.score();
    let health = session.with_player(|p| p.health().current());
    log::info!("Simulation finished after {:.1}s", time);
    log::info!(
        "  Outcome: {}",
        match session.outcome() {
            Some(true) => "survived",
            Some(false) => "died",
            None => "still fighting",
        }
    );
    log::info!("  Score {} from {} kills, {} pickups collected", score.score(), score.kills(), collected);
    log::info!("  Health {}, {} enemies on the field", health, session.with_enemies(|e| e.alive_count()));
    Ok(())
}
