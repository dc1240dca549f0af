//! Enemy behaviour controller
//!
//! Active enemies chase the target every tick, turn toward their movement
//! direction and trigger an attack when in range and off cooldown. Death is
//! a short sequence driven by animation callbacks:
//!
//! ```text
//! Active --killed--> Dying --DeathHalf/DeathEnd--> Fading --1.5 s--> Finished
//! ```
//!
//! `Finished` enemies are released by the manager after its update pass, so
//! nothing is returned to the pool while the roster is being iterated.

use serde::{Deserialize, Serialize};
use tps_core::Countdown;
use tps_math::{Quat, Vec3};

use crate::navigation::Navigation;

/// Animator trigger and parameter names
pub mod names {
    pub const ATTACK: &str = "Attack";
    pub const DEATH: &str = "Death";
    pub const HURT: &str = "Hurt";
    pub const MOVEMENT: &str = "Movement";
    pub const SPEED: &str = "Speed";
}

/// Where an enemy is in its death sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeathPhase {
    /// Death animation playing
    Dying,
    /// Fading out
    Fading,
    /// Fully faded, waiting to be released
    Finished,
}

/// Enemy lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyState {
    Active,
    Dead(DeathPhase),
}

/// Animation key frames reported for an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyAnimEvent {
    /// Halfway through the death animation
    DeathHalf,
    /// Death animation finished
    DeathEnd,
    /// The attack swing connects
    AttackHit,
}

/// Animator instruction queued by the controller
#[derive(Debug, Clone, PartialEq)]
pub enum EnemyAnim {
    Trigger(&'static str),
    ResetTrigger(&'static str),
    Play(&'static str),
    SetFloat(&'static str, f32),
    /// Material alpha during the fade
    SetAlpha(f32),
}

/// Behaviour tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerTuning {
    /// Attack when the target is this close
    pub attack_range: f32,
    /// Seconds between attacks
    pub attack_cooldown: f32,
    /// Slerp rate toward the movement direction
    pub rotation_speed: f32,
    /// Seconds to fade out after dying
    pub fade_duration: f32,
    /// Velocities below this (squared) do not turn the body
    pub turn_threshold: f32,
}

impl Default for ControllerTuning {
    fn default() -> Self {
        Self {
            attack_range: 2.0,
            attack_cooldown: 1.5,
            rotation_speed: 8.0,
            fade_duration: 1.5,
            turn_threshold: 0.01,
        }
    }
}

/// Per-enemy behaviour state around a navigation agent
pub struct EnemyController {
    nav: Box<dyn Navigation>,
    tuning: ControllerTuning,
    state: EnemyState,
    rotation: Quat,
    last_attack: f32,
    knockback: Countdown,
    knockback_velocity: Vec3,
    fade: Countdown,
    alpha: f32,
    collider_enabled: bool,
    anim: Vec<EnemyAnim>,
}

impl EnemyController {
    pub fn new(nav: Box<dyn Navigation>, tuning: ControllerTuning) -> Self {
        Self {
            nav,
            tuning,
            state: EnemyState::Active,
            rotation: Quat::IDENTITY,
            last_attack: f32::NEG_INFINITY,
            knockback: Countdown::new(),
            knockback_velocity: Vec3::ZERO,
            fade: Countdown::new(),
            alpha: 1.0,
            collider_enabled: true,
            anim: Vec::new(),
        }
    }

    /// Back to a fresh, chasing enemy (pool acquisition)
    pub fn reset(&mut self) {
        self.state = EnemyState::Active;
        self.rotation = Quat::IDENTITY;
        self.last_attack = f32::NEG_INFINITY;
        self.knockback.cancel();
        self.knockback_velocity = Vec3::ZERO;
        self.fade.cancel();
        self.alpha = 1.0;
        self.collider_enabled = true;
        self.nav.reset();

        self.anim.clear();
        for trigger in [names::DEATH, names::HURT, names::ATTACK] {
            self.anim.push(EnemyAnim::ResetTrigger(trigger));
        }
        self.anim.push(EnemyAnim::Play(names::MOVEMENT));
        self.anim.push(EnemyAnim::SetAlpha(1.0));
    }

    /// Park the enemy (pool release)
    pub fn deactivate(&mut self) {
        self.nav.stop();
        self.knockback.cancel();
        self.fade.cancel();
        self.collider_enabled = false;
    }

    /// Place the enemy without pathing
    pub fn warp(&mut self, position: Vec3, rotation: Quat) {
        self.nav.warp(position);
        self.rotation = rotation;
    }

    /// Advance one tick toward `target`. Returns true when an attack was
    /// triggered this tick.
    pub fn update(&mut self, target: Vec3, now: f32, dt: f32) -> bool {
        match self.state {
            EnemyState::Active => self.update_active(target, now, dt),
            EnemyState::Dead(DeathPhase::Fading) => {
                if self.fade.tick(dt) {
                    self.alpha = 0.0;
                    self.state = EnemyState::Dead(DeathPhase::Finished);
                } else {
                    self.alpha = 1.0 - self.fade.progress();
                }
                self.anim.push(EnemyAnim::SetAlpha(self.alpha));
                false
            }
            EnemyState::Dead(_) => false,
        }
    }

    fn update_active(&mut self, target: Vec3, now: f32, dt: f32) -> bool {
        if self.knockback.is_running() {
            let pushed = self.nav.position() + self.knockback_velocity * dt;
            self.nav.warp(pushed);
            if self.knockback.tick(dt) {
                self.knockback_velocity = Vec3::ZERO;
                self.nav.resume();
            }
            return false;
        }

        self.nav.set_destination(target);
        let position = self.nav.advance(dt);

        let mut attacked = false;
        if position.distance(target) <= self.tuning.attack_range
            && now - self.last_attack >= self.tuning.attack_cooldown
        {
            self.last_attack = now;
            self.anim.push(EnemyAnim::Trigger(names::ATTACK));
            attacked = true;
        }

        let velocity = self.nav.velocity();
        if velocity.length_squared() > self.tuning.turn_threshold {
            let facing = Quat::look_rotation_y(velocity);
            self.rotation = self.rotation.slerp(facing, self.tuning.rotation_speed * dt);
        }
        self.anim.push(EnemyAnim::SetFloat(names::SPEED, velocity.with_y(0.0).length()));

        attacked
    }

    /// Non-lethal hit reaction
    pub fn hurt(&mut self) {
        if self.is_alive() {
            self.anim.push(EnemyAnim::Trigger(names::HURT));
        }
    }

    /// Push the enemy with `velocity` for `duration` seconds, pausing
    /// navigation. Returns false for dead enemies.
    pub fn knockback(&mut self, velocity: Vec3, duration: f32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.nav.stop();
        self.knockback_velocity = velocity.with_y(0.0);
        self.knockback.start(duration);
        true
    }

    /// Enter the death sequence. Returns false when already dead.
    pub fn die(&mut self) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.state = EnemyState::Dead(DeathPhase::Dying);
        self.nav.stop();
        self.knockback.cancel();
        self.knockback_velocity = Vec3::ZERO;
        self.collider_enabled = false;
        self.anim.push(EnemyAnim::Trigger(names::DEATH));
        self.anim.push(EnemyAnim::ResetTrigger(names::HURT));
        true
    }

    /// Death key frames: the first of DeathHalf/DeathEnd starts the fade,
    /// later ones are ignored. AttackHit is accepted only while active.
    pub fn on_animation_event(&mut self, event: EnemyAnimEvent) -> bool {
        match (event, self.state) {
            (EnemyAnimEvent::DeathHalf | EnemyAnimEvent::DeathEnd, EnemyState::Dead(DeathPhase::Dying)) => {
                self.fade.start(self.tuning.fade_duration);
                self.state = EnemyState::Dead(DeathPhase::Fading);
                true
            }
            (EnemyAnimEvent::AttackHit, EnemyState::Active) => true,
            _ => false,
        }
    }

    pub fn state(&self) -> EnemyState {
        self.state
    }

    pub fn is_alive(&self) -> bool {
        self.state == EnemyState::Active
    }

    /// Fully faded and waiting for release
    pub fn is_finished(&self) -> bool {
        self.state == EnemyState::Dead(DeathPhase::Finished)
    }

    pub fn is_knocked_back(&self) -> bool {
        self.knockback.is_running()
    }

    pub fn position(&self) -> Vec3 {
        self.nav.position()
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn collider_enabled(&self) -> bool {
        self.collider_enabled
    }

    pub fn tuning(&self) -> &ControllerTuning {
        &self.tuning
    }

    pub fn navigation(&self) -> &dyn Navigation {
        self.nav.as_ref()
    }

    /// Take queued animator instructions
    pub fn drain_animations(&mut self) -> Vec<EnemyAnim> {
        std::mem::take(&mut self.anim)
    }
}
