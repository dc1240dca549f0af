//! The player character
//!
//! Binds the player state machine to the rifle, the health pool and the
//! regeneration buff. Everything the HUD must hear about is queued as a
//! [`Notice`]; the owner drains the queue once it no longer holds the
//! player's lock and publishes it.

use tps_combat::{
    AmmoChanged, AmmoKind, DamageOutcome, Damageable, HealthChanged, HealthDanger, OutOfAmmo, Regeneration,
    ShootingMethod, ShootingModeChanged, ShotKind, Weapon, WeaponConfig,
};
use tps_event::EventBus;
use tps_fsm::{CollisionPhase, Contact, FsmError, HookResult, Tick};
use tps_math::{flatten, Vec3};
use tps_player::{names, InputFrame, PlayerAnimEvent, PlayerConfig, PlayerStateKey, PlayerStateMachine};

use crate::events::GameOver;
use crate::services::{CameraView, WorldServices};

/// Eye height used for aiming
const EYE_HEIGHT: f32 = 1.5;
/// Ground probes start this far above the feet
const GROUND_PROBE: f32 = 0.5;
/// Feet this close to the ground count as grounded
const GROUND_SKIN: f32 = 0.01;
/// Third-person camera offset behind and above the player
const CAMERA_BACK: f32 = 3.0;
const CAMERA_UP: f32 = 2.0;

/// Something the player's HUD and audio need to hear about
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Notice {
    Ammo(AmmoChanged),
    Health(HealthChanged),
    Danger(HealthDanger),
    ShootingMode(ShootingModeChanged),
    OutOfAmmo(OutOfAmmo),
    Died,
}

impl Notice {
    /// Publish as the matching bus event. Death ends the match as a loss.
    pub fn publish(self, bus: &EventBus) {
        match self {
            Self::Ammo(e) => bus.publish(e),
            Self::Health(e) => bus.publish(e),
            Self::Danger(e) => bus.publish(e),
            Self::ShootingMode(e) => bus.publish(e),
            Self::OutOfAmmo(e) => bus.publish(e),
            Self::Died => bus.publish(GameOver { won: false }),
        };
    }
}

/// Publish a drained notice queue in order
pub fn publish_notices(bus: &EventBus, notices: Vec<Notice>) {
    for notice in notices {
        notice.publish(bus);
    }
}

/// How the player reacted to an animation key frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reaction {
    /// Not expected by the animation in flight
    Ignored,
    Handled,
    /// A round left the barrel
    Shot(ShotKind),
}

/// Player state machine, weapon and health
pub struct Player {
    config: PlayerConfig,
    machine: PlayerStateMachine,
    weapon: Weapon,
    health: Damageable,
    regen: Regeneration,
    position: Vec3,
    danger: bool,
    trigger_down: bool,
    notices: Vec<Notice>,
}

impl Player {
    pub fn new(config: PlayerConfig, weapon: WeaponConfig) -> Result<Self, FsmError> {
        Ok(Self {
            machine: PlayerStateMachine::new(config.clone())?,
            weapon: Weapon::new(weapon),
            health: Damageable::new(config.max_health),
            regen: Regeneration::default(),
            position: Vec3::ZERO,
            danger: false,
            trigger_down: false,
            notices: Vec::new(),
            config,
        })
    }

    /// Feed one frame of intents. Presses the weapon cannot honour are
    /// filtered out here: an empty trigger reports `OutOfAmmo` once per
    /// press, a reload with nothing to load is dropped.
    pub fn apply_input(&mut self, frame: &InputFrame) {
        if self.machine.is_dead() {
            return;
        }

        let mut frame = *frame;
        let method = self.machine.context().shooting_method;
        let pressed = frame.shoot && frame.aim;
        if pressed && !self.weapon.can_fire(method) {
            if !self.trigger_down {
                self.notices.push(Notice::OutOfAmmo(OutOfAmmo { method }));
            }
            frame.shoot = false;
        }
        self.trigger_down = pressed;

        if frame.reload && !self.weapon.can_reload() {
            frame.reload = false;
        }

        if let Some(method) = self.machine.apply_input(&frame) {
            self.notices.push(Notice::ShootingMode(ShootingModeChanged { index: method.index() }));
        }
    }

    /// Run the state machine and regeneration for one frame
    pub fn tick(&mut self, dt: f32) -> Result<Tick<PlayerStateKey>, FsmError> {
        let tick = self.machine.tick(dt)?;
        if !self.machine.is_dead() {
            let healed = self.regen.tick(dt);
            if healed > 0 {
                self.heal(healed);
            }
        }
        Ok(tick)
    }

    /// Physics step: state hooks, then the motor against the level
    pub fn fixed_update(&mut self, dt: f32, services: &dyn WorldServices) {
        self.machine.fixed_update(dt);

        self.position += self.machine.integrate(dt);
        let probe = self.position + Vec3::new(0.0, GROUND_PROBE, 0.0);
        let grounded = match services.ground_below(probe) {
            Some(ground) if self.position.y <= ground + GROUND_SKIN => {
                self.position.y = ground;
                true
            }
            _ => false,
        };
        self.machine.set_grounded(grounded);
    }

    pub fn late_update(&mut self, dt: f32) {
        self.machine.late_update(dt);
    }

    pub fn collision(&mut self, phase: CollisionPhase, contact: &Contact) -> HookResult {
        self.machine.collision(phase, contact)
    }

    /// Handle an animation key frame. Ammo is only spent here, on the
    /// muzzle frame, and only when the state machine expected it.
    pub fn on_animation_event(&mut self, event: PlayerAnimEvent) -> Reaction {
        if !self.machine.on_animation_event(event) {
            return Reaction::Ignored;
        }

        match event {
            PlayerAnimEvent::ShootFire => {
                let method = self.machine.context().shooting_method;
                match self.weapon.fire(method) {
                    Some(shot) => {
                        self.notices.push(Notice::Ammo(self.weapon.ammo()));
                        if method == ShootingMethod::Auto && !self.weapon.can_fire(method) {
                            self.machine.release_trigger();
                        }
                        Reaction::Shot(shot)
                    }
                    None => {
                        self.notices.push(Notice::OutOfAmmo(OutOfAmmo { method }));
                        self.machine.release_trigger();
                        Reaction::Handled
                    }
                }
            }
            PlayerAnimEvent::ReloadGripSwap => Reaction::Handled,
            PlayerAnimEvent::ReloadComplete => {
                let moved = self.weapon.complete_reload();
                log::debug!("Reloaded {} rounds", moved);
                self.notices.push(Notice::Ammo(self.weapon.ammo()));
                Reaction::Handled
            }
        }
    }

    /// Take a hit. The killing blow halts input and queues `Died`.
    pub fn take_damage(&mut self, amount: i32) -> DamageOutcome {
        let outcome = self.health.take_damage(amount);
        if outcome.is_applied() {
            self.push_health();
        }
        if outcome.is_killed() {
            self.machine.kill();
            self.notices.push(Notice::Died);
            log::info!("Player died");
        }
        outcome
    }

    /// Heal up to max. Returns the amount healed.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let healed = self.health.heal(amount);
        if healed > 0 {
            self.push_health();
        }
        healed
    }

    pub fn scale_max_health(&mut self, percent: f32) -> i32 {
        let max = self.health.scale_max(percent);
        self.push_health();
        max
    }

    pub fn add_regeneration(&mut self, per_second: f32) {
        self.regen.add_rate(per_second);
    }

    pub fn add_ammo(&mut self, amount: i32) {
        self.weapon.add_reserve(amount);
        self.notices.push(Notice::Ammo(self.weapon.ammo()));
    }

    pub fn set_infinite_ammo(&mut self, kind: AmmoKind, on: bool) {
        self.weapon.set_infinite(kind, on);
    }

    pub fn boost_bullet_damage(&mut self, percent: f32) -> f32 {
        self.weapon.bullet_damage.apply_percent(percent)
    }

    pub fn boost_grenade_damage(&mut self, percent: f32) -> f32 {
        self.weapon.grenade_damage.apply_percent(percent)
    }

    /// Speed up the reload animation
    pub fn boost_reload_speed(&mut self, percent: f32) -> f32 {
        let speed = self.weapon.reload_speed.apply_percent(percent);
        self.machine.context_mut().anim.set_float(names::RELOAD_SPEED, speed);
        speed
    }

    pub fn apply_speed_buff(&mut self, percent: f32) {
        self.machine.apply_speed_buff(percent);
    }

    fn push_health(&mut self) {
        self.notices.push(Notice::Health(HealthChanged {
            current: self.health.current(),
            max: self.health.max(),
        }));
        let danger = self.health.fraction() <= self.config.danger_fraction;
        if danger != self.danger {
            self.danger = danger;
            self.notices.push(Notice::Danger(HealthDanger(danger)));
        }
    }

    /// Take everything queued since the last drain
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Where shots start
    pub fn aim_origin(&self) -> Vec3 {
        self.position + Vec3::new(0.0, EYE_HEIGHT, 0.0)
    }

    /// Where shots go
    pub fn aim_direction(&self) -> Vec3 {
        self.machine.context().camera_forward.normalize_or_zero()
    }

    /// Camera pose following the player
    pub fn camera_view(&self) -> CameraView {
        let forward = self.aim_direction();
        let position = self.position + Vec3::new(0.0, CAMERA_UP, 0.0) - flatten(forward) * CAMERA_BACK;
        CameraView::new(position, forward)
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn machine(&self) -> &PlayerStateMachine {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut PlayerStateMachine {
        &mut self.machine
    }

    pub fn weapon(&self) -> &Weapon {
        &self.weapon
    }

    pub fn health(&self) -> &Damageable {
        &self.health
    }

    pub fn regeneration(&self) -> &Regeneration {
        &self.regen
    }

    pub fn state(&self) -> PlayerStateKey {
        self.machine.state()
    }

    pub fn is_dead(&self) -> bool {
        self.machine.is_dead()
    }

    pub fn in_danger(&self) -> bool {
        self.danger
    }

    /// Back to a fresh spawn at the origin
    pub fn reset(&mut self) -> Result<(), FsmError> {
        let weapon = self.weapon.config().clone();
        *self = Self::new(self.config.clone(), weapon)?;
        Ok(())
    }
}
