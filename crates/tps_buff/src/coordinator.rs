//! Buff coordinator
//!
//! Listens for [`BuffConsumed`] and fans each pickup out as
//! [`BuffApplied`] plus one typed event. Infinite-ammo buffs are timed: the
//! coordinator keeps one timer per ammo type, cancels and reschedules it on
//! re-pickup, and publishes [`InfiniteAmmoExpired`] from [`BuffCoordinator::tick`]
//! exactly once per active period.
//!
//! Publishing always happens after the timer lock is released, so handlers
//! may call back into the coordinator.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tps_combat::AmmoKind;
use tps_core::{TimerHandle, TimerQueue};
use tps_event::{EventBus, SubscriberId};

use crate::events::*;
use crate::kind::{BuffDescriptor, BuffKind, BuffTable, Magnitude};

#[derive(Default)]
struct Timed {
    timers: TimerQueue<AmmoKind>,
    active: HashMap<AmmoKind, TimerHandle>,
    /// Time of the last tick; pickups between ticks are stamped with it
    now: f64,
}

/// Republishes consumed pickups as typed buff events
pub struct BuffCoordinator {
    bus: Arc<EventBus>,
    table: BuffTable,
    timed: Arc<Mutex<Timed>>,
    subscription: SubscriberId,
}

impl BuffCoordinator {
    /// Subscribe to `BuffConsumed` on `bus`
    pub fn attach(bus: Arc<EventBus>, table: BuffTable) -> Self {
        let timed = Arc::new(Mutex::new(Timed::default()));

        // Weak: the bus owns the handler, the handler must not own the bus
        let weak: Weak<EventBus> = Arc::downgrade(&bus);
        let handler_table = table.clone();
        let handler_timed = timed.clone();
        let subscription = bus.subscribe(move |event: &BuffConsumed| {
            if let Some(bus) = weak.upgrade() {
                dispatch(&bus, &handler_table, &handler_timed, event.kind);
            }
        });

        log::debug!("Buff coordinator attached");
        Self {
            bus,
            table,
            timed,
            subscription,
        }
    }

    /// Apply a buff directly, as if a pickup of `kind` was consumed
    pub fn apply(&self, kind: BuffKind) -> BuffDescriptor {
        dispatch(&self.bus, &self.table, &self.timed, kind)
    }

    /// Advance to `now` and publish expiries. Returns how many expired.
    pub fn tick(&self, now: f64) -> usize {
        let expired = {
            let mut timed = self.timed.lock();
            timed.now = now;
            let expired = timed.timers.poll(now);
            for ammo in &expired {
                timed.active.remove(ammo);
            }
            expired
        };

        for &ammo in &expired {
            log::debug!("Infinite {:?} expired at {:.2}s", ammo, now);
            self.bus.publish(InfiniteAmmoExpired { ammo });
        }
        expired.len()
    }

    /// Whether infinite ammo of a type is running
    pub fn is_active(&self, ammo: AmmoKind) -> bool {
        self.timed.lock().active.contains_key(&ammo)
    }

    /// Seconds left on an infinite-ammo buff
    pub fn remaining(&self, ammo: AmmoKind) -> Option<f64> {
        let timed = self.timed.lock();
        let handle = *timed.active.get(&ammo)?;
        timed.timers.remaining(handle, timed.now)
    }

    /// Tuning in use
    pub fn table(&self) -> &BuffTable {
        &self.table
    }

    /// Subscription on the bus
    pub fn subscription(&self) -> SubscriberId {
        self.subscription
    }

    /// Cancel every running timer without publishing expiries
    pub fn reset(&self) {
        let mut timed = self.timed.lock();
        timed.timers.clear();
        timed.active.clear();
        timed.now = 0.0;
    }

    /// Stop listening for pickups
    pub fn detach(&self) -> bool {
        self.bus.unsubscribe(self.subscription)
    }
}

fn dispatch(bus: &EventBus, table: &BuffTable, timed: &Mutex<Timed>, kind: BuffKind) -> BuffDescriptor {
    let descriptor = table.descriptor(kind);
    log::debug!("Buff {:?} applied ({:?})", kind, descriptor.magnitude);

    bus.publish(BuffApplied { kind });

    let percent = match descriptor.magnitude {
        Magnitude::Percent(p) => p,
        _ => 0.0,
    };
    match kind {
        BuffKind::Speed => {
            bus.publish(SpeedBuff { percent });
        }
        BuffKind::BulletDamage => {
            bus.publish(BulletDamageBuff { percent });
        }
        BuffKind::GrenadeDamage => {
            bus.publish(GrenadeDamageBuff { percent });
        }
        BuffKind::MaxHealth => {
            bus.publish(MaxHealthBuff { percent });
        }
        BuffKind::ReloadSpeed => {
            bus.publish(ReloadSpeedBuff { percent });
        }
        BuffKind::Ammo => {
            bus.publish(AmmoBuff { amount: table.ammo });
        }
        BuffKind::HealthRegen => {
            bus.publish(HealthRegenBuff {
                per_second: table.regen_per_second,
            });
        }
        BuffKind::InstantHeal => {
            bus.publish(InstantHealBuff {
                amount: table.instant_heal,
            });
        }
        BuffKind::KillAllEnemies => {
            bus.publish(KillAllEnemies);
        }
        BuffKind::InfinityBullet | BuffKind::InfinityGrenade => {
            let ammo = match kind.infinite_ammo() {
                Some(ammo) => ammo,
                None => return descriptor,
            };
            let duration = descriptor.duration.unwrap_or(0.0);
            {
                let mut timed = timed.lock();
                let now = timed.now;
                if let Some(previous) = timed.active.remove(&ammo) {
                    timed.timers.cancel(previous);
                    log::debug!("Infinite {:?} restarted", ammo);
                }
                let handle = timed.timers.schedule(now, duration as f64, ammo);
                timed.active.insert(ammo, handle);
            }
            bus.publish(InfiniteAmmoStarted { ammo, duration });
        }
    }
    descriptor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder<E: Clone + Send + Sync + 'static>(bus: &EventBus) -> Arc<Mutex<Vec<E>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        bus.subscribe(move |e: &E| sink.lock().push(e.clone()));
        seen
    }

    #[test]
    fn test_pickup_publishes_applied_then_typed() {
        let bus = Arc::new(EventBus::new());
        let _buffs = BuffCoordinator::attach(bus.clone(), BuffTable::default());
        let order = Arc::new(Mutex::new(Vec::new()));

        let o = order.clone();
        bus.subscribe(move |e: &BuffApplied| o.lock().push(format!("applied {:?}", e.kind)));
        let o = order.clone();
        bus.subscribe(move |e: &SpeedBuff| o.lock().push(format!("speed {}", e.percent)));

        bus.publish(BuffConsumed { kind: BuffKind::Speed });
        assert_eq!(*order.lock(), vec!["applied Speed", "speed 5"]);
    }

    #[test]
    fn test_every_kind_has_a_typed_event() {
        let bus = Arc::new(EventBus::new());
        let buffs = BuffCoordinator::attach(bus.clone(), BuffTable::default());
        let applied = recorder::<BuffApplied>(&bus);
        let ammo = recorder::<AmmoBuff>(&bus);
        let heal = recorder::<InstantHealBuff>(&bus);
        let kill = recorder::<KillAllEnemies>(&bus);

        for kind in BuffKind::ALL {
            buffs.apply(kind);
        }

        assert_eq!(applied.lock().len(), BuffKind::ALL.len());
        assert_eq!(*ammo.lock(), vec![AmmoBuff { amount: 100 }]);
        assert_eq!(*heal.lock(), vec![InstantHealBuff { amount: 50 }]);
        assert_eq!(kill.lock().len(), 1);
    }

    #[test]
    fn test_repickup_restarts_timer() {
        let bus = Arc::new(EventBus::new());
        let buffs = BuffCoordinator::attach(bus.clone(), BuffTable::default());
        let expired = recorder::<InfiniteAmmoExpired>(&bus);
        let started = recorder::<InfiniteAmmoStarted>(&bus);

        buffs.tick(0.0);
        bus.publish(BuffConsumed { kind: BuffKind::InfinityBullet });
        buffs.tick(5.0);
        bus.publish(BuffConsumed { kind: BuffKind::InfinityBullet });

        assert_eq!(started.lock().len(), 2);
        buffs.tick(10.0);
        assert!(expired.lock().is_empty());
        assert!(buffs.is_active(AmmoKind::Bullet));
        assert_eq!(buffs.remaining(AmmoKind::Bullet), Some(5.0));

        buffs.tick(15.0);
        assert_eq!(*expired.lock(), vec![InfiniteAmmoExpired { ammo: AmmoKind::Bullet }]);

        buffs.tick(30.0);
        assert_eq!(expired.lock().len(), 1);
        assert!(!buffs.is_active(AmmoKind::Bullet));
    }

    #[test]
    fn test_ammo_timers_are_independent() {
        let bus = Arc::new(EventBus::new());
        let buffs = BuffCoordinator::attach(bus.clone(), BuffTable::default());
        let expired = recorder::<InfiniteAmmoExpired>(&bus);

        buffs.tick(0.0);
        buffs.apply(BuffKind::InfinityBullet);
        buffs.tick(4.0);
        buffs.apply(BuffKind::InfinityGrenade);

        assert_eq!(buffs.tick(10.0), 1);
        assert_eq!(buffs.tick(14.0), 1);
        assert_eq!(
            *expired.lock(),
            vec![
                InfiniteAmmoExpired { ammo: AmmoKind::Bullet },
                InfiniteAmmoExpired { ammo: AmmoKind::Grenade },
            ]
        );
    }

    #[test]
    fn test_reset_cancels_without_expiry() {
        let bus = Arc::new(EventBus::new());
        let buffs = BuffCoordinator::attach(bus.clone(), BuffTable::default());
        let expired = recorder::<InfiniteAmmoExpired>(&bus);

        buffs.apply(BuffKind::InfinityGrenade);
        buffs.reset();
        assert_eq!(buffs.tick(100.0), 0);
        assert!(expired.lock().is_empty());
    }

    #[test]
    fn test_detach_stops_listening() {
        let bus = Arc::new(EventBus::new());
        let buffs = BuffCoordinator::attach(bus.clone(), BuffTable::default());
        let applied = recorder::<BuffApplied>(&bus);

        assert!(buffs.detach());
        bus.publish(BuffConsumed { kind: BuffKind::Ammo });
        assert!(applied.lock().is_empty());
    }
}
