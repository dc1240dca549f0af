//! State trait and collision surface

use std::fmt::Debug;
use std::hash::Hash;

/// Key identifying a state within one machine
pub trait StateKey: Copy + Eq + Hash + Debug + Send + 'static {}

// Blanket implementation
impl<T: Copy + Eq + Hash + Debug + Send + 'static> StateKey for T {}

/// Collision contact delivered by the physics collaborator
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Contact {
    /// Entity id of the other collider
    pub other: u64,
    /// Collision layer / tag of the other collider
    pub layer: u32,
    /// World-space contact point
    pub point: [f32; 3],
    /// Contact normal pointing away from the other collider
    pub normal: [f32; 3],
}

impl Contact {
    /// Create a contact with another entity on a layer
    pub fn new(other: u64, layer: u32) -> Self {
        Self {
            other,
            layer,
            ..Default::default()
        }
    }

    /// Set the contact point
    pub fn with_point(mut self, point: [f32; 3]) -> Self {
        self.point = point;
        self
    }
}

/// Collision callback phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionPhase {
    Enter,
    Stay,
    Exit,
}

/// Outcome of an optional hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookResult {
    /// The state reacted to the callback
    Handled,
    /// The state has no behaviour for this callback
    NotSupported,
}

/// A behaviour unit of a state machine.
///
/// Every hook except [`State::key`] and [`State::next_state`] defaults to a
/// no-op, so states only override what they need.
pub trait State<K: StateKey, C>: Send {
    /// Key of this state. Must not change after construction.
    fn key(&self) -> K;

    /// Keys this state may return from [`State::next_state`]. Checked when
    /// the machine is built so a typo fails at init, not mid-game.
    fn transitions(&self) -> Vec<K> {
        Vec::new()
    }

    /// Called when the state becomes current
    fn enter(&mut self, _ctx: &mut C) {}

    /// Called when the state stops being current. Clear per-state flags here.
    fn exit(&mut self, _ctx: &mut C) {}

    /// Per-frame update (not called on the tick that transitions away)
    fn update(&mut self, _ctx: &mut C, _dt: f32) {}

    /// Fixed-timestep physics update
    fn fixed_update(&mut self, _ctx: &mut C, _dt: f32) {}

    /// Post-animation update
    fn late_update(&mut self, _ctx: &mut C, _dt: f32) {}

    /// Key of the state that should be current; its own key to stay
    fn next_state(&self, ctx: &C) -> K;

    fn on_collision_enter(&mut self, _ctx: &mut C, _contact: &Contact) -> HookResult {
        HookResult::NotSupported
    }

    fn on_collision_stay(&mut self, _ctx: &mut C, _contact: &Contact) -> HookResult {
        HookResult::NotSupported
    }

    fn on_collision_exit(&mut self, _ctx: &mut C, _contact: &Contact) -> HookResult {
        HookResult::NotSupported
    }
}
