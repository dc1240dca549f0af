//! Finite State Machine driven once per frame

use std::collections::HashMap;

use crate::error::{FsmError, Result};
use crate::state::{CollisionPhase, Contact, HookResult, State, StateKey};

/// Escape hatch checked from every state, in registration order, before
/// the state's own policy
struct GlobalTransition<K, C> {
    to: K,
    condition: Box<dyn Fn(&C) -> bool + Send + Sync>,
}

/// What a tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick<K> {
    /// Stayed in the state and ran its update
    Updated(K),
    /// Switched states (exit then enter, no update)
    Transitioned { from: K, to: K },
}

/// Collects states and validates them into a [`StateMachine`]
pub struct StateMachineBuilder<K: StateKey, C> {
    initial: K,
    states: Vec<Box<dyn State<K, C>>>,
    global_transitions: Vec<GlobalTransition<K, C>>,
}

impl<K: StateKey, C> StateMachineBuilder<K, C> {
    /// Start a builder with the initial state key
    pub fn new(initial: K) -> Self {
        Self {
            initial,
            states: Vec::new(),
            global_transitions: Vec::new(),
        }
    }

    /// Register a state
    pub fn with_state(mut self, state: impl State<K, C> + 'static) -> Self {
        self.states.push(Box::new(state));
        self
    }

    /// Add a global transition (can occur from any state). Earlier
    /// registrations win when several fire on the same tick.
    pub fn with_global_transition<F>(mut self, to: K, condition: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        self.global_transitions.push(GlobalTransition {
            to,
            condition: Box::new(condition),
        });
        self
    }

    /// Validate the state table and build the machine. The initial state is
    /// entered on the first [`StateMachine::tick`] or an explicit
    /// [`StateMachine::start`].
    pub fn build(self, context: C) -> Result<StateMachine<K, C>> {
        let mut states: HashMap<K, Box<dyn State<K, C>>> = HashMap::with_capacity(self.states.len());
        for state in self.states {
            let key = state.key();
            if states.insert(key, state).is_some() {
                return Err(FsmError::DuplicateState(format!("{:?}", key)));
            }
        }

        if !states.contains_key(&self.initial) {
            return Err(FsmError::MissingInitialState(format!("{:?}", self.initial)));
        }

        for (key, state) in &states {
            for target in state.transitions() {
                if !states.contains_key(&target) {
                    return Err(FsmError::UnregisteredTarget {
                        from: format!("{:?}", key),
                        to: format!("{:?}", target),
                    });
                }
            }
        }

        for transition in &self.global_transitions {
            if !states.contains_key(&transition.to) {
                return Err(FsmError::UnregisteredTarget {
                    from: "<global>".to_string(),
                    to: format!("{:?}", transition.to),
                });
            }
        }

        Ok(StateMachine {
            states,
            current: self.initial,
            previous: None,
            global_transitions: self.global_transitions,
            transitioning: false,
            started: false,
            context,
            transition_count: 0,
        })
    }
}

/// Finite State Machine owning its states and their shared context
pub struct StateMachine<K: StateKey, C> {
    /// Every state, created at init and kept for the machine's lifetime
    states: HashMap<K, Box<dyn State<K, C>>>,
    /// Current state
    current: K,
    /// Previous state
    previous: Option<K>,
    /// Global transitions (checked from any state)
    global_transitions: Vec<GlobalTransition<K, C>>,
    /// Whether currently transitioning
    transitioning: bool,
    /// Whether the initial state has been entered
    started: bool,
    /// Context shared by all states
    context: C,
    /// Completed transitions
    transition_count: u64,
}

impl<K: StateKey, C> StateMachine<K, C> {
    /// Enter the initial state. Subsequent calls do nothing.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.transitioning = true;
        let key = self.current;
        let Self { states, context, .. } = self;
        if let Some(state) = states.get_mut(&key) {
            state.enter(context);
        }
        self.transitioning = false;
        log::debug!("State machine started in {:?}", self.current);
    }

    /// Run one frame: evaluate global transitions, then the current state's
    /// policy. Staying runs `update`; otherwise exit, swap and enter.
    pub fn tick(&mut self, dt: f32) -> Result<Tick<K>> {
        self.start();

        let from = self.current;
        if self.transitioning {
            return Ok(Tick::Updated(from));
        }

        let next = match self
            .global_transitions
            .iter()
            .find(|t| t.to != from && (t.condition)(&self.context))
        {
            Some(transition) => transition.to,
            None => self.current_state()?.next_state(&self.context),
        };

        if next == from {
            let Self { states, context, .. } = self;
            if let Some(state) = states.get_mut(&from) {
                state.update(context, dt);
            }
            return Ok(Tick::Updated(from));
        }

        self.transition_to(next)?;
        Ok(Tick::Transitioned { from, to: next })
    }

    /// Switch states immediately, bypassing transition policies
    pub fn force_transition(&mut self, to: K) -> Result<()> {
        self.start();
        self.transition_to(to)
    }

    fn current_state(&self) -> Result<&dyn State<K, C>> {
        self.states
            .get(&self.current)
            .map(|state| state.as_ref())
            .ok_or_else(|| FsmError::UnknownState(format!("{:?}", self.current)))
    }

    fn transition_to(&mut self, to: K) -> Result<()> {
        if !self.states.contains_key(&to) {
            log::error!("Transition {:?} -> {:?} rejected: state not registered", self.current, to);
            return Err(FsmError::UnknownState(format!("{:?}", to)));
        }
        if self.transitioning {
            return Err(FsmError::ReentrantTransition {
                from: format!("{:?}", self.current),
                to: format!("{:?}", to),
            });
        }

        self.transitioning = true;
        let from = self.current;
        {
            let Self { states, context, .. } = self;
            if let Some(state) = states.get_mut(&from) {
                state.exit(context);
            }
            if let Some(state) = states.get_mut(&to) {
                state.enter(context);
            }
        }
        self.previous = Some(from);
        self.current = to;
        self.transitioning = false;
        self.transition_count += 1;

        log::debug!("State transition {:?} -> {:?}", from, to);
        Ok(())
    }

    /// Forward the fixed-timestep update to the current state
    pub fn fixed_update(&mut self, dt: f32) {
        let key = self.current;
        let Self { states, context, .. } = self;
        if let Some(state) = states.get_mut(&key) {
            state.fixed_update(context, dt);
        }
    }

    /// Forward the post-animation update to the current state
    pub fn late_update(&mut self, dt: f32) {
        let key = self.current;
        let Self { states, context, .. } = self;
        if let Some(state) = states.get_mut(&key) {
            state.late_update(context, dt);
        }
    }

    /// Forward a collision callback to the current state
    pub fn collision(&mut self, phase: CollisionPhase, contact: &Contact) -> HookResult {
        let key = self.current;
        let Self { states, context, .. } = self;
        let Some(state) = states.get_mut(&key) else {
            return HookResult::NotSupported;
        };
        let result = match phase {
            CollisionPhase::Enter => state.on_collision_enter(context, contact),
            CollisionPhase::Stay => state.on_collision_stay(context, contact),
            CollisionPhase::Exit => state.on_collision_exit(context, contact),
        };
        if result == HookResult::NotSupported {
            log::trace!("{:?} ignores collision {:?} with {}", key, phase, contact.other);
        }
        result
    }

    /// Get current state
    pub fn current(&self) -> K {
        self.current
    }

    /// Get previous state
    pub fn previous(&self) -> Option<K> {
        self.previous
    }

    /// Check if in a specific state
    pub fn is_in(&self, state: K) -> bool {
        self.current == state
    }

    /// Whether a transition is in progress
    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    /// Whether the initial state has been entered
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Number of completed transitions
    pub fn transition_count(&self) -> u64 {
        self.transition_count
    }

    /// Number of registered states
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Shared context
    pub fn context(&self) -> &C {
        &self.context
    }

    /// Shared context, mutably (input and collaborators write here)
    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Mode {
        Idle,
        Walk,
        Down,
    }

    #[derive(Default)]
    struct Ctx {
        speed: f32,
        hp: i32,
        log: Vec<String>,
    }

    struct Idle;
    struct Walk;
    struct Down;

    impl State<Mode, Ctx> for Idle {
        fn key(&self) -> Mode {
            Mode::Idle
        }
        fn transitions(&self) -> Vec<Mode> {
            vec![Mode::Walk]
        }
        fn enter(&mut self, ctx: &mut Ctx) {
            ctx.log.push("enter idle".into());
        }
        fn exit(&mut self, ctx: &mut Ctx) {
            ctx.log.push("exit idle".into());
        }
        fn update(&mut self, ctx: &mut Ctx, _dt: f32) {
            ctx.log.push("update idle".into());
        }
        fn next_state(&self, ctx: &Ctx) -> Mode {
            if ctx.speed > 0.0 { Mode::Walk } else { Mode::Idle }
        }
    }

    impl State<Mode, Ctx> for Walk {
        fn key(&self) -> Mode {
            Mode::Walk
        }
        fn enter(&mut self, ctx: &mut Ctx) {
            ctx.log.push("enter walk".into());
        }
        fn update(&mut self, ctx: &mut Ctx, _dt: f32) {
            ctx.log.push("update walk".into());
        }
        fn fixed_update(&mut self, ctx: &mut Ctx, _dt: f32) {
            ctx.log.push("fixed walk".into());
        }
        fn on_collision_enter(&mut self, ctx: &mut Ctx, contact: &Contact) -> HookResult {
            ctx.log.push(format!("bump {}", contact.other));
            HookResult::Handled
        }
        fn next_state(&self, ctx: &Ctx) -> Mode {
            if ctx.speed > 0.0 { Mode::Walk } else { Mode::Idle }
        }
    }

    impl State<Mode, Ctx> for Down {
        fn key(&self) -> Mode {
            Mode::Down
        }
        fn next_state(&self, _ctx: &Ctx) -> Mode {
            Mode::Down
        }
    }

    fn machine() -> StateMachine<Mode, Ctx> {
        StateMachineBuilder::new(Mode::Idle)
            .with_state(Idle)
            .with_state(Walk)
            .with_state(Down)
            .with_global_transition(Mode::Down, |ctx: &Ctx| ctx.hp <= 0)
            .build(Ctx { hp: 10, ..Default::default() })
            .unwrap()
    }

    #[test]
    fn test_single_transition_without_update() {
        let mut fsm = machine();
        fsm.tick(0.016).unwrap();
        assert_eq!(fsm.context().log, vec!["enter idle", "update idle"]);

        fsm.context_mut().log.clear();
        fsm.context_mut().speed = 1.0;
        let tick = fsm.tick(0.016).unwrap();

        assert_eq!(tick, Tick::Transitioned { from: Mode::Idle, to: Mode::Walk });
        assert_eq!(fsm.context().log, vec!["exit idle", "enter walk"]);
        assert_eq!(fsm.previous(), Some(Mode::Idle));
        assert_eq!(fsm.transition_count(), 1);

        fsm.context_mut().log.clear();
        assert_eq!(fsm.tick(0.016).unwrap(), Tick::Updated(Mode::Walk));
        assert_eq!(fsm.context().log, vec!["update walk"]);
    }

    #[test]
    fn test_global_transition_wins_and_is_terminal() {
        let mut fsm = machine();
        fsm.context_mut().speed = 1.0;
        fsm.context_mut().hp = 0;
        fsm.tick(0.016).unwrap();
        assert!(fsm.is_in(Mode::Down));

        fsm.context_mut().hp = 10;
        for _ in 0..5 {
            assert_eq!(fsm.tick(0.016).unwrap(), Tick::Updated(Mode::Down));
        }
    }

    #[test]
    fn test_first_registered_global_transition_wins() {
        let mut fsm = StateMachineBuilder::new(Mode::Idle)
            .with_state(Idle)
            .with_state(Walk)
            .with_state(Down)
            .with_global_transition(Mode::Walk, |ctx: &Ctx| ctx.hp < 5)
            .with_global_transition(Mode::Down, |ctx: &Ctx| ctx.hp <= 0)
            .build(Ctx { hp: 10, ..Default::default() })
            .unwrap();

        fsm.context_mut().hp = 0;
        assert_eq!(fsm.tick(0.016).unwrap(), Tick::Transitioned { from: Mode::Idle, to: Mode::Walk });
        // A global transition never re-enters the state it targets
        assert_eq!(fsm.tick(0.016).unwrap(), Tick::Transitioned { from: Mode::Walk, to: Mode::Down });
    }

    #[test]
    fn test_callbacks_forward_to_current_state() {
        let mut fsm = machine();
        fsm.start();
        let contact = Contact::new(42, 1);

        assert_eq!(fsm.collision(CollisionPhase::Enter, &contact), HookResult::NotSupported);

        fsm.force_transition(Mode::Walk).unwrap();
        fsm.fixed_update(0.02);
        assert_eq!(fsm.collision(CollisionPhase::Enter, &contact), HookResult::Handled);
        assert_eq!(fsm.collision(CollisionPhase::Exit, &contact), HookResult::NotSupported);
        assert!(fsm.context().log.ends_with(&["fixed walk".to_string(), "bump 42".to_string()]));
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut fsm = machine();
        fsm.start();
        fsm.start();
        assert_eq!(fsm.context().log, vec!["enter idle"]);
        assert!(fsm.is_started());
        assert!(!fsm.is_transitioning());
    }

    #[test]
    fn test_build_rejects_missing_initial() {
        let err = StateMachineBuilder::<Mode, Ctx>::new(Mode::Down)
            .with_state(Walk)
            .build(Ctx::default())
            .err();
        assert_eq!(err, Some(FsmError::MissingInitialState("Down".into())));
    }

    #[test]
    fn test_build_rejects_duplicates_and_dangling_targets() {
        let dup = StateMachineBuilder::new(Mode::Walk)
            .with_state(Walk)
            .with_state(Walk)
            .build(Ctx::default())
            .err();
        assert_eq!(dup, Some(FsmError::DuplicateState("Walk".into())));

        // Idle declares Walk, which is missing
        let dangling = StateMachineBuilder::new(Mode::Idle)
            .with_state(Idle)
            .build(Ctx::default())
            .err();
        assert!(matches!(dangling, Some(FsmError::UnregisteredTarget { .. })));
    }

    #[test]
    fn test_force_transition_to_unknown_state_keeps_current() {
        let mut fsm = StateMachineBuilder::new(Mode::Walk)
            .with_state(Walk)
            .build(Ctx::default())
            .unwrap();
        assert!(fsm.force_transition(Mode::Down).is_err());
        assert!(fsm.is_in(Mode::Walk));
        assert_eq!(fsm.state_count(), 1);
    }
}
