use super::{Env, Next, Probe, StateCx, StateDef, StateId, StateLocal, StateRegistry};
use crate::api::config::ConfigError;
use crate::components::combat::{Hit, HitResponse};
use crate::components::entity::Model;
use std::collections::HashMap;
use std::rc::Rc;

/// Runs one entity's states.
///
/// Exactly one state is active at any time. A tick first runs the active
/// state's `update` (`update_active`), then, after physics and hits, picks at
/// most one transition (`evaluate`): a pending forced request if any,
/// otherwise the first transition whose predicate holds, in registration
/// order. A change runs `exit` on the old state, then `enter` on the new one.
#[derive(Debug, Clone)]
pub struct StateMachine {
    registry: Rc<StateRegistry>,
    initial: StateId,
    current: StateId,
    previous: Option<StateId>,
    locals: HashMap<StateId, StateLocal>,
    pending: Option<StateId>,
    transitioning: bool,
}

impl StateMachine {
    /// Validate the registry and enter `initial`.
    pub fn start(
        registry: Rc<StateRegistry>,
        initial: StateId,
        model: &mut Model,
        env: &Env<'_>,
    ) -> Result<Self, ConfigError> {
        registry.validate(initial)?;
        let mut machine = Self {
            registry,
            initial,
            current: initial,
            previous: None,
            locals: HashMap::new(),
            pending: None,
            transitioning: false,
        };
        let registry = Rc::clone(&machine.registry);
        let def = lookup(&registry, initial);
        machine.enter(initial, def, model, env);
        log::trace!("machine started in {initial}");
        Ok(machine)
    }

    pub fn current(&self) -> StateId {
        self.current
    }

    pub fn previous(&self) -> Option<StateId> {
        self.previous
    }

    pub fn initial(&self) -> StateId {
        self.initial
    }

    pub fn pending(&self) -> Option<StateId> {
        self.pending
    }

    pub fn registry(&self) -> &StateRegistry {
        &self.registry
    }

    /// Scratch data of a state that has been entered at least once.
    pub fn local(&self, id: StateId) -> Option<&StateLocal> {
        self.locals.get(&id)
    }

    /// The active state is an end state.
    pub fn is_terminal(&self) -> bool {
        lookup(&self.registry, self.current).is_terminal()
    }

    /// Leave the active state and enter `next` right away.
    /// Returns false when `next` is already active.
    ///
    /// # Panics
    ///
    /// If `next` is not registered, or in debug builds when called while a
    /// change is already under way.
    pub fn set_state(&mut self, next: StateId, model: &mut Model, env: &Env<'_>) -> bool {
        let registry = Rc::clone(&self.registry);
        let to = lookup(&registry, next);
        debug_assert!(
            !self.transitioning,
            "change to {next} requested while already changing state"
        );
        if next == self.current {
            return false;
        }
        self.transitioning = true;
        let from = lookup(&registry, self.current);
        let local = self.locals.entry(self.current).or_default();
        from.run_exit(&mut StateCx::new(model, local, env));
        log::debug!("{} -> {}", self.current, next);
        self.previous = Some(self.current);
        self.current = next;
        self.enter(next, to, model, env);
        self.transitioning = false;
        true
    }

    /// Queue a forced transition, taken by the next `evaluate` ahead of every
    /// predicate. The first request wins until then.
    ///
    /// # Panics
    ///
    /// If `next` is not registered.
    pub fn request(&mut self, next: StateId) -> bool {
        lookup(&self.registry, next);
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(next);
        true
    }

    /// Advance the active state's tick and run its `update` hook.
    pub fn update_active(&mut self, extrp: f32, model: &mut Model, env: &Env<'_>) {
        let registry = Rc::clone(&self.registry);
        let def = lookup(&registry, self.current);
        let local = self.locals.entry(self.current).or_default();
        local.tick.update(extrp);
        def.run_update(&mut StateCx::new(model, local, env), extrp);
    }

    /// Take at most one transition. Returns the entered state, if any.
    pub fn evaluate(&mut self, model: &mut Model, env: &Env<'_>) -> Option<StateId> {
        let next = match self.pending.take() {
            Some(id) => Next::To(id),
            None => self.select(model, env)?,
        };
        let target = match next {
            Next::To(id) => id,
            Next::Previous => self.previous.unwrap_or_else(|| {
                log::warn!("{} goes back with no previous state, using {}", self.current, self.initial);
                self.initial
            }),
        };
        self.set_state(target, model, env).then_some(target)
    }

    /// `update_active` followed by `evaluate`.
    pub fn update(&mut self, extrp: f32, model: &mut Model, env: &Env<'_>) -> Option<StateId> {
        self.update_active(extrp, model, env);
        self.evaluate(model, env)
    }

    /// The active state's own hit reaction, if it overrides the default one.
    pub fn hit(&self, model: &Model, env: &Env<'_>, hit: &Hit) -> Option<HitResponse> {
        let def = lookup(&self.registry, self.current);
        let fallback = StateLocal::default();
        let local = self.locals.get(&self.current).unwrap_or(&fallback);
        def.run_hit(&Probe { model, local, env }, hit)
    }

    fn select(&self, model: &Model, env: &Env<'_>) -> Option<Next> {
        let def = lookup(&self.registry, self.current);
        let fallback = StateLocal::default();
        let local = self.locals.get(&self.current).unwrap_or(&fallback);
        let probe = Probe { model, local, env };
        def.transitions()
            .iter()
            .find(|t| (t.predicate)(&probe))
            .map(|t| t.next)
    }

    fn enter(&mut self, id: StateId, def: &StateDef, model: &mut Model, env: &Env<'_>) {
        let local = self.locals.entry(id).or_default();
        local.tick.restart();
        model.animation = def.animation;
        def.run_enter(&mut StateCx::new(model, local, env));
    }
}

fn lookup(registry: &StateRegistry, id: StateId) -> &StateDef {
    match registry.get(id) {
        Some(def) => def,
        None => panic!("state {id} is not registered"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::SimConfig;
    use crate::api::types::Animation;
    use crate::components::tilemap::TileMap;
    use crate::input::queue::ControlSignals;
    use glam::Vec2;
    use std::cell::RefCell;

    thread_local! {
        static TRACE: RefCell<Vec<&'static str>> = const { RefCell::new(Vec::new()) };
    }

    fn record(event: &'static str) {
        TRACE.with(|t| t.borrow_mut().push(event));
    }

    fn take_trace() -> Vec<&'static str> {
        TRACE.with(|t| std::mem::take(&mut *t.borrow_mut()))
    }

    fn registry() -> Rc<StateRegistry> {
        let idle = StateDef::new(Animation::looping("idle"))
            .on_enter(|_| record("enter idle"))
            .on_exit(|_| record("exit idle"))
            .to(StateId::Walk, |p| p.model.control.is_going_right())
            .to(StateId::Jump, |p| p.model.control.is_going_right() || p.model.control.jump());
        let walk = StateDef::new(Animation::looping("walk"))
            .on_enter(|_| record("enter walk"))
            .on_update(|cx, _| cx.local.flag = true)
            .on_exit(|_| record("exit walk"))
            .back(|p| !p.model.control.is_going_horizontal());
        let jump = StateDef::new(Animation::once("jump", 3.0))
            .on_enter(|cx| {
                record("enter jump");
                cx.model.control.feed(ControlSignals::idle().with_horizontal(1.0));
            })
            .to(StateId::Walk, |p| p.model.control.is_going_right())
            .to(StateId::Idle, |p| p.animation_finished());
        Rc::new(
            StateRegistry::new()
                .with(StateId::Idle, idle)
                .with(StateId::Walk, walk)
                .with(StateId::Jump, jump),
        )
    }

    fn fixture() -> (TileMap, SimConfig, Model) {
        (
            TileMap::new(4, 4, 16.0, 16.0),
            SimConfig::default(),
            Model::new(Vec2::ZERO, Vec2::new(16.0, 32.0)),
        )
    }

    #[test]
    fn start_enters_initial_once() {
        let (map, config, mut model) = fixture();
        let env = Env::new(&map, &config);
        take_trace();
        let machine = StateMachine::start(registry(), StateId::Idle, &mut model, &env).unwrap();
        assert_eq!(machine.current(), StateId::Idle);
        assert_eq!(machine.previous(), None);
        assert_eq!(model.animation.name, "idle");
        assert_eq!(take_trace(), vec!["enter idle"]);
    }

    #[test]
    fn start_rejects_unregistered_initial() {
        let (map, config, mut model) = fixture();
        let env = Env::new(&map, &config);
        let err = StateMachine::start(registry(), StateId::Dead, &mut model, &env).unwrap_err();
        assert!(matches!(err, ConfigError::UnregisteredState(StateId::Dead)));
    }

    #[test]
    fn exit_runs_before_enter() {
        let (map, config, mut model) = fixture();
        let env = Env::new(&map, &config);
        let mut machine = StateMachine::start(registry(), StateId::Idle, &mut model, &env).unwrap();
        take_trace();
        model.control.feed(ControlSignals::idle().with_horizontal(1.0));
        assert_eq!(machine.update(1.0, &mut model, &env), Some(StateId::Walk));
        assert_eq!(take_trace(), vec!["exit idle", "enter walk"]);
        assert_eq!(machine.previous(), Some(StateId::Idle));
    }

    #[test]
    fn first_registered_transition_wins() {
        let (map, config, mut model) = fixture();
        let env = Env::new(&map, &config);
        let mut machine = StateMachine::start(registry(), StateId::Idle, &mut model, &env).unwrap();
        model.control.feed(ControlSignals::idle().with_horizontal(1.0).with_jump(true));
        assert_eq!(machine.evaluate(&mut model, &env), Some(StateId::Walk));
    }

    #[test]
    fn previous_returns_to_caller() {
        let (map, config, mut model) = fixture();
        let env = Env::new(&map, &config);
        let mut machine = StateMachine::start(registry(), StateId::Idle, &mut model, &env).unwrap();
        model.control.feed(ControlSignals::idle().with_horizontal(1.0));
        machine.evaluate(&mut model, &env);
        model.control.feed(ControlSignals::idle());
        assert_eq!(machine.evaluate(&mut model, &env), Some(StateId::Idle));
        assert_eq!(machine.previous(), Some(StateId::Walk));
    }

    #[test]
    fn previous_without_history_falls_back_to_initial() {
        let (map, config, mut model) = fixture();
        let env = Env::new(&map, &config);
        let mut machine = StateMachine::start(registry(), StateId::Walk, &mut model, &env).unwrap();
        // Walk wants to go back; the initial state is already active
        assert_eq!(machine.evaluate(&mut model, &env), None);
        assert_eq!(machine.current(), StateId::Walk);
    }

    #[test]
    fn one_transition_per_evaluate() {
        let (map, config, mut model) = fixture();
        let env = Env::new(&map, &config);
        let mut machine = StateMachine::start(registry(), StateId::Idle, &mut model, &env).unwrap();
        model.control.feed(ControlSignals::idle().with_jump(true));
        // Jump's enter makes its own Walk predicate true, but it waits a tick
        assert_eq!(machine.evaluate(&mut model, &env), Some(StateId::Jump));
        assert_eq!(machine.current(), StateId::Jump);
        assert_eq!(machine.evaluate(&mut model, &env), Some(StateId::Walk));
    }

    #[test]
    fn request_beats_predicates() {
        let (map, config, mut model) = fixture();
        let env = Env::new(&map, &config);
        let mut machine = StateMachine::start(registry(), StateId::Idle, &mut model, &env).unwrap();
        model.control.feed(ControlSignals::idle().with_horizontal(1.0));
        assert!(machine.request(StateId::Jump));
        assert!(!machine.request(StateId::Walk));
        assert_eq!(machine.evaluate(&mut model, &env), Some(StateId::Jump));
        assert_eq!(machine.pending(), None);
    }

    #[test]
    fn local_tick_restarts_on_enter() {
        let (map, config, mut model) = fixture();
        let env = Env::new(&map, &config);
        let mut machine = StateMachine::start(registry(), StateId::Jump, &mut model, &env).unwrap();
        model.control.feed(ControlSignals::idle());
        machine.update_active(1.0, &mut model, &env);
        machine.update_active(1.0, &mut model, &env);
        assert_eq!(machine.evaluate(&mut model, &env), None);
        machine.update_active(1.0, &mut model, &env);
        assert_eq!(machine.local(StateId::Jump).unwrap().tick.ticks(), 3.0);
        assert_eq!(machine.evaluate(&mut model, &env), Some(StateId::Idle));

        machine.set_state(StateId::Jump, &mut model, &env);
        assert_eq!(machine.local(StateId::Jump).unwrap().tick.ticks(), 0.0);
    }

    #[test]
    fn update_hook_writes_local() {
        let (map, config, mut model) = fixture();
        let env = Env::new(&map, &config);
        let mut machine = StateMachine::start(registry(), StateId::Walk, &mut model, &env).unwrap();
        model.control.feed(ControlSignals::idle().with_horizontal(1.0));
        machine.update(1.0, &mut model, &env);
        assert!(machine.local(StateId::Walk).unwrap().flag);
    }

    #[test]
    fn set_state_to_current_is_a_no_op() {
        let (map, config, mut model) = fixture();
        let env = Env::new(&map, &config);
        let mut machine = StateMachine::start(registry(), StateId::Idle, &mut model, &env).unwrap();
        take_trace();
        assert!(!machine.set_state(StateId::Idle, &mut model, &env));
        assert!(take_trace().is_empty());
    }

    #[test]
    #[should_panic(expected = "not registered")]
    fn set_state_unregistered_panics() {
        let (map, config, mut model) = fixture();
        let env = Env::new(&map, &config);
        let mut machine = StateMachine::start(registry(), StateId::Idle, &mut model, &env).unwrap();
        machine.set_state(StateId::Dead, &mut model, &env);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "already changing state")]
    fn nested_change_is_refused() {
        let (map, config, mut model) = fixture();
        let env = Env::new(&map, &config);
        let mut machine = StateMachine::start(registry(), StateId::Idle, &mut model, &env).unwrap();
        machine.transitioning = true;
        machine.set_state(StateId::Walk, &mut model, &env);
    }
}
