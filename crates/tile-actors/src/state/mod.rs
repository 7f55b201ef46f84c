//! Per-entity finite state machine: state identifiers, state definitions and
//! the read-only views hooks and predicates receive.
//!
//! A state is data: an animation, optional `enter`/`update`/`exit` hooks, an
//! optional hit override and an ordered list of transitions. Hooks only see
//! the entity's model, the state's local scratch data and the shared
//! environment, never the machine itself, so a hook cannot start a nested
//! transition.

pub mod actor;
pub mod fish;
pub mod guard;
pub mod machine;
pub mod missile;

use crate::api::config::{ConfigError, SimConfig};
use crate::components::combat::{Hit, HitResponse};
use crate::components::entity::Model;
use crate::components::tilemap::TileMap;
use crate::components::water::Water;
use crate::core::time::Tick;
use crate::systems::tracking::Target;
use crate::api::types::{Animation, Facing};
use glam::Vec2;
use std::collections::HashMap;
use std::fmt;

pub use machine::StateMachine;

/// Identifier of a state in a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StateId {
    Idle,
    Walk,
    Jump,
    Fall,
    Land,
    Attack,
    Turn,
    Patrol,
    Hurt,
    Die,
    Dead,
    GuardAttackPrepare,
    GuardAttack,
    GuardSalto,
    FishFall,
    FishJump,
    FishAttack,
    Fly,
    Armed,
}

impl StateId {
    pub fn name(self) -> &'static str {
        match self {
            StateId::Idle => "idle",
            StateId::Walk => "walk",
            StateId::Jump => "jump",
            StateId::Fall => "fall",
            StateId::Land => "land",
            StateId::Attack => "attack",
            StateId::Turn => "turn",
            StateId::Patrol => "patrol",
            StateId::Hurt => "hurt",
            StateId::Die => "die",
            StateId::Dead => "dead",
            StateId::GuardAttackPrepare => "guard_attack_prepare",
            StateId::GuardAttack => "guard_attack",
            StateId::GuardSalto => "guard_salto",
            StateId::FishFall => "fish_fall",
            StateId::FishJump => "fish_jump",
            StateId::FishAttack => "fish_attack",
            StateId::Fly => "fly",
            StateId::Armed => "armed",
        }
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a transition leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    To(StateId),
    /// The state active before the current one.
    Previous,
}

pub type Predicate = fn(&Probe<'_, '_>) -> bool;
pub type Hook = fn(&mut StateCx<'_, '_>);
pub type UpdateHook = fn(&mut StateCx<'_, '_>, f32);
pub type HitHook = fn(&Probe<'_, '_>, &Hit) -> HitResponse;

#[derive(Clone, Copy)]
pub struct Transition {
    pub next: Next,
    pub predicate: Predicate,
}

/// Scratch data owned by one state of one entity. The tick restarts on
/// every `enter`; the other fields keep whatever the hooks store.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StateLocal {
    pub tick: Tick,
    pub anchor: Vec2,
    pub speed: Vec2,
    pub flag: bool,
}

/// Shared, read-only collaborators of a tick.
#[derive(Debug, Clone, Copy)]
pub struct Env<'w> {
    pub map: &'w TileMap,
    pub config: &'w SimConfig,
    /// Tracked entity, snapshotted at the start of the tick.
    pub target: Option<Target>,
    pub water: Option<&'w Water>,
}

impl<'w> Env<'w> {
    pub fn new(map: &'w TileMap, config: &'w SimConfig) -> Self {
        Self {
            map,
            config,
            target: None,
            water: None,
        }
    }

    pub fn with_target(mut self, target: Option<Target>) -> Self {
        self.target = target;
        self
    }

    pub fn with_water(mut self, water: Option<&'w Water>) -> Self {
        self.water = water;
        self
    }
}

/// Mutable view handed to `enter`, `update` and `exit` hooks.
pub struct StateCx<'a, 'w> {
    pub model: &'a mut Model,
    pub local: &'a mut StateLocal,
    pub env: &'a Env<'w>,
}

impl<'a, 'w> StateCx<'a, 'w> {
    pub fn new(model: &'a mut Model, local: &'a mut StateLocal, env: &'a Env<'w>) -> Self {
        Self { model, local, env }
    }
}

/// Read-only view handed to transition predicates and hit overrides.
pub struct Probe<'a, 'w> {
    pub model: &'a Model,
    pub local: &'a StateLocal,
    pub env: &'a Env<'w>,
}

impl Probe<'_, '_> {
    /// One-shot animation of the current state has played out.
    pub fn animation_finished(&self) -> bool {
        self.model
            .animation
            .length
            .is_some_and(|length| self.local.tick.elapsed(length))
    }

    /// Ticks spent in the current state reached `ticks`.
    pub fn elapsed(&self, ticks: f32) -> bool {
        self.local.tick.elapsed(ticks)
    }

    /// Time spent in the current state reached `ms` at the configured rate.
    pub fn elapsed_time(&self, ms: f32) -> bool {
        self.local.tick.elapsed_time(self.env.config.rate, ms)
    }

    pub fn on_ground(&self) -> bool {
        self.model.contact.on_ground()
    }

    pub fn target(&self) -> Option<Target> {
        self.env.target
    }

    /// Target strictly on the side the entity faces.
    pub fn target_in_front(&self) -> bool {
        self.env.target.is_some_and(|t| match self.model.facing {
            Facing::Left => t.is_left_of(self.model.pos.x),
            Facing::Right => t.is_right_of(self.model.pos.x),
        })
    }

    /// Target strictly on the side the entity turns its back to.
    pub fn target_behind(&self) -> bool {
        self.env.target.is_some_and(|t| match self.model.facing {
            Facing::Left => t.is_right_of(self.model.pos.x),
            Facing::Right => t.is_left_of(self.model.pos.x),
        })
    }

    /// Horizontal distance to the target.
    pub fn target_distance_x(&self) -> Option<f32> {
        self.env.target.map(|t| t.distance_x(self.model.pos.x))
    }
}

/// Definition of one state, built with the `on_*` and `to` methods.
/// Transitions are evaluated in the order they were added.
#[derive(Clone)]
pub struct StateDef {
    pub animation: Animation,
    enter: Option<Hook>,
    update: Option<UpdateHook>,
    exit: Option<Hook>,
    on_hit: Option<HitHook>,
    transitions: Vec<Transition>,
    terminal: bool,
}

impl StateDef {
    pub fn new(animation: Animation) -> Self {
        Self {
            animation,
            enter: None,
            update: None,
            exit: None,
            on_hit: None,
            transitions: Vec::new(),
            terminal: false,
        }
    }

    // -- Builder pattern --

    pub fn on_enter(mut self, hook: Hook) -> Self {
        self.enter = Some(hook);
        self
    }

    pub fn on_update(mut self, hook: UpdateHook) -> Self {
        self.update = Some(hook);
        self
    }

    pub fn on_exit(mut self, hook: Hook) -> Self {
        self.exit = Some(hook);
        self
    }

    /// Override the default hit reaction while this state is active.
    pub fn on_hit(mut self, hook: HitHook) -> Self {
        self.on_hit = Some(hook);
        self
    }

    pub fn to(mut self, next: StateId, predicate: Predicate) -> Self {
        self.transitions.push(Transition {
            next: Next::To(next),
            predicate,
        });
        self
    }

    /// Transition back to the previously active state.
    pub fn back(mut self, predicate: Predicate) -> Self {
        self.transitions.push(Transition {
            next: Next::Previous,
            predicate,
        });
        self
    }

    /// Mark the state as an end state; entities that are not tracked are
    /// removed from the world once they reach it.
    pub fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub(crate) fn run_enter(&self, cx: &mut StateCx<'_, '_>) {
        if let Some(hook) = self.enter {
            hook(cx);
        }
    }

    pub(crate) fn run_update(&self, cx: &mut StateCx<'_, '_>, extrp: f32) {
        if let Some(hook) = self.update {
            hook(cx, extrp);
        }
    }

    pub(crate) fn run_exit(&self, cx: &mut StateCx<'_, '_>) {
        if let Some(hook) = self.exit {
            hook(cx);
        }
    }

    pub(crate) fn run_hit(&self, probe: &Probe<'_, '_>, hit: &Hit) -> Option<HitResponse> {
        self.on_hit.map(|hook| hook(probe, hit))
    }
}

impl fmt::Debug for StateDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let targets: Vec<Next> = self.transitions.iter().map(|t| t.next).collect();
        f.debug_struct("StateDef")
            .field("animation", &self.animation.name)
            .field("transitions", &targets)
            .field("terminal", &self.terminal)
            .finish()
    }
}

/// States available to an archetype, shared by all its instances.
#[derive(Default, Clone)]
pub struct StateRegistry {
    states: HashMap<StateId, StateDef>,
}

impl StateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a state. Returns the definition it replaced, if any.
    pub fn register(&mut self, id: StateId, def: StateDef) -> Option<StateDef> {
        let replaced = self.states.insert(id, def);
        if replaced.is_some() {
            log::warn!("state {id} registered twice, keeping the latest definition");
        }
        replaced
    }

    pub fn with(mut self, id: StateId, def: StateDef) -> Self {
        self.register(id, def);
        self
    }

    pub fn get(&self, id: StateId) -> Option<&StateDef> {
        self.states.get(&id)
    }

    pub fn contains(&self, id: StateId) -> bool {
        self.states.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Registered ids in a stable order.
    pub fn ids(&self) -> Vec<StateId> {
        let mut ids: Vec<StateId> = self.states.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Check that `initial` and every declared transition target exist.
    pub fn validate(&self, initial: StateId) -> Result<(), ConfigError> {
        if !self.contains(initial) {
            return Err(ConfigError::UnregisteredState(initial));
        }
        for from in self.ids() {
            let Some(def) = self.get(from) else { continue };
            for transition in def.transitions() {
                if let Next::To(to) = transition.next {
                    if !self.contains(to) {
                        return Err(ConfigError::UnregisteredTarget { from, to });
                    }
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for StateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.ids()).finish()
    }
}
