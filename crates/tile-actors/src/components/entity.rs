use crate::api::types::{Animation, EntityId, EntityPose, Facing, Group};
use crate::components::combat::Stats;
use crate::components::launcher::Launcher;
use crate::components::patrol::Patrol;
use crate::components::tilemap::Surface;
use crate::core::force::Force;
use crate::core::geometry::Rect;
use crate::core::physics::PhysicsBody;
use crate::core::time::Tick;
use crate::input::queue::{Control, ControlSignals, IdleInput, InputSource};
use crate::state::{StateId, StateMachine};
use crate::systems::effects::EffectRequest;
use glam::Vec2;
use std::fmt;

/// Tile contacts found by the last collision pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Contact {
    pub ground: Option<Surface>,
    pub ceiling: bool,
    pub wall_left: bool,
    pub wall_right: bool,
}

impl Contact {
    pub fn on_ground(&self) -> bool {
        self.ground.is_some()
    }
}

/// Physical and control state of an entity; what state hooks act upon.
///
/// `pos` is the feet (bottom-centre) of the body. `movement` displaces in
/// world space; `jump` holds lift, where positive vertical means up.
#[derive(Debug, Clone)]
pub struct Model {
    pub pos: Vec2,
    /// Position at the start of the current tick.
    pub old_pos: Vec2,
    pub size: Vec2,
    pub facing: Facing,
    pub body: PhysicsBody,
    pub movement: Force,
    pub jump: Force,
    pub control: Control,
    pub contact: Contact,
    pub animation: Animation,
    pub stats: Stats,
    /// Whether hits can damage this entity.
    pub vulnerable: bool,
    /// Attack box relative to the feet; x grows forward.
    pub attack_reach: Option<Rect>,
    /// Attack box is live.
    pub attacking: bool,
    pub launcher: Option<Launcher>,
    pub patrol: Option<Patrol>,
    /// Effect emitted when the entity reaches its end state.
    pub death_effect: Option<&'static str>,
    /// Runs while the entity shrugs off further hits.
    recovery: Tick,
    recovery_ticks: f32,
    control_override: Option<ControlSignals>,
    effects: Vec<EffectRequest>,
}

impl Model {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            old_pos: pos,
            size,
            facing: Facing::Left,
            body: PhysicsBody::weightless(),
            movement: Force::new(),
            jump: Force::new(),
            control: Control::default(),
            contact: Contact::default(),
            animation: Animation::default(),
            stats: Stats::new(1),
            vulnerable: false,
            attack_reach: None,
            attacking: false,
            launcher: None,
            patrol: None,
            death_effect: None,
            recovery: Tick::new(),
            recovery_ticks: 0.0,
            control_override: None,
            effects: Vec::new(),
        }
    }

    // -- Builder pattern --

    pub fn with_body(mut self, body: PhysicsBody) -> Self {
        self.body = body;
        self
    }

    pub fn with_facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }

    pub fn with_stats(mut self, stats: Stats, vulnerable: bool) -> Self {
        self.stats = stats;
        self.vulnerable = vulnerable;
        self
    }

    // -- Geometry --

    pub fn footprint(&self) -> Rect {
        Rect::from_feet(self.pos, self.size)
    }

    /// World-space attack box, while attacking.
    pub fn attack_footprint(&self) -> Option<Rect> {
        if !self.attacking {
            return None;
        }
        let reach = self.attack_reach?;
        let oriented = match self.facing {
            Facing::Right => reach,
            Facing::Left => reach.mirror_x(),
        };
        Some(oriented.translate(self.pos))
    }

    pub fn is_moving_down(&self) -> bool {
        self.pos.y > self.old_pos.y
    }

    pub fn is_moving_up(&self) -> bool {
        self.pos.y < self.old_pos.y
    }

    // -- Per-tick --

    pub fn begin_tick(&mut self) {
        self.old_pos = self.pos;
    }

    /// Ignore hits for the next `ticks` reference ticks.
    pub fn start_recovery(&mut self, ticks: f32) {
        self.recovery.restart();
        self.recovery_ticks = ticks;
    }

    pub fn is_recovering(&self) -> bool {
        self.recovery.is_started() && !self.recovery.elapsed(self.recovery_ticks)
    }

    pub fn update_recovery(&mut self, extrp: f32) {
        self.recovery.update(extrp);
        if self.recovery.elapsed(self.recovery_ticks) {
            self.recovery.stop();
        }
    }

    /// Latch this tick's control signals, unless a state overrides them.
    pub fn feed_control(&mut self, signals: ControlSignals) {
        self.control.feed(self.control_override.unwrap_or(signals));
    }

    pub fn set_control_override(&mut self, signals: Option<ControlSignals>) {
        self.control_override = signals;
    }

    pub fn control_override(&self) -> Option<ControlSignals> {
        self.control_override
    }

    /// Advance both forces and gravity over `extrp` ticks and return the
    /// resulting world displacement, without applying it.
    pub fn displacement(&mut self, extrp: f32) -> Vec2 {
        let movement = self.movement.update(extrp);
        let lift = self.jump.update(extrp);
        let fall = self.body.integrate(extrp);
        Vec2::new(movement.x + lift.x, movement.y - lift.y + fall)
    }

    /// Apply `displacement` directly, ignoring tiles.
    pub fn integrate(&mut self, extrp: f32) {
        let delta = self.displacement(extrp);
        self.pos += delta;
    }

    pub fn move_by(&mut self, offset: Vec2) {
        self.pos += offset;
    }

    /// Place the body without a visible motion this tick.
    pub fn teleport(&mut self, pos: Vec2) {
        self.pos = pos;
        self.old_pos = pos;
    }

    pub fn emit(&mut self, effect: EffectRequest) {
        self.effects.push(effect);
    }

    pub fn drain_effects(&mut self) -> Vec<EffectRequest> {
        std::mem::take(&mut self.effects)
    }
}

/// Fat Entity: one struct owning its model, its state machine and its
/// control source.
pub struct Entity {
    pub id: EntityId,
    /// String tag for finding entities by name.
    pub tag: String,
    /// Inactive entities are skipped by the tick.
    pub active: bool,
    /// Name of the archetype it was built from.
    pub archetype: &'static str,
    pub group: Group,
    /// Tracked entities stay in the world after reaching an end state.
    pub trackable: bool,
    /// Ends itself when one of its hits lands.
    pub consumed_on_hit: bool,
    pub model: Model,
    pub machine: StateMachine,
    pub input: Box<dyn InputSource>,
}

impl Entity {
    pub fn new(
        id: EntityId,
        archetype: &'static str,
        group: Group,
        model: Model,
        machine: StateMachine,
    ) -> Self {
        Self {
            id,
            tag: String::new(),
            active: true,
            archetype,
            group,
            trackable: false,
            consumed_on_hit: false,
            model,
            machine,
            input: Box::new(IdleInput),
        }
    }

    // -- Builder pattern --

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_input(mut self, input: Box<dyn InputSource>) -> Self {
        self.input = input;
        self
    }

    pub fn state(&self) -> StateId {
        self.machine.current()
    }

    /// Snapshot the position and latch this tick's control.
    /// A patrol replaces polled input and asks for a turn when it reverses.
    pub fn begin_tick(&mut self, tick: u64, extrp: f32) {
        self.model.begin_tick();
        self.model.update_recovery(extrp);
        let mut signals = self.input.poll(tick);
        if let Some(patrol) = self.model.patrol.as_mut() {
            if patrol.update(extrp) && self.machine.registry().contains(StateId::Turn) {
                self.machine.request(StateId::Turn);
            }
            signals = patrol.control();
        }
        self.model.feed_control(signals);
    }

    pub fn pose(&self) -> EntityPose {
        EntityPose {
            id: self.id.0,
            state: self.state() as u32,
            x: self.model.pos.x,
            y: self.model.pos.y,
            width: self.model.size.x,
            height: self.model.size.y,
            facing: self.model.facing.sign(),
            health: self.model.stats.health() as f32,
        }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("tag", &self.tag)
            .field("archetype", &self.archetype)
            .field("state", &self.state())
            .field("pos", &self.model.pos)
            .finish()
    }
}
