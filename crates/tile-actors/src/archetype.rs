//! Entity blueprints: which states an entity runs, which services it needs,
//! and the numbers it starts with.

use crate::api::config::{ConfigError, StatBlock};
use crate::api::types::{EntityId, Facing, Group};
use crate::components::combat::Stats;
use crate::components::entity::{Entity, Model};
use crate::components::launcher::Launcher;
use crate::components::patrol::Patrol;
use crate::core::geometry::Rect;
use crate::core::physics::PhysicsBody;
use crate::state::{actor, fish, guard, missile, Env, StateId, StateMachine, StateRegistry};
use glam::Vec2;
use std::rc::Rc;

/// Shared services an archetype cannot run without.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Requirements {
    pub target: bool,
    pub water: bool,
}

#[derive(Debug, Clone)]
pub struct Archetype {
    pub name: &'static str,
    pub group: Group,
    pub stats: StatBlock,
    pub registry: Rc<StateRegistry>,
    pub initial: StateId,
    pub requires: Requirements,
    pub facing: Facing,
    pub gravity: bool,
    pub vulnerable: bool,
    /// Stays in the world after its end state and can be tracked.
    pub trackable: bool,
    pub consumed_on_hit: bool,
    pub attack_reach: Option<Rect>,
    pub launcher: Option<Launcher>,
    pub patrol: Option<Patrol>,
    pub death_effect: Option<&'static str>,
}

impl Archetype {
    fn base(name: &'static str, group: Group, stats: StatBlock, registry: StateRegistry, initial: StateId) -> Self {
        Self {
            name,
            group,
            stats,
            registry: Rc::new(registry),
            initial,
            requires: Requirements::default(),
            facing: Facing::Left,
            gravity: true,
            vulnerable: true,
            trackable: false,
            consumed_on_hit: false,
            attack_reach: None,
            launcher: None,
            patrol: None,
            death_effect: None,
        }
    }

    /// Keyboard-driven hero. The usual tracking target.
    pub fn player() -> Self {
        let registry = StateRegistry::new()
            .with(StateId::Idle, actor::idle())
            .with(StateId::Walk, actor::walk())
            .with(StateId::Jump, actor::jump())
            .with(StateId::Fall, actor::fall(StateId::Land))
            .with(StateId::Land, actor::land())
            .with(StateId::Attack, actor::attack(StateId::Idle))
            .with(StateId::Hurt, actor::hurt(StateId::Fall))
            .with(StateId::Die, actor::die())
            .with(StateId::Dead, actor::dead());
        Self {
            trackable: true,
            attack_reach: Some(Rect::new(Vec2::new(4.0, -22.0), Vec2::new(26.0, -8.0))),
            ..Self::base(
                "player",
                Group::Player,
                StatBlock::new(4, 14.0, 28.0),
                registry,
                StateId::Fall,
            )
        }
    }

    /// Stands its ground, strikes or leaps at the tracked entity.
    pub fn guard() -> Self {
        let registry = StateRegistry::new()
            .with(StateId::Fall, actor::fall(StateId::GuardAttackPrepare))
            .with(StateId::GuardAttackPrepare, guard::attack_prepare())
            .with(StateId::GuardAttack, guard::attack())
            .with(StateId::GuardSalto, guard::salto())
            .with(StateId::Turn, actor::turn())
            .with(StateId::Hurt, actor::hurt(StateId::GuardAttackPrepare))
            .with(StateId::Dead, actor::dead());
        Self {
            requires: Requirements {
                target: true,
                water: false,
            },
            attack_reach: Some(Rect::new(Vec2::new(4.0, -28.0), Vec2::new(30.0, -6.0))),
            death_effect: Some("explode"),
            ..Self::base(
                "guard",
                Group::Enemy,
                StatBlock::new(3, 24.0, 32.0),
                registry,
                StateId::Fall,
            )
        }
    }

    /// Leaps out of the water and spits at the tracked entity.
    pub fn fish() -> Self {
        let registry = StateRegistry::new()
            .with(StateId::FishFall, fish::fall())
            .with(StateId::FishJump, fish::jump())
            .with(StateId::FishAttack, fish::attack())
            .with(StateId::Dead, actor::dead());
        Self {
            requires: Requirements {
                target: true,
                water: true,
            },
            gravity: false,
            launcher: Some(Launcher::new("fish_spit", 2.0).with_offset(Vec2::new(6.0, -16.0))),
            death_effect: Some("splash"),
            ..Self::base(
                "fish",
                Group::Enemy,
                StatBlock::new(1, 16.0, 24.0),
                registry,
                StateId::FishFall,
            )
        }
    }

    /// Walks back and forth, turning every patrol period.
    pub fn crawler() -> Self {
        let registry = StateRegistry::new()
            .with(StateId::Fall, actor::fall(StateId::Patrol))
            .with(StateId::Patrol, actor::patrol())
            .with(StateId::Turn, actor::turn())
            .with(StateId::Hurt, actor::hurt(StateId::Patrol))
            .with(StateId::Dead, actor::dead());
        Self {
            patrol: Some(Patrol::new(-0.6, 0.0)),
            death_effect: Some("explode"),
            ..Self::base(
                "crawler",
                Group::Enemy,
                StatBlock::new(2, 16.0, 12.0),
                registry,
                StateId::Fall,
            )
        }
    }

    /// Flies straight; ends on tiles, the map edge or its first landed hit.
    pub fn projectile() -> Self {
        let registry = StateRegistry::new()
            .with(StateId::Fly, missile::fly())
            .with(StateId::Dead, actor::dead());
        Self {
            gravity: false,
            vulnerable: false,
            consumed_on_hit: true,
            ..Self::base(
                "projectile",
                Group::Projectile,
                StatBlock::new(1, 6.0, 6.0),
                registry,
                StateId::Fly,
            )
        }
    }

    /// Static hazard hurting on contact.
    pub fn spike() -> Self {
        let registry = StateRegistry::new().with(StateId::Armed, missile::armed());
        Self {
            gravity: false,
            vulnerable: false,
            ..Self::base(
                "spike",
                Group::Hazard,
                StatBlock::new(1, 16.0, 8.0),
                registry,
                StateId::Armed,
            )
        }
    }

    // -- Builder pattern --

    pub fn with_stats(mut self, stats: StatBlock) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }

    pub fn with_patrol(mut self, patrol: Patrol) -> Self {
        self.patrol = Some(patrol);
        self
    }

    /// Fail when a required shared service is missing from `env`.
    pub fn check(&self, env: &Env<'_>) -> Result<(), ConfigError> {
        if self.requires.target && env.target.is_none() {
            return Err(ConfigError::MissingService {
                archetype: self.name,
                service: "target tracking",
            });
        }
        if self.requires.water && env.water.is_none() {
            return Err(ConfigError::MissingService {
                archetype: self.name,
                service: "water",
            });
        }
        Ok(())
    }

    /// Build an entity with its feet at `pos` and enter its initial state.
    pub fn instantiate(&self, id: EntityId, pos: Vec2, env: &Env<'_>) -> Result<Entity, ConfigError> {
        self.check(env)?;
        let body = if self.gravity {
            PhysicsBody::new(env.config.gravity, env.config.gravity_max)
        } else {
            PhysicsBody::weightless()
        };
        let facing = self.patrol.and_then(|p| p.facing()).unwrap_or(self.facing);
        let mut model = Model::new(pos, Vec2::new(self.stats.width, self.stats.height))
            .with_body(body)
            .with_facing(facing)
            .with_stats(Stats::from_block(&self.stats), self.vulnerable);
        model.attack_reach = self.attack_reach;
        model.launcher = self.launcher;
        model.patrol = self.patrol;
        model.death_effect = self.death_effect;

        let machine = StateMachine::start(Rc::clone(&self.registry), self.initial, &mut model, env)?;
        let mut entity = Entity::new(id, self.name, self.group, model, machine);
        entity.trackable = self.trackable;
        entity.consumed_on_hit = self.consumed_on_hit;
        Ok(entity)
    }
}
