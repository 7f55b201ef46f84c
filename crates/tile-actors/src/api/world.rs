use crate::api::config::{ConfigError, SimConfig};
use crate::api::level::{LevelData, LevelError};
use crate::api::types::{EntityId, PoseBuffer};
use crate::archetype::Archetype;
use crate::components::entity::Entity;
use crate::components::tilemap::TileMap;
use crate::components::water::Water;
use crate::core::rng::Rng;
use crate::core::scene::Scene;
use crate::core::time::FixedTimestep;
use crate::input::queue::InputSource;
use crate::state::{Env, StateId};
use crate::systems::effects::{EffectQueue, EffectRequest, SpawnRequest};
use crate::systems::hits;
use crate::systems::tile_collision;
use crate::systems::tracking::TargetTracking;
use glam::Vec2;

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    /// Entities that changed state, with the state they entered.
    pub transitions: Vec<(EntityId, StateId)>,
    /// Hits taken this tick.
    pub hits: usize,
    /// Entities removed after reaching an end state.
    pub despawned: Vec<EntityId>,
    /// Some input source raised `force_exit`.
    pub exit_requested: bool,
}

/// One running level: the map, its entities and the services they share.
///
/// A tick runs every active entity in spawn order: control, state update,
/// motion against the tiles; then hits over the settled footprints; then
/// one transition evaluation per entity.
pub struct World {
    config: SimConfig,
    map: TileMap,
    water: Option<Water>,
    scene: Scene,
    tracking: TargetTracking,
    timestep: FixedTimestep,
    rng: Rng,
    effects: EffectQueue,
    poses: PoseBuffer,
    tick: u64,
    next_id: u32,
}

impl World {
    pub fn new(config: SimConfig, map: TileMap) -> Self {
        let timestep =
            FixedTimestep::from_rate(config.rate).with_max_steps(config.max_steps_per_frame);
        let rng = Rng::new(config.rng_seed);
        Self {
            config,
            map,
            water: None,
            scene: Scene::new(),
            tracking: TargetTracking::new(),
            timestep,
            rng,
            effects: EffectQueue::new(),
            poses: PoseBuffer::new(),
            tick: 0,
            next_id: 1,
        }
    }

    /// Build a world from loaded level data, with water if the level has it.
    pub fn from_level(config: SimConfig, level: LevelData) -> Result<Self, LevelError> {
        let water = level.water();
        let mut world = Self::new(config, level.into_map()?);
        world.water = water;
        Ok(world)
    }

    pub fn with_water(mut self, water: Water) -> Self {
        self.water = Some(water);
        self
    }

    // -- Accessors --

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn map(&self) -> &TileMap {
        &self.map
    }

    pub fn water(&self) -> Option<&Water> {
        self.water.as_ref()
    }

    pub fn water_mut(&mut self) -> Option<&mut Water> {
        self.water.as_mut()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn tracking(&self) -> &TargetTracking {
        &self.tracking
    }

    /// Number of ticks run so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn effects(&self) -> &EffectQueue {
        &self.effects
    }

    pub fn drain_effects(&mut self) -> Vec<SpawnRequest> {
        self.effects.drain()
    }

    /// Poses published by the last tick.
    pub fn poses(&self) -> &PoseBuffer {
        &self.poses
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.scene.get(id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.scene.get_mut(id)
    }

    pub fn state_of(&self, id: EntityId) -> Option<StateId> {
        self.scene.get(id).map(Entity::state)
    }

    // -- Spawning --

    /// Spawn an idle-controlled entity with its feet at `pos`.
    pub fn spawn(&mut self, archetype: &Archetype, pos: Vec2) -> Result<EntityId, ConfigError> {
        self.spawn_entity(archetype, pos, None)
    }

    /// Spawn an entity driven by `input`.
    pub fn spawn_with_input(
        &mut self,
        archetype: &Archetype,
        pos: Vec2,
        input: Box<dyn InputSource>,
    ) -> Result<EntityId, ConfigError> {
        self.spawn_entity(archetype, pos, Some(input))
    }

    fn spawn_entity(
        &mut self,
        archetype: &Archetype,
        pos: Vec2,
        input: Option<Box<dyn InputSource>>,
    ) -> Result<EntityId, ConfigError> {
        let id = EntityId(self.next_id);
        let target = self.tracking.resolve(&self.scene);
        let env = Env::new(&self.map, &self.config)
            .with_target(target)
            .with_water(self.water.as_ref());
        let mut entity = archetype.instantiate(id, pos, &env)?;
        if let Some(input) = input {
            entity.input = input;
        }
        self.next_id += 1;
        if entity.trackable {
            self.tracking.track(id);
        }
        log::info!("spawned {} {id} at ({}, {})", archetype.name, pos.x, pos.y);
        self.scene.spawn(entity);
        Ok(id)
    }

    /// Turn a projectile request into a flying projectile entity centred on
    /// the request origin. Other requests spawn nothing.
    pub fn spawn_projectile(&mut self, request: &EffectRequest) -> Result<Option<EntityId>, ConfigError> {
        let EffectRequest::Projectile {
            kind,
            origin,
            velocity,
        } = *request
        else {
            return Ok(None);
        };
        let archetype = Archetype::projectile();
        let feet = origin + Vec2::new(0.0, archetype.stats.height * 0.5);
        let id = self.spawn(&archetype, feet)?;
        if let Some(entity) = self.scene.get_mut(id) {
            entity.tag = kind.to_string();
            entity.model.movement.set_direction(velocity.x, velocity.y);
            entity.model.movement.set_destination(velocity.x, velocity.y);
        }
        Ok(Some(id))
    }

    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        self.tracking.untrack(id);
        let entity = self.scene.despawn(id)?;
        log::info!("despawned {} {id}", entity.archetype);
        Some(entity)
    }

    /// Make `id` the entity AI states track.
    pub fn track(&mut self, id: EntityId) -> bool {
        if !self.scene.contains(id) {
            return false;
        }
        self.tracking.track(id);
        true
    }

    pub fn set_input(&mut self, id: EntityId, input: Box<dyn InputSource>) -> bool {
        match self.scene.get_mut(id) {
            Some(entity) => {
                entity.input = input;
                true
            }
            None => false,
        }
    }

    /// Switch an entity's state immediately, outside the tick.
    ///
    /// # Panics
    ///
    /// If `state` is not registered for the entity's archetype.
    pub fn set_state(&mut self, id: EntityId, state: StateId) -> bool {
        let target = self.tracking.resolve(&self.scene);
        let env = Env::new(&self.map, &self.config)
            .with_target(target)
            .with_water(self.water.as_ref());
        let Some(entity) = self.scene.get_mut(id) else {
            return false;
        };
        entity.machine.set_state(state, &mut entity.model, &env)
    }

    // -- Ticking --

    /// Run one tick scaled by `extrp`.
    pub fn step(&mut self, extrp: f32) -> TickReport {
        let tick = self.tick;
        let mut report = TickReport {
            tick,
            ..TickReport::default()
        };

        if let Some(water) = self.water.as_mut() {
            water.update(extrp);
        }
        let target = self.tracking.resolve(&self.scene);
        let env = Env::new(&self.map, &self.config)
            .with_target(target)
            .with_water(self.water.as_ref());

        for entity in self.scene.iter_mut().filter(|e| e.active) {
            entity.begin_tick(tick, extrp);
            report.exit_requested |= entity.model.control.signals().force_exit;
            entity.machine.update_active(extrp, &mut entity.model, &env);
            let delta = entity.model.displacement(extrp);
            tile_collision::resolve(&mut entity.model, &self.map, delta);
        }

        let pending = hits::detect(&self.scene, &mut self.rng);
        report.hits = hits::dispatch(&mut self.scene, &pending, &env);

        for entity in self.scene.iter_mut().filter(|e| e.active) {
            if let Some(next) = entity.machine.evaluate(&mut entity.model, &env) {
                report.transitions.push((entity.id, next));
            }
            for request in entity.model.drain_effects() {
                self.effects.push(SpawnRequest {
                    source: entity.id,
                    tick,
                    request,
                });
            }
        }

        let finished: Vec<EntityId> = self
            .scene
            .iter()
            .filter(|e| !e.trackable && e.machine.is_terminal())
            .map(|e| e.id)
            .collect();
        for id in finished {
            self.despawn(id);
            report.despawned.push(id);
        }

        self.publish_poses();
        self.tick += 1;
        report
    }

    /// Feed a frame duration in seconds and run the whole ticks it covers.
    pub fn advance(&mut self, frame_dt: f32) -> Vec<TickReport> {
        let steps = self.timestep.accumulate(frame_dt);
        (0..steps).map(|_| self.step(1.0)).collect()
    }

    /// Run a single tick scaled to the frame duration.
    pub fn step_frame(&mut self, frame_dt: f32) -> TickReport {
        let extrp = self.timestep.extrp(frame_dt);
        self.step(extrp)
    }

    fn publish_poses(&mut self) {
        self.poses.clear();
        for entity in self.scene.iter() {
            self.poses.push(entity.pose());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::tilemap::{CollisionCategory, Tile};
    use crate::input::queue::{ControlSignals, InputQueue};

    fn world() -> World {
        let mut map = TileMap::new(20, 10, 16.0, 16.0);
        map.fill_rect(0, 8, 20, 1, Some(Tile::new(1, CollisionCategory::Ground)));
        World::new(SimConfig::default(), map)
    }

    #[test]
    fn ids_are_sequential() {
        let mut world = world();
        let a = world.spawn(&Archetype::player(), Vec2::new(40.0, 128.0)).unwrap();
        let b = world.spawn(&Archetype::crawler(), Vec2::new(120.0, 128.0)).unwrap();
        assert_eq!((a, b), (EntityId(1), EntityId(2)));
        assert_eq!(world.tracking().tracked(), Some(a));
        assert_eq!(world.scene().len(), 2);
    }

    #[test]
    fn guard_without_player_is_rejected() {
        let mut world = world();
        let err = world.spawn(&Archetype::guard(), Vec2::new(40.0, 128.0)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingService { .. }));
        assert!(world.scene().is_empty());
        // The failed spawn does not burn an id
        let id = world.spawn(&Archetype::player(), Vec2::new(40.0, 128.0)).unwrap();
        assert_eq!(id, EntityId(1));
    }

    #[test]
    fn step_publishes_poses() {
        let mut world = world();
        let id = world.spawn(&Archetype::player(), Vec2::new(40.0, 128.0)).unwrap();
        let report = world.step(1.0);
        assert_eq!(report.tick, 0);
        assert_eq!(world.tick(), 1);
        assert_eq!(world.poses().len(), 1);
        assert_eq!(world.poses().poses[0].id, id.0);
        assert_eq!(report.transitions, vec![(id, StateId::Land)]);
    }

    #[test]
    fn projectile_leaving_the_map_is_removed() {
        let mut world = world();
        let request = EffectRequest::Projectile {
            kind: "fish_spit",
            origin: Vec2::new(312.0, 60.0),
            velocity: Vec2::new(4.0, 0.0),
        };
        let id = world.spawn_projectile(&request).unwrap().unwrap();
        assert_eq!(world.entity(id).unwrap().tag, "fish_spit");

        let mut removed = false;
        for _ in 0..10 {
            if world.step(1.0).despawned.contains(&id) {
                removed = true;
                break;
            }
        }
        assert!(removed);
        assert!(world.entity(id).is_none());
    }

    #[test]
    fn effect_requests_spawn_nothing() {
        let mut world = world();
        let request = EffectRequest::Effect {
            kind: "splash",
            at: Vec2::ZERO,
        };
        assert_eq!(world.spawn_projectile(&request).unwrap(), None);
        assert!(world.scene().is_empty());
    }

    #[test]
    fn force_exit_is_reported() {
        let mut world = world();
        let input = InputQueue::new().hold(ControlSignals::idle().with_force_exit(true), 1);
        world
            .spawn_with_input(&Archetype::player(), Vec2::new(40.0, 128.0), Box::new(input))
            .unwrap();
        assert!(world.step(1.0).exit_requested);
        assert!(!world.step(1.0).exit_requested);
    }

    #[test]
    fn advance_runs_whole_ticks() {
        let mut world = world();
        world.spawn(&Archetype::player(), Vec2::new(40.0, 128.0)).unwrap();
        assert_eq!(world.advance(1.0 / 60.0 * 3.0 + 0.001).len(), 3);
        assert_eq!(world.tick(), 3);
        // Capped by max_steps_per_frame
        assert_eq!(world.advance(1.0).len(), 10);
    }

    #[test]
    fn despawn_untracks() {
        let mut world = world();
        let id = world.spawn(&Archetype::player(), Vec2::new(40.0, 128.0)).unwrap();
        assert!(world.despawn(id).is_some());
        assert_eq!(world.tracking().tracked(), None);
        assert!(world.despawn(id).is_none());
    }

    #[test]
    fn set_state_switches_immediately() {
        let mut world = world();
        let id = world.spawn(&Archetype::player(), Vec2::new(40.0, 128.0)).unwrap();
        assert!(world.set_state(id, StateId::Idle));
        assert_eq!(world.state_of(id), Some(StateId::Idle));
        assert!(!world.set_state(EntityId(77), StateId::Idle));
    }
}
