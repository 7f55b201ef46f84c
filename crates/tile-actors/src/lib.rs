pub mod api;
pub mod archetype;
pub mod components;
pub mod core;
pub mod input;
pub mod logging;
pub mod state;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::config::{ConfigError, SimConfig, StatBlock};
pub use api::level::{LevelData, LevelError, TileData};
pub use api::types::{Animation, EntityId, EntityPose, Facing, Group, PoseBuffer};
pub use api::world::{TickReport, World};
pub use archetype::{Archetype, Requirements};
pub use components::combat::{Hit, HitKind, HitResponse, Stats};
pub use components::entity::{Contact, Entity, Model};
pub use components::launcher::Launcher;
pub use components::patrol::Patrol;
pub use components::tilemap::{CollisionCategory, Surface, Tile, TileMap};
pub use components::water::Water;
pub use core::force::Force;
pub use core::geometry::Rect;
pub use core::physics::PhysicsBody;
pub use core::scene::Scene;
pub use core::time::{FixedTimestep, Tick};
pub use input::queue::{Control, ControlSignals, IdleInput, InputQueue, InputSource};
pub use state::{Env, Next, Probe, StateCx, StateDef, StateId, StateLocal, StateMachine, StateRegistry};
pub use systems::effects::{EffectQueue, EffectRequest, SpawnRequest};
pub use systems::tracking::{Target, TargetTracking};
