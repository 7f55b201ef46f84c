use crate::state::StateId;
use serde::{Deserialize, Serialize};

/// Simulation-wide constants, provided by the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Reference tick rate in ticks per second (default: 60).
    pub rate: f32,
    /// Fall acceleration per reference tick, y-down (default: 0.3).
    pub gravity: f32,
    /// Maximum fall speed per reference tick (default: 6.5).
    pub gravity_max: f32,
    /// Maximum ticks run for one frame by `World::advance` (default: 10).
    pub max_steps_per_frame: u32,
    /// Seed of the damage roll generator (default: 42).
    pub rng_seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rate: 60.0,
            gravity: 0.3,
            gravity_max: 6.5,
            max_steps_per_frame: 10,
            rng_seed: 42,
        }
    }
}

impl SimConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Duration of one reference tick in seconds.
    pub fn tick_duration(&self) -> f32 {
        1.0 / self.rate
    }
}

/// Per-archetype numbers, loadable from data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatBlock {
    pub health: u32,
    #[serde(default = "default_damage")]
    pub damage_min: u32,
    #[serde(default = "default_damage")]
    pub damage_max: u32,
    /// Body width in world units.
    pub width: f32,
    /// Body height in world units.
    pub height: f32,
}

fn default_damage() -> u32 {
    1
}

impl StatBlock {
    pub fn new(health: u32, width: f32, height: f32) -> Self {
        Self {
            health,
            damage_min: 1,
            damage_max: 1,
            width,
            height,
        }
    }

    pub fn with_damage(mut self, min: u32, max: u32) -> Self {
        self.damage_min = min;
        self.damage_max = max;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Setup-time failures. Runtime misuse of the state machine panics instead.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("state {0} is not registered")]
    UnregisteredState(StateId),
    #[error("state {from} declares a transition to unregistered state {to}")]
    UnregisteredTarget { from: StateId, to: StateId },
    #[error("archetype `{archetype}` needs a {service} service")]
    MissingService {
        archetype: &'static str,
        service: &'static str,
    },
    #[error("invalid configuration data: {0}")]
    Json(#[from] serde_json::Error),
}
