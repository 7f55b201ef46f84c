use crate::api::types::EntityId;
use glam::Vec2;

/// A request for the host to materialise something outside the state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectRequest {
    /// Purely visual effect (explosion, splash).
    Effect { kind: &'static str, at: Vec2 },
    /// Projectile entity; `World::spawn_projectile` turns it into an entity.
    Projectile {
        kind: &'static str,
        origin: Vec2,
        /// Displacement per reference tick.
        velocity: Vec2,
    },
}

/// An effect request tagged with the entity that emitted it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    pub source: EntityId,
    pub tick: u64,
    pub request: EffectRequest,
}

/// Requests collected during ticks, drained by the host.
#[derive(Debug, Clone, Default)]
pub struct EffectQueue {
    requests: Vec<SpawnRequest>,
}

impl EffectQueue {
    pub fn new() -> Self {
        Self {
            requests: Vec::with_capacity(16),
        }
    }

    pub fn push(&mut self, request: SpawnRequest) {
        self.requests.push(request);
    }

    /// Drain all pending requests in emission order.
    pub fn drain(&mut self) -> Vec<SpawnRequest> {
        std::mem::take(&mut self.requests)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpawnRequest> {
        self.requests.iter()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}
