use crate::api::types::Facing;
use crate::systems::effects::EffectRequest;
use crate::systems::tracking::Target;
use glam::Vec2;

/// Fires projectiles, as spawn requests for the world to materialise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Launcher {
    pub projectile: &'static str,
    /// Projectile speed per reference tick.
    pub speed: f32,
    /// Spawn point relative to the feet; x grows forward.
    pub offset: Vec2,
}

impl Launcher {
    pub fn new(projectile: &'static str, speed: f32) -> Self {
        Self {
            projectile,
            speed,
            offset: Vec2::ZERO,
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn origin(&self, pos: Vec2, facing: Facing) -> Vec2 {
        pos + Vec2::new(self.offset.x * facing.sign(), self.offset.y)
    }

    /// Aim at the target's centre, or straight ahead without one.
    pub fn fire(&self, pos: Vec2, facing: Facing, target: Option<&Target>) -> EffectRequest {
        let origin = self.origin(pos, facing);
        let aim = target
            .and_then(|t| (t.center() - origin).try_normalize())
            .unwrap_or(Vec2::new(facing.sign(), 0.0));
        EffectRequest::Projectile {
            kind: self.projectile,
            origin,
            velocity: aim * self.speed,
        }
    }
}
