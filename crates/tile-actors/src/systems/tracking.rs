use crate::api::types::EntityId;
use crate::core::scene::Scene;
use glam::Vec2;

/// Snapshot of the tracked entity, taken once at the start of a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub id: EntityId,
    /// Feet position.
    pub pos: Vec2,
    pub size: Vec2,
}

impl Target {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.pos.x, self.pos.y - self.size.y * 0.5)
    }

    /// Strictly left of `x`; an equal x is on neither side.
    pub fn is_left_of(&self, x: f32) -> bool {
        self.pos.x < x
    }

    /// Strictly right of `x`.
    pub fn is_right_of(&self, x: f32) -> bool {
        self.pos.x > x
    }

    pub fn distance_x(&self, x: f32) -> f32 {
        (self.pos.x - x).abs()
    }
}

/// Which entity enemies chase. At most one is tracked at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetTracking {
    tracked: Option<EntityId>,
}

impl TargetTracking {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, id: EntityId) {
        if let Some(old) = self.tracked.replace(id) {
            if old != id {
                log::warn!("{id} replaces {old} as the tracked entity");
            }
        }
    }

    /// Stop tracking `id` if it is the tracked entity.
    pub fn untrack(&mut self, id: EntityId) {
        if self.tracked == Some(id) {
            self.tracked = None;
        }
    }

    pub fn tracked(&self) -> Option<EntityId> {
        self.tracked
    }

    pub fn resolve(&self, scene: &Scene) -> Option<Target> {
        let entity = scene.get(self.tracked?)?;
        entity.active.then(|| Target {
            id: entity.id,
            pos: entity.model.pos,
            size: entity.model.size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sides_are_strict() {
        let t = Target {
            id: EntityId(1),
            pos: Vec2::new(10.0, 0.0),
            size: Vec2::new(8.0, 16.0),
        };
        assert!(!t.is_left_of(10.0));
        assert!(!t.is_right_of(10.0));
        assert!(t.is_left_of(10.5));
        assert_eq!(t.distance_x(4.0), 6.0);
        assert_eq!(t.center(), Vec2::new(10.0, -8.0));
    }

    #[test]
    fn untrack_only_matching() {
        let mut tracking = TargetTracking::new();
        tracking.track(EntityId(1));
        tracking.untrack(EntityId(2));
        assert_eq!(tracking.tracked(), Some(EntityId(1)));
        tracking.untrack(EntityId(1));
        assert_eq!(tracking.tracked(), None);
    }

    #[test]
    fn nothing_resolves_in_empty_scene() {
        let mut tracking = TargetTracking::new();
        tracking.track(EntityId(1));
        assert!(tracking.resolve(&Scene::new()).is_none());
    }
}
