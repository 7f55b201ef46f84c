use crate::api::types::EntityId;
use crate::components::entity::Entity;

/// Entity storage using a flat Vec in spawn order.
///
/// Spawn order is the update order of a tick, so removal keeps the order
/// of the remaining entities.
pub struct Scene {
    entities: Vec<Entity>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            entities: Vec::with_capacity(64),
        }
    }

    /// Add an entity at the end of the update order.
    pub fn spawn(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    /// Remove an entity by ID. Returns the removed entity if found.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let idx = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.remove(idx))
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.iter().any(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    /// Find the first entity with the given tag.
    pub fn find_by_tag(&self, tag: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.tag == tag)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetype::Archetype;
    use crate::components::tilemap::TileMap;
    use crate::api::config::SimConfig;
    use crate::state::Env;
    use glam::Vec2;

    fn spike(id: u32, x: f32) -> Entity {
        let map = TileMap::new(4, 4, 16.0, 16.0);
        let config = SimConfig::default();
        let env = Env::new(&map, &config);
        Archetype::spike()
            .instantiate(EntityId(id), Vec2::new(x, 0.0), &env)
            .unwrap()
    }

    #[test]
    fn spawn_and_get() {
        let mut scene = Scene::new();
        scene.spawn(spike(1, 10.0));
        let e = scene.get(EntityId(1)).unwrap();
        assert_eq!(e.model.pos, Vec2::new(10.0, 0.0));
        assert!(scene.contains(EntityId(1)));
    }

    #[test]
    fn despawn_keeps_order() {
        let mut scene = Scene::new();
        for id in 1..=4 {
            scene.spawn(spike(id, 0.0));
        }
        assert!(scene.despawn(EntityId(2)).is_some());
        let order: Vec<u32> = scene.iter().map(|e| e.id.0).collect();
        assert_eq!(order, vec![1, 3, 4]);
        assert!(scene.despawn(EntityId(2)).is_none());
    }

    #[test]
    fn find_by_tag() {
        let mut scene = Scene::new();
        scene.spawn(spike(1, 0.0).with_tag("left"));
        scene.spawn(spike(2, 0.0).with_tag("right"));
        assert_eq!(scene.find_by_tag("right").unwrap().id, EntityId(2));
    }
}
