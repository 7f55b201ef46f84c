use crate::api::config::StatBlock;
use crate::api::types::EntityId;
use crate::core::rng::Rng;
use glam::Vec2;

/// Health and damage range of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    health: u32,
    health_max: u32,
    damage_min: u32,
    damage_max: u32,
}

impl Stats {
    pub fn new(health: u32) -> Self {
        Self {
            health,
            health_max: health,
            damage_min: 1,
            damage_max: 1,
        }
    }

    pub fn from_block(block: &StatBlock) -> Self {
        Self {
            health: block.health,
            health_max: block.health,
            damage_min: block.damage_min,
            damage_max: block.damage_max,
        }
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn health_max(&self) -> u32 {
        self.health_max
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }

    /// Remove health. Returns true when health is exhausted.
    pub fn apply_damage(&mut self, damage: u32) -> bool {
        self.health = self.health.saturating_sub(damage);
        self.is_dead()
    }

    pub fn kill(&mut self) {
        self.health = 0;
    }

    /// Damage dealt by one landed hit.
    pub fn roll_damage(&self, rng: &mut Rng) -> u32 {
        rng.range(self.damage_min, self.damage_max)
    }
}

/// What delivered a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    /// An attack box overlapped the body.
    Attack,
    /// A harmful body touched the body.
    Contact,
    /// The body stands on a hazard tile.
    Tile,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Attacking entity; `None` for tile hazards.
    pub source: Option<EntityId>,
    pub kind: HitKind,
    pub damage: u32,
    /// World position the hit came from, used for knockback.
    pub origin: Vec2,
}

/// Whether a state accepted a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitResponse {
    Ignore,
    Take,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_saturates() {
        let mut stats = Stats::new(3);
        assert!(!stats.apply_damage(1));
        assert_eq!(stats.health(), 2);
        assert!(stats.apply_damage(5));
        assert_eq!(stats.health(), 0);
        assert_eq!(stats.health_max(), 3);
    }

    #[test]
    fn roll_stays_in_range() {
        let block = StatBlock::new(1, 8.0, 8.0).with_damage(2, 4);
        let stats = Stats::from_block(&block);
        let mut rng = Rng::new(3);
        for _ in 0..50 {
            let d = stats.roll_damage(&mut rng);
            assert!((2..=4).contains(&d));
        }
    }
}
