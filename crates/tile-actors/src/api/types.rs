use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Unique identifier for an entity in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Horizontal orientation. `Left` is the un-mirrored sprite orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    #[default]
    Left,
    Right,
}

impl Facing {
    /// -1.0 when facing left, 1.0 when facing right.
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    /// Facing matching the sign of `dx`. Zero keeps no opinion.
    pub fn from_sign(dx: f32) -> Option<Self> {
        if dx < 0.0 {
            Some(Facing::Left)
        } else if dx > 0.0 {
            Some(Facing::Right)
        } else {
            None
        }
    }
}

/// Collision group, decides who can hurt whom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    Player,
    Enemy,
    Projectile,
    Hazard,
}

impl Group {
    /// Whether touching a player body with this group's body hurts the player.
    pub fn harms_on_contact(self) -> bool {
        matches!(self, Group::Enemy | Group::Projectile | Group::Hazard)
    }

    /// Whether an attack box of `self` can land on a body of `other`.
    pub fn can_attack(self, other: Group) -> bool {
        matches!(
            (self, other),
            (Group::Player, Group::Enemy) | (Group::Enemy, Group::Player)
        )
    }
}

/// Animation published by a state on `enter`, consumed by an external renderer.
///
/// `length` is the duration in ticks for one-shot animations; looping
/// animations never finish.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    pub name: &'static str,
    pub length: Option<f32>,
}

impl Animation {
    pub const fn looping(name: &'static str) -> Self {
        Self { name, length: None }
    }

    pub const fn once(name: &'static str, ticks: f32) -> Self {
        Self {
            name,
            length: Some(ticks),
        }
    }
}

impl Default for Animation {
    fn default() -> Self {
        Self::looping("")
    }
}

/// Per-entity pose record handed to the renderer after each tick.
/// 8 x 4 bytes = 32 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct EntityPose {
    pub id: u32,
    /// Active state discriminant (`StateId as u32`).
    pub state: u32,
    /// Feet (bottom-centre) position in world space.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// -1.0 facing left, 1.0 facing right.
    pub facing: f32,
    pub health: f32,
}

impl EntityPose {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

/// Poses of every live entity, in spawn order.
#[derive(Debug, Clone, Default)]
pub struct PoseBuffer {
    pub poses: Vec<EntityPose>,
}

impl PoseBuffer {
    pub fn new() -> Self {
        Self {
            poses: Vec::with_capacity(64),
        }
    }

    pub fn clear(&mut self) {
        self.poses.clear();
    }

    pub fn push(&mut self, pose: EntityPose) {
        self.poses.push(pose);
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Raw bytes for the renderer side.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.poses)
    }
}
