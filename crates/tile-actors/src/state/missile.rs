//! States of inanimate entities: flying projectiles and static hazards.

use super::actor::ignore_hits;
use super::{Probe, StateDef, StateId};
use crate::api::types::Animation;

pub const FLY: Animation = Animation::looping("fly");
pub const ARMED: Animation = Animation::looping("armed");

/// Straight flight until a tile or the map edge stops it.
pub fn fly() -> StateDef {
    StateDef::new(FLY).to(StateId::Dead, stopped)
}

/// Inert and unhittable; hurts by contact only.
pub fn armed() -> StateDef {
    StateDef::new(ARMED).on_hit(ignore_hits)
}

fn stopped(p: &Probe<'_, '_>) -> bool {
    let contact = &p.model.contact;
    contact.on_ground()
        || contact.ceiling
        || contact.wall_left
        || contact.wall_right
        || !p.env.map.bounds().overlaps(&p.model.footprint())
}
