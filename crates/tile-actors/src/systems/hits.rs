//! Hit detection between entities and against hazard tiles, and the default
//! reaction of an entity that takes a hit.

use crate::api::types::{EntityId, Group};
use crate::components::combat::{Hit, HitKind, HitResponse};
use crate::components::entity::{Entity, Model};
use crate::core::rng::Rng;
use crate::core::scene::Scene;
use crate::state::actor::JUMP_DECAY;
use crate::state::{Env, StateId};
use glam::Vec2;

/// Damage dealt by standing on a hazard tile.
pub const TILE_DAMAGE: u32 = 1;
/// Hit-free window after an attack or a hazard tile.
pub const RECOVERY_TICKS: f32 = 20.0;
/// Hit-free window after touching a harmful body.
pub const CONTACT_RECOVERY_TICKS: f32 = 120.0;
const KNOCKBACK_LIFT: f32 = 3.5;
const KNOCKBACK_SPEED: f32 = 1.8;
const KNOCKBACK_VELOCITY: f32 = 0.05;

/// A hit addressed to one entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingHit {
    pub target: EntityId,
    pub hit: Hit,
}

/// Collect this tick's hits in scene order.
///
/// Attack boxes land on groups the attacker can attack, harmful bodies
/// touch players, and hazard floors hurt whoever vulnerable stands on them.
/// Damage is rolled here so the rng is consumed in a fixed order.
pub fn detect(scene: &Scene, rng: &mut Rng) -> Vec<PendingHit> {
    let mut hits = Vec::new();
    for source in scene.iter().filter(|e| e.active && can_deal(e)) {
        let attack_box = source.model.attack_footprint();
        for target in scene.iter().filter(|e| e.active && e.id != source.id) {
            let body = target.model.footprint();
            if let Some(reach) = attack_box {
                if source.group.can_attack(target.group) && reach.overlaps(&body) {
                    hits.push(PendingHit {
                        target: target.id,
                        hit: Hit {
                            source: Some(source.id),
                            kind: HitKind::Attack,
                            damage: source.model.stats.roll_damage(rng),
                            origin: source.model.pos,
                        },
                    });
                    continue;
                }
            }
            if source.group.harms_on_contact()
                && target.group == Group::Player
                && source.model.footprint().overlaps(&body)
            {
                hits.push(PendingHit {
                    target: target.id,
                    hit: Hit {
                        source: Some(source.id),
                        kind: HitKind::Contact,
                        damage: source.model.stats.roll_damage(rng),
                        origin: source.model.pos,
                    },
                });
            }
        }
    }

    for entity in scene.iter().filter(|e| e.active && e.model.vulnerable) {
        let on_hazard = entity
            .model
            .contact
            .ground
            .is_some_and(|ground| ground.category.is_hazard());
        if on_hazard {
            hits.push(PendingHit {
                target: entity.id,
                hit: Hit {
                    source: None,
                    kind: HitKind::Tile,
                    damage: TILE_DAMAGE,
                    origin: entity.model.pos,
                },
            });
        }
    }
    hits
}

fn can_deal(entity: &Entity) -> bool {
    !entity.model.stats.is_dead() && !entity.machine.is_terminal()
}

/// Deliver hits to their targets. Returns how many were taken.
///
/// A taken hit whose source is consumed on hit sends the source to `Dead`.
pub fn dispatch(scene: &mut Scene, hits: &[PendingHit], env: &Env<'_>) -> usize {
    let mut taken = 0;
    for pending in hits {
        let Some(target) = scene.get_mut(pending.target) else {
            continue;
        };
        if react(target, &pending.hit, env) == HitResponse::Ignore {
            continue;
        }
        taken += 1;
        log::debug!(
            "{} took {:?} hit for {} from {:?}",
            pending.target,
            pending.hit.kind,
            pending.hit.damage,
            pending.hit.source
        );
        let Some(source) = pending.hit.source.and_then(|id| scene.get_mut(id)) else {
            continue;
        };
        if source.consumed_on_hit && source.machine.registry().contains(StateId::Dead) {
            source.machine.request(StateId::Dead);
        }
    }
    taken
}

/// The active state's override decides first; a state without one, or one
/// that takes the hit, gets the default reaction.
pub fn react(entity: &mut Entity, hit: &Hit, env: &Env<'_>) -> HitResponse {
    if entity.machine.hit(&entity.model, env, hit) == Some(HitResponse::Ignore) {
        return HitResponse::Ignore;
    }
    default_reaction(entity, hit)
}

/// Damage, knockback, a forced `Hurt` or `Die`, and a recovery window.
pub fn default_reaction(entity: &mut Entity, hit: &Hit) -> HitResponse {
    let model = &entity.model;
    if !model.vulnerable
        || model.is_recovering()
        || model.stats.is_dead()
        || entity.machine.pending().is_some()
    {
        return HitResponse::Ignore;
    }

    let registry = entity.machine.registry();
    let has_die = registry.contains(StateId::Die);
    let has_hurt = registry.contains(StateId::Hurt);

    let model = &mut entity.model;
    model.start_recovery(match hit.kind {
        HitKind::Contact => CONTACT_RECOVERY_TICKS,
        HitKind::Attack | HitKind::Tile => RECOVERY_TICKS,
    });
    if model.stats.apply_damage(hit.damage) {
        entity
            .machine
            .request(if has_die { StateId::Die } else { StateId::Dead });
        return HitResponse::Take;
    }

    knockback(model, entity.group, hit.origin);
    if has_hurt {
        entity.machine.request(StateId::Hurt);
    }
    HitResponse::Take
}

/// Push the body away from `origin`. Players are also lifted.
fn knockback(model: &mut Model, group: Group, origin: Vec2) {
    let dx = model.pos.x - origin.x;
    let side = if dx == 0.0 {
        -model.facing.sign()
    } else {
        dx.signum()
    };
    model.movement.set_velocity(KNOCKBACK_VELOCITY);
    model.movement.set_direction(KNOCKBACK_SPEED * side, 0.0);
    model.movement.set_destination(0.0, 0.0);
    if group == Group::Player {
        model.jump.set_velocity(JUMP_DECAY);
        model.jump.set_direction(0.0, KNOCKBACK_LIFT);
        model.jump.set_destination(0.0, 0.0);
    }
}
