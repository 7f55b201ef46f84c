//! Guard behaviour: wait, then strike a close target, leap toward a far one
//! or turn around to face one behind.

use super::{Probe, StateDef, StateId};
use crate::api::types::Animation;

/// Horizontal distance under which the guard strikes instead of leaping.
pub const ATTACK_DISTANCE_MAX: f32 = 56.0;
/// Wait in the prepare stance before deciding.
pub const PREPARE_DELAY_MS: f32 = 350.0;
const SALTO_SPEED: f32 = 1.0;
const SALTO_LIFT: f32 = 4.0;
const SALTO_DECAY: f32 = 0.05;

pub const PREPARE: Animation = Animation::looping("guard_prepare");
pub const STRIKE: Animation = Animation::once("guard_attack", 30.0);
pub const SALTO: Animation = Animation::looping("guard_salto");

pub fn attack_prepare() -> StateDef {
    StateDef::new(PREPARE)
        .on_enter(|cx| {
            cx.model.movement.zero();
            cx.model.jump.zero();
        })
        .to(StateId::GuardAttack, |p| {
            prepared(p) && p.target_in_front() && within_reach(p)
        })
        .to(StateId::GuardSalto, |p| {
            prepared(p) && p.target_in_front() && !within_reach(p)
        })
        .to(StateId::Turn, |p| prepared(p) && p.target_behind())
}

pub fn attack() -> StateDef {
    StateDef::new(STRIKE)
        .on_enter(|cx| {
            cx.model.movement.zero();
            cx.model.attacking = true;
        })
        .on_exit(|cx| cx.model.attacking = false)
        .to(StateId::GuardAttackPrepare, |p| p.animation_finished())
}

/// Leap forward; lands back in the prepare stance.
pub fn salto() -> StateDef {
    StateDef::new(SALTO)
        .on_enter(|cx| {
            let side = cx.model.facing.sign();
            cx.model.movement.set_velocity(SALTO_SPEED);
            cx.model.movement.set_direction(side, 0.0);
            cx.model.movement.set_destination(side, 0.0);
            cx.model.jump.set_direction(0.0, SALTO_LIFT);
            cx.model.jump.set_destination(0.0, 0.0);
            cx.model.jump.set_velocity(SALTO_DECAY);
            cx.model.body.reset_gravity();
        })
        .to(StateId::GuardAttackPrepare, |p| p.on_ground())
}

fn prepared(p: &Probe<'_, '_>) -> bool {
    p.elapsed_time(PREPARE_DELAY_MS)
}

fn within_reach(p: &Probe<'_, '_>) -> bool {
    p.target_distance_x()
        .is_some_and(|d| d < ATTACK_DISTANCE_MAX)
}
