//! Fish behaviour: sink, leap out of the water, fire at the target at the
//! top of the leap, sink again.
//!
//! Depth and altitude are measured against the water surface in y-down
//! world space.

use super::{StateDef, StateId};
use crate::api::types::Animation;
use crate::input::queue::ControlSignals;

/// Depth below the surface from which the fish leaps.
pub const JUMP_DEPTH: f32 = 80.0;
/// Clearance above the surface, on top of the fish height, that ends a leap.
pub const JUMP_CLEARANCE: f32 = 64.0;
/// Lift under which a leap ends.
pub const JUMP_LIFT_MIN: f32 = 1.0;
pub const ATTACK_TICKS: f32 = 20.0;
const JUMP_LIFT: f32 = 3.2;
const JUMP_DECAY: f32 = 0.05;
const SINK_DECAY: f32 = 0.06;
const SINK_SPEED: f32 = 2.0;
const SENSIBILITY: f32 = 0.5;

pub const SWIM: Animation = Animation::looping("fish_swim");
pub const LEAP: Animation = Animation::looping("fish_leap");
pub const SPIT: Animation = Animation::once("fish_attack", ATTACK_TICKS);

pub fn fall() -> StateDef {
    StateDef::new(SWIM)
        .on_enter(|cx| {
            cx.model.jump.set_velocity(SINK_DECAY);
            cx.model.jump.set_sensibility(SENSIBILITY);
            cx.model.jump.set_destination(0.0, -SINK_SPEED);
        })
        .to(StateId::FishJump, |p| {
            p.env
                .water
                .is_some_and(|w| w.depth(p.model.pos.y) > JUMP_DEPTH)
        })
}

pub fn jump() -> StateDef {
    StateDef::new(LEAP)
        .on_enter(|cx| {
            cx.model
                .set_control_override(Some(ControlSignals::idle().with_vertical(1.0)));
            cx.model.jump.set_velocity(JUMP_DECAY);
            cx.model.jump.set_sensibility(SENSIBILITY);
            cx.model.jump.set_direction(0.0, JUMP_LIFT);
            cx.model.body.reset_gravity();
        })
        .on_update(|cx, _| cx.model.body.suspend())
        .on_exit(|cx| cx.model.set_control_override(None))
        .to(StateId::FishAttack, |p| {
            p.model.jump.direction_vertical() < JUMP_LIFT_MIN
                || p.env.water.is_some_and(|w| {
                    w.altitude(p.model.pos.y) > p.model.size.y + JUMP_CLEARANCE
                })
        })
}

pub fn attack() -> StateDef {
    StateDef::new(SPIT)
        .on_enter(|cx| {
            if let Some(launcher) = cx.model.launcher {
                let shot = launcher.fire(cx.model.pos, cx.model.facing, cx.env.target.as_ref());
                cx.model.emit(shot);
            }
        })
        .on_update(|cx, _| cx.model.body.suspend())
        .to(StateId::FishFall, |p| p.elapsed(ATTACK_TICKS))
}
