//! Locomotion and damage states shared by walking archetypes.
//!
//! Constructors taking a `StateId` let each archetype pick where the state
//! leads (e.g. where a fall lands), so one definition serves the player,
//! the guard and the crawler.

use super::{Probe, StateDef, StateId};
use crate::api::types::{Animation, Facing};
use crate::components::combat::{Hit, HitResponse};
use crate::components::entity::Model;
use crate::systems::effects::EffectRequest;
use glam::Vec2;

/// Top walking speed per tick.
pub const WALK_SPEED: f32 = 5.0 / 3.0;
/// Horizontal convergence rate while walking or airborne.
pub const WALK_VELOCITY: f32 = 0.12;
/// Horizontal convergence rate when starting from idle.
pub const IDLE_VELOCITY: f32 = 0.16;
/// Horizontal speed from which idle becomes walk.
pub const WALK_MIN_SPEED: f32 = 0.75;
/// Horizontal speed under which walk settles into idle.
pub const WALK_STOP_SPEED: f32 = 0.005;
/// Lift at jump start.
pub const JUMP_MAX: f32 = 5.4;
/// Lowest lift cap after an early release.
pub const JUMP_MIN: f32 = 2.5;
/// Lift lost per tick.
pub const JUMP_DECAY: f32 = 0.25;
pub const LAND_TICKS: f32 = 10.0;
/// Shortest stay in hurt.
pub const HURT_TICKS: f32 = 20.0;
/// Offset covered by the death motion before the body rests.
pub const DIE_OFFSET_MAX: f32 = 25.0;
/// Upper bound on the death motion when something blocks it.
pub const DIE_TICKS_MAX: f32 = 60.0;
const DIE_SPEED: Vec2 = Vec2::new(0.8, -0.4);
const DIE_ACCEL: Vec2 = Vec2::new(0.1, 0.2);
const DIE_SPEED_MAX: Vec2 = Vec2::new(8.0, 8.0);

pub const IDLE: Animation = Animation::looping("idle");
pub const WALK: Animation = Animation::looping("walk");
pub const JUMP: Animation = Animation::looping("jump");
pub const FALL: Animation = Animation::looping("fall");
pub const LAND: Animation = Animation::once("land", LAND_TICKS);
pub const ATTACK: Animation = Animation::once("attack", 16.0);
pub const TURN: Animation = Animation::once("turn", 12.0);
pub const PATROL: Animation = Animation::looping("patrol");
pub const HURT: Animation = Animation::looping("hurt");
pub const DIE: Animation = Animation::looping("die");
pub const DEAD: Animation = Animation::looping("dead");

pub fn idle() -> StateDef {
    StateDef::new(IDLE)
        .on_enter(|cx| cx.model.movement.set_velocity(IDLE_VELOCITY))
        .on_update(|cx, _| steer(cx.model))
        .to(StateId::Walk, |p| {
            !blocked(p.model) && p.model.movement.direction_horizontal().abs() > WALK_MIN_SPEED
        })
        .to(StateId::Jump, |p| p.model.control.jump_once())
        .to(StateId::Attack, |p| p.model.control.attack_once())
        .to(StateId::Fall, airborne)
}

pub fn walk() -> StateDef {
    StateDef::new(WALK)
        .on_enter(|cx| cx.model.movement.set_velocity(WALK_VELOCITY))
        .on_update(|cx, _| steer(cx.model))
        .to(StateId::Idle, |p| {
            blocked(p.model)
                || (!p.model.control.is_going_horizontal()
                    && p.model.movement.direction_horizontal().abs() < WALK_STOP_SPEED)
        })
        .to(StateId::Jump, |p| p.model.control.jump_once())
        .to(StateId::Attack, |p| p.model.control.attack_once())
        .to(StateId::Fall, airborne)
}

/// Rising part of a jump. Releasing the button early caps the lift, so a
/// tap gives a short hop and a hold the full height.
pub fn jump() -> StateDef {
    StateDef::new(JUMP)
        .on_enter(|cx| {
            cx.model.movement.set_velocity(WALK_VELOCITY);
            cx.model.jump.set_vertical_maximum(None);
            cx.model.jump.set_direction(0.0, JUMP_MAX);
            cx.model.jump.set_destination(0.0, 0.0);
            cx.model.jump.set_velocity(JUMP_DECAY);
            cx.model.body.reset_gravity();
            cx.local.flag = true;
        })
        .on_update(|cx, _| {
            cx.model.body.suspend();
            steer(cx.model);
            if cx.local.flag && !cx.model.control.jump() {
                cx.local.flag = false;
                let lift = cx.model.jump.direction_vertical();
                let cap = (JUMP_MAX - lift).clamp(JUMP_MIN, JUMP_MAX);
                cx.model.jump.set_vertical_maximum(Some(cap));
            }
        })
        .on_exit(|cx| cx.model.jump.set_vertical_maximum(None))
        .to(StateId::Fall, |p| {
            p.model.jump.direction_vertical() <= 0.0 || p.model.is_moving_down()
        })
}

/// Airborne without lift, until ground contact leads to `landing`.
pub fn fall(landing: StateId) -> StateDef {
    StateDef::new(FALL)
        .on_enter(|cx| cx.model.movement.set_velocity(WALK_VELOCITY))
        .on_update(|cx, _| steer(cx.model))
        .to(landing, |p| p.on_ground())
}

pub fn land() -> StateDef {
    StateDef::new(LAND)
        .on_update(|cx, _| steer(cx.model))
        .to(StateId::Jump, |p| p.model.control.jump_once())
        .to(StateId::Attack, |p| p.model.control.attack_once())
        .to(StateId::Fall, airborne)
        .to(StateId::Idle, |p| p.animation_finished())
}

/// Swing the attack box until the animation ends, then go to `recover`.
pub fn attack(recover: StateId) -> StateDef {
    StateDef::new(ATTACK)
        .on_enter(|cx| {
            cx.model.movement.set_destination(0.0, 0.0);
            cx.model.attacking = true;
        })
        .on_exit(|cx| cx.model.attacking = false)
        .to(StateId::Fall, airborne)
        .to(recover, |p| p.animation_finished())
}

/// Stop, then face the other way when the animation ends.
pub fn turn() -> StateDef {
    StateDef::new(TURN)
        .on_enter(|cx| cx.model.movement.zero())
        .on_exit(|cx| cx.model.facing = cx.model.facing.flipped())
        .back(|p| p.animation_finished())
}

/// Walk along the patrol control; reversals arrive as requested turns.
pub fn patrol() -> StateDef {
    StateDef::new(PATROL)
        .on_enter(|cx| cx.model.movement.set_velocity(WALK_VELOCITY))
        .on_update(|cx, _| {
            let h = cx.model.control.horizontal();
            cx.model.movement.set_destination(h * WALK_SPEED, 0.0);
        })
        .to(StateId::Fall, airborne)
}

/// Knocked back and unhittable; back to `recover` once the push is spent.
pub fn hurt(recover: StateId) -> StateDef {
    StateDef::new(HURT)
        .on_enter(|cx| cx.model.attacking = false)
        .on_update(|cx, _| cx.model.body.suspend())
        .on_hit(ignore_hits)
        .to(recover, |p| p.elapsed(HURT_TICKS) && !hurting(p.model))
}

/// Death motion: a short backward arc, then `Dead`.
///
/// The arc accelerates through the two forces, horizontal speed on
/// `movement` and vertical speed as negative lift on `jump`, so it is
/// integrated exactly whatever the step size.
pub fn die() -> StateDef {
    StateDef::new(DIE)
        .on_enter(|cx| {
            cx.model.stats.kill();
            cx.model.attacking = false;
            cx.local.anchor = cx.model.pos;
            let back = -cx.model.facing.sign();
            let speed = Vec2::new(DIE_SPEED.x * back, DIE_SPEED.y);
            cx.local.speed = speed;

            let movement = &mut cx.model.movement;
            movement.set_sensibility(1.0);
            movement.set_velocity(DIE_ACCEL.x);
            movement.set_direction(speed.x, 0.0);
            movement.set_destination(DIE_SPEED_MAX.x * back, 0.0);

            let jump = &mut cx.model.jump;
            jump.set_vertical_maximum(None);
            jump.set_sensibility(1.0);
            jump.set_velocity(DIE_ACCEL.y);
            jump.set_direction(0.0, -speed.y);
            jump.set_destination(0.0, -DIE_SPEED_MAX.y);
        })
        .on_update(|cx, _| cx.model.body.suspend())
        .on_exit(|cx| {
            cx.model.movement.zero();
            cx.model.jump.zero();
        })
        .on_hit(ignore_hits)
        .to(StateId::Dead, |p| {
            (p.model.pos.x - p.local.anchor.x).abs() > DIE_OFFSET_MAX || p.elapsed(DIE_TICKS_MAX)
        })
}

/// End state. Emits the death effect once.
pub fn dead() -> StateDef {
    StateDef::new(DEAD)
        .on_enter(|cx| {
            cx.model.stats.kill();
            cx.model.attacking = false;
            cx.model.movement.zero();
            cx.model.jump.zero();
            if let Some(kind) = cx.model.death_effect {
                let at = cx.model.footprint().center();
                cx.model.emit(EffectRequest::Effect { kind, at });
            }
        })
        .on_hit(ignore_hits)
        .terminal()
}

pub fn ignore_hits(_: &Probe<'_, '_>, _: &Hit) -> HitResponse {
    HitResponse::Ignore
}

/// Falling without ground support.
pub fn airborne(p: &Probe<'_, '_>) -> bool {
    p.model.body.has_gravity() && !p.on_ground()
}

/// Pushing against a wall.
fn blocked(model: &Model) -> bool {
    (model.control.is_going_right() && model.contact.wall_right)
        || (model.control.is_going_left() && model.contact.wall_left)
}

fn hurting(model: &Model) -> bool {
    model.jump.direction_vertical() > 0.0
        || model.movement.direction_horizontal().abs() > WALK_STOP_SPEED
}

/// Horizontal destination and facing from the control axis.
fn steer(model: &mut Model) {
    let h = model.control.horizontal();
    model.movement.set_destination(h * WALK_SPEED, 0.0);
    if let Some(facing) = Facing::from_sign(h) {
        model.facing = facing;
    }
}
