//! End-to-end ticks of small levels: landing, guard decisions, fish leaps,
//! patrols, death and determinism.

use approx::assert_abs_diff_eq;
use glam::Vec2;
use std::collections::HashMap;
use tile_actors::{
    Archetype, CollisionCategory, ControlSignals, EffectRequest, EntityId, Facing, InputQueue,
    SimConfig, StateId, Tile, TileMap, Water, World,
};

/// Map whose origin sits at (0, 4), with a full ground row.
fn floor_world(width: u32, height: u32, floor_row: u32) -> World {
    let mut map = TileMap::new(width, height, 16.0, 16.0).with_origin(Vec2::new(0.0, 4.0));
    map.fill_rect(0, floor_row, width, 1, Some(Tile::new(1, CollisionCategory::Ground)));
    World::new(SimConfig::default(), map)
}

fn transitions_of(world: &mut World, id: EntityId, ticks: usize) -> Vec<(u64, StateId)> {
    let mut seen = Vec::new();
    for _ in 0..ticks {
        let report = world.step(1.0);
        for &(who, state) in &report.transitions {
            if who == id {
                seen.push((report.tick, state));
            }
        }
    }
    seen
}

#[test]
fn falling_player_lands_on_the_floor() {
    let mut world = floor_world(20, 8, 6); // floor top at y = 100
    let id = world.spawn(&Archetype::player(), Vec2::new(80.0, 0.0)).unwrap();
    assert_eq!(world.state_of(id), Some(StateId::Fall));

    let mut landed = false;
    for _ in 0..120 {
        let report = world.step(1.0);
        let player = world.entity(id).unwrap();
        if player.model.pos.y == 100.0 {
            assert!(report.transitions.contains(&(id, StateId::Land)));
            assert!(player.model.contact.on_ground());
            landed = true;
            break;
        }
        assert!(player.model.pos.y < 100.0);
        assert_eq!(player.state(), StateId::Fall);
    }
    assert!(landed);

    let later = transitions_of(&mut world, id, 20);
    assert_eq!(later.first().map(|&(_, s)| s), Some(StateId::Idle));
}

#[test]
fn resting_on_the_ground_is_stable() {
    let mut world = floor_world(20, 8, 6);
    let id = world.spawn(&Archetype::player(), Vec2::new(80.0, 100.0)).unwrap();
    for _ in 0..100 {
        world.step(1.0);
        let player = world.entity(id).unwrap();
        assert_eq!(player.model.pos.y, 100.0);
        assert!(player.model.contact.on_ground());
    }
    assert_eq!(world.state_of(id), Some(StateId::Idle));
}

/// Guard at x = 300 facing left, player `offset` units away on the floor.
fn guard_decisions(offset: f32) -> Vec<(u64, StateId)> {
    let mut world = floor_world(40, 8, 6);
    world.spawn(&Archetype::player(), Vec2::new(300.0 + offset, 100.0)).unwrap();
    let guard = world.spawn(&Archetype::guard(), Vec2::new(300.0, 100.0)).unwrap();
    transitions_of(&mut world, guard, 40)
}

#[test]
fn guard_strikes_a_close_target_in_front() {
    let seen = guard_decisions(-30.0);
    assert_eq!(seen[0], (0, StateId::GuardAttackPrepare));
    assert_eq!(seen[1], (21, StateId::GuardAttack));
}

#[test]
fn guard_leaps_at_a_far_target_in_front() {
    let seen = guard_decisions(-150.0);
    assert_eq!(seen[0], (0, StateId::GuardAttackPrepare));
    assert_eq!(seen[1], (21, StateId::GuardSalto));
}

#[test]
fn guard_turns_toward_a_target_behind() {
    let seen = guard_decisions(40.0);
    assert_eq!(seen[1], (21, StateId::Turn));
}

#[test]
fn guard_reach_ends_just_short_of_its_limit() {
    assert_eq!(guard_decisions(-55.0)[1], (21, StateId::GuardAttack));
    assert_eq!(guard_decisions(-56.0)[1], (21, StateId::GuardSalto));
}

#[test]
fn guard_reach_is_the_same_on_both_sides() {
    let decide = |offset: f32| {
        let mut world = floor_world(40, 8, 6);
        world.spawn(&Archetype::player(), Vec2::new(300.0 + offset, 100.0)).unwrap();
        let guard = world
            .spawn(&Archetype::guard().with_facing(Facing::Right), Vec2::new(300.0, 100.0))
            .unwrap();
        transitions_of(&mut world, guard, 40)[1]
    };
    assert_eq!(decide(55.0), (21, StateId::GuardAttack));
    assert_eq!(decide(56.0), (21, StateId::GuardSalto));
}

#[test]
fn guard_ignores_a_target_at_the_same_x() {
    let mut map = TileMap::new(40, 8, 16.0, 16.0).with_origin(Vec2::new(0.0, 4.0));
    map.fill_rect(0, 6, 40, 1, Some(Tile::new(1, CollisionCategory::Ground)));
    // Platform above the guard so the bodies never touch
    map.set(18, 2, Some(Tile::new(1, CollisionCategory::Ground)));
    let mut world = World::new(SimConfig::default(), map);
    let player = world.spawn(&Archetype::player(), Vec2::new(300.0, 36.0)).unwrap();
    let guard = world.spawn(&Archetype::guard(), Vec2::new(300.0, 100.0)).unwrap();
    let seen = transitions_of(&mut world, guard, 60);
    assert_eq!(world.entity(player).unwrap().model.pos, Vec2::new(300.0, 36.0));
    assert_eq!(seen, vec![(0, StateId::GuardAttackPrepare)]);
}

fn fish_world(water_level: f32) -> World {
    let mut map = TileMap::new(40, 60, 16.0, 16.0);
    map.fill_rect(0, 10, 8, 1, Some(Tile::new(1, CollisionCategory::Ground)));
    let mut world = World::new(SimConfig::default(), map).with_water(Water::new(water_level));
    world.spawn(&Archetype::player(), Vec2::new(40.0, 160.0)).unwrap();
    world
}

#[test]
fn deep_fish_attacks_when_its_lift_runs_out() {
    let mut world = fish_world(300.0);
    let fish = world.spawn(&Archetype::fish(), Vec2::new(400.0, 800.0)).unwrap();
    let mut jumped = false;
    for _ in 0..200 {
        let report = world.step(1.0);
        if report.transitions.contains(&(fish, StateId::FishJump)) {
            jumped = true;
        }
        if report.transitions.contains(&(fish, StateId::FishAttack)) {
            assert!(jumped);
            let model = &world.entity(fish).unwrap().model;
            assert!(model.jump.direction_vertical() < 1.0);
            // Still under water: the lift ran out first
            assert!(world.water().unwrap().depth(model.pos.y) > 0.0);
            return;
        }
    }
    panic!("fish never attacked");
}

#[test]
fn shallow_fish_attacks_above_the_surface() {
    let mut world = fish_world(300.0);
    let fish = world.spawn(&Archetype::fish(), Vec2::new(400.0, 381.0)).unwrap();
    let seen = transitions_of(&mut world, fish, 1);
    assert_eq!(seen, vec![(0, StateId::FishJump)]);
    assert_eq!(world.entity(fish).unwrap().model.control.vertical(), 0.0);

    for _ in 0..200 {
        let report = world.step(1.0);
        if report.transitions.contains(&(fish, StateId::FishAttack)) {
            let model = &world.entity(fish).unwrap().model;
            assert!(model.jump.direction_vertical() >= 1.0);
            let altitude = world.water().unwrap().altitude(model.pos.y);
            assert!(altitude > model.size.y + 64.0);
            let shots: Vec<_> = world
                .effects()
                .iter()
                .filter(|r| r.source == fish)
                .collect();
            assert_eq!(shots.len(), 1);
            assert!(matches!(shots[0].request, EffectRequest::Projectile { .. }));
            return;
        }
        if world.state_of(fish) == Some(StateId::FishJump) {
            assert_eq!(world.entity(fish).unwrap().model.control.vertical(), 1.0);
        }
    }
    panic!("fish never attacked");
}

#[test]
fn crawler_turns_at_the_end_of_its_patrol() {
    let mut world = floor_world(40, 8, 6);
    let crawler = world.spawn(&Archetype::crawler(), Vec2::new(320.0, 100.0)).unwrap();
    let start = world.entity(crawler).unwrap().model.pos.x;
    let seen = transitions_of(&mut world, crawler, 130);
    let states: Vec<StateId> = seen.iter().map(|&(_, s)| s).collect();
    assert_eq!(states, vec![StateId::Patrol, StateId::Turn, StateId::Patrol]);
    assert_eq!(seen[1].0, 99);

    let model = &world.entity(crawler).unwrap().model;
    assert!(model.pos.x < start);
    assert_eq!(model.facing, Facing::Right);
}

#[test]
fn player_touching_a_spike_dies_and_stays() {
    let mut world = floor_world(40, 8, 6);
    let player = world
        .spawn(
            &Archetype::player().with_stats(tile_actors::StatBlock::new(1, 14.0, 28.0)),
            Vec2::new(100.0, 100.0),
        )
        .unwrap();
    world.spawn(&Archetype::spike(), Vec2::new(100.0, 100.0)).unwrap();

    let seen = transitions_of(&mut world, player, 90);
    let states: Vec<StateId> = seen.iter().map(|&(_, s)| s).collect();
    assert_eq!(states, vec![StateId::Die, StateId::Dead]);
    let entity = world.entity(player).unwrap();
    assert!(entity.model.stats.is_dead());
    assert_eq!(world.tracking().tracked(), Some(player));
}

fn scripted_world() -> World {
    let right = ControlSignals::idle().with_horizontal(1.0);
    let script = InputQueue::new()
        .hold(ControlSignals::idle(), 12)
        .hold(right, 30)
        .hold(right.with_jump(true), 18)
        .hold(ControlSignals::idle(), 20)
        .hold(ControlSignals::idle().with_attack(true), 1)
        .hold(ControlSignals::idle().with_horizontal(-1.0), 40);
    let mut world = floor_world(60, 8, 6);
    world
        .spawn_with_input(&Archetype::player(), Vec2::new(200.0, 100.0), Box::new(script))
        .unwrap();
    world.spawn(&Archetype::guard(), Vec2::new(420.0, 100.0)).unwrap();
    world.spawn(&Archetype::crawler(), Vec2::new(700.0, 100.0)).unwrap();
    world
}

#[test]
fn same_script_same_run() {
    let mut a = scripted_world();
    let mut b = scripted_world();
    for _ in 0..300 {
        let ra = a.step(1.0);
        let rb = b.step(1.0);
        assert_eq!(ra, rb);
        assert_eq!(a.poses().as_bytes(), b.poses().as_bytes());
    }
}

#[test]
fn one_state_change_per_entity_per_tick() {
    let mut world = scripted_world();
    let ids: Vec<EntityId> = world.scene().iter().map(|e| e.id).collect();
    for _ in 0..300 {
        let report = world.step(1.0);
        let mut counts: HashMap<EntityId, usize> = HashMap::new();
        for &(id, _) in &report.transitions {
            *counts.entry(id).or_default() += 1;
        }
        assert!(counts.values().all(|&n| n == 1));
        for &id in &ids {
            if let Some(entity) = world.entity(id) {
                assert!(entity.machine.registry().contains(entity.state()));
            }
        }
    }
}

#[test]
fn half_ticks_match_full_ticks() {
    let right = ControlSignals::idle().with_horizontal(1.0);
    let mut full = floor_world(20, 32, 30);
    let mut half = floor_world(20, 32, 30);
    let a = full
        .spawn_with_input(
            &Archetype::player(),
            Vec2::new(80.0, 0.0),
            Box::new(InputQueue::new().hold(right, 10)),
        )
        .unwrap();
    let b = half
        .spawn_with_input(
            &Archetype::player(),
            Vec2::new(80.0, 0.0),
            Box::new(InputQueue::new().hold(right, 20)),
        )
        .unwrap();
    for _ in 0..10 {
        full.step(1.0);
    }
    for _ in 0..20 {
        half.step(0.5);
    }
    let pa = full.entity(a).unwrap().model.pos;
    let pb = half.entity(b).unwrap().model.pos;
    assert_abs_diff_eq!(pa.x, pb.x, epsilon = 1e-3);
    assert_abs_diff_eq!(pa.y, pb.y, epsilon = 1e-3);
    assert!(pa.x > 80.0 && pa.y > 0.0);
    assert_eq!(full.state_of(a), Some(StateId::Fall));
    assert_eq!(half.state_of(b), Some(StateId::Fall));
}

/// Run the same world 10 ticks at `extrp = 1.0` and 20 at `0.5`, starting
/// each from `setup`, and return both positions of `id`.
fn full_and_half(setup: impl Fn(&mut World) -> EntityId) -> (Vec2, Vec2, StateId, StateId) {
    let mut full = floor_world(20, 32, 30);
    let mut half = floor_world(20, 32, 30);
    let a = setup(&mut full);
    let b = setup(&mut half);
    for _ in 0..10 {
        full.step(1.0);
    }
    for _ in 0..20 {
        half.step(0.5);
    }
    (
        full.entity(a).unwrap().model.pos,
        half.entity(b).unwrap().model.pos,
        full.state_of(a).unwrap(),
        half.state_of(b).unwrap(),
    )
}

#[test]
fn jump_arc_is_independent_of_the_step() {
    let (pa, pb, sa, sb) = full_and_half(|world| {
        let held = ControlSignals::idle().with_jump(true);
        let id = world
            .spawn_with_input(
                &Archetype::player(),
                Vec2::new(80.0, 484.0),
                Box::new(InputQueue::new().hold(held, 20)),
            )
            .unwrap();
        world.set_state(id, StateId::Jump);
        id
    });
    assert_eq!((sa, sb), (StateId::Jump, StateId::Jump));
    // Lift 5.4 losing 0.25 per tick, gravity suspended: 54 - 12.5
    assert_abs_diff_eq!(pa.y, 484.0 - 41.5, epsilon = 1e-3);
    assert_abs_diff_eq!(pa.y, pb.y, epsilon = 1e-3);
    assert_abs_diff_eq!(pa.x, pb.x, epsilon = 1e-3);
}

#[test]
fn hurt_knockback_is_independent_of_the_step() {
    let (pa, pb, sa, sb) = full_and_half(|world| {
        let id = world.spawn(&Archetype::player(), Vec2::new(80.0, 200.0)).unwrap();
        let model = &mut world.entity_mut(id).unwrap().model;
        model.movement.set_velocity(0.05);
        model.movement.set_direction(1.8, 0.0);
        model.movement.set_destination(0.0, 0.0);
        model.jump.set_velocity(0.25);
        model.jump.set_direction(0.0, 3.5);
        model.jump.set_destination(0.0, 0.0);
        world.set_state(id, StateId::Hurt);
        id
    });
    assert_eq!((sa, sb), (StateId::Hurt, StateId::Hurt));
    assert_abs_diff_eq!(pa.x, 80.0 + 15.5, epsilon = 1e-3);
    assert_abs_diff_eq!(pa.y, 200.0 - 22.5, epsilon = 1e-3);
    assert_abs_diff_eq!(pa.x, pb.x, epsilon = 1e-3);
    assert_abs_diff_eq!(pa.y, pb.y, epsilon = 1e-3);
}

#[test]
fn death_arc_is_independent_of_the_step() {
    let (pa, pb, sa, sb) = full_and_half(|world| {
        let id = world.spawn(&Archetype::player(), Vec2::new(80.0, 200.0)).unwrap();
        world.set_state(id, StateId::Die);
        id
    });
    assert_eq!((sa, sb), (StateId::Die, StateId::Die));
    // Backward 0.8 + 0.1/tick, up 0.4 - 0.2/tick
    assert_abs_diff_eq!((pa.x - 80.0).abs(), 13.0, epsilon = 1e-3);
    assert_abs_diff_eq!(pa.y, 206.0, epsilon = 1e-3);
    assert_abs_diff_eq!(pa.x, pb.x, epsilon = 1e-3);
    assert_abs_diff_eq!(pa.y, pb.y, epsilon = 1e-3);
}

#[test]
fn walker_follows_a_slope_up_a_step() {
    let mut map = TileMap::new(20, 8, 16.0, 16.0);
    map.fill_rect(0, 6, 6, 1, Some(Tile::new(1, CollisionCategory::Ground)));
    map.set(5, 5, Some(Tile::new(2, CollisionCategory::SlopeUpRight)));
    map.fill_rect(6, 5, 14, 1, Some(Tile::new(1, CollisionCategory::Ground)));
    let mut world = World::new(SimConfig::default(), map);
    let right = ControlSignals::idle().with_horizontal(1.0);
    let id = world
        .spawn_with_input(
            &Archetype::player(),
            Vec2::new(40.0, 96.0),
            Box::new(InputQueue::new().hold(right, 90)),
        )
        .unwrap();

    let mut on_slope = false;
    for _ in 0..90 {
        let report = world.step(1.0);
        assert!(!report.transitions.contains(&(id, StateId::Fall)));
        let model = &world.entity(id).unwrap().model;
        assert!(model.contact.on_ground());
        assert!(model.pos.y <= 96.0 && model.pos.y >= 80.0);
        if model.pos.y > 80.0 && model.pos.y < 96.0 {
            on_slope = true;
            let surface = 96.0 - (model.pos.x - 80.0);
            assert_abs_diff_eq!(model.pos.y, surface, epsilon = 1e-3);
        }
    }
    assert!(on_slope);
    let model = &world.entity(id).unwrap().model;
    assert!(model.pos.x > 120.0);
    assert_eq!(model.pos.y, 80.0);
}

#[test]
fn wall_stops_a_walker() {
    let mut map = TileMap::new(20, 8, 16.0, 16.0).with_origin(Vec2::new(0.0, 4.0));
    map.fill_rect(0, 6, 20, 1, Some(Tile::new(1, CollisionCategory::Ground)));
    map.fill_rect(10, 3, 1, 3, Some(Tile::new(2, CollisionCategory::Wall)));
    let mut world = World::new(SimConfig::default(), map);
    let right = ControlSignals::idle().with_horizontal(1.0);
    let id = world
        .spawn_with_input(
            &Archetype::player(),
            Vec2::new(100.0, 100.0),
            Box::new(InputQueue::new().hold(right, 200)),
        )
        .unwrap();

    // Wall face at x = 160, half the body is 7 wide
    for _ in 0..120 {
        world.step(1.0);
        assert!(world.entity(id).unwrap().model.pos.x <= 153.0);
    }
    let model = &world.entity(id).unwrap().model;
    assert_eq!(model.pos.x, 153.0);
    assert!(model.contact.wall_right);
    assert_eq!(world.state_of(id), Some(StateId::Idle));
}
