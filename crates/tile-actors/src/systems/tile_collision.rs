use crate::components::entity::{Contact, Model};
use crate::components::tilemap::TileMap;
use glam::Vec2;

/// Move `model` by `delta` against the map's tiles and record contacts.
///
/// The horizontal axis is resolved first, then the vertical one from the
/// new column. A body moving down onto a floor ends with its feet exactly on
/// the floor surface, loses its fall speed and its lift.
pub fn resolve(model: &mut Model, map: &TileMap, delta: Vec2) {
    model.contact = Contact::default();

    if delta.x != 0.0 {
        let rect = model.footprint();
        let dir = delta.x.signum();
        match map.probe_horizontal(&rect, dir, delta.x.abs()) {
            Some(wall) => {
                let half = model.size.x * 0.5;
                if dir > 0.0 {
                    model.pos.x = wall.position - half;
                    model.contact.wall_right = true;
                } else {
                    model.pos.x = wall.position + half;
                    model.contact.wall_left = true;
                }
                let vertical = model.movement.direction_vertical();
                model.movement.set_direction(0.0, vertical);
            }
            None => model.pos.x += delta.x,
        }
    }

    let rect = model.footprint();
    if delta.y >= 0.0 {
        match map.probe_vertical(&rect, 1.0, delta.y) {
            Some(floor) => {
                model.pos.y = floor.position;
                model.contact.ground = Some(floor);
                model.body.land();
                let horizontal = model.jump.direction_horizontal();
                model.jump.set_direction(horizontal, 0.0);
            }
            None => model.pos.y += delta.y,
        }
    } else {
        match map.probe_vertical(&rect, -1.0, -delta.y) {
            Some(ceiling) => {
                model.pos.y = ceiling.position + model.size.y;
                model.contact.ceiling = true;
                let horizontal = model.jump.direction_horizontal();
                model.jump.set_direction(horizontal, 0.0);
            }
            None => model.pos.y += delta.y,
        }
    }
}
