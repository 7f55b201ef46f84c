pub mod effects;
pub mod hits;
pub mod tile_collision;
pub mod tracking;
