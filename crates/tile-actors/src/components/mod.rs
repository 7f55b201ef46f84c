pub mod combat;
pub mod entity;
pub mod launcher;
pub mod patrol;
pub mod tilemap;
pub mod water;
