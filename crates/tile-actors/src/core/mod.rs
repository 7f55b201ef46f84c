pub mod force;
pub mod geometry;
pub mod physics;
pub mod rng;
pub mod scene;
pub mod time;
