pub mod checkpoints;
pub mod episode;
pub mod fleet;
pub mod game;
pub mod map;
pub mod physics;
pub mod policy;
