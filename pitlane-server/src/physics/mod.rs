pub mod bounding_box;
pub mod collisions;
pub mod constants;
pub mod sensors;
pub mod trigger_entity;
pub mod vehicle_entity;
