use glam::DVec2;

use crate::physics::bounding_box::BoundingBox;

pub trait TriggerEntity {
    fn pos(&self) -> DVec2;
    fn get_bounding_box(&self) -> BoundingBox;
    fn trigger(&self) -> TriggerEvent;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TriggerEvent {
    Checkpoint(pitlane_core::progress::CheckpointIndex),
}
