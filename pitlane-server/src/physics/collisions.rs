use pitlane_core::progress::CheckpointIndex;

use crate::physics::bounding_box::BoundingBox;
use crate::physics::sensors::Obstacle;
use crate::physics::trigger_entity::{TriggerEntity, TriggerEvent};

// What the car ran into during one physics tick
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickEvents {
    pub triggered_checkpoints: Vec<CheckpointIndex>,
    pub wall_collision: bool,
}

// Compare the car's footprint against every trigger and wall. A trigger only
// fires on entry: while the car keeps overlapping the same region it stays in
// `current_triggers` and is not reported again.
pub fn detect_tick_events<'a>(
    car: &BoundingBox,
    triggers: impl Iterator<Item = &'a dyn TriggerEntity>,
    walls: &[Obstacle],
    current_triggers: &mut Vec<TriggerEvent>,
) -> TickEvents {
    let mut events = TickEvents::default();

    let overlapping: Vec<TriggerEvent> = triggers
        .filter(|trigger| trigger.get_bounding_box().is_colliding(car))
        .map(|trigger| trigger.trigger())
        .collect();

    for event in &overlapping {
        if !current_triggers.contains(event) {
            match event {
                TriggerEvent::Checkpoint(index) => events.triggered_checkpoints.push(*index),
            }
        }
    }
    *current_triggers = overlapping;

    events.wall_collision = walls.iter().any(|wall| wall.bounds.is_colliding(car));
    events
}
