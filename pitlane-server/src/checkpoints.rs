use glam::DVec2;
use pitlane_core::error::ConfigurationError;
use pitlane_core::progress::CheckpointIndex;

use crate::physics::bounding_box::BoundingBox;
use crate::physics::trigger_entity::{TriggerEntity, TriggerEvent};

#[derive(Clone, Debug, PartialEq)]
pub struct Checkpoint {
    pub index: CheckpointIndex,
    pub name: String,
    pub bounds: BoundingBox,
}

impl Checkpoint {
    pub fn new(index: CheckpointIndex, name: String, bounds: BoundingBox) -> Self {
        Self {
            index,
            name,
            bounds,
        }
    }
}

impl TriggerEntity for Checkpoint {
    fn pos(&self) -> DVec2 {
        self.bounds.pos()
    }

    fn get_bounding_box(&self) -> BoundingBox {
        self.bounds
    }

    fn trigger(&self) -> TriggerEvent {
        TriggerEvent::Checkpoint(self.index)
    }
}

// How a checkpoint hit relates to the checkpoint the agent was heading for
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CheckpointHit {
    OnTarget,
    OutOfOrder { distance: usize },
}

// The ordered lap. Index N-1 is followed by index 0. Shared read-only by every
// agent once built, and never empty.
#[derive(Clone, Debug)]
pub struct CheckpointTrack {
    checkpoints: Vec<Checkpoint>,
}

impl CheckpointTrack {
    pub fn new(checkpoints: Vec<Checkpoint>) -> Result<CheckpointTrack, ConfigurationError> {
        if checkpoints.is_empty() {
            return Err(ConfigurationError::EmptyTrack);
        }

        // the position in the list is the authoritative lap order
        let checkpoints = checkpoints
            .into_iter()
            .enumerate()
            .map(|(index, checkpoint)| Checkpoint { index, ..checkpoint })
            .collect();

        Ok(CheckpointTrack { checkpoints })
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Checkpoint> {
        self.checkpoints.iter()
    }

    pub fn triggers(&self) -> impl Iterator<Item = &dyn TriggerEntity> {
        self.checkpoints
            .iter()
            .map(|checkpoint| checkpoint as &dyn TriggerEntity)
    }

    // an index outside the track means something upstream is broken, not a
    // value to wrap around
    pub fn get(&self, index: CheckpointIndex) -> Result<&Checkpoint, ConfigurationError> {
        self.checkpoints
            .get(index)
            .ok_or(ConfigurationError::CheckpointOutOfRange {
                index,
                len: self.checkpoints.len(),
            })
    }

    pub fn next_index_after(&self, index: CheckpointIndex) -> CheckpointIndex {
        (index + 1) % self.len()
    }

    // number of steps between two checkpoints going whichever way round is shorter
    pub fn cyclic_distance(&self, a: CheckpointIndex, b: CheckpointIndex) -> usize {
        let n = self.len();
        let (a, b) = (a % n, b % n);
        let forward = (a + n - b) % n;
        let backward = (b + n - a) % n;
        forward.min(backward)
    }

    pub fn classify(&self, triggered: CheckpointIndex, expected: CheckpointIndex) -> CheckpointHit {
        if triggered == expected {
            CheckpointHit::OnTarget
        } else {
            CheckpointHit::OutOfOrder {
                distance: self.cyclic_distance(triggered, expected),
            }
        }
    }
}
