use serde::{Deserialize, Serialize};

use crate::AgentID;

pub type CheckpointIndex = usize;
pub type EpisodeNumber = u32;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    WallCollision,
    // the episode ran past its time budget; no penalty is applied
    Truncated,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeStatus {
    Running,
    // transient; the owner resets the episode before the next tick
    Terminated(TerminationReason),
}

impl EpisodeStatus {
    pub fn is_terminated(&self) -> bool {
        matches!(self, EpisodeStatus::Terminated(_))
    }
}

// Sent out whenever an episode ends, so the trainer knows where the boundary is
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub agent: AgentID,
    pub episode: EpisodeNumber,
    pub reason: TerminationReason,
    pub cumulative_reward: f64,
    pub checkpoints_passed: u32,
    pub elapsed_seconds: f64,
}
