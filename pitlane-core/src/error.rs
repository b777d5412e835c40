use thiserror::Error;

use crate::progress::CheckpointIndex;
use crate::vehicle::VehicleClass;

// Everything that can be wrong with how the simulation was set up. These are
// all caught at initialization, except for the checkpoint lookup guard which
// also fires if a corrupted index ever reaches the track.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("failed to read settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("checkpoint track has no checkpoints")]
    EmptyTrack,

    #[error("checkpoint index {index} is out of range for a track of {len} checkpoints")]
    CheckpointOutOfRange { index: CheckpointIndex, len: usize },

    #[error("unsupported ray count {0}, expected 8 or 16")]
    UnsupportedRayCount(usize),

    #[error("spawn bounds on the {axis} axis are degenerate: [{min}, {max}]")]
    DegenerateSpawnBounds {
        axis: &'static str,
        min: f64,
        max: f64,
    },

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be zero or positive, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("drift factor {value} of {class:?} is outside [0, 1]")]
    DriftFactorOutOfRange { class: VehicleClass, value: f64 },

    #[error("decision interval must be at least one physics tick")]
    ZeroDecisionInterval,

    #[error("the fleet needs at least one agent")]
    NoAgents,
}

#[derive(Debug, Error)]
pub enum PacketError {
    #[error("connection i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode or decode packet: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("packet of {0} bytes does not fit in a frame")]
    TooLarge(u64),

    #[error("peer closed the connection")]
    ConnectionClosed,
}
