use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};

use glam::DVec2;
use pitlane_core::agent_inputs::Action;
use pitlane_core::error::PacketError;
use pitlane_core::networking::{
    Connection, SimulatorBoundPacket, TrainerBoundPacket, TrainerConnection,
};
use pitlane_core::observation::Observation;
use pitlane_core::progress::{CheckpointIndex, EpisodeSummary};
use pitlane_core::AgentID;
use thiserror::Error;
use tracing::info;

// the heuristic steers this hard per unit of normalized angle
const STEER_GAIN: f32 = 3.0;
// forward ray reading below which the heuristic lifts off the throttle
const BRAKE_READING: f32 = 0.4;
const CAUTIOUS_THROTTLE: f32 = 0.2;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error(transparent)]
    Packet(#[from] PacketError),

    #[error("could not accept a trainer connection: {0}")]
    Io(#[from] std::io::Error),

    #[error("asked agent {expected} for an action but the trainer answered for agent {actual}")]
    AgentMismatch { expected: AgentID, actual: AgentID },

    #[error("trainer disconnected")]
    Disconnected,
}

// What a policy gets to see when it is asked for a decision
pub struct DecisionRequest<'a> {
    pub agent: AgentID,
    pub observation: &'a Observation,
    pub cumulative_reward: f64,
    pub next_checkpoint: CheckpointIndex,
    pub position: DVec2,
}

pub trait Policy {
    fn act(&mut self, request: &DecisionRequest) -> Result<Action, PolicyError>;

    fn episode_ended(&mut self, _summary: &EpisodeSummary) -> Result<(), PolicyError> {
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), PolicyError> {
        Ok(())
    }
}

impl<P: Policy + ?Sized> Policy for Box<P> {
    fn act(&mut self, request: &DecisionRequest) -> Result<Action, PolicyError> {
        (**self).act(request)
    }

    fn episode_ended(&mut self, summary: &EpisodeSummary) -> Result<(), PolicyError> {
        (**self).episode_ended(summary)
    }

    fn shutdown(&mut self) -> Result<(), PolicyError> {
        (**self).shutdown()
    }
}

// Steers toward the next checkpoint and backs off when a wall is close ahead.
// Good enough to keep a fleet moving without a trainer attached.
#[derive(Default)]
pub struct HeuristicPolicy;

impl Policy for HeuristicPolicy {
    fn act(&mut self, request: &DecisionRequest) -> Result<Action, PolicyError> {
        let observation = request.observation;

        // a positive angle means the checkpoint is to the left, and a positive
        // steer turns clockwise
        let steer = -observation.signed_angle() * STEER_GAIN;

        let ahead = observation.rays().first().copied().unwrap_or(1.0);
        let throttle = if ahead < BRAKE_READING {
            CAUTIOUS_THROTTLE
        } else {
            1.0
        };

        Ok(Action::new(throttle, steer).clamped())
    }
}

// Forwards every decision to an external trainer over a framed packet stream
pub struct RemotePolicy<S: Read + Write> {
    connection: TrainerConnection<S>,
}

impl RemotePolicy<TcpStream> {
    // blocks until one trainer connects
    pub fn listen(
        address: &str,
        agent_count: usize,
        observation_len: usize,
    ) -> Result<Self, PolicyError> {
        let listener = TcpListener::bind(address)?;
        info!("waiting for a trainer on {}", address);

        let (socket, peer) = listener.accept()?;
        info!("trainer connected from {}", peer.ip());

        RemotePolicy::new(Connection::from_tcp(socket)?, agent_count, observation_len)
    }
}

impl<S: Read + Write> RemotePolicy<S> {
    pub fn new(
        mut connection: TrainerConnection<S>,
        agent_count: usize,
        observation_len: usize,
    ) -> Result<Self, PolicyError> {
        connection.push_outgoing(TrainerBoundPacket::Hello {
            agent_count,
            observation_len,
        });
        connection.sync_outgoing()?;
        Ok(RemotePolicy { connection })
    }

    pub fn into_connection(self) -> TrainerConnection<S> {
        self.connection
    }
}

impl<S: Read + Write> Policy for RemotePolicy<S> {
    fn act(&mut self, request: &DecisionRequest) -> Result<Action, PolicyError> {
        let reply = self.connection.exchange(TrainerBoundPacket::DecisionRequest {
            agent: request.agent,
            observation: request.observation.clone(),
            cumulative_reward: request.cumulative_reward,
            next_checkpoint: request.next_checkpoint,
            position: request.position,
        })?;

        match reply {
            SimulatorBoundPacket::Act { agent, action } if agent == request.agent => Ok(action),
            SimulatorBoundPacket::Act { agent, .. } => Err(PolicyError::AgentMismatch {
                expected: request.agent,
                actual: agent,
            }),
            SimulatorBoundPacket::Disconnect => Err(PolicyError::Disconnected),
        }
    }

    // queued; goes out together with the next decision request
    fn episode_ended(&mut self, summary: &EpisodeSummary) -> Result<(), PolicyError> {
        self.connection
            .push_outgoing(TrainerBoundPacket::EpisodeEnded(*summary));
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), PolicyError> {
        self.connection.push_outgoing(TrainerBoundPacket::Shutdown);
        self.connection.sync_outgoing()?;
        Ok(())
    }
}
