use std::io::{Read, Write};

use bincode::{DefaultOptions, Options};
use glam::DVec2;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::agent_inputs::Action;
use crate::error::PacketError;
use crate::observation::Observation;
use crate::progress::{CheckpointIndex, EpisodeSummary};
use crate::AgentID;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum TrainerBoundPacket {
    // Sent once, right after the trainer connects
    Hello {
        agent_count: usize,
        observation_len: usize,
    },

    // One per agent per decision step; the simulator then waits for an Act
    DecisionRequest {
        agent: AgentID,
        observation: Observation,
        cumulative_reward: f64,
        next_checkpoint: CheckpointIndex,
        position: DVec2,
    },

    EpisodeEnded(EpisodeSummary),

    Shutdown,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum SimulatorBoundPacket {
    Act { agent: AgentID, action: Action },
    Disconnect,
}

pub trait Packet: Serialize + DeserializeOwned {
    fn parse_packet<R: Read>(reader: R) -> Result<Self, PacketError> {
        Ok(DefaultOptions::new().deserialize_from(reader)?)
    }

    fn packet_size(&self) -> Result<u64, PacketError> {
        Ok(DefaultOptions::new().serialized_size(self)?)
    }

    // every packet is prefixed by two big-endian bytes holding its payload size
    fn write_packet<W: Write>(&self, mut write: W) -> Result<(), PacketError> {
        let size = self.packet_size()?;
        if size > u16::MAX as u64 {
            return Err(PacketError::TooLarge(size));
        }

        write.write_all(&[(size >> 8) as u8, size as u8])?;
        DefaultOptions::new().serialize_into(&mut write, self)?;
        Ok(())
    }

    fn read_packet<R: Read>(mut read: R) -> Result<Self, PacketError> {
        let mut buffer: [u8; 2] = [0, 0];
        read.read_exact(&mut buffer)?;
        let packet_size = ((buffer[0] as u16) << 8) | buffer[1] as u16;

        Self::parse_packet(read.take(packet_size as u64))
    }
}

impl Packet for TrainerBoundPacket {}
impl Packet for SimulatorBoundPacket {}
