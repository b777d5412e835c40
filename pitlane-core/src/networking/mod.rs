mod connection;
mod packets;

pub use connection::Connection;
pub use packets::*;

// the simulator reads actions and writes observations; a trainer does the opposite
pub type TrainerConnection<S> = Connection<S, SimulatorBoundPacket, TrainerBoundPacket>;
pub type SimulatorConnection<S> = Connection<S, TrainerBoundPacket, SimulatorBoundPacket>;
