use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Write};
use std::marker::PhantomData;
use std::net::TcpStream;

use super::Packet;
use crate::error::PacketError;

// A synchronous, framed packet stream. Outgoing packets are queued and flushed
// together; incoming packets are read one at a time, blocking until a whole
// packet has arrived.
pub struct Connection<S: Read + Write, T: Packet, V: Packet> {
    stream: S,
    outgoing_packets: VecDeque<V>,
    incoming: PhantomData<T>,
}

impl<T: Packet, V: Packet> Connection<TcpStream, T, V> {
    pub fn from_tcp(tcp_stream: TcpStream) -> Result<Self, PacketError> {
        // disable the Nagle algorithm, every decision step is a tiny round trip
        tcp_stream.set_nodelay(true)?;
        tcp_stream.set_nonblocking(false)?;
        Ok(Connection::new(tcp_stream))
    }
}

impl<S: Read + Write, T: Packet, V: Packet> Connection<S, T, V> {
    pub fn new(stream: S) -> Self {
        Connection {
            stream,
            outgoing_packets: VecDeque::new(),
            incoming: PhantomData,
        }
    }

    pub fn push_outgoing(&mut self, packet: V) {
        self.outgoing_packets.push_back(packet);
    }

    // send packets on this connection until exhausted
    pub fn sync_outgoing(&mut self) -> Result<(), PacketError> {
        while let Some(packet) = self.outgoing_packets.pop_front() {
            packet.write_packet(&mut self.stream)?;
        }
        self.stream.flush()?;
        Ok(())
    }

    pub fn wait_incoming(&mut self) -> Result<T, PacketError> {
        match T::read_packet(&mut self.stream) {
            Err(PacketError::Io(ref e)) if e.kind() == ErrorKind::UnexpectedEof => {
                Err(PacketError::ConnectionClosed)
            }
            Err(PacketError::Io(ref e)) if e.kind() == ErrorKind::ConnectionReset => {
                Err(PacketError::ConnectionClosed)
            }
            other => other,
        }
    }

    // request/response in one go
    pub fn exchange(&mut self, packet: V) -> Result<T, PacketError> {
        self.push_outgoing(packet);
        self.sync_outgoing()?;
        self.wait_incoming()
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::agent_inputs::Action;
    use crate::networking::{
        SimulatorBoundPacket, SimulatorConnection, TrainerBoundPacket, TrainerConnection,
    };

    #[test]
    fn queued_packets_flush_in_order() {
        let mut connection: TrainerConnection<Cursor<Vec<u8>>> =
            Connection::new(Cursor::new(Vec::new()));
        connection.push_outgoing(TrainerBoundPacket::Hello {
            agent_count: 2,
            observation_len: 22,
        });
        connection.push_outgoing(TrainerBoundPacket::Shutdown);
        connection.sync_outgoing().unwrap();

        let wire = connection.into_inner().into_inner();
        let mut reader = wire.as_slice();
        assert_eq!(
            TrainerBoundPacket::read_packet(&mut reader).unwrap(),
            TrainerBoundPacket::Hello {
                agent_count: 2,
                observation_len: 22
            }
        );
        assert_eq!(
            TrainerBoundPacket::read_packet(&mut reader).unwrap(),
            TrainerBoundPacket::Shutdown
        );
    }

    #[test]
    fn closed_stream_is_reported_as_disconnect() {
        let mut wire: Vec<u8> = Vec::new();
        SimulatorBoundPacket::Act {
            agent: 0,
            action: Action::new(0.5, 0.0),
        }
        .write_packet(&mut wire)
        .unwrap();

        let mut connection: TrainerConnection<Cursor<Vec<u8>>> =
            Connection::new(Cursor::new(wire));
        assert!(matches!(
            connection.wait_incoming(),
            Ok(SimulatorBoundPacket::Act { agent: 0, .. })
        ));
        assert!(matches!(
            connection.wait_incoming(),
            Err(PacketError::ConnectionClosed)
        ));
    }

    #[test]
    fn trainer_side_reads_what_the_simulator_sends() {
        let mut wire: Vec<u8> = Vec::new();
        TrainerBoundPacket::Hello {
            agent_count: 1,
            observation_len: 14,
        }
        .write_packet(&mut wire)
        .unwrap();

        let mut trainer: SimulatorConnection<Cursor<Vec<u8>>> =
            Connection::new(Cursor::new(wire));
        assert_eq!(
            trainer.wait_incoming().unwrap(),
            TrainerBoundPacket::Hello {
                agent_count: 1,
                observation_len: 14
            }
        );

        // the reply lands after the hello on the shared buffer
        trainer.push_outgoing(SimulatorBoundPacket::Disconnect);
        trainer.sync_outgoing().unwrap();
        let cursor = trainer.into_inner();
        let written = cursor.position() as usize;
        let wire = cursor.into_inner();
        let mut reader = &wire[..written];
        TrainerBoundPacket::read_packet(&mut reader).unwrap();
        assert_eq!(
            SimulatorBoundPacket::read_packet(&mut reader).unwrap(),
            SimulatorBoundPacket::Disconnect
        );
    }
}
