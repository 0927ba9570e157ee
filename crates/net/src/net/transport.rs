use std::time::Duration;

use thiserror::Error;

use super::address::ServerAddress;
use super::packet::ProtocolVersion;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to open connection to {0}")]
    ConnectFailed(String),
    #[error("no active connection")]
    NotOpen,
    #[error("send failed: {0}")]
    SendFailed(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Connected,
    Received(Vec<u8>),
    Disconnected { code: u32 },
}

/// Byte counters accumulated since the last `take_traffic` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Traffic {
    pub sent: u64,
    pub received: u64,
}

/// Reliable/ordered datagram session to one server.
///
/// `connect` passes the protocol number as connect data, which is how servers
/// tell 0.75 and 0.76 clients apart.
pub trait Transport {
    fn connect(
        &mut self,
        address: &ServerAddress,
        protocol: ProtocolVersion,
    ) -> Result<(), TransportError>;

    fn disconnect(&mut self);

    /// Waits at most `timeout` for the next event.
    fn service(&mut self, timeout: Duration) -> Result<Option<TransportEvent>, TransportError>;

    /// Queues `data` for reliable, in-order delivery.
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError>;

    fn round_trip_time(&self) -> Option<Duration>;

    fn take_traffic(&mut self) -> Traffic;
}
