use thiserror::Error;

use crate::demo::DemoError;

use super::session::ConnectionStatus;
use super::transport::TransportError;

#[derive(Debug, Error)]
pub enum NetError {
    #[error("truncated packet: wanted {wanted} bytes at offset {offset}\n{dump}")]
    TruncatedPacket {
        tag: u8,
        offset: usize,
        wanted: usize,
        dump: String,
    },
    #[error("invalid {field}: {value}\n{dump}")]
    InvalidPacketField {
        field: &'static str,
        value: String,
        dump: String,
    },
    #[error("unexpected packet {tag:#04x} while {status:?}")]
    UnexpectedPacket { tag: u8, status: ConnectionStatus },
    #[error("packet {tag:#04x} requires a loaded world")]
    NoWorld { tag: u8 },
    #[error("patch at {position} outside written range of {len} bytes")]
    InvalidPatch { position: usize, len: usize },
    #[error("map decode failed: {0}")]
    MapDecode(#[from] MapDecodeError),
    #[error("disconnected: {0}")]
    Disconnected(DisconnectReason),
    #[error("transport: {0}")]
    Transport(#[from] TransportError),
    #[error("demo: {0}")]
    Demo(#[from] DemoError),
    #[error("not connected")]
    NotConnected,
    #[error("no local player")]
    NoLocalPlayer,
}

impl NetError {
    /// Failures confined to the packet being processed. The session survives
    /// them; everything else ends it.
    pub fn is_packet_local(&self) -> bool {
        matches!(
            self,
            NetError::TruncatedPacket { .. }
                | NetError::InvalidPacketField { .. }
                | NetError::UnexpectedPacket { .. }
                | NetError::NoWorld { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapDecodeError {
    #[error("map data incomplete")]
    NeedsMoreData,
    #[error("map data corrupt: {0}")]
    Corrupt(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    Banned,
    Kicked,
    IncompatibleVersion,
    ServerFull,
    Unknown(u32),
}

impl DisconnectReason {
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => DisconnectReason::Banned,
            2 | 10 => DisconnectReason::Kicked,
            3 => DisconnectReason::IncompatibleVersion,
            4 => DisconnectReason::ServerFull,
            other => DisconnectReason::Unknown(other),
        }
    }
}

impl std::fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisconnectReason::Banned => f.write_str("You are banned from this server."),
            DisconnectReason::Kicked => f.write_str("You were kicked from this server."),
            DisconnectReason::IncompatibleVersion => {
                f.write_str("Incompatible client protocol version.")
            }
            DisconnectReason::ServerFull => f.write_str("Server full"),
            DisconnectReason::Unknown(code) => write!(f, "Unknown Reason ({code})"),
        }
    }
}
