pub mod address;
pub mod bandwidth;
pub mod client;
pub mod codec;
pub mod cp437;
pub mod error;
pub mod handshake;
pub mod packet;
pub mod session;
pub mod transport;

pub use address::{AddressError, ServerAddress};
pub use bandwidth::BandwidthMonitor;
pub use client::NetClient;
pub use codec::{PacketReader, PacketWriter, dump_packet};
pub use error::{DisconnectReason, MapDecodeError, NetError};
pub use handshake::VersionProperty;
pub use packet::{
    BlockActionType, ClientFeatures, Color, DEFAULT_PORT, HitType, HurtType, KillType,
    MAX_PLAYER_SLOTS, PacketType, PlayerInput, ProtocolVersion, REPLAY_SPECTATOR_ID,
    SPECTATOR_TEAM, Tool, WeaponInput, WeaponType,
};
pub use session::{ConnectionStatus, Session, SessionEvent};
pub use transport::{Traffic, Transport, TransportError, TransportEvent};
