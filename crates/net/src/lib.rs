pub mod config;
pub mod demo;
pub mod game;
pub mod net;

pub use config::{ClientConfig, ClientVersion};
pub use demo::{DemoCommand, DemoError, DemoPlayer, DemoReader, DemoRecorder, PlaybackState};
pub use game::{Dispatcher, GameEvent, GameMode, MapCodec, PlayerInfo, SimulationSink};
pub use net::{
    ConnectionStatus, DisconnectReason, MapDecodeError, NetClient, NetError, PacketReader,
    PacketType, PacketWriter, ProtocolVersion, ServerAddress, Session, SessionEvent, Transport,
    TransportEvent,
};
