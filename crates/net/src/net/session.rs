use std::collections::{BTreeSet, VecDeque};

use crate::config::ClientConfig;
use crate::game::dispatch::{Dispatcher, Signal};
use crate::game::sink::{MapCodec, SimulationSink};

use super::codec::{PacketReader, PacketWriter};
use super::error::{MapDecodeError, NetError};
use super::handshake;
use super::packet::{PacketType, ProtocolVersion};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    NotConnected,
    Connecting,
    ReceivingMap,
    Connected,
}

/// Lifecycle notifications produced while handling packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    MapTransferStarted { size: u32 },
    MapStillLoading,
    MapLoaded,
    WorldUpdate,
    Joined,
    LocalPlayerCreated(u8),
}

enum LoadOutcome {
    Loaded,
    NeedsMoreData,
}

/// Connection state machine shared by live play and demo replay.
///
/// Owns the map transfer buffer, the packets held back for the next world,
/// the dispatcher caches and the simulation sink. Replies the protocol
/// requires (handshakes, color sync) are queued in `outbound` for the driver
/// to send; in replay they are dropped.
pub struct Session<S, C> {
    config: ClientConfig,
    status: ConnectionStatus,
    status_text: String,
    protocol: ProtocolVersion,
    map_size: usize,
    map_data: Vec<u8>,
    saved_packets: VecDeque<Vec<u8>>,
    map_load_countdown: u32,
    try_load_on_packet: bool,
    dispatcher: Dispatcher,
    sink: S,
    codec: C,
    outbound: Vec<Vec<u8>>,
    replay: bool,
}

impl<S, C> Session<S, C>
where
    S: SimulationSink,
    C: MapCodec<Map = S::Map>,
{
    pub fn new(sink: S, codec: C, config: ClientConfig) -> Self {
        Self {
            config,
            status: ConnectionStatus::NotConnected,
            status_text: "Not connected".to_string(),
            protocol: ProtocolVersion::V075,
            map_size: 0,
            map_data: Vec::new(),
            saved_packets: VecDeque::new(),
            map_load_countdown: 0,
            try_load_on_packet: false,
            dispatcher: Dispatcher::new(ProtocolVersion::V075),
            sink,
            codec,
            outbound: Vec::new(),
            replay: false,
        }
    }

    /// Starts a fresh session waiting for MapStart.
    pub fn begin(&mut self, protocol: ProtocolVersion, replay: bool) {
        self.discard_transient();
        if self.sink.has_world() {
            self.sink.clear_world();
        }
        self.protocol = protocol;
        self.replay = replay;
        self.dispatcher.reset(protocol);
        self.outbound.clear();
        self.status = ConnectionStatus::Connecting;
        self.status_text = if replay {
            "Reading demo file".to_string()
        } else {
            "Connecting to the server".to_string()
        };
    }

    /// Ends the session. Transient buffers and the world are discarded.
    pub fn close(&mut self, status_text: impl Into<String>) {
        self.discard_transient();
        if self.sink.has_world() {
            self.sink.clear_world();
        }
        self.outbound.clear();
        self.status = ConnectionStatus::NotConnected;
        self.status_text = status_text.into();
    }

    fn fail(&mut self) {
        self.close("Error");
    }

    fn discard_transient(&mut self) {
        self.map_size = 0;
        self.map_data.clear();
        self.saved_packets.clear();
        self.map_load_countdown = 0;
        self.try_load_on_packet = false;
    }

    pub fn transport_connected(&mut self) {
        if self.status == ConnectionStatus::Connecting {
            self.status_text = "Awaiting for state".to_string();
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn protocol(&self) -> ProtocolVersion {
        self.protocol
    }

    pub fn is_replay(&self) -> bool {
        self.replay
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Bytes received and bytes announced for the current map transfer.
    pub fn map_progress(&self) -> (usize, usize) {
        (self.map_data.len(), self.map_size)
    }

    pub fn saved_packet_count(&self) -> usize {
        self.saved_packets.len()
    }

    pub fn take_outbound(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.outbound)
    }

    fn queue(&mut self, packet: Vec<u8>) {
        if !self.replay {
            self.outbound.push(packet);
        }
    }

    pub fn handle_packet(&mut self, data: &[u8]) -> Result<Vec<SessionEvent>, NetError> {
        let mut reader = PacketReader::new(data)?;
        let mut events = Vec::new();
        if self.handle_handshake(&mut reader)? {
            return Ok(events);
        }

        match self.status {
            ConnectionStatus::NotConnected => {
                return Err(NetError::UnexpectedPacket {
                    tag: reader.tag(),
                    status: self.status,
                });
            }
            ConnectionStatus::Connecting => {
                if reader.packet_type() != Some(PacketType::MapStart) {
                    log::warn!("Unexpected packet while connecting: {}", reader.dump());
                    return Err(NetError::UnexpectedPacket {
                        tag: reader.tag(),
                        status: self.status,
                    });
                }
                self.start_map_transfer(&mut reader, &mut events)?;
            }
            ConnectionStatus::ReceivingMap => self.receive_during_transfer(&mut reader, &mut events)?,
            ConnectionStatus::Connected => {
                if reader.packet_type() == Some(PacketType::MapStart) {
                    log::info!("Next map");
                    self.sink.clear_world();
                    self.dispatcher.world_cleared();
                    self.start_map_transfer(&mut reader, &mut events)?;
                } else {
                    self.dispatch(&mut reader, &mut events)?;
                }
            }
        }
        Ok(events)
    }

    /// Advances the map-load countdown by one tick.
    pub fn tick(&mut self) -> Result<Vec<SessionEvent>, NetError> {
        let mut events = Vec::new();
        if self.status != ConnectionStatus::ReceivingMap || self.map_load_countdown == 0 {
            return Ok(events);
        }
        self.map_load_countdown -= 1;
        if self.map_load_countdown > 0 {
            return Ok(events);
        }

        match self.try_load_map(&mut events)? {
            LoadOutcome::Loaded => {}
            LoadOutcome::NeedsMoreData if self.saved_packets.len() < self.config.max_saved_packets => {
                self.still_loading(&mut events);
                self.map_load_countdown = self.config.map_load_retry_ticks;
            }
            LoadOutcome::NeedsMoreData => {
                log::error!(
                    "Map transfer stalled with {} packets held back",
                    self.saved_packets.len()
                );
                self.fail();
                return Err(MapDecodeError::NeedsMoreData.into());
            }
        }
        Ok(events)
    }

    /// Dispatches a locally built packet as if it came from the server.
    pub fn inject(&mut self, data: &[u8]) -> Result<Vec<SessionEvent>, NetError> {
        let mut reader = PacketReader::new(data)?;
        let mut events = Vec::new();
        self.dispatch(&mut reader, &mut events)?;
        Ok(events)
    }

    fn handle_handshake(&mut self, reader: &mut PacketReader<'_>) -> Result<bool, NetError> {
        match reader.packet_type() {
            Some(PacketType::HandShakeInit) => {
                let challenge = reader.read_u32()?;
                log::debug!("Sending hand shake back");
                self.queue(handshake::handshake_reply(challenge));
                Ok(true)
            }
            Some(PacketType::VersionGet) => {
                let version = &self.config.client_version;
                let reply = if reader.remaining() > 0 {
                    let properties: BTreeSet<u8> = reader.read_remaining().iter().copied().collect();
                    log::debug!("Sending enhanced version info {properties:?}");
                    handshake::enhanced_version_reply(
                        &properties,
                        version,
                        &self.config.locale,
                        self.config.unicode,
                    )?
                } else {
                    log::debug!("Sending version back");
                    handshake::version_reply(version, self.config.unicode)
                };
                self.queue(reply);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn start_map_transfer(
        &mut self,
        reader: &mut PacketReader<'_>,
        events: &mut Vec<SessionEvent>,
    ) -> Result<(), NetError> {
        let size = reader.read_u32()?;
        log::info!("Map transfer started ({size} bytes)");
        self.map_size = size as usize;
        self.map_data.clear();
        self.status = ConnectionStatus::ReceivingMap;
        self.status_text = "Loading snapshot".to_string();
        self.map_load_countdown = self.config.initial_map_load_ticks;
        self.try_load_on_packet = true;
        events.push(SessionEvent::MapTransferStarted { size });
        Ok(())
    }

    fn receive_during_transfer(
        &mut self,
        reader: &mut PacketReader<'_>,
        events: &mut Vec<SessionEvent>,
    ) -> Result<(), NetError> {
        match reader.packet_type() {
            Some(PacketType::MapChunk) => {
                self.map_data.extend_from_slice(reader.read_remaining());
                self.map_load_countdown = self.config.map_load_retry_ticks;
                self.status_text = format!(
                    "Loading snapshot ({}/{})",
                    self.map_data.len(),
                    self.map_size
                );
                if self.map_data.len() == self.map_size {
                    if let LoadOutcome::NeedsMoreData = self.try_load_map(events)? {
                        self.still_loading(events);
                    }
                }
            }
            // Leftover reloads from the previous round name players that no
            // longer exist.
            Some(PacketType::WeaponReload) => {
                log::debug!("Dropping reload during map transfer");
            }
            Some(ty) if !ty.belongs_to_next_world() && self.try_load_on_packet => {
                log::debug!("Non-chunk packet ends map transfer: {}", reader.dump());
                match self.try_load_map(events)? {
                    LoadOutcome::Loaded => self.dispatch(reader, events)?,
                    LoadOutcome::NeedsMoreData => {
                        self.try_load_on_packet = false;
                        self.still_loading(events);
                        self.saved_packets.push_back(reader.data().to_vec());
                    }
                }
            }
            _ => self.saved_packets.push_back(reader.data().to_vec()),
        }
        Ok(())
    }

    fn still_loading(&mut self, events: &mut Vec<SessionEvent>) {
        self.status = ConnectionStatus::ReceivingMap;
        self.status_text = "Still loading...".to_string();
        events.push(SessionEvent::MapStillLoading);
    }

    fn try_load_map(&mut self, events: &mut Vec<SessionEvent>) -> Result<LoadOutcome, NetError> {
        match self.codec.decode(&self.map_data) {
            Ok(map) => {
                log::info!("Map decoding succeeded ({} bytes)", self.map_data.len());
                self.install_world(map, events)?;
                Ok(LoadOutcome::Loaded)
            }
            Err(MapDecodeError::NeedsMoreData) => {
                log::info!(
                    "Map decoder wants more data ({}/{} bytes)",
                    self.map_data.len(),
                    self.map_size
                );
                Ok(LoadOutcome::NeedsMoreData)
            }
            Err(err) => {
                log::error!("Map decoding failed: {err}");
                self.fail();
                Err(err.into())
            }
        }
    }

    fn install_world(&mut self, map: S::Map, events: &mut Vec<SessionEvent>) -> Result<(), NetError> {
        self.sink.set_world(map);
        self.map_data.clear();
        self.map_size = 0;
        self.map_load_countdown = 0;
        self.dispatcher.world_loaded();
        self.status = ConnectionStatus::Connected;
        self.status_text = "Connected".to_string();
        events.push(SessionEvent::MapLoaded);

        let saved = std::mem::take(&mut self.saved_packets);
        log::info!("World loaded. Processing saved packets ({})", saved.len());
        for packet in saved {
            let mut reader = PacketReader::new(&packet)?;
            if let Err(err) = self.dispatch(&mut reader, events) {
                if !err.is_packet_local() {
                    return Err(err);
                }
                log::warn!("Dropped saved packet: {err}");
            }
        }
        Ok(())
    }

    fn dispatch(
        &mut self,
        reader: &mut PacketReader<'_>,
        events: &mut Vec<SessionEvent>,
    ) -> Result<(), NetError> {
        let signal = self.dispatcher.dispatch(reader, &mut self.sink)?;
        match signal {
            Some(Signal::WorldUpdate) => events.push(SessionEvent::WorldUpdate),
            Some(Signal::Joined) => events.push(SessionEvent::Joined),
            Some(Signal::LocalPlayerCreated(id)) => {
                // Keep the server's idea of our block color in sync.
                if let Some(info) = self.sink.player(id) {
                    let mut w = PacketWriter::new(PacketType::SetColour);
                    w.write_u8(id).write_color(info.block_color);
                    self.queue(w.into_bytes());
                }
                events.push(SessionEvent::LocalPlayerCreated(id));
            }
            None => {}
        }
        Ok(())
    }
}
