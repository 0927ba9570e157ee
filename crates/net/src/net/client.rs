use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use glam::{IVec3, Vec3};

use crate::config::ClientConfig;
use crate::demo::recorder::DemoRecorder;
use crate::game::sink::{MapCodec, SimulationSink};

use super::address::ServerAddress;
use super::bandwidth::BandwidthMonitor;
use super::codec::PacketWriter;
use super::error::{DisconnectReason, NetError};
use super::packet::{BlockActionType, Color, HitType, PacketType, PlayerInput, Tool, WeaponInput, WeaponType};
use super::session::{ConnectionStatus, Session, SessionEvent};
use super::transport::{Transport, TransportEvent};

/// Live connection to one server.
pub struct NetClient<T, S, C> {
    transport: T,
    session: Session<S, C>,
    recorder: Option<DemoRecorder>,
    bandwidth: BandwidthMonitor,
    last_player_input: Option<PlayerInput>,
    last_weapon_input: Option<WeaponInput>,
}

impl<T, S, C> NetClient<T, S, C>
where
    T: Transport,
    S: SimulationSink,
    C: MapCodec<Map = S::Map>,
{
    pub fn new(transport: T, sink: S, codec: C, config: ClientConfig) -> Self {
        Self {
            transport,
            session: Session::new(sink, codec, config),
            recorder: None,
            bandwidth: BandwidthMonitor::new(Instant::now()),
            last_player_input: None,
            last_weapon_input: None,
        }
    }

    pub fn connect(&mut self, address: &ServerAddress) -> Result<(), NetError> {
        self.disconnect();
        log::info!("Connecting to {address} (protocol {})", address.protocol);

        self.session.begin(address.protocol, false);
        self.last_player_input = None;
        self.last_weapon_input = None;
        self.bandwidth = BandwidthMonitor::new(Instant::now());
        if let Err(err) = self.transport.connect(address, address.protocol) {
            log::error!("Failed to connect: {err}");
            self.session.close("Error");
            return Err(err.into());
        }
        if self.session.config().record_demo {
            self.record_to_demo_dir();
        }
        Ok(())
    }

    /// Starts recording into `<demo_dir>/<unix seconds>.demo`. A file that
    /// cannot be created only costs the recording.
    fn record_to_demo_dir(&mut self) {
        let dir = self.session.config().demo_dir.clone();
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let path = dir.join(format!("{stamp}.demo"));
        let file = match fs::create_dir_all(&dir).and_then(|()| File::create(&path)) {
            Ok(file) => file,
            Err(err) => {
                log::warn!("Cannot create demo file {}: {err}", path.display());
                return;
            }
        };
        match self.start_recording(Box::new(BufWriter::new(file))) {
            Ok(()) => log::info!("Recording demo to {}", path.display()),
            Err(err) => log::warn!("Cannot record demo to {}: {err}", path.display()),
        }
    }

    pub fn disconnect(&mut self) {
        if self.session.status() == ConnectionStatus::NotConnected {
            return;
        }
        log::info!("Disconnecting");
        self.transport.disconnect();
        self.session.close("Not connected");
        self.stop_recording();
    }

    /// Mirrors traffic into `out` until stopped or disconnected.
    pub fn start_recording(&mut self, out: Box<dyn Write>) -> Result<(), NetError> {
        let recorder = DemoRecorder::start(out, self.session.protocol(), Instant::now())?;
        self.recorder = Some(recorder);
        Ok(())
    }

    pub fn stop_recording(&mut self) {
        if let Some(mut recorder) = self.recorder.take() {
            recorder.stop();
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.as_ref().is_some_and(DemoRecorder::is_active)
    }

    pub fn status(&self) -> ConnectionStatus {
        self.session.status()
    }

    pub fn status_text(&self) -> &str {
        self.session.status_text()
    }

    pub fn session(&self) -> &Session<S, C> {
        &self.session
    }

    pub fn sink(&self) -> &S {
        self.session.sink()
    }

    pub fn sink_mut(&mut self) -> &mut S {
        self.session.sink_mut()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn bandwidth(&self) -> &BandwidthMonitor {
        &self.bandwidth
    }

    /// Round trip time in milliseconds once measured.
    pub fn ping(&self) -> Option<u32> {
        if self.session.status() == ConnectionStatus::NotConnected {
            return None;
        }
        let rtt = self.transport.round_trip_time()?;
        let ms = rtt.as_millis().min(u32::MAX as u128) as u32;
        (ms > 0).then_some(ms)
    }

    /// Drains transport events, advances the map-load countdown once and
    /// sends queued replies. Waits at most the configured service timeout
    /// for the first event.
    pub fn do_events(&mut self) -> Result<Vec<SessionEvent>, NetError> {
        let mut events = Vec::new();
        if self.session.status() == ConnectionStatus::NotConnected {
            return Ok(events);
        }
        self.bandwidth.record(self.transport.take_traffic());
        self.bandwidth.update(Instant::now());

        let mut wait = self.session.config().service_timeout;
        loop {
            let event = match self.transport.service(wait) {
                Ok(event) => event,
                Err(err) => {
                    log::error!("Transport failure: {err}");
                    self.fail();
                    return Err(err.into());
                }
            };
            wait = Duration::ZERO;
            match event {
                None => break,
                Some(TransportEvent::Connected) => {
                    log::info!("Connection established");
                    self.session.transport_connected();
                }
                Some(TransportEvent::Received(data)) => {
                    if let Some(recorder) = self.recorder.as_mut() {
                        recorder.record_inbound(&data, Instant::now());
                    }
                    let handled = self.session.handle_packet(&data);
                    self.settle(handled, &mut events)?;
                }
                Some(TransportEvent::Disconnected { code }) => {
                    let reason = DisconnectReason::from_code(code);
                    log::info!("Disconnected (data = {code:#010x}): {reason}");
                    self.session.close(format!("Disconnected: {reason}"));
                    self.stop_recording();
                    return Err(NetError::Disconnected(reason));
                }
            }
        }

        let ticked = self.session.tick();
        self.settle(ticked, &mut events)?;
        self.flush()?;
        Ok(events)
    }

    fn settle(
        &mut self,
        result: Result<Vec<SessionEvent>, NetError>,
        events: &mut Vec<SessionEvent>,
    ) -> Result<(), NetError> {
        match result {
            Ok(new_events) => {
                for event in &new_events {
                    if let SessionEvent::LocalPlayerCreated(_) = event {
                        self.last_player_input = None;
                        self.last_weapon_input = None;
                    }
                }
                events.extend(new_events);
                Ok(())
            }
            Err(err) if err.is_packet_local() => {
                log::warn!("Dropped packet: {err}");
                Ok(())
            }
            Err(err) => {
                self.fail();
                Err(err)
            }
        }
    }

    fn fail(&mut self) {
        self.transport.disconnect();
        self.session.close("Error");
        self.stop_recording();
    }

    fn flush(&mut self) -> Result<(), NetError> {
        for packet in self.session.take_outbound() {
            self.send(packet)?;
        }
        Ok(())
    }

    fn send(&mut self, packet: Vec<u8>) -> Result<(), NetError> {
        if self.session.status() == ConnectionStatus::NotConnected {
            return Err(NetError::NotConnected);
        }
        self.transport.send(&packet)?;
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.record_outbound(&packet, Instant::now());
        }
        Ok(())
    }

    fn local_player(&self) -> Result<u8, NetError> {
        self.session
            .dispatcher()
            .local_player()
            .ok_or(NetError::NoLocalPlayer)
    }

    fn writer(&self, packet_type: PacketType) -> PacketWriter {
        PacketWriter::new(packet_type).unicode(self.session.config().unicode)
    }

    /// Joins (or rejoins) the game with the team's color.
    pub fn send_join(
        &mut self,
        team: u8,
        weapon: WeaponType,
        name: &str,
        kills: u32,
    ) -> Result<(), NetError> {
        let id = self.local_player()?;
        let color = self.session.dispatcher().team_color(team);
        let mut w = self.writer(PacketType::ExistingPlayer);
        w.write_u8(id)
            .write_u8(team)
            .write_u8(weapon as u8)
            .write_u8(Tool::Weapon as u8)
            .write_u32(kills)
            .write_color(color)
            .write_fixed_str(name, 16);
        self.send(w.into_bytes())
    }

    pub fn send_position(&mut self, position: Vec3) -> Result<(), NetError> {
        let mut w = self.writer(PacketType::PositionData);
        w.write_vec3(position);
        self.send(w.into_bytes())
    }

    pub fn send_orientation(&mut self, front: Vec3) -> Result<(), NetError> {
        let mut w = self.writer(PacketType::OrientationData);
        w.write_vec3(front);
        self.send(w.into_bytes())
    }

    /// Unchanged input is not resent.
    pub fn send_player_input(&mut self, input: PlayerInput) -> Result<(), NetError> {
        if self.last_player_input == Some(input) {
            return Ok(());
        }
        let id = self.local_player()?;
        let mut w = self.writer(PacketType::InputData);
        w.write_u8(id).write_u8(input.bits());
        self.send(w.into_bytes())?;
        self.last_player_input = Some(input);
        Ok(())
    }

    /// Unchanged input is not resent.
    pub fn send_weapon_input(&mut self, input: WeaponInput) -> Result<(), NetError> {
        if self.last_weapon_input == Some(input) {
            return Ok(());
        }
        let id = self.local_player()?;
        let mut w = self.writer(PacketType::WeaponInput);
        w.write_u8(id).write_u8(input.bits());
        self.send(w.into_bytes())?;
        self.last_weapon_input = Some(input);
        Ok(())
    }

    pub fn send_block_action(&mut self, cell: IVec3, action: BlockActionType) -> Result<(), NetError> {
        let id = self.local_player()?;
        let mut w = self.writer(PacketType::BlockAction);
        w.write_u8(id).write_u8(action as u8).write_ivec3(cell);
        self.send(w.into_bytes())
    }

    pub fn send_block_line(&mut self, from: IVec3, to: IVec3) -> Result<(), NetError> {
        let id = self.local_player()?;
        let mut w = self.writer(PacketType::BlockLine);
        w.write_u8(id).write_ivec3(from).write_ivec3(to);
        self.send(w.into_bytes())
    }

    pub fn send_reload(&mut self) -> Result<(), NetError> {
        let id = self.local_player()?;
        let mut w = self.writer(PacketType::WeaponReload);
        // 255/255 marks the request so its echo is not taken as completion.
        w.write_u8(id).write_u8(255).write_u8(255);
        self.send(w.into_bytes())
    }

    pub fn send_held_block_color(&mut self, color: Color) -> Result<(), NetError> {
        let id = self.local_player()?;
        let mut w = self.writer(PacketType::SetColour);
        w.write_u8(id).write_color(color);
        self.send(w.into_bytes())
    }

    pub fn send_tool(&mut self, tool: Tool) -> Result<(), NetError> {
        let id = self.local_player()?;
        let mut w = self.writer(PacketType::SetTool);
        w.write_u8(id).write_u8(tool as u8);
        self.send(w.into_bytes())
    }

    pub fn send_grenade(&mut self, fuse: f32, position: Vec3, velocity: Vec3) -> Result<(), NetError> {
        let id = self.local_player()?;
        let mut w = self.writer(PacketType::Grenade);
        w.write_u8(id)
            .write_f32(fuse)
            .write_vec3(position)
            .write_vec3(velocity);
        self.send(w.into_bytes())
    }

    pub fn send_hit(&mut self, target: u8, hit: HitType) -> Result<(), NetError> {
        let mut w = self.writer(PacketType::HIT);
        w.write_u8(target).write_u8(hit as u8);
        self.send(w.into_bytes())
    }

    pub fn send_chat(&mut self, text: &str, global: bool) -> Result<(), NetError> {
        let id = self.local_player()?;
        let mut w = self.writer(PacketType::ChatMessage);
        w.write_u8(id)
            .write_u8(if global { 0 } else { 1 })
            .write_str(text)
            .write_u8(0);
        self.send(w.into_bytes())
    }

    pub fn send_weapon_change(&mut self, weapon: WeaponType) -> Result<(), NetError> {
        let id = self.local_player()?;
        let mut w = self.writer(PacketType::ChangeWeapon);
        w.write_u8(id).write_u8(weapon as u8);
        self.send(w.into_bytes())
    }

    pub fn send_team_change(&mut self, team: u8) -> Result<(), NetError> {
        let id = self.local_player()?;
        let mut w = self.writer(PacketType::ChangeTeam);
        w.write_u8(id).write_u8(team);
        self.send(w.into_bytes())
    }
}
