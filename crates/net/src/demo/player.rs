use std::io::{Read, Seek};

use crate::config::ClientConfig;
use crate::game::sink::{FollowTarget, MapCodec, SimulationSink};
use crate::net::codec::PacketWriter;
use crate::net::error::NetError;
use crate::net::packet::{PacketType, REPLAY_SPECTATOR_ID, SPECTATOR_TEAM};
use crate::net::session::{ConnectionStatus, Session, SessionEvent};

use super::clock::{ClockEffect, DemoClock};
use super::command::DemoCommand;
use super::file::{DemoEntry, DemoReader, format_duration};

const END_OF_RECORDING: &str = "Demo Ended: End of Recording reached";
/// Players facing nowhere have not been placed yet and make poor follow
/// targets.
const MIN_FOLLOW_FRONT_SQ: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
    Ended,
}

/// Replays a demo log through a [`Session`] in place of a transport.
pub struct DemoPlayer<R, S, C> {
    reader: DemoReader<R>,
    /// Entry read ahead of time that is not due yet.
    pending: Option<DemoEntry>,
    session: Session<S, C>,
    clock: DemoClock,
    saved_follow: Option<FollowTarget>,
    duration: String,
    ended: bool,
}

impl<R, S, C> DemoPlayer<R, S, C>
where
    R: Read + Seek,
    S: SimulationSink,
    C: MapCodec<Map = S::Map>,
{
    pub fn open(source: R, sink: S, codec: C, config: ClientConfig, now: f64) -> Result<Self, NetError> {
        let mut reader = DemoReader::open(source)?;
        let duration = format_duration(reader.scan_duration()?);
        let protocol = reader.protocol();
        log::info!("Replaying {protocol} demo, length {duration}");

        let mut session = Session::new(sink, codec, config);
        session.begin(protocol, true);
        Ok(Self {
            reader,
            pending: None,
            session,
            clock: DemoClock::new(now),
            saved_follow: None,
            duration,
            ended: false,
        })
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

    pub fn clock(&self) -> &DemoClock {
        &self.clock
    }

    /// Length of the recording as `hh:mm:ss`.
    pub fn duration(&self) -> &str {
        &self.duration
    }

    /// Replay time as `hh:mm:ss`.
    pub fn position(&self) -> String {
        format_duration(self.clock.delta() as f32)
    }

    pub fn state(&self) -> PlaybackState {
        if self.ended {
            PlaybackState::Ended
        } else if self.clock.is_paused() {
            PlaybackState::Paused
        } else {
            PlaybackState::Playing
        }
    }

    /// Replays every entry due at `now` (seconds, monotonic).
    pub fn poll(&mut self, now: f64) -> Result<PlaybackState, NetError> {
        if self.ended {
            return Ok(PlaybackState::Ended);
        }
        if !self.clock.is_running() {
            return Ok(PlaybackState::Paused);
        }

        let ticked = self.session.tick();
        self.settle(ticked, now)?;

        let receiving_map = self.session.status() == ConnectionStatus::ReceivingMap;
        if let Some(effect) = self.clock.finish_time_skip(receiving_map) {
            self.apply(effect)?;
        }

        while self.clock.is_running() {
            let entry = match self.pending.take() {
                Some(entry) => entry,
                None => match self.reader.next_entry()? {
                    Some(entry) => entry,
                    None => {
                        self.end();
                        return Ok(PlaybackState::Ended);
                    }
                },
            };
            if !self.clock.is_due(entry.time, now) {
                self.pending = Some(entry);
                break;
            }
            self.clock.entry_read(entry.time);
            if self.clock.drops_grenades() && entry.data.first() == Some(&PacketType::Grenade.tag()) {
                continue;
            }
            let handled = self.session.handle_packet(&entry.data);
            self.settle(handled, now)?;
        }
        Ok(self.state())
    }

    /// Runs a chat line as a playback command. Returns whether it was one.
    pub fn command(&mut self, text: &str, now: f64) -> Result<bool, NetError> {
        match DemoCommand::parse(text) {
            Ok(command) => {
                self.execute(command, now)?;
                Ok(true)
            }
            Err(err) => {
                log::debug!("'{text}': {err}");
                Ok(false)
            }
        }
    }

    pub fn execute(&mut self, command: DemoCommand, now: f64) -> Result<(), NetError> {
        log::debug!("Demo command {command:?}");
        let effects = match command {
            DemoCommand::TogglePause => {
                self.clock.toggle_pause(now);
                Vec::new()
            }
            DemoCommand::Unpause => {
                if self.clock.is_paused() {
                    self.clock.unpause(now, true);
                }
                Vec::new()
            }
            DemoCommand::Speed(speed) => {
                if !self.clock.set_speed(speed, now) {
                    log::info!("Replay speed {speed} out of range");
                }
                Vec::new()
            }
            DemoCommand::Goto(secs) => self.clock.goto(secs, now),
            DemoCommand::Forward(secs) => self.clock.forward(secs, now),
            DemoCommand::Backward(secs) => self.clock.backward(secs, now),
            DemoCommand::NextUpdates(count) => self.clock.next_updates(count, now),
            DemoCommand::PrevUpdates(count) => self.clock.prev_updates(count, now),
        };
        for effect in effects {
            self.apply(effect)?;
        }
        Ok(())
    }

    fn settle(
        &mut self,
        result: Result<Vec<SessionEvent>, NetError>,
        now: f64,
    ) -> Result<(), NetError> {
        match result {
            Ok(events) => {
                for event in events {
                    self.on_event(event, now)?;
                }
                Ok(())
            }
            Err(err) if err.is_packet_local() => {
                log::warn!("Skipping demo packet: {err}");
                Ok(())
            }
            Err(err) => {
                log::error!("Demo playback stopped: {err}");
                self.ended = true;
                Err(err)
            }
        }
    }

    fn on_event(&mut self, event: SessionEvent, now: f64) -> Result<(), NetError> {
        match event {
            SessionEvent::MapTransferStarted { .. } | SessionEvent::MapStillLoading => {
                self.clock.skip_map();
            }
            SessionEvent::WorldUpdate => {
                if let Some(effect) = self.clock.world_update(now) {
                    self.apply(effect)?;
                }
            }
            SessionEvent::Joined => self.join(now)?,
            SessionEvent::MapLoaded | SessionEvent::LocalPlayerCreated(_) => {}
        }
        Ok(())
    }

    /// Inserts the replay viewer as a spectator in the recorded slot.
    fn join(&mut self, now: f64) -> Result<(), NetError> {
        let config = self.session.config();
        let color = self.session.dispatcher().team_color(SPECTATOR_TEAM);
        let mut w = PacketWriter::new(PacketType::ExistingPlayer).unicode(config.unicode);
        w.write_u8(REPLAY_SPECTATOR_ID)
            .write_u8(SPECTATOR_TEAM)
            .write_u8(0)
            .write_u8(2)
            .write_u32(0)
            .write_color(color)
            .write_fixed_str(&config.player_name, 16);
        let packet = w.into_bytes();

        let injected = self.session.inject(&packet);
        self.settle(injected, now)?;
        let effect = self.clock.joined(now);
        self.apply(effect)
    }

    fn apply(&mut self, effect: ClockEffect) -> Result<(), NetError> {
        match effect {
            ClockEffect::SaveFollow => {
                self.saved_follow = self.session.sink().follow_target();
            }
            ClockEffect::RestoreFollow => self.restore_follow(),
            ClockEffect::Rewind => {
                log::debug!("Rewinding demo");
                self.pending = None;
                self.reader.rewind()?;
                let protocol = self.reader.protocol();
                self.session.begin(protocol, true);
            }
        }
        Ok(())
    }

    fn restore_follow(&mut self) {
        let Some(target) = self.saved_follow else {
            return;
        };
        let sink = self.session.sink_mut();
        if !sink.has_world() {
            return;
        }
        match sink.player(target.player_id) {
            Some(info) if !info.is_spectator() && info.front.length_squared() >= MIN_FOLLOW_FRONT_SQ => {
                sink.set_follow_target(target);
            }
            _ => {}
        }
    }

    fn end(&mut self) {
        log::info!("{END_OF_RECORDING}");
        self.session.close(END_OF_RECORDING);
        self.ended = true;
    }
}
