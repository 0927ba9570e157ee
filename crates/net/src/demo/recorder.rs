use std::io::Write;
use std::time::Instant;

use crate::net::packet::{PacketType, ProtocolVersion, REPLAY_SPECTATOR_ID};

use super::file::{DemoError, DemoWriter};

/// Mirrors live traffic into a demo log.
///
/// Failures only stop the recording; they never reach packet handling.
pub struct DemoRecorder {
    writer: Option<DemoWriter<Box<dyn Write>>>,
    started: Instant,
}

impl DemoRecorder {
    pub fn start(
        out: Box<dyn Write>,
        protocol: ProtocolVersion,
        now: Instant,
    ) -> Result<Self, DemoError> {
        log::info!("Demo recording started ({protocol})");
        Ok(Self {
            writer: Some(DemoWriter::new(out, protocol)?),
            started: now,
        })
    }

    pub fn is_active(&self) -> bool {
        self.writer.is_some()
    }

    /// Logs the sends a server never reflects back. Other client packets
    /// reuse tags that mean something else inbound and would corrupt replay.
    pub fn record_outbound(&mut self, data: &[u8], now: Instant) {
        let mirrored = data.first().and_then(|&tag| PacketType::from_tag(tag)).is_some_and(|ty| {
            matches!(
                ty,
                PacketType::InputData
                    | PacketType::WeaponInput
                    | PacketType::WeaponReload
                    | PacketType::SetColour
                    | PacketType::SetTool
                    | PacketType::Grenade
            )
        });
        if mirrored {
            self.write(data, now);
        }
    }

    /// StateData is logged with the replay spectator as local player.
    pub fn record_inbound(&mut self, data: &[u8], now: Instant) {
        if data.first() == Some(&PacketType::StateData.tag()) && data.len() > 1 {
            let mut copy = data.to_vec();
            copy[1] = REPLAY_SPECTATOR_ID;
            self.write(&copy, now);
        } else {
            self.write(data, now);
        }
    }

    pub fn stop(&mut self) {
        if self.writer.take().is_some() {
            log::info!("Demo recording stopped");
        }
    }

    fn write(&mut self, data: &[u8], now: Instant) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        let time = now.saturating_duration_since(self.started).as_secs_f32();
        if let Err(err) = writer.write_entry(time, data) {
            log::warn!("Demo recording stopped: {err}");
            self.writer = None;
        }
    }
}
