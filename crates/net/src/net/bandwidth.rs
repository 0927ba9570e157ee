use std::time::{Duration, Instant};

use super::transport::Traffic;

const SAMPLE_WINDOW: Duration = Duration::from_millis(500);

/// Rolling byte-rate sampler fed from transport traffic counters.
#[derive(Debug, Clone)]
pub struct BandwidthMonitor {
    window_start: Instant,
    pending: Traffic,
    last_up: f64,
    last_down: f64,
}

impl BandwidthMonitor {
    pub fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            pending: Traffic::default(),
            last_up: 0.0,
            last_down: 0.0,
        }
    }

    pub fn record(&mut self, traffic: Traffic) {
        self.pending.sent += traffic.sent;
        self.pending.received += traffic.received;
    }

    /// Closes the sample window once it is at least half a second old.
    pub fn update(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < SAMPLE_WINDOW {
            return;
        }
        let secs = elapsed.as_secs_f64();
        self.last_up = self.pending.sent as f64 / secs;
        self.last_down = self.pending.received as f64 / secs;
        self.pending = Traffic::default();
        self.window_start = now;
    }

    /// Bits per second sent during the last closed window.
    pub fn uplink_bps(&self) -> f64 {
        self.last_up * 8.0
    }

    pub fn downlink_bps(&self) -> f64 {
        self.last_down * 8.0
    }
}
