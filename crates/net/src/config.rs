use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Version numbers reported to servers that ask for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientVersion {
    pub major: u8,
    pub minor: u8,
    pub revision: u8,
    pub app_name: String,
    /// Free-form line sent with the simple version reply.
    pub info: String,
}

impl Default for ClientVersion {
    fn default() -> Self {
        let major = env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap_or(0);
        let minor = env!("CARGO_PKG_VERSION_MINOR").parse().unwrap_or(0);
        let revision = env!("CARGO_PKG_VERSION_PATCH").parse().unwrap_or(0);
        Self {
            major,
            minor,
            revision,
            app_name: "spadenet".to_string(),
            info: format!(
                "spadenet {}.{}.{} {}",
                major,
                minor,
                revision,
                std::env::consts::OS
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Allow the UTF-8 escape in outgoing strings.
    pub unicode: bool,
    /// Record every connection into a new file under `demo_dir`.
    pub record_demo: bool,
    pub demo_dir: PathBuf,
    pub player_name: String,
    pub locale: String,
    /// Longest `NetClient::do_events` waits for the first transport event.
    pub service_timeout: Duration,
    /// Ticks to wait after MapStart before trying to load anyway.
    pub initial_map_load_ticks: u32,
    /// Ticks to wait for more chunks after each chunk or failed load.
    pub map_load_retry_ticks: u32,
    /// Retries stop once this many packets are held for the next world.
    pub max_saved_packets: usize,
    pub client_version: ClientVersion,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            unicode: true,
            record_demo: false,
            demo_dir: PathBuf::from("Demos"),
            player_name: "Deuce".to_string(),
            locale: "en_US".to_string(),
            service_timeout: Duration::from_millis(1),
            initial_map_load_ticks: 30,
            map_load_retry_ticks: 200,
            max_saved_packets: 400,
            client_version: ClientVersion::default(),
        }
    }
}
