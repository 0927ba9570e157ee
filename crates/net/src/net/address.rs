use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use thiserror::Error;

use super::packet::{DEFAULT_PORT, ProtocolVersion};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("empty address")]
    Empty,
    #[error("invalid port '{0}'")]
    InvalidPort(String),
    #[error("invalid aos:// host '{0}'")]
    InvalidAosHost(String),
    #[error("unsupported protocol version '{0}'")]
    UnsupportedVersion(String),
}

/// Server endpoint plus the protocol variant to speak.
///
/// Accepts `aos://<ip as u32>:<port>[:0.75|0.76]` as served by master lists,
/// and plain `host[:port][:version]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    pub host: String,
    pub port: u16,
    pub protocol: ProtocolVersion,
}

impl ServerAddress {
    pub fn new(host: impl Into<String>, port: u16, protocol: ProtocolVersion) -> Self {
        Self {
            host: host.into(),
            port,
            protocol,
        }
    }
}

fn parse_version(text: &str) -> Result<ProtocolVersion, AddressError> {
    match text {
        "0.75" | "75" => Ok(ProtocolVersion::V075),
        "0.76" | "76" => Ok(ProtocolVersion::V076),
        other => Err(AddressError::UnsupportedVersion(other.to_string())),
    }
}

impl FromStr for ServerAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (is_aos, rest) = match s.strip_prefix("aos://") {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        if rest.is_empty() {
            return Err(AddressError::Empty);
        }

        let mut parts = rest.split(':');
        let raw_host = parts.next().unwrap_or_default();
        let port = match parts.next() {
            Some(p) => p
                .parse::<u16>()
                .map_err(|_| AddressError::InvalidPort(p.to_string()))?,
            None => DEFAULT_PORT,
        };
        let protocol = match parts.next() {
            Some(v) => parse_version(v)?,
            None => ProtocolVersion::V075,
        };
        if let Some(extra) = parts.next() {
            return Err(AddressError::UnsupportedVersion(extra.to_string()));
        }

        let host = if is_aos {
            let packed = raw_host
                .parse::<u32>()
                .map_err(|_| AddressError::InvalidAosHost(raw_host.to_string()))?;
            Ipv4Addr::from(packed.to_le_bytes()).to_string()
        } else {
            raw_host.to_string()
        };

        Ok(Self {
            host,
            port,
            protocol,
        })
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", self.host, self.port, self.protocol)
    }
}
