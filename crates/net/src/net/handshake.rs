use std::collections::BTreeSet;

use crate::config::ClientVersion;

use super::codec::PacketWriter;
use super::error::NetError;
use super::packet::{ClientFeatures, PacketType};

const SIMPLE_VERSION_MARKER: u8 = b'o';
const ENHANCED_VERSION_MARKER: u8 = b'x';

/// Property ids a server may ask for in an enhanced version query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionProperty {
    ApplicationNameAndVersion,
    UserLocale,
    ClientFeatureFlags,
}

impl VersionProperty {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(VersionProperty::ApplicationNameAndVersion),
            1 => Some(VersionProperty::UserLocale),
            2 => Some(VersionProperty::ClientFeatureFlags),
            _ => None,
        }
    }
}

pub fn handshake_reply(challenge: u32) -> Vec<u8> {
    let mut w = PacketWriter::new(PacketType::HandShakeReturn);
    w.write_u32(challenge);
    w.into_bytes()
}

pub fn version_reply(version: &ClientVersion, unicode: bool) -> Vec<u8> {
    let mut w = PacketWriter::new(PacketType::VersionSend).unicode(unicode);
    w.write_u8(SIMPLE_VERSION_MARKER)
        .write_u8(version.major)
        .write_u8(version.minor)
        .write_u8(version.revision)
        .write_str(&version.info);
    w.into_bytes()
}

/// Answer to a VersionGet carrying property ids.
///
/// Each requested property becomes `id, length, payload`; unknown ids get an
/// empty payload. The reply travels under the ExistingPlayer tag.
pub fn enhanced_version_reply(
    properties: &BTreeSet<u8>,
    version: &ClientVersion,
    locale: &str,
    unicode: bool,
) -> Result<Vec<u8>, NetError> {
    let mut w = PacketWriter::new(PacketType::ExistingPlayer).unicode(unicode);
    w.write_u8(ENHANCED_VERSION_MARKER);

    for &id in properties {
        w.write_u8(id);
        let length_at = w.position();
        w.write_u8(0);
        let begin = w.position();

        match VersionProperty::from_id(id) {
            Some(VersionProperty::ApplicationNameAndVersion) => {
                w.write_u8(version.major)
                    .write_u8(version.minor)
                    .write_u8(version.revision)
                    .write_str(&version.app_name);
            }
            Some(VersionProperty::UserLocale) => {
                w.write_str(locale);
            }
            Some(VersionProperty::ClientFeatureFlags) => {
                let mut flags = ClientFeatures::empty();
                if unicode {
                    flags |= ClientFeatures::SUPPORTS_UNICODE;
                }
                w.write_u32(flags.bits());
            }
            None => {}
        }

        let length = (w.position() - begin).min(u8::MAX as usize) as u8;
        w.patch_u8(length_at, length)?;
    }
    Ok(w.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version() -> ClientVersion {
        ClientVersion {
            major: 0,
            minor: 1,
            revision: 5,
            app_name: "spadenet".into(),
            info: "spadenet test".into(),
        }
    }

    #[test]
    fn challenge_is_echoed() {
        assert_eq!(handshake_reply(0x0403_0201), vec![32, 1, 2, 3, 4]);
    }

    #[test]
    fn simple_version_layout() {
        let bytes = version_reply(&version(), true);
        assert_eq!(&bytes[..5], &[34, b'o', 0, 1, 5]);
        assert_eq!(&bytes[5..], b"spadenet test");
    }

    #[test]
    fn enhanced_records_are_length_prefixed() {
        let ids: BTreeSet<u8> = [2, 9, 1, 0].into_iter().collect();
        let bytes = enhanced_version_reply(&ids, &version(), "de_DE", true).unwrap();

        let mut expected = vec![9, b'x'];
        expected.extend_from_slice(&[0, 11, 0, 1, 5]);
        expected.extend_from_slice(b"spadenet");
        expected.extend_from_slice(&[1, 5]);
        expected.extend_from_slice(b"de_DE");
        expected.extend_from_slice(&[2, 4, 1, 0, 0, 0]);
        expected.extend_from_slice(&[9, 0]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn feature_flags_follow_unicode_setting() {
        let ids: BTreeSet<u8> = [2].into_iter().collect();
        let bytes = enhanced_version_reply(&ids, &version(), "en", false).unwrap();
        assert_eq!(bytes, vec![9, b'x', 2, 4, 0, 0, 0, 0]);
    }
}
