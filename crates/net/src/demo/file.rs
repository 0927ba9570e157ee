use std::io::{self, Read, Seek, SeekFrom, Write};

use thiserror::Error;

use crate::net::packet::ProtocolVersion;

pub const DEMO_FORMAT_VERSION: u8 = 1;
/// Offset of the first entry.
pub const DEMO_HEADER_LEN: u64 = 2;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("unsupported demo format version {0}")]
    UnsupportedFormat(u8),
    #[error("unsupported protocol version {0}")]
    UnsupportedProtocol(u8),
    #[error("packet of {0} bytes does not fit a demo entry")]
    PacketTooLarge(usize),
    #[error("entry timestamp {0} is not a finite time")]
    InvalidTime(f32),
}

/// One logged packet and its time since recording start.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoEntry {
    pub time: f32,
    pub data: Vec<u8>,
}

pub struct DemoWriter<W: Write> {
    inner: W,
}

impl<W: Write> DemoWriter<W> {
    pub fn new(mut inner: W, protocol: ProtocolVersion) -> Result<Self, DemoError> {
        inner.write_all(&[DEMO_FORMAT_VERSION, protocol.number()])?;
        inner.flush()?;
        Ok(Self { inner })
    }

    pub fn write_entry(&mut self, time: f32, data: &[u8]) -> Result<(), DemoError> {
        let len = u16::try_from(data.len()).map_err(|_| DemoError::PacketTooLarge(data.len()))?;
        self.inner.write_all(&time.to_le_bytes())?;
        self.inner.write_all(&len.to_le_bytes())?;
        self.inner.write_all(data)?;
        self.inner.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

pub struct DemoReader<R> {
    inner: R,
    protocol: ProtocolVersion,
}

impl<R: Read + Seek> DemoReader<R> {
    pub fn open(mut inner: R) -> Result<Self, DemoError> {
        let mut header = [0u8; 2];
        inner.read_exact(&mut header)?;
        if header[0] != DEMO_FORMAT_VERSION {
            return Err(DemoError::UnsupportedFormat(header[0]));
        }
        let protocol =
            ProtocolVersion::from_number(header[1]).ok_or(DemoError::UnsupportedProtocol(header[1]))?;
        Ok(Self { inner, protocol })
    }

    pub fn protocol(&self) -> ProtocolVersion {
        self.protocol
    }

    /// Next entry, or `None` at the end of the log. A truncated trailing
    /// entry also counts as the end.
    pub fn next_entry(&mut self) -> Result<Option<DemoEntry>, DemoError> {
        let mut time = [0u8; 4];
        if !read_full(&mut self.inner, &mut time)? {
            return Ok(None);
        }
        let time = f32::from_le_bytes(time);
        if !time.is_finite() {
            return Err(DemoError::InvalidTime(time));
        }
        let mut len = [0u8; 2];
        if !read_full(&mut self.inner, &mut len)? {
            return Ok(None);
        }
        let mut data = vec![0u8; u16::from_le_bytes(len) as usize];
        if !read_full(&mut self.inner, &mut data)? {
            return Ok(None);
        }
        Ok(Some(DemoEntry { time, data }))
    }

    /// Back to the first entry.
    pub fn rewind(&mut self) -> Result<(), DemoError> {
        self.inner.seek(SeekFrom::Start(DEMO_HEADER_LEN))?;
        Ok(())
    }

    /// Timestamp of the last complete entry. Leaves the reader at the first
    /// entry.
    pub fn scan_duration(&mut self) -> Result<f32, DemoError> {
        self.rewind()?;
        let mut end = 0.0;
        while let Some(entry) = self.next_entry()? {
            end = entry.time;
        }
        self.rewind()?;
        Ok(end)
    }
}

impl<R: Read + Seek> Iterator for DemoReader<R> {
    type Item = Result<DemoEntry, DemoError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().transpose()
    }
}

fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<bool> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(err) => Err(err),
    }
}

/// `hh:mm:ss` for a demo timestamp.
pub fn format_duration(seconds: f32) -> String {
    let total = seconds.max(0.0) as u32;
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn sample() -> Vec<u8> {
        let mut writer = DemoWriter::new(Vec::new(), ProtocolVersion::V076).unwrap();
        writer.write_entry(0.0, &[18, 1, 0, 0, 0]).unwrap();
        writer.write_entry(1.5, &[19, 0xAB]).unwrap();
        writer.write_entry(3725.0, &[2]).unwrap();
        writer.into_inner()
    }

    #[test]
    fn layout_is_byte_exact() {
        let bytes = sample();
        assert_eq!(&bytes[..2], &[1, 4]);
        assert_eq!(&bytes[2..6], &0.0f32.to_le_bytes());
        assert_eq!(&bytes[6..8], &[5, 0]);
        assert_eq!(&bytes[8..13], &[18, 1, 0, 0, 0]);
    }

    #[test]
    fn reads_back_entries() {
        let mut reader = DemoReader::open(Cursor::new(sample())).unwrap();
        assert_eq!(reader.protocol(), ProtocolVersion::V076);
        let entries: Vec<DemoEntry> = reader.by_ref().collect::<Result<_, _>>().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].time, 1.5);
        assert_eq!(entries[1].data, vec![19, 0xAB]);

        reader.rewind().unwrap();
        assert_eq!(reader.next_entry().unwrap().unwrap().data, vec![18, 1, 0, 0, 0]);
    }

    #[test]
    fn truncated_tail_ends_the_log() {
        let mut bytes = sample();
        bytes.extend_from_slice(&9.0f32.to_le_bytes());
        bytes.extend_from_slice(&[10, 0, 1, 2]);
        let mut reader = DemoReader::open(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.scan_duration().unwrap(), 3725.0);
        assert_eq!(reader.by_ref().count(), 3);
    }

    #[test]
    fn rejects_entries_that_are_never_due() {
        let mut bytes = sample();
        bytes.extend_from_slice(&f32::NAN.to_le_bytes());
        bytes.extend_from_slice(&[1, 0, 2]);
        let mut reader = DemoReader::open(Cursor::new(bytes)).unwrap();
        assert!(matches!(reader.scan_duration(), Err(DemoError::InvalidTime(t)) if t.is_nan()));

        reader.rewind().unwrap();
        assert_eq!(reader.by_ref().take(3).filter(Result::is_ok).count(), 3);
        assert!(matches!(reader.next_entry(), Err(DemoError::InvalidTime(_))));
    }

    #[test]
    fn rejects_unknown_header() {
        assert!(matches!(
            DemoReader::open(Cursor::new(vec![2, 3])),
            Err(DemoError::UnsupportedFormat(2))
        ));
        assert!(matches!(
            DemoReader::open(Cursor::new(vec![1, 5])),
            Err(DemoError::UnsupportedProtocol(5))
        ));
    }

    #[test]
    fn oversized_packet() {
        let mut writer = DemoWriter::new(Vec::new(), ProtocolVersion::V075).unwrap();
        let big = vec![0u8; 70_000];
        assert!(matches!(
            writer.write_entry(0.0, &big),
            Err(DemoError::PacketTooLarge(70_000))
        ));
    }

    #[test]
    fn duration_string() {
        assert_eq!(format_duration(3725.9), "01:02:05");
        assert_eq!(format_duration(0.0), "00:00:00");
    }
}
