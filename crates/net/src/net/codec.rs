use glam::{IVec3, Vec3};

use super::cp437;
use super::error::NetError;
use super::packet::{Color, PacketType};

const DUMP_LIMIT: usize = 64;

/// Renders `Packet 0xNN [len=N]` followed by up to 64 hex bytes.
pub fn dump_packet(data: &[u8]) -> String {
    let tag = data.first().copied().unwrap_or(0);
    let mut out = format!("Packet {:#04x} [len={}]", tag, data.len());
    for byte in data.iter().take(DUMP_LIMIT) {
        out.push_str(&format!(" {byte:02x}"));
    }
    out
}

fn until_nul(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}

/// Cursor over one inbound packet. Byte 0 is the tag; reads start after it.
#[derive(Debug, Clone)]
pub struct PacketReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PacketReader<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self, NetError> {
        if data.is_empty() {
            return Err(NetError::TruncatedPacket {
                tag: 0,
                offset: 0,
                wanted: 1,
                dump: dump_packet(data),
            });
        }
        Ok(Self { data, pos: 1 })
    }

    pub fn tag(&self) -> u8 {
        self.data[0]
    }

    pub fn packet_type(&self) -> Option<PacketType> {
        PacketType::from_tag(self.tag())
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn dump(&self) -> String {
        dump_packet(self.data)
    }

    /// Builds an `InvalidPacketField` error carrying this packet's dump.
    pub fn invalid(&self, field: &'static str, value: impl ToString) -> NetError {
        NetError::InvalidPacketField {
            field,
            value: value.to_string(),
            dump: self.dump(),
        }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], NetError> {
        if len > self.remaining() {
            return Err(NetError::TruncatedPacket {
                tag: self.tag(),
                offset: self.pos,
                wanted: len,
                dump: self.dump(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], NetError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, NetError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, NetError> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16, NetError> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, NetError> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, NetError> {
        Ok(self.read_u32()? as i32)
    }

    pub fn read_f32(&mut self) -> Result<f32, NetError> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    pub fn read_color(&mut self) -> Result<Color, NetError> {
        let b = self.read_u8()?;
        let g = self.read_u8()?;
        let r = self.read_u8()?;
        Ok(Color { r, g, b })
    }

    pub fn read_vec3(&mut self) -> Result<Vec3, NetError> {
        let x = self.read_f32()?;
        let y = self.read_f32()?;
        let z = self.read_f32()?;
        Ok(Vec3::new(x, y, z))
    }

    /// Three little-endian i32 coordinates, as block packets carry them.
    pub fn read_ivec3(&mut self) -> Result<IVec3, NetError> {
        let x = self.read_i32()?;
        let y = self.read_i32()?;
        let z = self.read_i32()?;
        Ok(IVec3::new(x, y, z))
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], NetError> {
        self.take(len)
    }

    pub fn skip(&mut self, len: usize) -> Result<(), NetError> {
        self.take(len).map(|_| ())
    }

    /// Fixed-width string field, cut at the first NUL.
    pub fn read_string(&mut self, len: usize) -> Result<String, NetError> {
        let raw = self.take(len)?;
        Ok(cp437::decode(until_nul(raw)))
    }

    pub fn read_remaining(&mut self) -> &'a [u8] {
        let rest = &self.data[self.pos..];
        self.pos = self.data.len();
        rest
    }

    pub fn read_remaining_string(&mut self) -> String {
        cp437::decode(until_nul(self.read_remaining()))
    }
}

/// Builds one outbound packet, tag first.
#[derive(Debug, Clone)]
pub struct PacketWriter {
    data: Vec<u8>,
    unicode: bool,
}

impl PacketWriter {
    pub fn new(packet_type: PacketType) -> Self {
        Self::with_tag(packet_type.tag())
    }

    pub fn with_tag(tag: u8) -> Self {
        Self {
            data: vec![tag],
            unicode: true,
        }
    }

    /// Whether strings may use the UTF-8 escape.
    pub fn unicode(mut self, enabled: bool) -> Self {
        self.unicode = enabled;
        self
    }

    pub fn position(&self) -> usize {
        self.data.len()
    }

    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.data.push(value);
        self
    }

    pub fn write_u16(&mut self, value: u16) -> &mut Self {
        self.data.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_u32(&mut self, value: u32) -> &mut Self {
        self.data.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_i32(&mut self, value: i32) -> &mut Self {
        self.write_u32(value as u32)
    }

    pub fn write_f32(&mut self, value: f32) -> &mut Self {
        self.write_u32(value.to_bits())
    }

    pub fn write_color(&mut self, color: Color) -> &mut Self {
        self.data.extend_from_slice(&[color.b, color.g, color.r]);
        self
    }

    pub fn write_vec3(&mut self, v: Vec3) -> &mut Self {
        self.write_f32(v.x).write_f32(v.y).write_f32(v.z)
    }

    pub fn write_ivec3(&mut self, v: IVec3) -> &mut Self {
        self.write_i32(v.x).write_i32(v.y).write_i32(v.z)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.data.extend_from_slice(bytes);
        self
    }

    /// Encoded string with no terminator or padding.
    pub fn write_str(&mut self, text: &str) -> &mut Self {
        let encoded = cp437::encode(text, self.unicode);
        self.write_bytes(&encoded)
    }

    /// Encoded string truncated or zero-padded to exactly `len` bytes.
    pub fn write_fixed_str(&mut self, text: &str, len: usize) -> &mut Self {
        let mut encoded = cp437::encode(text, self.unicode);
        encoded.resize(len, 0);
        self.write_bytes(&encoded)
    }

    pub fn patch_u8(&mut self, position: usize, value: u8) -> Result<(), NetError> {
        self.patch(position, &[value])
    }

    pub fn patch_u32(&mut self, position: usize, value: u32) -> Result<(), NetError> {
        self.patch(position, &value.to_le_bytes())
    }

    fn patch(&mut self, position: usize, bytes: &[u8]) -> Result<(), NetError> {
        let len = self.data.len();
        match position.checked_add(bytes.len()) {
            Some(end) if end <= len => {
                self.data[position..end].copy_from_slice(bytes);
                Ok(())
            }
            _ => Err(NetError::InvalidPatch { position, len }),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_travels_reversed() {
        let mut writer = PacketWriter::new(PacketType::SetColour);
        writer.write_u8(3).write_color(Color::new(10, 20, 30));
        let bytes = writer.into_bytes();
        assert_eq!(bytes, vec![8, 3, 30, 20, 10]);

        let mut reader = PacketReader::new(&bytes).unwrap();
        assert_eq!(reader.read_u8().unwrap(), 3);
        assert_eq!(reader.read_color().unwrap(), Color::new(10, 20, 30));
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn truncation_reports_tag_and_offset() {
        let bytes = [PacketType::SetHp.tag(), 1, 2];
        let mut reader = PacketReader::new(&bytes).unwrap();
        match reader.read_u32() {
            Err(NetError::TruncatedPacket {
                tag,
                offset,
                wanted,
                dump,
            }) => {
                assert_eq!(tag, 5);
                assert_eq!(offset, 1);
                assert_eq!(wanted, 4);
                assert_eq!(dump, "Packet 0x05 [len=3] 05 01 02");
            }
            other => panic!("unexpected {other:?}"),
        }
        // A failed read consumes nothing.
        assert_eq!(reader.read_u16().unwrap(), 0x0201);
    }

    #[test]
    fn empty_packet_is_truncated() {
        assert!(matches!(
            PacketReader::new(&[]),
            Err(NetError::TruncatedPacket { wanted: 1, .. })
        ));
    }

    #[test]
    fn fixed_strings_pad_and_cut() {
        let mut writer = PacketWriter::new(PacketType::ExistingPlayer);
        writer.write_fixed_str("Deuce", 8).write_fixed_str("a very long name", 4);
        let bytes = writer.into_bytes();
        assert_eq!(&bytes[1..9], b"Deuce\0\0\0");
        assert_eq!(&bytes[9..], b"a ve");

        let mut reader = PacketReader::new(&bytes).unwrap();
        assert_eq!(reader.read_string(8).unwrap(), "Deuce");
        assert_eq!(reader.read_remaining_string(), "a ve");
    }

    #[test]
    fn patching_inside_and_outside() {
        let mut writer = PacketWriter::with_tag(9);
        let at = writer.position();
        writer.write_u8(0).write_u32(0);
        writer.patch_u8(at, 7).unwrap();
        writer.patch_u32(at + 1, 0xdead_beef).unwrap();
        assert_eq!(writer.as_bytes(), &[9, 7, 0xef, 0xbe, 0xad, 0xde]);

        assert!(matches!(
            writer.patch_u32(3, 1),
            Err(NetError::InvalidPatch { position: 3, len: 6 })
        ));
        assert!(writer.patch_u8(usize::MAX, 1).is_err());
    }

    #[test]
    fn dump_is_capped() {
        let data = vec![0u8; 100];
        let dump = dump_packet(&data);
        assert!(dump.starts_with("Packet 0x00 [len=100]"));
        assert_eq!(dump.matches(" 00").count(), 64);
    }
}
