use bitflags::bitflags;
use serde::{Deserialize, Serialize};

pub const MAX_PLAYER_SLOTS: usize = 128;
pub const SPECTATOR_TEAM: u8 = 255;
/// Slot the demo player occupies when it joins a replay as an observer.
pub const REPLAY_SPECTATOR_ID: u8 = 33;
pub const DEFAULT_PORT: u16 = 32887;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolVersion {
    V075,
    V076,
}

impl ProtocolVersion {
    pub fn number(self) -> u8 {
        match self {
            ProtocolVersion::V075 => 3,
            ProtocolVersion::V076 => 4,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            3 => Some(ProtocolVersion::V075),
            4 => Some(ProtocolVersion::V076),
            _ => None,
        }
    }

    /// Bytes per player record in a WorldUpdate packet.
    pub fn world_update_width(self) -> usize {
        match self {
            ProtocolVersion::V075 => 24,
            ProtocolVersion::V076 => 25,
        }
    }
}

impl std::fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolVersion::V075 => f.write_str("0.75"),
            ProtocolVersion::V076 => f.write_str("0.76"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketType {
    PositionData = 0,
    OrientationData = 1,
    WorldUpdate = 2,
    InputData = 3,
    WeaponInput = 4,
    SetHp = 5,
    Grenade = 6,
    SetTool = 7,
    SetColour = 8,
    ExistingPlayer = 9,
    ShortPlayerData = 10,
    MoveObject = 11,
    CreatePlayer = 12,
    BlockAction = 13,
    BlockLine = 14,
    StateData = 15,
    KillAction = 16,
    ChatMessage = 17,
    MapStart = 18,
    MapChunk = 19,
    PlayerLeft = 20,
    TerritoryCapture = 21,
    ProgressBar = 22,
    IntelCapture = 23,
    IntelPickup = 24,
    IntelDrop = 25,
    Restock = 26,
    FogColour = 27,
    WeaponReload = 28,
    ChangeTeam = 29,
    ChangeWeapon = 30,
    HandShakeInit = 31,
    HandShakeReturn = 32,
    VersionGet = 33,
    VersionSend = 34,
}

impl PacketType {
    /// Client-to-server hit report; shares its tag with the server's SetHP.
    pub const HIT: PacketType = PacketType::SetHp;

    pub fn from_tag(tag: u8) -> Option<Self> {
        use PacketType::*;
        Some(match tag {
            0 => PositionData,
            1 => OrientationData,
            2 => WorldUpdate,
            3 => InputData,
            4 => WeaponInput,
            5 => SetHp,
            6 => Grenade,
            7 => SetTool,
            8 => SetColour,
            9 => ExistingPlayer,
            10 => ShortPlayerData,
            11 => MoveObject,
            12 => CreatePlayer,
            13 => BlockAction,
            14 => BlockLine,
            15 => StateData,
            16 => KillAction,
            17 => ChatMessage,
            18 => MapStart,
            19 => MapChunk,
            20 => PlayerLeft,
            21 => TerritoryCapture,
            22 => ProgressBar,
            23 => IntelCapture,
            24 => IntelPickup,
            25 => IntelDrop,
            26 => Restock,
            27 => FogColour,
            28 => WeaponReload,
            29 => ChangeTeam,
            30 => ChangeWeapon,
            31 => HandShakeInit,
            32 => HandShakeReturn,
            33 => VersionGet,
            34 => VersionSend,
            _ => return None,
        })
    }

    #[inline]
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Packets that may legitimately arrive before the map transfer finishes
    /// and must be held until the world exists.
    pub fn belongs_to_next_world(self) -> bool {
        matches!(
            self,
            PacketType::WorldUpdate | PacketType::ExistingPlayer | PacketType::CreatePlayer
        )
    }
}

/// RGB color. On the wire the components travel as (b, g, r).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct PlayerInput: u8 {
        const MOVE_FORWARD = 1 << 0;
        const MOVE_BACKWARD = 1 << 1;
        const MOVE_LEFT = 1 << 2;
        const MOVE_RIGHT = 1 << 3;
        const JUMP = 1 << 4;
        const CROUCH = 1 << 5;
        const SNEAK = 1 << 6;
        const SPRINT = 1 << 7;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct WeaponInput: u8 {
        const PRIMARY = 1 << 0;
        const SECONDARY = 1 << 1;
    }
}

bitflags! {
    /// Reported to servers that ask for the enhanced version info.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct ClientFeatures: u32 {
        const SUPPORTS_UNICODE = 1 << 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum WeaponType {
    Rifle = 0,
    Smg = 1,
    Shotgun = 2,
}

impl WeaponType {
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(WeaponType::Rifle),
            1 => Some(WeaponType::Smg),
            2 => Some(WeaponType::Shotgun),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Tool {
    Spade = 0,
    Block = 1,
    Weapon = 2,
    Grenade = 3,
}

impl Tool {
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Tool::Spade),
            1 => Some(Tool::Block),
            2 => Some(Tool::Weapon),
            3 => Some(Tool::Grenade),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum KillType {
    Weapon = 0,
    Headshot = 1,
    Melee = 2,
    Grenade = 3,
    Fall = 4,
    TeamChange = 5,
    ClassChange = 6,
}

impl KillType {
    pub fn from_wire(value: u8) -> Option<Self> {
        use KillType::*;
        Some(match value {
            0 => Weapon,
            1 => Headshot,
            2 => Melee,
            3 => Grenade,
            4 => Fall,
            5 => TeamChange,
            6 => ClassChange,
            _ => return None,
        })
    }

    /// Kills the victim caused themselves, whatever the wire says.
    pub fn is_self_inflicted(self) -> bool {
        matches!(self, KillType::Fall | KillType::TeamChange | KillType::ClassChange)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BlockActionType {
    Build = 0,
    Destroy = 1,
    Dig = 2,
    Grenade = 3,
}

impl BlockActionType {
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(BlockActionType::Build),
            1 => Some(BlockActionType::Destroy),
            2 => Some(BlockActionType::Dig),
            3 => Some(BlockActionType::Grenade),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HitType {
    Torso = 0,
    Head = 1,
    Arms = 2,
    Legs = 3,
    Melee = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HurtType {
    Fall,
    Weapon,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tag_maps_back() {
        for tag in 0..=34u8 {
            let ty = PacketType::from_tag(tag).unwrap();
            assert_eq!(ty.tag(), tag);
        }
        assert!(PacketType::from_tag(35).is_none());
        assert!(PacketType::from_tag(255).is_none());
    }

    #[test]
    fn world_update_width_depends_on_version() {
        assert_eq!(ProtocolVersion::V075.world_update_width(), 24);
        assert_eq!(ProtocolVersion::V076.world_update_width(), 25);
        assert_eq!(ProtocolVersion::from_number(4), Some(ProtocolVersion::V076));
        assert_eq!(ProtocolVersion::from_number(5), None);
    }

    #[test]
    fn self_inflicted_kills() {
        assert!(KillType::Fall.is_self_inflicted());
        assert!(KillType::TeamChange.is_self_inflicted());
        assert!(KillType::ClassChange.is_self_inflicted());
        assert!(!KillType::Headshot.is_self_inflicted());
    }
}
