use glam::Vec3;

use crate::net::codec::PacketReader;
use crate::net::error::NetError;

/// Progress per second for each unit of a territory's capture rate.
pub const TC_CAPTURE_RATE: f32 = 0.05;

const CARRIER_PADDING: usize = 11;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CtfTeam {
    pub score: u8,
    pub has_intel: bool,
    pub carrier: Option<u8>,
    pub flag_pos: Vec3,
    pub base_pos: Vec3,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CtfState {
    pub teams: [CtfTeam; 2],
    pub capture_limit: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Territory {
    pub pos: Vec3,
    pub owner: u8,
    pub progress_base: f32,
    pub progress_rate: f32,
    pub capturing_team: Option<u8>,
}

impl Territory {
    fn new(pos: Vec3, owner: u8) -> Self {
        Self {
            pos,
            owner,
            progress_base: 0.0,
            progress_rate: 0.0,
            capturing_team: None,
        }
    }

    fn reset_progress(&mut self) {
        self.progress_base = 0.0;
        self.progress_rate = 0.0;
        self.capturing_team = None;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TcState {
    pub territories: Vec<Territory>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameMode {
    CaptureTheFlag(CtfState),
    TerritoryControl(TcState),
}

/// Movable objects named by MoveObject in capture-the-flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtfObject {
    BlueFlag,
    GreenFlag,
    BlueBase,
    GreenBase,
}

impl CtfObject {
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(CtfObject::BlueFlag),
            1 => Some(CtfObject::GreenFlag),
            2 => Some(CtfObject::BlueBase),
            3 => Some(CtfObject::GreenBase),
            _ => None,
        }
    }
}

impl GameMode {
    /// Decodes the mode section that ends a StateData packet.
    pub fn decode(reader: &mut PacketReader<'_>) -> Result<Self, NetError> {
        match reader.read_u8()? {
            0 => CtfState::decode(reader).map(GameMode::CaptureTheFlag),
            _ => TcState::decode(reader).map(GameMode::TerritoryControl),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GameMode::CaptureTheFlag(_) => "ctf",
            GameMode::TerritoryControl(_) => "tc",
        }
    }

    pub fn as_ctf_mut(&mut self) -> Option<&mut CtfState> {
        match self {
            GameMode::CaptureTheFlag(ctf) => Some(ctf),
            _ => None,
        }
    }

    pub fn as_tc_mut(&mut self) -> Option<&mut TcState> {
        match self {
            GameMode::TerritoryControl(tc) => Some(tc),
            _ => None,
        }
    }
}

impl CtfState {
    fn decode(reader: &mut PacketReader<'_>) -> Result<Self, NetError> {
        let mut state = CtfState::default();
        state.teams[0].score = reader.read_u8()?;
        state.teams[1].score = reader.read_u8()?;
        state.capture_limit = reader.read_u8()?;

        let intel_flags = reader.read_u8()?;
        state.teams[0].has_intel = intel_flags & 1 != 0;
        state.teams[1].has_intel = intel_flags & 2 != 0;

        // A carried flag has no position on the wire; its carrier id takes
        // the place of the coordinates. The carrier belongs to the holding team.
        for (flag_team, holder) in [(0usize, 1usize), (1, 0)] {
            if state.teams[holder].has_intel {
                state.teams[holder].carrier = Some(reader.read_u8()?);
                reader.skip(CARRIER_PADDING)?;
            } else {
                state.teams[flag_team].flag_pos = reader.read_vec3()?;
            }
        }

        state.teams[0].base_pos = reader.read_vec3()?;
        state.teams[1].base_pos = reader.read_vec3()?;
        Ok(state)
    }

    pub fn move_object(&mut self, object: CtfObject, pos: Vec3) {
        match object {
            CtfObject::BlueFlag => self.teams[0].flag_pos = pos,
            CtfObject::GreenFlag => self.teams[1].flag_pos = pos,
            CtfObject::BlueBase => self.teams[0].base_pos = pos,
            CtfObject::GreenBase => self.teams[1].base_pos = pos,
        }
    }
}

impl TcState {
    fn decode(reader: &mut PacketReader<'_>) -> Result<Self, NetError> {
        let count = reader.read_u8()?;
        let mut territories = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let pos = reader.read_vec3()?;
            let owner = reader.read_u8()?;
            territories.push(Territory::new(pos, owner));
        }
        Ok(Self { territories })
    }

    pub fn territory_mut(&mut self, id: u8) -> Option<&mut Territory> {
        self.territories.get_mut(id as usize)
    }

    pub fn capture(&mut self, id: u8, team: u8) -> bool {
        match self.territory_mut(id) {
            Some(t) => {
                t.owner = team;
                t.reset_progress();
                true
            }
            None => false,
        }
    }
}
