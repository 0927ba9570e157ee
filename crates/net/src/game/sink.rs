use glam::{IVec3, Vec3};

use crate::net::error::MapDecodeError;
use crate::net::packet::{Color, Tool};

use super::event::GameEvent;

/// What the dispatcher needs to know about a live player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerInfo {
    pub team: u8,
    pub tool: Tool,
    pub block_color: Color,
    pub front: Vec3,
}

impl PlayerInfo {
    pub fn is_spectator(&self) -> bool {
        self.team >= 2
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowMode {
    FirstPerson,
    ThirdPerson,
}

/// Player the spectator camera is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowTarget {
    pub player_id: u8,
    pub mode: FollowMode,
}

/// The game simulation that decoded packets are applied to.
pub trait SimulationSink {
    type Map;

    fn set_world(&mut self, map: Self::Map);
    fn clear_world(&mut self);
    fn has_world(&self) -> bool;

    fn player(&self, id: u8) -> Option<PlayerInfo>;
    fn is_solid(&self, cell: IVec3) -> bool;

    fn follow_target(&self) -> Option<FollowTarget>;
    fn set_follow_target(&mut self, target: FollowTarget);

    fn apply(&mut self, event: GameEvent);
}

/// Turns the assembled map transfer into a world map.
pub trait MapCodec {
    type Map;

    /// `NeedsMoreData` keeps the transfer open; `Corrupt` ends the session.
    fn decode(&mut self, data: &[u8]) -> Result<Self::Map, MapDecodeError>;
}
