use glam::{IVec3, Vec3};

use crate::net::packet::{
    Color, HurtType, KillType, PlayerInput, Tool, WeaponInput, WeaponType,
};

use super::mode::GameMode;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamInfo {
    pub name: String,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatChannel {
    Global,
    Team,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyCause {
    Tool,
    Dig,
    Grenade,
}

/// A mutation of the simulation, decoded from one server packet.
///
/// Events are applied in the order they are produced; the dispatcher may
/// consult the sink between them (solidity, player existence).
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    PlayerPosition {
        id: u8,
        position: Vec3,
    },
    PlayerOrientation {
        id: u8,
        front: Vec3,
    },
    PlayerMoved {
        id: u8,
        position: Vec3,
        front: Vec3,
    },
    PlayerInput {
        id: u8,
        input: PlayerInput,
    },
    ForceJump {
        id: u8,
    },
    WeaponInput {
        id: u8,
        input: WeaponInput,
    },
    LocalHealth {
        hp: u8,
        hurt: HurtType,
        source: Vec3,
    },
    GrenadeThrown {
        fuse: f32,
        position: Vec3,
        velocity: Vec3,
    },
    ToolChanged {
        id: u8,
        tool: Tool,
    },
    BlockColorChanged {
        id: u8,
        color: Color,
    },
    ExistingPlayer {
        id: u8,
        team: u8,
        weapon: WeaponType,
        tool: Tool,
        kills: u32,
        block_color: Color,
        name: String,
        position: Vec3,
    },
    PlayerCreated {
        id: u8,
        team: u8,
        weapon: WeaponType,
        position: Vec3,
        name: Option<String>,
    },
    LocalPlayerCreated {
        id: u8,
    },
    PlayerJoinedTeam {
        id: u8,
        team: u8,
    },
    PlayerSpawned {
        id: u8,
    },
    BlockCreated {
        cell: IVec3,
        color: Color,
        actor: Option<u8>,
    },
    BlocksUsed {
        id: u8,
        count: u32,
    },
    BlockGained {
        id: u8,
    },
    BlocksDestroyed {
        cells: Vec<IVec3>,
        cause: DestroyCause,
    },
    WorldState {
        local_player: u8,
        fog: Color,
        teams: [TeamInfo; 2],
    },
    ModeChanged(GameMode),
    JoinedGame,
    PlayerKilled {
        victim: u8,
        killer: u8,
        kind: KillType,
        respawn_time: u8,
    },
    KillsAdded {
        id: u8,
        amount: u32,
    },
    ChatMessage {
        sender: u8,
        channel: ChatChannel,
        text: String,
    },
    ServerMessage {
        text: String,
    },
    PlayerLeft {
        id: u8,
    },
    TerritoryCaptured {
        territory: u8,
        team: u8,
    },
    TerritoryProgress {
        territory: u8,
        capturing_team: u8,
        rate: i8,
        progress: f32,
    },
    IntelCaptured {
        id: u8,
    },
    IntelPickedUp {
        id: u8,
    },
    IntelDropped {
        id: u8,
        position: Vec3,
    },
    TeamWon {
        team: u8,
    },
    Restock {
        id: u8,
    },
    FogColor(Color),
    Reload {
        id: u8,
    },
    ReloadDone {
        id: u8,
        clip: u8,
        reserve: u8,
    },
    TeamChanged {
        id: u8,
        team: u8,
    },
}
