use std::collections::{BTreeMap, HashMap, HashSet};

use glam::{IVec3, Vec3};
use spadenet::game::{FollowTarget, GameEvent, MapCodec, PlayerInfo, SimulationSink};
use spadenet::net::{Color, MapDecodeError, Tool};

/// Keeps the map transfer as raw bytes. Map decoding belongs to the renderer.
#[derive(Debug, Default)]
pub struct RawMapCodec;

impl MapCodec for RawMapCodec {
    type Map = Vec<u8>;

    fn decode(&mut self, data: &[u8]) -> Result<Vec<u8>, MapDecodeError> {
        if data.is_empty() {
            return Err(MapDecodeError::NeedsMoreData);
        }
        Ok(data.to_vec())
    }
}

struct Player {
    name: String,
    info: PlayerInfo,
}

/// Headless simulation: tracks the roster and placed blocks, and logs
/// what happens in the game.
#[derive(Default)]
pub struct LoggingSink {
    map_len: Option<usize>,
    players: HashMap<u8, Player>,
    solid: HashSet<IVec3>,
    follow: Option<FollowTarget>,
    counts: BTreeMap<&'static str, u64>,
}

impl LoggingSink {
    /// Events seen so far, by kind.
    pub fn counts(&self) -> &BTreeMap<&'static str, u64> {
        &self.counts
    }

    fn name(&self, id: u8) -> String {
        self.players
            .get(&id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("#{id}"))
    }

    fn join(&mut self, id: u8, team: u8, tool: Tool, block_color: Color, name: String) {
        log::info!("{name} (#{id}) is on team {team}");
        self.players.insert(
            id,
            Player {
                name,
                info: PlayerInfo {
                    team,
                    tool,
                    block_color,
                    front: Vec3::ZERO,
                },
            },
        );
    }

    fn describe(&mut self, event: &GameEvent) {
        match event {
            GameEvent::ExistingPlayer {
                id,
                team,
                tool,
                block_color,
                name,
                ..
            } => self.join(*id, *team, *tool, *block_color, name.clone()),
            GameEvent::PlayerCreated { id, team, name, .. } => {
                let name = name.clone().unwrap_or_else(|| self.name(*id));
                self.join(*id, *team, Tool::Weapon, Color::default(), name);
            }
            GameEvent::PlayerLeft { id } => {
                log::info!("{} left", self.name(*id));
                self.players.remove(id);
            }
            GameEvent::PlayerMoved { id, front, .. } => {
                if let Some(p) = self.players.get_mut(id) {
                    p.info.front = *front;
                }
            }
            GameEvent::ToolChanged { id, tool } => {
                if let Some(p) = self.players.get_mut(id) {
                    p.info.tool = *tool;
                }
            }
            GameEvent::BlockColorChanged { id, color } => {
                if let Some(p) = self.players.get_mut(id) {
                    p.info.block_color = *color;
                }
            }
            GameEvent::TeamChanged { id, team } | GameEvent::PlayerJoinedTeam { id, team } => {
                if let Some(p) = self.players.get_mut(id) {
                    p.info.team = *team;
                }
            }
            GameEvent::BlockCreated { cell, .. } => {
                self.solid.insert(*cell);
            }
            GameEvent::BlocksDestroyed { cells, .. } => {
                for cell in cells {
                    self.solid.remove(cell);
                }
            }
            GameEvent::ChatMessage { sender, text, .. } => {
                log::info!("<{}> {text}", self.name(*sender));
            }
            GameEvent::ServerMessage { text } => log::info!("* {text}"),
            GameEvent::PlayerKilled { victim, killer, kind, .. } => {
                log::info!("{} killed {} ({kind:?})", self.name(*killer), self.name(*victim));
            }
            GameEvent::IntelCaptured { id } => log::info!("{} captured the intel", self.name(*id)),
            GameEvent::TerritoryCaptured { territory, team } => {
                log::info!("Team {team} captured territory {territory}");
            }
            GameEvent::TeamWon { team } => log::info!("Team {team} wins"),
            other => log::trace!("{other:?}"),
        }
    }
}

/// Variant name of an event, for the summary.
fn kind(event: &GameEvent) -> &'static str {
    match event {
        GameEvent::PlayerPosition { .. } => "PlayerPosition",
        GameEvent::PlayerOrientation { .. } => "PlayerOrientation",
        GameEvent::PlayerMoved { .. } => "PlayerMoved",
        GameEvent::PlayerInput { .. } => "PlayerInput",
        GameEvent::ForceJump { .. } => "ForceJump",
        GameEvent::WeaponInput { .. } => "WeaponInput",
        GameEvent::LocalHealth { .. } => "LocalHealth",
        GameEvent::GrenadeThrown { .. } => "GrenadeThrown",
        GameEvent::ToolChanged { .. } => "ToolChanged",
        GameEvent::BlockColorChanged { .. } => "BlockColorChanged",
        GameEvent::ExistingPlayer { .. } => "ExistingPlayer",
        GameEvent::PlayerCreated { .. } => "PlayerCreated",
        GameEvent::LocalPlayerCreated { .. } => "LocalPlayerCreated",
        GameEvent::PlayerJoinedTeam { .. } => "PlayerJoinedTeam",
        GameEvent::PlayerSpawned { .. } => "PlayerSpawned",
        GameEvent::BlockCreated { .. } => "BlockCreated",
        GameEvent::BlocksUsed { .. } => "BlocksUsed",
        GameEvent::BlockGained { .. } => "BlockGained",
        GameEvent::BlocksDestroyed { .. } => "BlocksDestroyed",
        GameEvent::WorldState { .. } => "WorldState",
        GameEvent::ModeChanged(_) => "ModeChanged",
        GameEvent::JoinedGame => "JoinedGame",
        GameEvent::PlayerKilled { .. } => "PlayerKilled",
        GameEvent::KillsAdded { .. } => "KillsAdded",
        GameEvent::ChatMessage { .. } => "ChatMessage",
        GameEvent::ServerMessage { .. } => "ServerMessage",
        GameEvent::PlayerLeft { .. } => "PlayerLeft",
        GameEvent::TerritoryCaptured { .. } => "TerritoryCaptured",
        GameEvent::TerritoryProgress { .. } => "TerritoryProgress",
        GameEvent::IntelCaptured { .. } => "IntelCaptured",
        GameEvent::IntelPickedUp { .. } => "IntelPickedUp",
        GameEvent::IntelDropped { .. } => "IntelDropped",
        GameEvent::TeamWon { .. } => "TeamWon",
        GameEvent::Restock { .. } => "Restock",
        GameEvent::FogColor(_) => "FogColor",
        GameEvent::Reload { .. } => "Reload",
        GameEvent::ReloadDone { .. } => "ReloadDone",
        GameEvent::TeamChanged { .. } => "TeamChanged",
    }
}

impl SimulationSink for LoggingSink {
    type Map = Vec<u8>;

    fn set_world(&mut self, map: Vec<u8>) {
        log::info!("Map loaded ({} bytes)", map.len());
        self.map_len = Some(map.len());
    }

    fn clear_world(&mut self) {
        self.map_len = None;
        self.players.clear();
        self.solid.clear();
    }

    fn has_world(&self) -> bool {
        self.map_len.is_some()
    }

    fn player(&self, id: u8) -> Option<PlayerInfo> {
        self.players.get(&id).map(|p| p.info)
    }

    fn is_solid(&self, cell: IVec3) -> bool {
        self.solid.contains(&cell)
    }

    fn follow_target(&self) -> Option<FollowTarget> {
        self.follow
    }

    fn set_follow_target(&mut self, target: FollowTarget) {
        self.follow = Some(target);
    }

    fn apply(&mut self, event: GameEvent) {
        *self.counts.entry(kind(&event)).or_default() += 1;
        self.describe(&event);
    }
}
