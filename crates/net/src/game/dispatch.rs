use glam::{IVec3, Vec3};

use crate::net::codec::PacketReader;
use crate::net::error::NetError;
use crate::net::packet::{
    BlockActionType, Color, HurtType, KillType, MAX_PLAYER_SLOTS, PacketType, PlayerInput,
    ProtocolVersion, Tool, WeaponInput, WeaponType,
};
use crate::net::session::ConnectionStatus;

use super::event::{ChatChannel, DestroyCause, GameEvent, TeamInfo};
use super::line::{MAX_LINE_LENGTH, cube_line};
use super::mode::{CtfObject, CtfState, GameMode, TC_CAPTURE_RATE};
use super::sink::{PlayerInfo, SimulationSink};
use super::slots::SlotCache;

/// Side results of a dispatched packet that the session layer acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    WorldUpdate,
    Joined,
    LocalPlayerCreated(u8),
}

/// Applies in-game server packets to a simulation sink.
///
/// Owns the client-side caches the simulation does not: slot motion and
/// teams, the pending block color, team names, the game mode and the local
/// player id.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    protocol: ProtocolVersion,
    slots: SlotCache,
    fallback_color: Color,
    teams: [TeamInfo; 2],
    mode: Option<GameMode>,
    local_player: Option<u8>,
}

impl Dispatcher {
    pub fn new(protocol: ProtocolVersion) -> Self {
        Self {
            protocol,
            slots: SlotCache::new(),
            fallback_color: Color::default(),
            teams: Default::default(),
            mode: None,
            local_player: None,
        }
    }

    /// Fresh session: forget everything.
    pub fn reset(&mut self, protocol: ProtocolVersion) {
        *self = Self::new(protocol);
    }

    /// The world went away (next map): state tied to it is stale.
    pub fn world_cleared(&mut self) {
        self.mode = None;
        self.local_player = None;
    }

    /// A new world was installed; slot teams from the last one are void.
    pub fn world_loaded(&mut self) {
        self.slots.clear_teams();
    }

    pub fn protocol(&self) -> ProtocolVersion {
        self.protocol
    }

    pub fn local_player(&self) -> Option<u8> {
        self.local_player
    }

    pub fn mode(&self) -> Option<&GameMode> {
        self.mode.as_ref()
    }

    pub fn teams(&self) -> &[TeamInfo; 2] {
        &self.teams
    }

    /// Team color for join packets; spectators and unknown teams get black.
    pub fn team_color(&self, team: u8) -> Color {
        self.teams
            .get(team as usize)
            .map(|t| t.color)
            .unwrap_or_default()
    }

    pub fn slots(&self) -> &SlotCache {
        &self.slots
    }

    pub fn dispatch<S: SimulationSink>(
        &mut self,
        reader: &mut PacketReader<'_>,
        sink: &mut S,
    ) -> Result<Option<Signal>, NetError> {
        let Some(ty) = reader.packet_type() else {
            return Err(reader.invalid("packet type", reader.tag()));
        };

        match ty {
            PacketType::PositionData => self.position_data(reader, sink),
            PacketType::OrientationData => {
                let id = self.require_local(reader, sink)?;
                let front = reader.read_vec3()?;
                sink.apply(GameEvent::PlayerOrientation { id, front });
                Ok(None)
            }
            PacketType::WorldUpdate => self.world_update(reader, sink),
            PacketType::InputData => self.input_data(reader, sink),
            PacketType::WeaponInput => self.weapon_input(reader, sink),
            PacketType::SetHp => {
                self.require_local(reader, sink)?;
                let hp = reader.read_u8()?;
                let hurt = match reader.read_u8()? {
                    0 => HurtType::Fall,
                    _ => HurtType::Weapon,
                };
                let source = reader.read_vec3()?;
                sink.apply(GameEvent::LocalHealth { hp, hurt, source });
                Ok(None)
            }
            PacketType::Grenade => {
                if sink.has_world() {
                    reader.skip(1)?;
                    let fuse = reader.read_f32()?;
                    let position = reader.read_vec3()?;
                    let velocity = reader.read_vec3()?;
                    sink.apply(GameEvent::GrenadeThrown {
                        fuse,
                        position,
                        velocity,
                    });
                }
                Ok(None)
            }
            PacketType::SetTool => {
                let (id, _) = self.require_player(reader, sink)?;
                let tool = read_tool(reader)?;
                sink.apply(GameEvent::ToolChanged { id, tool });
                Ok(None)
            }
            PacketType::SetColour => {
                require_world(reader, sink)?;
                let id = reader.read_u8()?;
                let color = reader.read_color()?;
                if sink.player(id).is_some() {
                    sink.apply(GameEvent::BlockColorChanged { id, color });
                } else {
                    self.fallback_color = color;
                }
                Ok(None)
            }
            PacketType::ExistingPlayer => self.existing_player(reader, sink),
            PacketType::ShortPlayerData | PacketType::MapChunk => Err(NetError::UnexpectedPacket {
                tag: reader.tag(),
                status: ConnectionStatus::Connected,
            }),
            PacketType::MoveObject => self.move_object(reader, sink),
            PacketType::CreatePlayer => self.create_player(reader, sink),
            PacketType::BlockAction => self.block_action(reader, sink),
            PacketType::BlockLine => self.block_line(reader, sink),
            PacketType::StateData => self.state_data(reader, sink),
            PacketType::KillAction => self.kill_action(reader, sink),
            PacketType::ChatMessage => {
                require_world(reader, sink)?;
                let sender = reader.read_u8()?;
                let kind = reader.read_u8()?;
                let text = reader.read_remaining_string();
                let event = match (sink.player(sender), kind) {
                    (Some(_), 0) => Some(GameEvent::ChatMessage {
                        sender,
                        channel: ChatChannel::Global,
                        text,
                    }),
                    (Some(_), 1) => Some(GameEvent::ChatMessage {
                        sender,
                        channel: ChatChannel::Team,
                        text,
                    }),
                    (Some(_), 2) | (None, _) => Some(GameEvent::ServerMessage { text }),
                    (Some(_), _) => None,
                };
                if let Some(event) = event {
                    sink.apply(event);
                }
                Ok(None)
            }
            PacketType::PlayerLeft => {
                let (id, _) = self.require_player(reader, sink)?;
                sink.apply(GameEvent::PlayerLeft { id });
                self.slots.set_team(id, None);
                Ok(None)
            }
            PacketType::TerritoryCapture => self.territory_capture(reader, sink),
            PacketType::ProgressBar => self.progress_bar(reader, sink),
            PacketType::IntelCapture => self.intel_capture(reader, sink),
            PacketType::IntelPickup => self.intel_pickup(reader, sink),
            PacketType::IntelDrop => self.intel_drop(reader, sink),
            PacketType::Restock => {
                let id = self.require_local(reader, sink)?;
                sink.apply(GameEvent::Restock { id });
                Ok(None)
            }
            PacketType::FogColour => {
                if sink.has_world() {
                    reader.skip(1)?;
                    let color = reader.read_color()?;
                    sink.apply(GameEvent::FogColor(color));
                }
                Ok(None)
            }
            PacketType::WeaponReload => {
                let (id, _) = self.require_player(reader, sink)?;
                if Some(id) != self.local_player {
                    sink.apply(GameEvent::Reload { id });
                } else {
                    let clip = reader.read_u8()?;
                    let reserve = reader.read_u8()?;
                    // Echoes of our own reload request carry 255/255.
                    if clip < 255 && reserve < 255 {
                        sink.apply(GameEvent::ReloadDone { id, clip, reserve });
                    }
                }
                Ok(None)
            }
            PacketType::ChangeTeam => {
                let (id, _) = self.require_player(reader, sink)?;
                let team = reader.read_u8()?;
                if team > 2 {
                    return Err(reader.invalid("team", team));
                }
                sink.apply(GameEvent::TeamChanged { id, team });
                Ok(None)
            }
            PacketType::ChangeWeapon => {
                reader.skip(1)?;
                read_weapon(reader)?;
                Ok(None)
            }
            PacketType::MapStart
            | PacketType::HandShakeInit
            | PacketType::HandShakeReturn
            | PacketType::VersionGet
            | PacketType::VersionSend => Err(reader.invalid("packet type", reader.tag())),
        }
    }

    fn require_local<S: SimulationSink>(
        &self,
        reader: &PacketReader<'_>,
        sink: &S,
    ) -> Result<u8, NetError> {
        require_world(reader, sink)?;
        match self.local_player {
            Some(id) if sink.player(id).is_some() => Ok(id),
            _ => Err(reader.invalid("local player", "missing")),
        }
    }

    /// Reads a player id that must name an existing player.
    fn require_player<S: SimulationSink>(
        &self,
        reader: &mut PacketReader<'_>,
        sink: &S,
    ) -> Result<(u8, PlayerInfo), NetError> {
        require_world(reader, sink)?;
        let id = reader.read_u8()?;
        match sink.player(id) {
            Some(info) => Ok((id, info)),
            None => Err(reader.invalid("player id", id)),
        }
    }

    fn position_data<S: SimulationSink>(
        &mut self,
        reader: &mut PacketReader<'_>,
        sink: &mut S,
    ) -> Result<Option<Signal>, NetError> {
        let id = self.require_local(reader, sink)?;
        // Some servers send a bare four-byte position packet.
        if reader.data().len() < 12 {
            return Ok(None);
        }
        let position = reader.read_vec3()?;
        sink.apply(GameEvent::PlayerPosition { id, position });
        Ok(None)
    }

    fn world_update<S: SimulationSink>(
        &mut self,
        reader: &mut PacketReader<'_>,
        sink: &mut S,
    ) -> Result<Option<Signal>, NetError> {
        let width = self.protocol.world_update_width();
        let payload = reader.remaining();
        if payload % width != 0 {
            return Err(reader.invalid("world update length", payload));
        }

        // Nothing is applied unless every record is valid.
        let mut records = Vec::with_capacity(payload / width);
        for index in 0..payload / width {
            let id = match self.protocol {
                ProtocolVersion::V075 => index as u8,
                ProtocolVersion::V076 => reader.read_u8()?,
            };
            if index >= MAX_PLAYER_SLOTS || !SlotCache::contains(id) {
                return Err(reader.invalid("player id", id));
            }
            let position = reader.read_vec3()?;
            let front = reader.read_vec3()?;
            if !position.is_finite() || !front.is_finite() {
                return Err(reader.invalid("player motion", format!("{position} {front}")));
            }
            records.push((id, position, front));
        }

        for (id, position, front) in records {
            self.slots.record_motion(id, position, front);
            if position == Vec3::ZERO && front == Vec3::ZERO {
                continue;
            }
            if sink.has_world() && sink.player(id).is_some() && Some(id) != self.local_player {
                sink.apply(GameEvent::PlayerMoved {
                    id,
                    position,
                    front,
                });
            }
        }
        Ok(Some(Signal::WorldUpdate))
    }

    fn input_data<S: SimulationSink>(
        &mut self,
        reader: &mut PacketReader<'_>,
        sink: &mut S,
    ) -> Result<Option<Signal>, NetError> {
        if !sink.has_world() {
            return Ok(None);
        }
        let (id, _) = self.require_player(reader, sink)?;
        let input = PlayerInput::from_bits_retain(reader.read_u8()?);
        if Some(id) == self.local_player {
            // The server forces jumps on the local player (fly mode).
            if input.contains(PlayerInput::JUMP) {
                sink.apply(GameEvent::ForceJump { id });
            }
        } else {
            sink.apply(GameEvent::PlayerInput { id, input });
        }
        Ok(None)
    }

    fn weapon_input<S: SimulationSink>(
        &mut self,
        reader: &mut PacketReader<'_>,
        sink: &mut S,
    ) -> Result<Option<Signal>, NetError> {
        if !sink.has_world() {
            return Ok(None);
        }
        let (id, _) = self.require_player(reader, sink)?;
        let input = WeaponInput::from_bits_retain(reader.read_u8()?);
        if Some(id) != self.local_player {
            sink.apply(GameEvent::WeaponInput { id, input });
        }
        Ok(None)
    }

    fn existing_player<S: SimulationSink>(
        &mut self,
        reader: &mut PacketReader<'_>,
        sink: &mut S,
    ) -> Result<Option<Signal>, NetError> {
        if !sink.has_world() {
            return Ok(None);
        }
        let id = reader.read_u8()?;
        let team = reader.read_u8()?;
        let weapon = read_weapon(reader)?;
        let tool = read_tool(reader)?;
        let kills = reader.read_u32()?;
        let block_color = reader.read_color()?;
        let name = reader.read_remaining_string();
        if !SlotCache::contains(id) {
            return Err(reader.invalid("player id", id));
        }

        sink.apply(GameEvent::ExistingPlayer {
            id,
            team,
            weapon,
            tool,
            kills,
            block_color,
            name,
            position: self.slots.position(id),
        });
        self.slots.set_team(id, Some(team));
        Ok(None)
    }

    fn move_object<S: SimulationSink>(
        &mut self,
        reader: &mut PacketReader<'_>,
        sink: &mut S,
    ) -> Result<Option<Signal>, NetError> {
        require_world(reader, sink)?;
        let object = reader.read_u8()?;
        let state = reader.read_u8()?;
        let pos = reader.read_vec3()?;

        match self.mode.as_mut() {
            Some(GameMode::CaptureTheFlag(ctf)) => {
                if let Some(object) = CtfObject::from_wire(object) {
                    ctf.move_object(object, pos);
                }
            }
            Some(GameMode::TerritoryControl(tc)) => {
                if object as usize >= tc.territories.len() {
                    return Err(reader.invalid("territory id", object));
                }
                if state > 2 {
                    return Err(reader.invalid("territory owner", state));
                }
                if let Some(territory) = tc.territory_mut(object) {
                    territory.pos = pos;
                    territory.owner = state;
                }
            }
            None => return Ok(None),
        }
        if let Some(mode) = &self.mode {
            sink.apply(GameEvent::ModeChanged(mode.clone()));
        }
        Ok(None)
    }

    fn create_player<S: SimulationSink>(
        &mut self,
        reader: &mut PacketReader<'_>,
        sink: &mut S,
    ) -> Result<Option<Signal>, NetError> {
        require_world(reader, sink)?;
        let id = reader.read_u8()?;
        let weapon = read_weapon(reader)?;
        let team = reader.read_u8()?;
        let mut position = reader.read_vec3()?;
        position.z -= 2.0;
        let name = reader.read_remaining_string();
        if !SlotCache::contains(id) {
            return Err(reader.invalid("player id", id));
        }

        sink.apply(GameEvent::PlayerCreated {
            id,
            team,
            weapon,
            position,
            name: (!name.is_empty()).then_some(name),
        });

        let signal = if Some(id) == self.local_player {
            sink.apply(GameEvent::LocalPlayerCreated { id });
            Some(Signal::LocalPlayerCreated(id))
        } else {
            if self.slots.team(id) != Some(team) {
                sink.apply(GameEvent::PlayerJoinedTeam { id, team });
                self.slots.set_team(id, Some(team));
            }
            None
        };
        sink.apply(GameEvent::PlayerSpawned { id });
        Ok(signal)
    }

    fn block_action<S: SimulationSink>(
        &mut self,
        reader: &mut PacketReader<'_>,
        sink: &mut S,
    ) -> Result<Option<Signal>, NetError> {
        require_world(reader, sink)?;
        let actor_id = reader.read_u8()?;
        let actor = sink.player(actor_id).map(|info| (actor_id, info));
        let action = reader.read_u8()?;
        let cell = reader.read_ivec3()?;

        let Some(action) = BlockActionType::from_wire(action) else {
            return Err(reader.invalid("block action", action));
        };
        match action {
            BlockActionType::Build => {
                let replace = sink.is_solid(cell);
                match actor {
                    None => sink.apply(GameEvent::BlockCreated {
                        cell,
                        color: self.fallback_color,
                        actor: None,
                    }),
                    Some((id, info)) => {
                        sink.apply(GameEvent::BlockCreated {
                            cell,
                            color: info.block_color,
                            actor: Some(id),
                        });
                        if !replace {
                            sink.apply(GameEvent::BlocksUsed { id, count: 1 });
                        }
                    }
                }
            }
            BlockActionType::Destroy => {
                sink.apply(GameEvent::BlocksDestroyed {
                    cells: vec![cell],
                    cause: DestroyCause::Tool,
                });
                if let Some((id, info)) = actor {
                    if info.tool == Tool::Spade {
                        sink.apply(GameEvent::BlockGained { id });
                    }
                }
            }
            BlockActionType::Dig => {
                let cells = (-1..=1).map(|z| cell.saturating_add(IVec3::new(0, 0, z))).collect();
                sink.apply(GameEvent::BlocksDestroyed {
                    cells,
                    cause: DestroyCause::Dig,
                });
            }
            BlockActionType::Grenade => {
                let mut cells = Vec::with_capacity(27);
                for x in -1..=1 {
                    for y in -1..=1 {
                        for z in -1..=1 {
                            cells.push(cell.saturating_add(IVec3::new(x, y, z)));
                        }
                    }
                }
                sink.apply(GameEvent::BlocksDestroyed {
                    cells,
                    cause: DestroyCause::Grenade,
                });
            }
        }
        Ok(None)
    }

    fn block_line<S: SimulationSink>(
        &mut self,
        reader: &mut PacketReader<'_>,
        sink: &mut S,
    ) -> Result<Option<Signal>, NetError> {
        require_world(reader, sink)?;
        let actor_id = reader.read_u8()?;
        let actor = sink.player(actor_id).map(|info| (actor_id, info));
        let from = reader.read_ivec3()?;
        let to = reader.read_ivec3()?;

        let color = actor
            .map(|(_, info)| info.block_color)
            .unwrap_or(self.fallback_color);
        let cells = cube_line(from, to, MAX_LINE_LENGTH);
        for &cell in &cells {
            if !sink.is_solid(cell) {
                sink.apply(GameEvent::BlockCreated {
                    cell,
                    color,
                    actor: actor.map(|(id, _)| id),
                });
            }
        }
        if let Some((id, _)) = actor {
            sink.apply(GameEvent::BlocksUsed {
                id,
                count: cells.len() as u32,
            });
        }
        Ok(None)
    }

    fn state_data<S: SimulationSink>(
        &mut self,
        reader: &mut PacketReader<'_>,
        sink: &mut S,
    ) -> Result<Option<Signal>, NetError> {
        if !sink.has_world() {
            return Ok(None);
        }
        let local_player = reader.read_u8()?;
        let fog = reader.read_color()?;
        let colors = [reader.read_color()?, reader.read_color()?];
        let names = [reader.read_string(10)?, reader.read_string(10)?];
        let mode = GameMode::decode(reader)?;

        // Nothing is committed until the whole packet decoded.
        let [name0, name1] = names;
        let teams = [
            TeamInfo {
                name: name0,
                color: colors[0],
            },
            TeamInfo {
                name: name1,
                color: colors[1],
            },
        ];
        self.teams = teams.clone();
        self.local_player = Some(local_player);
        self.mode = Some(mode.clone());

        log::info!(
            "Joined as player {} ({} mode, teams '{}' / '{}')",
            local_player,
            mode.name(),
            teams[0].name,
            teams[1].name
        );
        sink.apply(GameEvent::WorldState {
            local_player,
            fog,
            teams,
        });
        sink.apply(GameEvent::ModeChanged(mode));
        sink.apply(GameEvent::JoinedGame);
        Ok(Some(Signal::Joined))
    }

    fn kill_action<S: SimulationSink>(
        &mut self,
        reader: &mut PacketReader<'_>,
        sink: &mut S,
    ) -> Result<Option<Signal>, NetError> {
        let (victim, _) = self.require_player(reader, sink)?;
        let (mut killer, _) = self.require_player(reader, sink)?;
        let kind = reader.read_u8()?;
        let Some(kind) = KillType::from_wire(kind) else {
            return Err(reader.invalid("kill type", kind));
        };
        let respawn_time = reader.read_u8()?;

        if kind.is_self_inflicted() {
            killer = victim;
        }
        sink.apply(GameEvent::PlayerKilled {
            victim,
            killer,
            kind,
            respawn_time,
        });
        if killer != victim {
            sink.apply(GameEvent::KillsAdded {
                id: killer,
                amount: 1,
            });
        }
        Ok(None)
    }

    fn territory_capture<S: SimulationSink>(
        &mut self,
        reader: &mut PacketReader<'_>,
        sink: &mut S,
    ) -> Result<Option<Signal>, NetError> {
        let territory = reader.read_u8()?;
        let winning = reader.read_u8()? != 0;
        let team = reader.read_u8()?;

        let Some(mode) = self.mode.as_mut() else {
            return Ok(None);
        };
        let Some(tc) = mode.as_tc_mut() else {
            return Err(reader.invalid("game mode", "territory capture outside tc"));
        };
        if !tc.capture(territory, team) {
            return Err(reader.invalid("territory id", territory));
        }
        sink.apply(GameEvent::TerritoryCaptured { territory, team });
        if winning {
            sink.apply(GameEvent::TeamWon { team });
        }
        Ok(None)
    }

    fn progress_bar<S: SimulationSink>(
        &mut self,
        reader: &mut PacketReader<'_>,
        sink: &mut S,
    ) -> Result<Option<Signal>, NetError> {
        let territory = reader.read_u8()?;
        let capturing_team = reader.read_u8()?;
        let rate = reader.read_i8()?;
        let progress = reader.read_f32()?;

        let Some(mode) = self.mode.as_mut() else {
            return Ok(None);
        };
        let Some(tc) = mode.as_tc_mut() else {
            return Err(reader.invalid("game mode", "progress bar outside tc"));
        };
        if territory as usize >= tc.territories.len() {
            return Err(reader.invalid("territory id", territory));
        }
        if !(-0.1..=1.1).contains(&progress) {
            return Err(reader.invalid("progress", progress));
        }
        if let Some(t) = tc.territory_mut(territory) {
            t.progress_base = progress;
            t.progress_rate = rate as f32 * TC_CAPTURE_RATE;
            t.capturing_team = Some(capturing_team);
        }
        sink.apply(GameEvent::TerritoryProgress {
            territory,
            capturing_team,
            rate,
            progress,
        });
        Ok(None)
    }

    /// Resolves the CTF state for an intel packet. `Ok(None)` means there is
    /// no mode yet and the packet is ignored.
    fn ctf_team<'m>(
        mode: Option<&'m mut GameMode>,
        reader: &PacketReader<'_>,
        team: u8,
    ) -> Result<Option<&'m mut CtfState>, NetError> {
        let Some(mode) = mode else {
            return Ok(None);
        };
        let Some(ctf) = mode.as_ctf_mut() else {
            return Err(reader.invalid("game mode", "intel packet outside ctf"));
        };
        if team > 1 {
            return Err(reader.invalid("team", team));
        }
        Ok(Some(ctf))
    }

    fn intel_capture<S: SimulationSink>(
        &mut self,
        reader: &mut PacketReader<'_>,
        sink: &mut S,
    ) -> Result<Option<Signal>, NetError> {
        require_world(reader, sink)?;
        if self.mode.is_none() {
            return Ok(None);
        }
        let (id, info) = self.require_player(reader, sink)?;
        let winning = reader.read_u8()? != 0;
        let Some(ctf) = Self::ctf_team(self.mode.as_mut(), reader, info.team)? else {
            return Ok(None);
        };
        let team = &mut ctf.teams[info.team as usize];
        team.has_intel = false;
        team.carrier = None;
        team.score = team.score.saturating_add(1);

        sink.apply(GameEvent::IntelCaptured { id });
        sink.apply(GameEvent::KillsAdded { id, amount: 10 });
        if winning {
            sink.apply(GameEvent::TeamWon { team: info.team });
        }
        Ok(None)
    }

    fn intel_pickup<S: SimulationSink>(
        &mut self,
        reader: &mut PacketReader<'_>,
        sink: &mut S,
    ) -> Result<Option<Signal>, NetError> {
        let (id, info) = self.require_player(reader, sink)?;
        let Some(ctf) = Self::ctf_team(self.mode.as_mut(), reader, info.team)? else {
            return Ok(None);
        };
        let team = &mut ctf.teams[info.team as usize];
        team.has_intel = true;
        team.carrier = Some(id);
        sink.apply(GameEvent::IntelPickedUp { id });
        Ok(None)
    }

    fn intel_drop<S: SimulationSink>(
        &mut self,
        reader: &mut PacketReader<'_>,
        sink: &mut S,
    ) -> Result<Option<Signal>, NetError> {
        let (id, info) = self.require_player(reader, sink)?;
        if self.mode.is_none() {
            return Ok(None);
        }
        let position = reader.read_vec3()?;
        let Some(ctf) = Self::ctf_team(self.mode.as_mut(), reader, info.team)? else {
            return Ok(None);
        };
        let holder = info.team as usize;
        ctf.teams[holder].has_intel = false;
        ctf.teams[holder].carrier = None;
        ctf.teams[1 - holder].flag_pos = position;
        sink.apply(GameEvent::IntelDropped { id, position });
        Ok(None)
    }
}

fn require_world<S: SimulationSink>(reader: &PacketReader<'_>, sink: &S) -> Result<(), NetError> {
    if sink.has_world() {
        Ok(())
    } else {
        Err(NetError::NoWorld { tag: reader.tag() })
    }
}

fn read_weapon(reader: &mut PacketReader<'_>) -> Result<WeaponType, NetError> {
    let value = reader.read_u8()?;
    WeaponType::from_wire(value).ok_or_else(|| reader.invalid("weapon", value))
}

fn read_tool(reader: &mut PacketReader<'_>) -> Result<Tool, NetError> {
    let value = reader.read_u8()?;
    Tool::from_wire(value).ok_or_else(|| reader.invalid("tool", value))
}
