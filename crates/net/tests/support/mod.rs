#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::io::{self, Write};
use std::rc::Rc;
use std::time::Duration;

use glam::{IVec3, Vec3};
use spadenet::game::{FollowTarget, GameEvent, MapCodec, PlayerInfo, SimulationSink};
use spadenet::net::{
    Color, MapDecodeError, PacketType, PacketWriter, ProtocolVersion, ServerAddress,
    Tool, Traffic, Transport, TransportError, TransportEvent,
};

/// Sink that keeps just enough world state for the dispatcher and logs
/// every event it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub world: Option<Vec<u8>>,
    pub players: HashMap<u8, PlayerInfo>,
    pub solid: HashSet<IVec3>,
    pub follow: Option<FollowTarget>,
    pub events: Vec<GameEvent>,
    pub worlds_set: usize,
}

impl SimulationSink for RecordingSink {
    type Map = Vec<u8>;

    fn set_world(&mut self, map: Vec<u8>) {
        self.world = Some(map);
        self.worlds_set += 1;
    }

    fn clear_world(&mut self) {
        self.world = None;
        self.players.clear();
        self.solid.clear();
        self.follow = None;
    }

    fn has_world(&self) -> bool {
        self.world.is_some()
    }

    fn player(&self, id: u8) -> Option<PlayerInfo> {
        self.players.get(&id).copied()
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
        match &event {
            GameEvent::ExistingPlayer {
                id,
                team,
                tool,
                block_color,
                ..
            } => {
                self.players.insert(
                    *id,
                    PlayerInfo {
                        team: *team,
                        tool: *tool,
                        block_color: *block_color,
                        front: Vec3::X,
                    },
                );
            }
            GameEvent::PlayerCreated { id, team, .. } => {
                self.players.insert(
                    *id,
                    PlayerInfo {
                        team: *team,
                        tool: Tool::Weapon,
                        block_color: Color::default(),
                        front: Vec3::X,
                    },
                );
            }
            GameEvent::PlayerLeft { id } => {
                self.players.remove(id);
            }
            GameEvent::PlayerMoved { id, front, .. } => {
                if let Some(p) = self.players.get_mut(id) {
                    p.front = *front;
                }
            }
            GameEvent::ToolChanged { id, tool } => {
                if let Some(p) = self.players.get_mut(id) {
                    p.tool = *tool;
                }
            }
            GameEvent::BlockColorChanged { id, color } => {
                if let Some(p) = self.players.get_mut(id) {
                    p.block_color = *color;
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
            _ => {}
        }
        self.events.push(event);
    }
}

/// Accepts the map once at least `complete_len` bytes arrived.
#[derive(Debug, Clone, Default)]
pub struct FakeCodec {
    pub complete_len: usize,
    pub corrupt: bool,
    pub attempts: Rc<Cell<usize>>,
}

impl FakeCodec {
    pub fn new(complete_len: usize) -> Self {
        Self {
            complete_len,
            ..Self::default()
        }
    }
}

impl MapCodec for FakeCodec {
    type Map = Vec<u8>;

    fn decode(&mut self, data: &[u8]) -> Result<Vec<u8>, MapDecodeError> {
        self.attempts.set(self.attempts.get() + 1);
        if self.corrupt {
            Err(MapDecodeError::Corrupt("bad header".into()))
        } else if data.len() < self.complete_len {
            Err(MapDecodeError::NeedsMoreData)
        } else {
            Ok(data.to_vec())
        }
    }
}

#[derive(Debug, Default)]
pub struct Script {
    pub inbound: VecDeque<TransportEvent>,
    pub sent: Vec<Vec<u8>>,
    pub connected_to: Option<(ServerAddress, ProtocolVersion)>,
    pub disconnects: usize,
    pub rtt: Option<Duration>,
    pub waits: Vec<Duration>,
}

/// In-memory transport fed from a shared script.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport(pub Rc<RefCell<Script>>);

impl ScriptedTransport {
    pub fn push(&self, event: TransportEvent) {
        self.0.borrow_mut().inbound.push_back(event);
    }

    pub fn receive(&self, packet: Vec<u8>) {
        self.push(TransportEvent::Received(packet));
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.0.borrow().sent.clone()
    }
}

impl Transport for ScriptedTransport {
    fn connect(
        &mut self,
        address: &ServerAddress,
        protocol: ProtocolVersion,
    ) -> Result<(), TransportError> {
        self.0.borrow_mut().connected_to = Some((address.clone(), protocol));
        Ok(())
    }

    fn disconnect(&mut self) {
        self.0.borrow_mut().disconnects += 1;
    }

    fn service(&mut self, timeout: Duration) -> Result<Option<TransportEvent>, TransportError> {
        let mut script = self.0.borrow_mut();
        script.waits.push(timeout);
        Ok(script.inbound.pop_front())
    }

    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.0.borrow_mut().sent.push(data.to_vec());
        Ok(())
    }

    fn round_trip_time(&self) -> Option<Duration> {
        self.0.borrow().rtt
    }

    fn take_traffic(&mut self) -> Traffic {
        Traffic::default()
    }
}

/// Shared in-memory file for demo recordings.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(pub Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn bytes(&self) -> Vec<u8> {
        self.0.borrow().clone()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn map_start(size: u32) -> Vec<u8> {
    let mut w = PacketWriter::new(PacketType::MapStart);
    w.write_u32(size);
    w.into_bytes()
}

pub fn map_chunk(data: &[u8]) -> Vec<u8> {
    let mut w = PacketWriter::new(PacketType::MapChunk);
    w.write_bytes(data);
    w.into_bytes()
}

pub fn existing_player(id: u8, team: u8, tool: Tool, color: Color, name: &str) -> Vec<u8> {
    let mut w = PacketWriter::new(PacketType::ExistingPlayer);
    w.write_u8(id)
        .write_u8(team)
        .write_u8(0)
        .write_u8(tool as u8)
        .write_u32(0)
        .write_color(color)
        .write_fixed_str(name, 16);
    w.into_bytes()
}

pub fn create_player(id: u8, team: u8, position: Vec3, name: &str) -> Vec<u8> {
    let mut w = PacketWriter::new(PacketType::CreatePlayer);
    w.write_u8(id)
        .write_u8(0)
        .write_u8(team)
        .write_vec3(position)
        .write_str(name);
    w.into_bytes()
}

pub fn chat(sender: u8, kind: u8, text: &str) -> Vec<u8> {
    let mut w = PacketWriter::new(PacketType::ChatMessage);
    w.write_u8(sender).write_u8(kind).write_str(text);
    w.into_bytes()
}

pub fn block_action(actor: u8, action: u8, cell: IVec3) -> Vec<u8> {
    let mut w = PacketWriter::new(PacketType::BlockAction);
    w.write_u8(actor).write_u8(action).write_ivec3(cell);
    w.into_bytes()
}

/// One 0.75 world update record per motion, slot index implicit.
pub fn world_update(motions: &[(Vec3, Vec3)]) -> Vec<u8> {
    let mut w = PacketWriter::new(PacketType::WorldUpdate);
    for (position, front) in motions {
        w.write_vec3(*position).write_vec3(*front);
    }
    w.into_bytes()
}

/// CTF state with nobody holding intel.
pub fn state_data(local_player: u8) -> Vec<u8> {
    let mut w = PacketWriter::new(PacketType::StateData);
    w.write_u8(local_player)
        .write_color(Color::new(128, 232, 255))
        .write_color(Color::new(0, 0, 255))
        .write_color(Color::new(0, 255, 0))
        .write_fixed_str("Blue", 10)
        .write_fixed_str("Green", 10)
        .write_u8(0)
        .write_u8(0)
        .write_u8(0)
        .write_u8(10)
        .write_u8(0)
        .write_vec3(Vec3::new(10.0, 10.0, 10.0))
        .write_vec3(Vec3::new(500.0, 10.0, 10.0))
        .write_vec3(Vec3::new(20.0, 20.0, 20.0))
        .write_vec3(Vec3::new(490.0, 20.0, 20.0));
    w.into_bytes()
}

pub fn grenade(position: Vec3) -> Vec<u8> {
    let mut w = PacketWriter::new(PacketType::Grenade);
    w.write_u8(0)
        .write_f32(3.0)
        .write_vec3(position)
        .write_vec3(Vec3::ZERO);
    w.into_bytes()
}
