pub mod dispatch;
pub mod event;
pub mod line;
pub mod mode;
pub mod sink;
pub mod slots;

pub use dispatch::{Dispatcher, Signal};
pub use event::{ChatChannel, DestroyCause, GameEvent, TeamInfo};
pub use line::{MAX_LINE_LENGTH, cube_line};
pub use mode::{CtfObject, CtfState, CtfTeam, GameMode, TcState, Territory};
pub use sink::{FollowMode, FollowTarget, MapCodec, PlayerInfo, SimulationSink};
pub use slots::SlotCache;
