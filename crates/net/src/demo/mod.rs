pub mod clock;
pub mod command;
pub mod file;
pub mod player;
pub mod recorder;

pub use clock::{ClockEffect, DemoClock, Skip};
pub use command::{CommandError, DemoCommand};
pub use file::{DemoEntry, DemoError, DemoReader, DemoWriter, format_duration};
pub use player::{DemoPlayer, PlaybackState};
pub use recorder::DemoRecorder;
