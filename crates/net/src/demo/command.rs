use thiserror::Error;

/// Longest goto accepted as a bare number of seconds.
const MAX_GOTO_SECONDS: u32 = 10 * 60 * 60;
const MAX_GOTO_HOURS: u32 = 10;

/// Playback control typed into the chat box during replay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DemoCommand {
    TogglePause,
    Unpause,
    Speed(f64),
    Goto(u32),
    NextUpdates(u32),
    PrevUpdates(u32),
    Forward(u32),
    Backward(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("not a demo command")]
    Unknown,
    #[error("invalid argument '{0}'")]
    InvalidArgument(String),
    #[error("time field out of range in '{0}'")]
    OutOfRange(String),
}

impl DemoCommand {
    pub fn parse(text: &str) -> Result<Self, CommandError> {
        match text {
            "pause" => return Ok(DemoCommand::TogglePause),
            "unpause" => return Ok(DemoCommand::Unpause),
            _ => {}
        }
        if text.len() <= 3 {
            return Err(CommandError::Unknown);
        }
        let Some((verb, arg)) = text.split_at_checked(3) else {
            return Err(CommandError::Unknown);
        };

        match verb {
            "sp " => {
                if arg.is_empty() || !arg.chars().all(|c| c.is_ascii_digit() || c == '.') {
                    return Err(CommandError::InvalidArgument(arg.to_string()));
                }
                let speed = arg
                    .parse()
                    .map_err(|_| CommandError::InvalidArgument(arg.to_string()))?;
                Ok(DemoCommand::Speed(speed))
            }
            "gt " => parse_timestamp(arg).map(DemoCommand::Goto),
            "nu " | "pu " | "ff " | "bb " => {
                let count = parse_count(arg)?;
                Ok(match verb {
                    "nu " => DemoCommand::NextUpdates(count),
                    "pu " => DemoCommand::PrevUpdates(count),
                    "ff " => DemoCommand::Forward(count),
                    _ => DemoCommand::Backward(count),
                })
            }
            _ => Err(CommandError::Unknown),
        }
    }
}

fn parse_count(arg: &str) -> Result<u32, CommandError> {
    if arg.is_empty() || !arg.chars().all(|c| c.is_ascii_digit()) {
        return Err(CommandError::InvalidArgument(arg.to_string()));
    }
    match arg.parse() {
        Ok(0) | Err(_) => Err(CommandError::InvalidArgument(arg.to_string())),
        Ok(count) => Ok(count),
    }
}

/// `ss`, `mm:ss` or `hh:mm:ss` in seconds.
fn parse_timestamp(arg: &str) -> Result<u32, CommandError> {
    let fields: Vec<&str> = arg.split(':').collect();
    if fields.len() > 3 {
        return Err(CommandError::InvalidArgument(arg.to_string()));
    }
    let mut values = Vec::with_capacity(fields.len());
    for field in &fields {
        if field.is_empty() || !field.chars().all(|c| c.is_ascii_digit()) {
            return Err(CommandError::InvalidArgument(arg.to_string()));
        }
        let value: u32 = field
            .parse()
            .map_err(|_| CommandError::OutOfRange(arg.to_string()))?;
        values.push(value);
    }

    let out_of_range = || CommandError::OutOfRange(arg.to_string());
    match values.as_slice() {
        [secs] if *secs <= MAX_GOTO_SECONDS => Ok(*secs),
        [mins, secs] if *mins <= 59 && *secs <= 59 => Ok(mins * 60 + secs),
        [hours, mins, secs] if *hours <= MAX_GOTO_HOURS && *mins <= 59 && *secs <= 59 => {
            Ok(hours * 3600 + mins * 60 + secs)
        }
        _ => Err(out_of_range()),
    }
}
