mod sink;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use spadenet::ClientConfig;
use spadenet::demo::clock::{MAX_SPEED, MIN_SPEED};
use spadenet::demo::file::DEMO_FORMAT_VERSION;
use spadenet::demo::{DemoCommand, DemoPlayer, DemoReader, PlaybackState, format_duration};
use spadenet::net::{PacketType, dump_packet};

use sink::{LoggingSink, RawMapCodec};

#[derive(Parser)]
#[command(name = "spadenet-demo")]
#[command(about = "Inspect and replay Ace of Spades demo recordings")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Header, length and packet mix of a recording
    Inspect { file: PathBuf },
    /// Every entry with its timestamp and a hex dump
    Dump {
        file: PathBuf,

        #[arg(short, long, help = "Stop after this many entries")]
        limit: Option<usize>,

        #[arg(short, long, help = "Only entries with this packet tag")]
        tag: Option<u8>,
    },
    /// Parse playback commands without playing anything
    Commands {
        #[arg(required = true)]
        lines: Vec<String>,
    },
    /// Replay a recording headless, logging what happens in the game
    Replay {
        file: PathBuf,

        #[arg(short, long, default_value_t = 1.0)]
        speed: f64,

        #[arg(
            short,
            long = "command",
            help = "Playback command run before the first entry (e.g. \"gt 1:30\")"
        )]
        commands: Vec<String>,

        #[arg(long, help = "Pace playback against the wall clock")]
        realtime: bool,

        #[arg(long, default_value_t = 0.05, help = "Seconds advanced per poll")]
        step: f64,

        #[arg(long, default_value = "Deuce")]
        name: String,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match args.command {
        Command::Inspect { file } => inspect(&file),
        Command::Dump { file, limit, tag } => dump(&file, limit, tag),
        Command::Commands { lines } => {
            check_commands(&lines);
            Ok(())
        }
        Command::Replay {
            file,
            speed,
            commands,
            realtime,
            step,
            name,
        } => {
            if !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
                bail!("speed must be between {MIN_SPEED} and {MAX_SPEED}");
            }
            if step <= 0.0 {
                bail!("step must be positive");
            }
            let config = ClientConfig {
                player_name: name,
                ..ClientConfig::default()
            };
            replay(&file, config, speed, &commands, realtime, step)
        }
    }
}

fn open(path: &Path) -> Result<DemoReader<BufReader<File>>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    DemoReader::open(BufReader::new(file)).with_context(|| format!("reading {}", path.display()))
}

fn tag_name(tag: u8) -> String {
    match PacketType::from_tag(tag) {
        Some(ty) => format!("{ty:?}"),
        None => format!("Unknown({tag})"),
    }
}

fn inspect(path: &Path) -> Result<()> {
    let reader = open(path)?;
    let protocol = reader.protocol();

    let mut entries = 0usize;
    let mut bytes = 0usize;
    let mut end = 0.0f32;
    let mut tags: BTreeMap<u8, (usize, usize)> = BTreeMap::new();
    for entry in reader {
        let entry = entry?;
        entries += 1;
        bytes += entry.data.len();
        end = entry.time;
        if let Some(&tag) = entry.data.first() {
            let slot = tags.entry(tag).or_default();
            slot.0 += 1;
            slot.1 += entry.data.len();
        }
    }

    println!("file:     {}", path.display());
    println!("format:   {DEMO_FORMAT_VERSION}");
    println!("protocol: {protocol} ({})", protocol.number());
    println!("length:   {}", format_duration(end));
    println!("entries:  {entries} ({bytes} bytes)");
    println!();
    println!("{:>4}  {:<20} {:>8} {:>10}", "tag", "packet", "count", "bytes");
    for (tag, (count, size)) in tags {
        println!("{tag:>4}  {:<20} {count:>8} {size:>10}", tag_name(tag));
    }
    Ok(())
}

fn dump(path: &Path, limit: Option<usize>, tag: Option<u8>) -> Result<()> {
    let reader = open(path)?;
    let mut shown = 0usize;
    for entry in reader {
        let entry = entry?;
        let entry_tag = entry.data.first().copied().unwrap_or(0);
        if tag.is_some_and(|wanted| wanted != entry_tag) {
            continue;
        }
        if limit.is_some_and(|limit| shown >= limit) {
            break;
        }
        println!(
            "{:>10.3}  {:<20} {}",
            entry.time,
            tag_name(entry_tag),
            dump_packet(&entry.data)
        );
        shown += 1;
    }
    Ok(())
}

fn check_commands(lines: &[String]) {
    for line in lines {
        match DemoCommand::parse(line) {
            Ok(command) => println!("{line:<16} -> {command:?}"),
            Err(err) => println!("{line:<16} -> error: {err}"),
        }
    }
}

fn replay(
    path: &Path,
    config: ClientConfig,
    speed: f64,
    commands: &[String],
    realtime: bool,
    step: f64,
) -> Result<()> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut now = 0.0;
    let mut player = DemoPlayer::open(
        BufReader::new(file),
        LoggingSink::default(),
        RawMapCodec,
        config,
        now,
    )?;
    log::info!("Replaying {} ({})", path.display(), player.duration());

    if speed != 1.0 {
        player.execute(DemoCommand::Speed(speed), now)?;
    }
    for line in commands {
        if !player.command(line, now)? {
            bail!("not a playback command: '{line}'");
        }
    }

    let started = Instant::now();
    loop {
        match player.poll(now)? {
            PlaybackState::Playing => {}
            PlaybackState::Ended => break,
            PlaybackState::Paused => {
                log::info!("Paused at {}", player.position());
                break;
            }
        }
        if realtime {
            thread::sleep(Duration::from_secs_f64(step));
            now = started.elapsed().as_secs_f64();
        } else {
            now += step;
        }
    }

    log::info!("{}", player.session().status_text());
    for (kind, count) in player.sink().counts() {
        println!("{kind:<20} {count:>8}");
    }
    Ok(())
}
