use anyhow::Result;
use clap::{Parser, ValueEnum};
use crossbeam_channel::{unbounded, Receiver, TryRecvError};
use env_logger::Env;
use log::{error, info, warn};
use std::io::BufRead;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use erfplayer::device::{ProcessDeviceFactory, RankedDeviceFactory};
use erfplayer::player::progress::format_time;
use erfplayer::utils::Config;
use erfplayer::{playlist_file, PlaybackController, PlaybackState, PlayerCommand, PlayerEvent};

/// ErfPlayer - a minimalist media player
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Media files to queue
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// M3U playlist to load
    #[arg(short, long, value_name = "PLAYLIST")]
    playlist: Option<PathBuf>,

    /// Set initial volume (0-100)
    #[arg(short, long, value_name = "VOLUME")]
    volume: Option<u8>,

    /// Start with shuffle enabled
    #[arg(short, long)]
    shuffle: bool,

    /// Repeat mode
    #[arg(short, long, value_enum, default_value_t = RepeatArg::Off)]
    repeat: RepeatArg,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RepeatArg {
    Off,
    All,
    One,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    info!("Starting ErfPlayer v{}", env!("CARGO_PKG_VERSION"));

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            warn!("Using default configuration: {}", e);
            Config::default()
        }
    };

    let mut controller = PlaybackController::new(Box::new(build_factory(&config)?));
    let events = controller.subscribe();

    if let Some(volume) = args.volume {
        controller.set_volume(f32::from(volume.min(100)) / 100.0);
    } else {
        controller.set_volume(config.playback.volume);
    }
    if args.shuffle {
        controller.set_shuffle(true);
    }
    match args.repeat {
        RepeatArg::Off => {}
        RepeatArg::All => controller.cycle_repeat(),
        RepeatArg::One => {
            controller.cycle_repeat();
            controller.cycle_repeat();
        }
    }

    if let Some(playlist) = &args.playlist {
        controller.replace_playlist(playlist_file::load(playlist)?);
    }
    controller.add_tracks(args.files);

    if controller.track_count() == 0 {
        warn!("No tracks queued; type 'add <file>' to queue tracks");
    } else if config.playback.autoplay {
        controller.play()?;
    }

    let stdin_lines = spawn_stdin_reader();
    let tick_interval = Duration::from_millis(config.playback.tick_interval_ms);
    let mut stdin_done = false;

    // Single loop serializes user commands and the progress tick
    'main: loop {
        thread::sleep(tick_interval);

        loop {
            match stdin_lines.try_recv() {
                Ok(line) => {
                    if !run_line(&mut controller, &line) {
                        break 'main;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    stdin_done = true;
                    break;
                }
            }
        }

        controller.tick();

        for event in events.try_iter() {
            report_event(&event);
        }

        // With stdin gone there is nobody left to issue commands, so
        // exit once playback has come to rest
        if stdin_done && controller.state() == PlaybackState::Stopped {
            break;
        }
    }

    controller.shutdown();
    Ok(())
}

/// Build the ranked device factory from the configured player commands
fn build_factory(config: &Config) -> Result<RankedDeviceFactory> {
    let mut factory = RankedDeviceFactory::new();
    for command in &config.devices.audio_players {
        factory.push_audio(Box::new(ProcessDeviceFactory::from_command_line(command)?));
    }
    for command in &config.devices.video_players {
        factory.push_video(Box::new(ProcessDeviceFactory::from_command_line(command)?));
    }
    Ok(factory)
}

/// Forward stdin lines to the main loop without blocking it
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = unbounded();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
        // Dropping the sender signals EOF to the main loop
    });
    rx
}

/// Execute one console line; returns false when the host should quit
fn run_line(controller: &mut PlaybackController, line: &str) -> bool {
    let mut tokens = line.split_whitespace();
    let Some(verb) = tokens.next() else {
        return true;
    };
    let rest: Vec<&str> = tokens.collect();

    let command = match (verb, rest.as_slice()) {
        ("quit" | "exit", _) => return false,
        ("play", _) => PlayerCommand::Play,
        ("pause", _) => PlayerCommand::Pause,
        ("stop", _) => PlayerCommand::Stop,
        ("next", _) => PlayerCommand::Next,
        ("prev" | "previous", _) => PlayerCommand::Previous,
        ("select", [index]) => match index.parse() {
            Ok(index) => PlayerCommand::SelectTrack(index),
            Err(_) => {
                error!("Usage: select <index>");
                return true;
            }
        },
        ("seek", [fraction]) => match fraction.parse() {
            Ok(fraction) => PlayerCommand::Seek(fraction),
            Err(_) => {
                error!("Usage: seek <0.0-1.0>");
                return true;
            }
        },
        ("volume", [volume]) => match volume.parse() {
            Ok(volume) => PlayerCommand::SetVolume(volume),
            Err(_) => {
                error!("Usage: volume <0.0-1.0>");
                return true;
            }
        },
        ("shuffle", _) => PlayerCommand::ToggleShuffle,
        ("repeat", _) => PlayerCommand::CycleRepeat,
        ("add", files) if !files.is_empty() => {
            PlayerCommand::AddTracks(files.iter().map(PathBuf::from).collect())
        }
        ("remove", [index]) => match index.parse() {
            Ok(index) => PlayerCommand::RemoveAt(index),
            Err(_) => {
                error!("Usage: remove <index>");
                return true;
            }
        },
        ("clear", _) => PlayerCommand::Clear,
        ("save", [path]) => {
            if let Err(e) = playlist_file::save(&PathBuf::from(path), controller.tracks()) {
                error!("Failed to save playlist: {}", e);
            }
            return true;
        }
        ("load", [path]) => {
            match playlist_file::load(&PathBuf::from(path)) {
                Ok(tracks) => controller.replace_playlist(tracks),
                Err(e) => error!("Failed to load playlist: {}", e),
            }
            return true;
        }
        ("list", _) => {
            for (index, track) in controller.tracks().iter().enumerate() {
                let marker = if controller.current_index() == Some(index) {
                    ">"
                } else {
                    " "
                };
                println!("{} {:3}  {}", marker, index, track.display());
            }
            return true;
        }
        _ => {
            error!("Unknown command: {}", line.trim());
            return true;
        }
    };

    if let Err(e) = controller.handle_command(command) {
        error!("Command failed: {}", e);
    }
    true
}

fn report_event(event: &PlayerEvent) {
    match event {
        PlayerEvent::StateChanged(state) => info!("State: {:?}", state),
        PlayerEvent::TrackChanged { index, track } => {
            info!("Now playing [{}]: {}", index, track.display());
        }
        PlayerEvent::Progress {
            elapsed,
            total,
            fraction,
        } => {
            info!(
                "Progress: {} / {} ({:.0}%)",
                format_time(elapsed.as_secs()),
                format_time(total.as_secs()),
                fraction * 100.0
            );
        }
        PlayerEvent::PlaylistChanged { count } => info!("Playlist: {} tracks", count),
        PlayerEvent::VolumeChanged(volume) => info!("Volume: {:.0}%", volume * 100.0),
        PlayerEvent::ShuffleChanged(enabled) => {
            info!("Shuffle {}", if *enabled { "on" } else { "off" });
        }
        PlayerEvent::RepeatChanged(mode) => info!("Repeat mode: {:?}", mode),
        PlayerEvent::PlaybackError { kind, message } => {
            error!("Playback error ({}): {}", kind, message);
        }
        PlayerEvent::PlaylistFinished => info!("Playlist finished"),
    }
}
