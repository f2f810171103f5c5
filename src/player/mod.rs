//! Playback core for ErfPlayer
//!
//! This module owns the headless playback machinery: the playlist, the
//! playback controller state machine, the repeat/shuffle traversal
//! policy, and time/progress formatting. The controller consumes
//! commands and device callbacks and emits status events; it never
//! touches pixels.

mod controller;
mod playlist;
pub mod policy;
pub mod progress;

pub use controller::PlaybackController;
pub use playlist::Playlist;

use std::path::PathBuf;
use std::time::Duration;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// No device loaded, nothing playing
    Stopped,

    /// Currently playing
    Playing,

    /// Playback paused
    Paused,
}

/// Repeat mode
///
/// Controls what happens when a track reaches its natural end. Repeat
/// and shuffle are independent axes: repeat decides end-of-track
/// behavior, shuffle decides traversal order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RepeatMode {
    /// Stop after the last track
    #[default]
    Off,

    /// Wrap to the start after the last track
    All,

    /// Replay the current track forever
    One,
}

impl RepeatMode {
    /// Advance to the next mode in the Off -> All -> One -> Off cycle
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }
}

/// Inbound command for the playback controller
///
/// Hosts (UI, CLI) drive the controller exclusively through these; see
/// [`PlaybackController::handle_command`].
#[derive(Debug, Clone)]
pub enum PlayerCommand {
    /// Start playback, or resume when paused
    Play,

    /// Pause playback
    Pause,

    /// Stop playback and release the device
    Stop,

    /// Advance to the next track per the traversal policy
    Next,

    /// Go back to the previous track per the traversal policy
    Previous,

    /// Jump to a specific track in the active order
    SelectTrack(usize),

    /// Seek to a fraction of the current track, clamped to [0, 1]
    Seek(f64),

    /// Set the volume, clamped to [0, 1]
    SetVolume(f32),

    /// Enable or disable shuffle
    SetShuffle(bool),

    /// Flip the shuffle flag
    ToggleShuffle,

    /// Cycle the repeat mode Off -> All -> One -> Off
    CycleRepeat,

    /// Append tracks to the playlist, skipping duplicates
    AddTracks(Vec<PathBuf>),

    /// Remove the track at an index in the active order
    RemoveAt(usize),

    /// Remove all tracks
    Clear,

    /// Release the device and stop; the controller stays usable
    Shutdown,
}

/// Outbound event emitted by the playback controller
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    /// Playback state transition
    StateChanged(PlaybackState),

    /// A different track was loaded and started
    TrackChanged { index: usize, track: PathBuf },

    /// Periodic progress report while playing
    Progress {
        elapsed: Duration,
        total: Duration,
        fraction: f64,
    },

    /// The playlist contents changed
    PlaylistChanged { count: usize },

    /// Volume changed (already clamped)
    VolumeChanged(f32),

    /// Shuffle was enabled or disabled
    ShuffleChanged(bool),

    /// Repeat mode changed
    RepeatChanged(RepeatMode),

    /// A device failure, converted at the controller boundary
    PlaybackError { kind: &'static str, message: String },

    /// The last track finished with repeat off
    PlaylistFinished,
}
