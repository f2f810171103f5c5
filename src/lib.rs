//! ErfPlayer - a headless media player core
//!
//! The crate owns playlist order, current-track selection,
//! play/pause/stop/seek transitions, shuffle and repeat policy, and the
//! periodic reconciliation between a playback device's reported position
//! and the host's progress display. Decoding and rendering are delegated
//! to external playback devices behind [`device::MediaDevice`]; hosts
//! drive the [`player::PlaybackController`] with commands and a fixed
//! tick, and observe it through events.

pub mod device;
pub mod player;
pub mod playlist_file;
pub mod utils;

pub use player::{
    PlaybackController, PlaybackState, PlayerCommand, PlayerEvent, Playlist, RepeatMode,
};
pub use utils::error::{PlayerError, Result};
