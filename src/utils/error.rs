//! Error types for ErfPlayer
//!
//! This module defines custom error types used throughout the crate.
//! We use thiserror for convenient error type definitions and anyhow for
//! application-level error handling in the binary.

use thiserror::Error;

/// Main error type for ErfPlayer
#[derive(Error, Debug)]
pub enum PlayerError {
    /// A command that requires a current track was issued against an
    /// empty playlist. Recovered locally as a no-op by the controller;
    /// it never crosses the public API.
    #[error("playlist is empty")]
    EmptyPlaylist,

    /// An index-based operation was given an invalid index
    #[error("index {index} out of range (playlist has {count} tracks)")]
    IndexOutOfRange { index: usize, count: usize },

    /// The underlying device failed to open a track
    #[error("failed to load track: {0}")]
    DeviceLoad(String),

    /// A command on an already-loaded device failed
    #[error("device error: {0}")]
    Device(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("file error: {0}")]
    FileIo(#[from] std::io::Error),
}

impl PlayerError {
    /// Short machine-readable tag for this error, used as the `kind`
    /// field of `PlayerEvent::PlaybackError`.
    pub fn kind(&self) -> &'static str {
        match self {
            PlayerError::EmptyPlaylist => "empty-playlist",
            PlayerError::IndexOutOfRange { .. } => "index-out-of-range",
            PlayerError::DeviceLoad(_) => "device-load",
            PlayerError::Device(_) => "device",
            PlayerError::Config(_) => "config",
            PlayerError::FileIo(_) => "file-io",
        }
    }
}

/// Convenience type alias for Results in ErfPlayer
pub type Result<T> = std::result::Result<T, PlayerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlayerError::IndexOutOfRange { index: 7, count: 3 };
        assert_eq!(err.to_string(), "index 7 out of range (playlist has 3 tracks)");

        let err = PlayerError::DeviceLoad("bad file".to_string());
        assert_eq!(err.to_string(), "failed to load track: bad file");
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let player_err: PlayerError = io_err.into();
        assert!(matches!(player_err, PlayerError::FileIo(_)));
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(PlayerError::EmptyPlaylist.kind(), "empty-playlist");
        assert_eq!(PlayerError::Device("x".into()).kind(), "device");
    }
}
