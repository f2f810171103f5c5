//! Playback device abstraction for ErfPlayer
//!
//! The controller drives concrete playback engines through the
//! [`MediaDevice`] trait and never learns which backend is playing a
//! given track. Opening a track goes through a [`DeviceFactory`]; the
//! [`RankedDeviceFactory`] models the original fallback chain (native
//! player, then alternate players) as an ordered candidate list per
//! media kind, trying each until one accepts the track.

mod process;

pub use process::{ProcessDevice, ProcessDeviceFactory};

use crate::utils::error::{PlayerError, Result};
use log::warn;
use std::path::Path;
use std::time::Duration;

/// Playback state reported by a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    /// Not playing; also reported after natural end-of-track
    Stopped,

    /// Actively playing
    Playing,

    /// Paused mid-track
    Paused,
}

/// Interface to a loaded playback engine
///
/// A device is created already bound to one track and owns whatever
/// resource backs it (audio handle, child process) until it is stopped
/// or dropped. Query methods take `&mut self` so process-backed devices
/// can poll their child handle.
pub trait MediaDevice: Send {
    /// Start or resume playback
    fn play(&mut self) -> Result<()>;

    /// Pause playback
    fn pause(&mut self) -> Result<()>;

    /// Stop playback and release the underlying resource
    ///
    /// Must tolerate a resource that has already gone away (a child
    /// process that exited on its own).
    fn stop(&mut self) -> Result<()>;

    /// Seek to a fraction of the track duration
    ///
    /// # Arguments
    ///
    /// * `fraction` - Target position in [0.0, 1.0]
    fn seek(&mut self, fraction: f64) -> Result<()>;

    /// Set the output volume
    ///
    /// # Arguments
    ///
    /// * `volume` - Volume level (0.0 to 1.0)
    fn set_volume(&mut self, volume: f32) -> Result<()>;

    /// Current playback position
    fn position(&mut self) -> Duration;

    /// Total track duration, or zero when unknown
    fn duration(&mut self) -> Duration;

    /// Current device state
    fn state(&mut self) -> DeviceState;
}

impl std::fmt::Debug for dyn MediaDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn MediaDevice")
    }
}

/// Opens tracks into playback devices
pub trait DeviceFactory: Send {
    /// Open a track, producing a device ready to play it
    ///
    /// # Arguments
    ///
    /// * `track` - Path of the track to load
    fn open(&mut self, track: &Path) -> Result<Box<dyn MediaDevice>>;
}

/// Coarse media classification by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
}

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "aac", "m4a", "wma", "ogg", "opus"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mkv", "mov", "wmv", "flv", "webm"];

impl MediaKind {
    /// Classify a path by its extension; unknown extensions count as audio
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Video
        } else {
            MediaKind::Audio
        }
    }

    /// Whether a path looks like a playable media file at all
    pub fn is_media_file(path: &Path) -> bool {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        AUDIO_EXTENSIONS.contains(&ext.as_str()) || VIDEO_EXTENSIONS.contains(&ext.as_str())
    }
}

/// Device factory with ranked fallback per media kind
///
/// Holds an ordered list of candidate factories for audio tracks and
/// another for video tracks. `open` picks the list by the track's media
/// kind and tries each candidate in order; a candidate that fails to
/// open the track falls through to the next one.
pub struct RankedDeviceFactory {
    audio: Vec<Box<dyn DeviceFactory>>,
    video: Vec<Box<dyn DeviceFactory>>,
}

impl RankedDeviceFactory {
    pub fn new() -> Self {
        Self {
            audio: Vec::new(),
            video: Vec::new(),
        }
    }

    /// Append an audio candidate; earlier candidates are preferred
    pub fn push_audio(&mut self, factory: Box<dyn DeviceFactory>) {
        self.audio.push(factory);
    }

    /// Append a video candidate; earlier candidates are preferred
    pub fn push_video(&mut self, factory: Box<dyn DeviceFactory>) {
        self.video.push(factory);
    }
}

impl Default for RankedDeviceFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceFactory for RankedDeviceFactory {
    fn open(&mut self, track: &Path) -> Result<Box<dyn MediaDevice>> {
        let candidates = match MediaKind::from_path(track) {
            MediaKind::Audio => &mut self.audio,
            MediaKind::Video => &mut self.video,
        };

        if candidates.is_empty() {
            return Err(PlayerError::DeviceLoad(format!(
                "no device configured for {}",
                track.display()
            )));
        }

        let mut last_error = None;
        for candidate in candidates.iter_mut() {
            match candidate.open(track) {
                Ok(device) => return Ok(device),
                Err(e) => {
                    warn!("Device candidate failed for {}: {}", track.display(), e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            PlayerError::DeviceLoad(format!("no device could open {}", track.display()))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_media_kind_from_path() {
        assert_eq!(MediaKind::from_path(Path::new("song.mp3")), MediaKind::Audio);
        assert_eq!(MediaKind::from_path(Path::new("song.FLAC")), MediaKind::Audio);
        assert_eq!(MediaKind::from_path(Path::new("clip.mkv")), MediaKind::Video);
        assert_eq!(MediaKind::from_path(Path::new("clip.MP4")), MediaKind::Video);
        // No extension falls back to audio
        assert_eq!(MediaKind::from_path(Path::new("stream")), MediaKind::Audio);
    }

    #[test]
    fn test_is_media_file() {
        assert!(MediaKind::is_media_file(Path::new("a.mp3")));
        assert!(MediaKind::is_media_file(Path::new("a.webm")));
        assert!(!MediaKind::is_media_file(Path::new("a.txt")));
        assert!(!MediaKind::is_media_file(Path::new("a")));
    }

    struct FailingFactory;

    impl DeviceFactory for FailingFactory {
        fn open(&mut self, track: &Path) -> Result<Box<dyn MediaDevice>> {
            Err(PlayerError::DeviceLoad(format!(
                "cannot open {}",
                track.display()
            )))
        }
    }

    struct RecordingDevice;

    impl MediaDevice for RecordingDevice {
        fn play(&mut self) -> Result<()> {
            Ok(())
        }
        fn pause(&mut self) -> Result<()> {
            Ok(())
        }
        fn stop(&mut self) -> Result<()> {
            Ok(())
        }
        fn seek(&mut self, _fraction: f64) -> Result<()> {
            Ok(())
        }
        fn set_volume(&mut self, _volume: f32) -> Result<()> {
            Ok(())
        }
        fn position(&mut self) -> Duration {
            Duration::ZERO
        }
        fn duration(&mut self) -> Duration {
            Duration::ZERO
        }
        fn state(&mut self) -> DeviceState {
            DeviceState::Playing
        }
    }

    struct WorkingFactory;

    impl DeviceFactory for WorkingFactory {
        fn open(&mut self, _track: &Path) -> Result<Box<dyn MediaDevice>> {
            Ok(Box::new(RecordingDevice))
        }
    }

    #[test]
    fn test_ranked_factory_falls_through() {
        let mut factory = RankedDeviceFactory::new();
        factory.push_audio(Box::new(FailingFactory));
        factory.push_audio(Box::new(WorkingFactory));

        let track = PathBuf::from("song.mp3");
        assert!(factory.open(&track).is_ok());
    }

    #[test]
    fn test_ranked_factory_reports_last_error() {
        let mut factory = RankedDeviceFactory::new();
        factory.push_audio(Box::new(FailingFactory));
        factory.push_audio(Box::new(FailingFactory));

        let err = factory.open(Path::new("song.mp3")).unwrap_err();
        assert!(matches!(err, PlayerError::DeviceLoad(_)));
    }

    #[test]
    fn test_ranked_factory_no_candidates() {
        let mut factory = RankedDeviceFactory::new();
        factory.push_audio(Box::new(WorkingFactory));

        // Video track, but only audio candidates configured
        let err = factory.open(Path::new("clip.mp4")).unwrap_err();
        assert!(matches!(err, PlayerError::DeviceLoad(_)));
    }
}
