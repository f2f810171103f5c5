//! Playback controller for ErfPlayer
//!
//! The controller is the sole owner and sole mutator of the playlist and
//! the playback session. It consumes commands and periodic ticks, drives
//! whatever device currently backs the track, and emits status events to
//! subscribers. It holds no timers or threads of its own: the host
//! schedules [`PlaybackController::tick`] at a fixed interval and calls
//! every operation from one thread.

use crate::device::{DeviceFactory, DeviceState, MediaDevice};
use crate::player::{policy, PlaybackState, PlayerCommand, PlayerEvent, Playlist, RepeatMode};
use crate::utils::error::{PlayerError, Result};

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

/// Default volume for a fresh session
const DEFAULT_VOLUME: f32 = 0.7;

/// The playback state machine
pub struct PlaybackController {
    playlist: Playlist,
    current_index: Option<usize>,
    state: PlaybackState,
    repeat_mode: RepeatMode,
    shuffle_enabled: bool,
    volume: f32,

    /// The loaded device; at most one is ever live
    device: Option<Box<dyn MediaDevice>>,
    factory: Box<dyn DeviceFactory>,

    event_txs: Vec<Sender<PlayerEvent>>,
    rng: StdRng,
}

impl PlaybackController {
    /// Create a controller with an empty playlist
    ///
    /// # Arguments
    ///
    /// * `factory` - Opens tracks into playback devices
    pub fn new(factory: Box<dyn DeviceFactory>) -> Self {
        Self {
            playlist: Playlist::new(),
            current_index: None,
            state: PlaybackState::Stopped,
            repeat_mode: RepeatMode::Off,
            shuffle_enabled: false,
            volume: DEFAULT_VOLUME,
            device: None,
            factory,
            event_txs: Vec::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Subscribe to controller events
    ///
    /// Each subscriber gets its own unbounded receiver; subscribers that
    /// drop their receiver are pruned on the next emit.
    pub fn subscribe(&mut self) -> Receiver<PlayerEvent> {
        let (tx, rx) = unbounded();
        self.event_txs.push(tx);
        rx
    }

    /// Dispatch a single inbound command
    ///
    /// Index validation errors (`SelectTrack`, `RemoveAt`) are surfaced
    /// to the caller; everything else is handled internally, with device
    /// failures converted to `PlaybackError` events.
    pub fn handle_command(&mut self, command: PlayerCommand) -> Result<()> {
        match command {
            PlayerCommand::Play => self.play(),
            PlayerCommand::Pause => self.pause(),
            PlayerCommand::Stop => self.stop(),
            PlayerCommand::Next => self.next(),
            PlayerCommand::Previous => self.previous(),
            PlayerCommand::SelectTrack(index) => self.select_track(index),
            PlayerCommand::Seek(fraction) => self.seek(fraction),
            PlayerCommand::SetVolume(volume) => {
                self.set_volume(volume);
                Ok(())
            }
            PlayerCommand::SetShuffle(enabled) => {
                self.set_shuffle(enabled);
                Ok(())
            }
            PlayerCommand::ToggleShuffle => {
                self.set_shuffle(!self.shuffle_enabled);
                Ok(())
            }
            PlayerCommand::CycleRepeat => {
                self.cycle_repeat();
                Ok(())
            }
            PlayerCommand::AddTracks(tracks) => {
                self.add_tracks(tracks);
                Ok(())
            }
            PlayerCommand::RemoveAt(index) => self.remove_at(index),
            PlayerCommand::Clear => {
                self.clear();
                Ok(())
            }
            PlayerCommand::Shutdown => {
                self.shutdown();
                Ok(())
            }
        }
    }

    /// Start playback, or resume when paused
    ///
    /// On an empty playlist this is a no-op. From `Stopped` with no
    /// selection, playback starts at the first track.
    pub fn play(&mut self) -> Result<()> {
        match self.state {
            PlaybackState::Playing => Ok(()),
            PlaybackState::Paused => self.resume(),
            PlaybackState::Stopped => {
                if self.playlist.is_empty() {
                    debug!("Play ignored: {}", PlayerError::EmptyPlaylist);
                    return Ok(());
                }
                let index = self.current_index.unwrap_or(0);
                self.load_and_play(index);
                Ok(())
            }
        }
    }

    fn resume(&mut self) -> Result<()> {
        let Some(device) = self.device.as_mut() else {
            // Paused with no device should not happen; recover by stopping
            warn!("Paused without a loaded device; stopping");
            self.set_state(PlaybackState::Stopped);
            return Ok(());
        };
        match device.play() {
            Ok(()) => {
                info!("Resumed playback");
                self.set_state(PlaybackState::Playing);
            }
            Err(e) => self.fail_playback(e),
        }
        Ok(())
    }

    /// Pause playback; a no-op unless currently playing
    pub fn pause(&mut self) -> Result<()> {
        if self.state != PlaybackState::Playing {
            return Ok(());
        }
        let Some(device) = self.device.as_mut() else {
            return Ok(());
        };
        match device.pause() {
            Ok(()) => {
                info!("Paused playback");
                self.set_state(PlaybackState::Paused);
            }
            Err(e) => self.fail_playback(e),
        }
        Ok(())
    }

    /// Stop playback, release the device and reset progress
    ///
    /// The current selection is kept so `play` restarts the same track.
    pub fn stop(&mut self) -> Result<()> {
        self.release_device();
        if self.state != PlaybackState::Stopped {
            info!("Stopped playback");
            self.set_state(PlaybackState::Stopped);
        }
        self.emit(PlayerEvent::Progress {
            elapsed: std::time::Duration::ZERO,
            total: std::time::Duration::ZERO,
            fraction: 0.0,
        });
        Ok(())
    }

    /// Advance to the next track per the traversal policy
    pub fn next(&mut self) -> Result<()> {
        let count = self.playlist.len();
        if count == 0 {
            debug!("Next ignored: {}", PlayerError::EmptyPlaylist);
            return Ok(());
        }
        let index = match self.current_index {
            Some(current) => policy::next_index(current, count, self.shuffle_enabled, &mut self.rng),
            // No selection yet: forward traversal starts at the front
            None => policy::next_index(count - 1, count, self.shuffle_enabled, &mut self.rng),
        };
        self.load_and_play(index);
        Ok(())
    }

    /// Go back to the previous track per the traversal policy
    pub fn previous(&mut self) -> Result<()> {
        let count = self.playlist.len();
        if count == 0 {
            debug!("Previous ignored: {}", PlayerError::EmptyPlaylist);
            return Ok(());
        }
        let index = match self.current_index {
            Some(current) => {
                policy::previous_index(current, count, self.shuffle_enabled, &mut self.rng)
            }
            // No selection yet: backward traversal starts at the end
            None => policy::previous_index(0, count, self.shuffle_enabled, &mut self.rng),
        };
        self.load_and_play(index);
        Ok(())
    }

    /// Jump to a specific track in the active order
    pub fn select_track(&mut self, index: usize) -> Result<()> {
        if index >= self.playlist.len() {
            return Err(PlayerError::IndexOutOfRange {
                index,
                count: self.playlist.len(),
            });
        }
        self.load_and_play(index);
        Ok(())
    }

    /// Seek to a fraction of the current track
    ///
    /// The fraction is clamped to `[0, 1]`. With no device loaded this
    /// is a no-op, not an error.
    pub fn seek(&mut self, fraction: f64) -> Result<()> {
        let fraction = fraction.clamp(0.0, 1.0);
        let Some(device) = self.device.as_mut() else {
            debug!("Seek ignored: no track loaded");
            return Ok(());
        };
        if let Err(e) = device.seek(fraction) {
            self.fail_playback(e);
        }
        Ok(())
    }

    /// Set the volume, clamped to `[0, 1]`
    ///
    /// Stored in the session and propagated to the loaded device, if
    /// any. Always succeeds.
    pub fn set_volume(&mut self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        self.volume = volume;
        if let Some(device) = self.device.as_mut() {
            if let Err(e) = device.set_volume(volume) {
                warn!("Device rejected volume change: {}", e);
            }
        }
        self.emit(PlayerEvent::VolumeChanged(volume));
    }

    /// Enable or disable shuffle
    ///
    /// Turning shuffle on reshuffles the active order; turning it off
    /// restores the insertion order. Either way the current selection is
    /// re-resolved so it still points at the same track value. Setting
    /// the flag to its current value changes nothing.
    pub fn set_shuffle(&mut self, enabled: bool) {
        if enabled == self.shuffle_enabled {
            return;
        }
        let current_track = self
            .current_index
            .and_then(|i| self.playlist.get(i).cloned());

        self.shuffle_enabled = enabled;
        if enabled {
            self.playlist.shuffle(&mut self.rng);
        } else {
            self.playlist.restore_original_order();
        }

        self.current_index = current_track.and_then(|t| self.playlist.index_of(&t));
        info!("Shuffle {}", if enabled { "enabled" } else { "disabled" });
        self.emit(PlayerEvent::ShuffleChanged(enabled));
    }

    /// Cycle the repeat mode Off -> All -> One -> Off
    pub fn cycle_repeat(&mut self) {
        self.repeat_mode = self.repeat_mode.cycle();
        info!("Repeat mode: {:?}", self.repeat_mode);
        self.emit(PlayerEvent::RepeatChanged(self.repeat_mode));
    }

    /// Append tracks to the playlist, silently skipping duplicates
    pub fn add_tracks(&mut self, tracks: Vec<PathBuf>) {
        let mut added = 0;
        for track in tracks {
            if self.playlist.add(track) {
                added += 1;
            }
        }
        if added > 0 {
            info!("Added {} tracks ({} total)", added, self.playlist.len());
            self.emit(PlayerEvent::PlaylistChanged {
                count: self.playlist.len(),
            });
        }
    }

    /// Remove the track at `index` in the active order
    ///
    /// Removing the current track stops playback and clears the
    /// selection; removing an earlier track shifts the selection down so
    /// it keeps naming the same track.
    pub fn remove_at(&mut self, index: usize) -> Result<()> {
        let removed_current = self.current_index == Some(index);
        self.playlist.remove_at(index)?;

        if removed_current {
            self.release_device();
            self.current_index = None;
            self.set_state(PlaybackState::Stopped);
        } else if let Some(current) = self.current_index {
            if current > index {
                self.current_index = Some(current - 1);
            }
        }

        self.emit(PlayerEvent::PlaylistChanged {
            count: self.playlist.len(),
        });
        Ok(())
    }

    /// Remove all tracks, stopping playback
    pub fn clear(&mut self) {
        self.release_device();
        self.playlist.clear();
        self.current_index = None;
        self.set_state(PlaybackState::Stopped);
        self.emit(PlayerEvent::PlaylistChanged { count: 0 });
    }

    /// Replace the whole playlist, e.g. after loading a playlist file
    ///
    /// Stops playback and clears the selection.
    pub fn replace_playlist(&mut self, tracks: Vec<PathBuf>) {
        self.release_device();
        self.playlist.replace_all(tracks);
        self.current_index = None;
        self.set_state(PlaybackState::Stopped);
        self.emit(PlayerEvent::PlaylistChanged {
            count: self.playlist.len(),
        });
    }

    /// Release the device and stop; the controller stays usable
    pub fn shutdown(&mut self) {
        self.release_device();
        self.set_state(PlaybackState::Stopped);
        info!("Controller shut down");
    }

    /// Periodic reconciliation against the device
    ///
    /// The host calls this at a fixed interval (about once per second).
    /// While playing, the device's reported position and duration are
    /// turned into a `Progress` event; a device that stopped on its own
    /// is read as end-of-track and resolved per the repeat mode.
    pub fn tick(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        let Some(device) = self.device.as_mut() else {
            return;
        };

        match device.state() {
            DeviceState::Playing => {
                let position = device.position();
                let duration = device.duration();
                let fraction = crate::player::progress::progress_fraction(position, duration);
                self.emit(PlayerEvent::Progress {
                    elapsed: position,
                    total: duration,
                    fraction,
                });
            }
            DeviceState::Stopped => self.handle_track_finished(),
            // Externally paused device; leave our state alone and report
            // nothing until it resumes or stops.
            DeviceState::Paused => {}
        }
    }

    /// End-of-track resolution per the repeat mode
    fn handle_track_finished(&mut self) {
        let count = self.playlist.len();
        let Some(current) = self.current_index else {
            // Finished with no selection; nothing sensible to advance to
            let _ = self.stop();
            return;
        };
        debug!("Track {} finished", current);

        match self.repeat_mode {
            RepeatMode::One => self.load_and_play(current),
            RepeatMode::All => {
                let index = policy::next_index(current, count, self.shuffle_enabled, &mut self.rng);
                self.load_and_play(index);
            }
            RepeatMode::Off => {
                if current + 1 < count {
                    self.load_and_play(current + 1);
                } else {
                    info!("Playlist finished");
                    let _ = self.stop();
                    self.emit(PlayerEvent::PlaylistFinished);
                }
            }
        }
    }

    /// Load the track at `index` and start playing it
    ///
    /// The previous device is always released first; no two devices are
    /// ever live at once. The session state is set to `Playing` only
    /// after the device has accepted both load and play, so a tick never
    /// observes a phantom device. A load failure leaves the controller
    /// `Stopped` with the selection on the failed track: no automatic
    /// advance, a bad file must not cascade into a skip loop.
    fn load_and_play(&mut self, index: usize) {
        self.release_device();

        let Some(track) = self.playlist.get(index).cloned() else {
            warn!("Attempted to play invalid index {}", index);
            return;
        };
        self.current_index = Some(index);

        let mut device = match self.factory.open(&track) {
            Ok(device) => device,
            Err(e) => {
                self.fail_playback(e);
                return;
            }
        };

        if let Err(e) = device.set_volume(self.volume) {
            warn!("Device rejected initial volume: {}", e);
        }

        match device.play() {
            Ok(()) => {
                info!("Playing track {}: {}", index, track.display());
                self.device = Some(device);
                self.set_state(PlaybackState::Playing);
                self.emit(PlayerEvent::TrackChanged { index, track });
            }
            Err(e) => self.fail_playback(e),
        }
    }

    /// Convert a device failure into an event plus a `Stopped` state
    fn fail_playback(&mut self, error: PlayerError) {
        warn!("Playback error: {}", error);
        self.release_device();
        self.set_state(PlaybackState::Stopped);
        self.emit(PlayerEvent::PlaybackError {
            kind: error.kind(),
            message: error.to_string(),
        });
    }

    fn release_device(&mut self) {
        if let Some(mut device) = self.device.take() {
            if let Err(e) = device.stop() {
                warn!("Error releasing device: {}", e);
            }
        }
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state != state {
            self.state = state;
            self.emit(PlayerEvent::StateChanged(state));
        }
    }

    fn emit(&mut self, event: PlayerEvent) {
        self.event_txs.retain(|tx| tx.send(event.clone()).is_ok());
    }

    // Read accessors for observers; external callers never mutate the
    // playlist or session directly.

    /// Current playback state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Current repeat mode
    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat_mode
    }

    /// Whether shuffle is enabled
    pub fn shuffle_enabled(&self) -> bool {
        self.shuffle_enabled
    }

    /// Current volume in `[0, 1]`
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Index of the current track in the active order, if any
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// The current track, if any
    pub fn current_track(&self) -> Option<&Path> {
        self.current_index
            .and_then(|i| self.playlist.get(i))
            .map(PathBuf::as_path)
    }

    /// Number of tracks in the playlist
    pub fn track_count(&self) -> usize {
        self.playlist.len()
    }

    /// The active playlist order
    pub fn tracks(&self) -> &[PathBuf] {
        self.playlist.tracks()
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.release_device();
    }
}
