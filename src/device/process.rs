//! External-process playback device
//!
//! Plays a track by launching an external player (vlc, mpv, ffplay, ...)
//! and tracking the child by handle. The child is killed on `stop` and
//! on drop, tolerating the case where it already exited; a natural exit
//! is reported as `DeviceState::Stopped`, which the controller reads as
//! end-of-track.
//!
//! External players accept no runtime control over a pipe in this setup,
//! so pause/resume is implemented with SIGSTOP/SIGCONT on unix and is a
//! logged no-op elsewhere. Seeking and volume are not supported by this
//! backend; both are logged no-ops.

use crate::device::{DeviceFactory, DeviceState, MediaDevice};
use crate::utils::error::{PlayerError, Result};
use log::{debug, warn};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

/// Opens tracks by spawning an external player command
pub struct ProcessDeviceFactory {
    program: String,
    args: Vec<String>,
}

impl ProcessDeviceFactory {
    /// Create a factory for a specific player program
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Parse a factory from a whitespace-separated command line
    ///
    /// The first token is the program, the rest are arguments. The track
    /// path is appended as the final argument when opening.
    pub fn from_command_line(command: &str) -> Result<Self> {
        let mut tokens = command.split_whitespace().map(str::to_string);
        let program = tokens
            .next()
            .ok_or_else(|| PlayerError::Config("empty player command".to_string()))?;
        Ok(Self::new(program, tokens.collect()))
    }
}

impl DeviceFactory for ProcessDeviceFactory {
    fn open(&mut self, track: &Path) -> Result<Box<dyn MediaDevice>> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(track)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                PlayerError::DeviceLoad(format!(
                    "failed to launch {} for {}: {}",
                    self.program,
                    track.display(),
                    e
                ))
            })?;

        debug!(
            "Launched {} (pid {}) for {}",
            self.program,
            child.id(),
            track.display()
        );

        Ok(Box::new(ProcessDevice {
            child,
            started: Instant::now(),
            paused_at: None,
            paused_total: Duration::ZERO,
        }))
    }
}

/// A playback device backed by a running external player process
pub struct ProcessDevice {
    child: Child,
    started: Instant,
    paused_at: Option<Instant>,
    paused_total: Duration,
}

impl ProcessDevice {
    #[cfg(unix)]
    fn signal(&self, signal: libc::c_int) -> Result<()> {
        let rc = unsafe { libc::kill(self.child.id() as libc::pid_t, signal) };
        if rc == 0 {
            Ok(())
        } else {
            Err(PlayerError::Device(format!(
                "failed to signal player process {}",
                self.child.id()
            )))
        }
    }

    fn has_exited(&mut self) -> bool {
        // try_wait also reaps the child once it is gone
        matches!(self.child.try_wait(), Ok(Some(_)))
    }
}

impl MediaDevice for ProcessDevice {
    fn play(&mut self) -> Result<()> {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total += paused_at.elapsed();
            #[cfg(unix)]
            self.signal(libc::SIGCONT)?;
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        if self.paused_at.is_none() && !self.has_exited() {
            #[cfg(unix)]
            self.signal(libc::SIGSTOP)?;
            #[cfg(not(unix))]
            warn!("process device cannot pause on this platform");
            self.paused_at = Some(Instant::now());
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        match self.child.try_wait() {
            Ok(Some(status)) => {
                debug!("Player process already exited: {}", status);
                Ok(())
            }
            Ok(None) => {
                // A paused child cannot handle the kill until resumed
                #[cfg(unix)]
                if self.paused_at.is_some() {
                    let _ = self.signal(libc::SIGCONT);
                }
                if let Err(e) = self.child.kill() {
                    debug!("Kill raced with process exit: {}", e);
                }
                let _ = self.child.wait();
                Ok(())
            }
            Err(e) => Err(PlayerError::Device(format!(
                "failed to query player process: {}",
                e
            ))),
        }
    }

    fn seek(&mut self, fraction: f64) -> Result<()> {
        warn!(
            "process device cannot seek (requested {:.2}); ignoring",
            fraction
        );
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> Result<()> {
        debug!(
            "process device does not control volume (requested {:.2})",
            volume
        );
        Ok(())
    }

    fn position(&mut self) -> Duration {
        let paused_span = self.paused_at.map(|t| t.elapsed()).unwrap_or_default();
        self.started
            .elapsed()
            .saturating_sub(self.paused_total + paused_span)
    }

    fn duration(&mut self) -> Duration {
        // External players do not report duration over this interface
        Duration::ZERO
    }

    fn state(&mut self) -> DeviceState {
        if self.has_exited() {
            DeviceState::Stopped
        } else if self.paused_at.is_some() {
            DeviceState::Paused
        } else {
            DeviceState::Playing
        }
    }
}

impl Drop for ProcessDevice {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_command_line() {
        let factory = ProcessDeviceFactory::from_command_line("mpv --no-video --really-quiet")
            .expect("valid command");
        assert_eq!(factory.program, "mpv");
        assert_eq!(factory.args, vec!["--no-video", "--really-quiet"]);
    }

    #[test]
    fn test_from_command_line_rejects_empty() {
        assert!(ProcessDeviceFactory::from_command_line("   ").is_err());
    }

    #[cfg(unix)]
    fn long_running_factory() -> ProcessDeviceFactory {
        // sh -c ignores the appended track path (it becomes $0)
        ProcessDeviceFactory::new("sh", vec!["-c".to_string(), "sleep 30".to_string()])
    }

    #[cfg(unix)]
    #[test]
    fn test_spawn_and_stop() {
        let mut factory = long_running_factory();
        let mut device = factory.open(Path::new("track.mp3")).unwrap();

        assert_eq!(device.state(), DeviceState::Playing);
        device.stop().unwrap();
        assert_eq!(device.state(), DeviceState::Stopped);

        // Stopping again after exit is not an error
        device.stop().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_natural_exit_reports_stopped() {
        let mut factory =
            ProcessDeviceFactory::new("sh", vec!["-c".to_string(), "exit 0".to_string()]);
        let mut device = factory.open(Path::new("track.mp3")).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while device.state() != DeviceState::Stopped {
            assert!(Instant::now() < deadline, "process did not exit in time");
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_pause_and_resume() {
        let mut factory = long_running_factory();
        let mut device = factory.open(Path::new("track.mp3")).unwrap();

        device.pause().unwrap();
        assert_eq!(device.state(), DeviceState::Paused);

        device.play().unwrap();
        assert_eq!(device.state(), DeviceState::Playing);

        device.stop().unwrap();
    }

    #[test]
    fn test_open_missing_program_fails() {
        let mut factory = ProcessDeviceFactory::new("definitely-not-a-player-xyz", Vec::new());
        let err = factory.open(Path::new("track.mp3")).unwrap_err();
        assert!(matches!(err, PlayerError::DeviceLoad(_)));
    }
}
