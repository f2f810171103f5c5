//! Configuration management for ErfPlayer
//!
//! This module handles loading and managing application configuration
//! from the user config file and environment variables.

use crate::utils::error::{PlayerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Playback configuration
    pub playback: PlaybackConfig,

    /// Device backend configuration
    pub devices: DevicesConfig,

    /// General application settings
    pub general: GeneralConfig,
}

/// Playback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Initial volume (0.0 - 1.0)
    pub volume: f32,

    /// Start playing as soon as tracks are added
    pub autoplay: bool,

    /// Progress reconciliation interval in milliseconds
    pub tick_interval_ms: u64,
}

/// Device backend configuration
///
/// Each entry is an external player command line; the first token is the
/// program, the rest are arguments, and the track path is appended last.
/// Candidates are tried in order until one of them opens the track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevicesConfig {
    /// Ranked audio player commands
    pub audio_players: Vec<String>,

    /// Ranked video player commands
    pub video_players: Vec<String>,
}

/// General application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: 0.7,
            autoplay: true,
            tick_interval_ms: 1000,
        }
    }
}

impl Default for DevicesConfig {
    fn default() -> Self {
        Self {
            audio_players: vec![
                "mpv --no-video --really-quiet".to_string(),
                "ffplay -nodisp -autoexit -loglevel quiet".to_string(),
            ],
            video_players: vec![
                "vlc --play-and-exit --no-video-title-show".to_string(),
                "mpv --really-quiet".to_string(),
                "ffplay -autoexit -loglevel quiet".to_string(),
            ],
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from various sources
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default values
    /// 2. User config file (~/.config/erfplayer/config.toml on Linux)
    /// 3. Environment variables (ERFPLAYER_* prefix)
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(user_path) = Self::user_config_path() {
            if user_path.exists() {
                config.merge_from_file(&user_path)?;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to the user config file
    pub fn save(&self) -> Result<()> {
        let path = Self::user_config_path()
            .ok_or_else(|| PlayerError::Config("cannot determine user config path".to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| PlayerError::Config(format!("failed to create config directory: {}", e)))?;
        }

        let toml = toml::to_string_pretty(self)
            .map_err(|e| PlayerError::Config(format!("failed to serialize config: {}", e)))?;

        std::fs::write(&path, toml)
            .map_err(|e| PlayerError::Config(format!("failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Merge configuration from a TOML file
    fn merge_from_file(&mut self, path: &Path) -> Result<()> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PlayerError::Config(format!("failed to read config file: {}", e)))?;

        let file_config: Config = toml::from_str(&contents)
            .map_err(|e| PlayerError::Config(format!("failed to parse config file: {}", e)))?;

        *self = file_config;

        Ok(())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(volume) = std::env::var("ERFPLAYER_VOLUME") {
            self.playback.volume = volume
                .parse()
                .map_err(|_| PlayerError::Config("invalid ERFPLAYER_VOLUME".to_string()))?;
        }

        if let Ok(interval) = std::env::var("ERFPLAYER_TICK_INTERVAL_MS") {
            self.playback.tick_interval_ms = interval
                .parse()
                .map_err(|_| PlayerError::Config("invalid ERFPLAYER_TICK_INTERVAL_MS".to_string()))?;
        }

        if let Ok(log_level) = std::env::var("ERFPLAYER_LOG_LEVEL") {
            self.general.log_level = log_level;
        }

        Ok(())
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.playback.volume) {
            return Err(PlayerError::Config(
                "playback volume must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.playback.tick_interval_ms == 0 {
            return Err(PlayerError::Config(
                "tick interval must be non-zero".to_string(),
            ));
        }

        if self.devices.audio_players.iter().any(|c| c.trim().is_empty())
            || self.devices.video_players.iter().any(|c| c.trim().is_empty())
        {
            return Err(PlayerError::Config(
                "device player commands must not be empty".to_string(),
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.general.log_level.as_str()) {
            return Err(PlayerError::Config(format!(
                "invalid log level '{}', must be one of: {:?}",
                self.general.log_level, valid_log_levels
            )));
        }

        Ok(())
    }

    /// Get user config file path
    fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("erfplayer").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.playback.volume, 0.7);
        assert!(config.playback.autoplay);
        assert_eq!(config.playback.tick_interval_ms, 1000);
        assert!(!config.devices.audio_players.is_empty());
        assert!(!config.devices.video_players.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.playback.volume = 1.5;
        assert!(config.validate().is_err());

        config.playback.volume = 0.5;
        config.playback.tick_interval_ms = 0;
        assert!(config.validate().is_err());

        config.playback.tick_interval_ms = 500;
        config.general.log_level = "noisy".to_string();
        assert!(config.validate().is_err());

        config.general.log_level = "debug".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&toml).unwrap();

        assert_eq!(config.playback.volume, deserialized.playback.volume);
        assert_eq!(config.devices.video_players, deserialized.devices.video_players);
    }
}
