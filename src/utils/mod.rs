//! Utility module for ErfPlayer
//!
//! This module provides common utilities used throughout the crate:
//! - Error handling with custom error types
//! - Configuration management

pub mod config;
pub mod error;

// Re-export commonly used items
pub use config::{Config, DevicesConfig, GeneralConfig, PlaybackConfig};
pub use error::{PlayerError, Result};
