use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub audio: AudioConfig,
    pub session: SessionTimeouts,
}

/// Recognition backend configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    pub endpoint: String,
    pub language: String,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
    pub block_size: usize,
    pub channels: u16,
}

/// Session timing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionTimeouts {
    pub idle_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::ENDPOINT.to_string(),
            language: defaults::LANGUAGE.to_string(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
            block_size: defaults::BLOCK_SIZE,
            channels: defaults::CHANNELS,
        }
    }
}

impl Default for SessionTimeouts {
    fn default() -> Self {
        Self {
            idle_timeout_secs: defaults::IDLE_TIMEOUT.as_secs(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - VOXLIST_ENDPOINT → backend.endpoint
    /// - VOXLIST_LANGUAGE → backend.language
    /// - VOXLIST_AUDIO_DEVICE → audio.device
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(endpoint) = std::env::var("VOXLIST_ENDPOINT") {
            if !endpoint.is_empty() {
                self.backend.endpoint = endpoint;
            }
        }

        if let Ok(language) = std::env::var("VOXLIST_LANGUAGE") {
            if !language.is_empty() {
                self.backend.language = language;
            }
        }

        if let Ok(device) = std::env::var("VOXLIST_AUDIO_DEVICE") {
            if !device.is_empty() {
                self.audio.device = Some(device);
            }
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/voxlist/config.toml on Linux
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("voxlist").join("config.toml"))
    }
}

/// Immutable per-session configuration value.
///
/// Created once at session start from the file/env [`Config`] plus call
/// arguments; never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Recognition backend endpoint (websocket URI).
    pub endpoint: String,
    /// Capture device name; `None` selects the default input device.
    pub device: Option<String>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Frame size in samples per channel.
    pub block_size: usize,
    /// Channel count.
    pub channels: u16,
    /// Recognition language tag for the handshake.
    pub language: String,
    /// Maximum silence tolerated before a live session ends.
    pub idle_timeout: Duration,
    /// Input file for file mode; `None` in live mode.
    pub input_file: Option<PathBuf>,
}

impl SessionConfig {
    /// Build a session configuration from the loaded config.
    pub fn from_config(config: &Config) -> Self {
        Self {
            endpoint: config.backend.endpoint.clone(),
            device: config.audio.device.clone(),
            sample_rate: config.audio.sample_rate,
            block_size: config.audio.block_size,
            channels: config.audio.channels,
            language: config.backend.language.clone(),
            idle_timeout: Duration::from_secs(config.session.idle_timeout_secs),
            input_file: None,
        }
    }

    /// Set the input file, switching the session to file mode.
    pub fn with_input_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_file = Some(path.into());
        self
    }

    /// Samples per frame across all channels.
    pub fn frame_samples(&self) -> usize {
        self.block_size * self.channels as usize
    }

    /// Validate values a session cannot work with.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.sample_rate == 0 {
            return Err(crate::error::VoxlistError::ConfigInvalidValue {
                key: "sample_rate".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.block_size == 0 {
            return Err(crate::error::VoxlistError::ConfigInvalidValue {
                key: "block_size".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.channels == 0 {
            return Err(crate::error::VoxlistError::ConfigInvalidValue {
                key: "channels".to_string(),
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
