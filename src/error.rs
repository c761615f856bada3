//! Error types for voxlist.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoxlistError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio capture errors
    #[error("Audio device not found: {device}")]
    AudioDeviceNotFound { device: String },

    #[error("Audio capture failed: {message}")]
    AudioCapture { message: String },

    // Audio file errors
    #[error("Audio file error: {message}")]
    AudioFile { message: String },

    // Recognition backend errors
    #[error("Backend connection failed: {message}")]
    Connection { message: String },

    #[error("Streaming protocol error: {message}")]
    Protocol { message: String },

    /// A fatal failure mid-session. Carries whatever transcript was
    /// accumulated before the failure — partial results have value and are
    /// never discarded.
    #[error("Session aborted: {message}")]
    SessionAborted {
        message: String,
        partial_transcript: String,
    },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl VoxlistError {
    /// The transcript accumulated before a fatal session failure, if any.
    pub fn partial_transcript(&self) -> Option<&str> {
        match self {
            VoxlistError::SessionAborted {
                partial_transcript, ..
            } => Some(partial_transcript),
            _ => None,
        }
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, VoxlistError>;
