//! voxlist - Streaming voice transcription client
//!
//! Captures microphone audio (or decodes a file), streams fixed-size PCM
//! frames to a Vosk websocket server, and aggregates the recognized text
//! into a single transcript.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod stream;

// Core backend trait (frames in → results out)
pub use stream::recognizer::{create_recognizer, RecognizerKind, SpeechRecognizer};

// Session entry points
pub use stream::session::{transcribe_file, transcribe_live_session, Session};

// Error handling
pub use error::{Result, VoxlistError};

// Config
pub use config::{Config, SessionConfig};

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
