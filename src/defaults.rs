//! Default configuration constants for voxlist.
//!
//! Shared constants used across configuration types to ensure consistency
//! and eliminate duplication.

use std::time::Duration;

/// Default recognition backend endpoint.
///
/// A Vosk server speaking the websocket streaming protocol. The standard
/// vosk-server docker image listens on port 2700.
pub const ENDPOINT: &str = "ws://localhost:2700";

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and provides a good balance
/// between quality and bandwidth for voice applications.
pub const SAMPLE_RATE: u32 = 16000;

/// Default frame size in samples per channel.
///
/// 4000 samples at 16kHz is 250ms of audio per frame — large enough to keep
/// the request/response protocol overhead low, small enough for timely
/// partial hypotheses.
pub const BLOCK_SIZE: usize = 4000;

/// Default channel count (mono).
pub const CHANNELS: u16 = 1;

/// Default language tag sent in the recognition handshake.
pub const LANGUAGE: &str = "es";

/// Default idle timeout for live sessions.
///
/// A live session ends after this much continuous silence (no finalized or
/// partial hypothesis from the backend).
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Bounded wait for a frame from the session queue.
///
/// The consumer re-checks the idle-timeout clock at this cadence even when
/// no audio is arriving, so silence detection latency is bounded by one
/// second regardless of backend behavior.
pub const QUEUE_POLL: Duration = Duration::from_secs(1);

/// Cadence for the "listening" progress log during silent stretches.
pub const LISTENING_LOG_INTERVAL: Duration = Duration::from_secs(5);
