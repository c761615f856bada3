//! Frame and result types for the streaming session.

/// One fixed-size slice of PCM audio handed to the recognition protocol as a
/// single message.
///
/// Always exactly `block_size × channels` samples of 16-bit signed PCM;
/// the final frame of a file is zero-padded to full length. Ownership moves
/// from the producer to the single consumer.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrame {
    /// Audio samples as 16-bit PCM, interleaved when multi-channel.
    pub samples: Vec<i16>,
}

impl AudioFrame {
    /// Creates a new audio frame.
    pub fn new(samples: Vec<i16>) -> Self {
        Self { samples }
    }

    /// Returns the duration of this frame in milliseconds.
    pub fn duration_ms(&self, sample_rate: u32, channels: u16) -> u32 {
        let per_channel = self.samples.len() as u32 / channels as u32;
        (per_channel * 1000) / sample_rate
    }

    /// Serializes the samples as little-endian bytes for the wire.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.samples.len() * 2);
        for sample in &self.samples {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        bytes
    }
}

/// Outcome of one recognition round trip.
///
/// Emitted once per frame sent, plus one final emission after end-of-stream.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecognitionResult {
    /// Finalized hypothesis text; non-empty only when the backend committed
    /// to a hypothesis for this stretch of audio.
    pub text: String,
    /// True when the backend reported either a finalized or an in-progress
    /// (partial) hypothesis.
    pub has_voice_activity: bool,
}

impl RecognitionResult {
    /// A result with no detected activity (also used for malformed
    /// responses, which are recoverable per-frame errors).
    pub fn silence() -> Self {
        Self::default()
    }

    /// A finalized hypothesis.
    pub fn finalized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            has_voice_activity: true,
        }
    }

    /// An in-progress hypothesis: activity, but no committed text yet.
    pub fn partial() -> Self {
        Self {
            text: String::new(),
            has_voice_activity: true,
        }
    }
}

/// Lifecycle state of a streaming session.
///
/// `Closed` and `Failed` are terminal; `Failed` is reachable from any
/// non-`Closed` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, not yet connected.
    Idle,
    /// Connection established and handshake accepted.
    Connected,
    /// Frames flowing.
    Streaming,
    /// End-of-stream sent, awaiting the final response.
    Finalizing,
    /// Connection released after a clean finish.
    Closed,
    /// Connection released after a fatal error.
    Failed,
}

impl SessionState {
    /// Returns true for states no session ever leaves.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Closed | SessionState::Failed)
    }
}
