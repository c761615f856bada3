//! Streaming recognition pipeline.
//!
//! ```text
//! capture thread                    session task
//! ──────────────                    ─────────────────────────────────────
//! mic callback ──► session queue ──► feeder ──► recognizer ──► collector
//!                  (unbounded,       │ pop ≤1s   │ 1 frame     │ renew
//!                   non-blocking     │ watchdog  │ in flight   │ watchdog,
//!                   push)            │ check     ▼             │ accumulate
//!                                    │         websocket       ▼
//!                                    │         backend       transcript
//! ```
//!
//! File mode replaces the queue and feeder with an eagerly decoded frame
//! sequence; everything downstream is shared.

pub mod frame;
pub mod queue;
pub mod recognizer;
pub mod session;
pub mod transcript;
pub mod vosk;
pub mod watchdog;

pub use frame::{AudioFrame, RecognitionResult, SessionState};
pub use queue::{session_queue, Pop, QueueConsumer, QueueProducer};
pub use recognizer::{create_recognizer, RecognizerKind, SpeechRecognizer};
pub use session::{transcribe_file, transcribe_live_session, Session};
pub use transcript::TranscriptAccumulator;
pub use vosk::VoskRecognizer;
pub use watchdog::{IdleWatchdog, WatchdogState};

pub use recognizer::{MockObserver, MockRecognizer};
