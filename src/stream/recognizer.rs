//! Speech recognition backend abstraction.
//!
//! This trait allows swapping backend vendors (real Vosk server vs mock).
//! New backends are added by implementing the trait, never by branching on a
//! type tag inside the client.

use crate::config::SessionConfig;
use crate::error::Result;
use crate::stream::frame::{AudioFrame, RecognitionResult};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// A streaming speech-recognition backend.
///
/// The implementation owns exactly one connection for the duration of a
/// session and enforces the wire protocol: strictly one frame in flight,
/// one response awaited per frame, one final response after end-of-stream.
#[async_trait::async_trait]
pub trait SpeechRecognizer: Send {
    /// Opens the connection and performs the configuration handshake
    /// (sample rate and language).
    ///
    /// # Errors
    /// `Connection` if the endpoint is unreachable or the handshake is
    /// rejected.
    async fn initialize(&mut self, config: &SessionConfig) -> Result<()>;

    /// Consumes the frame channel to exhaustion, sending each frame and
    /// awaiting exactly one response before the next. After the channel
    /// closes, sends the end-of-stream marker and awaits one final response.
    ///
    /// Emits one [`RecognitionResult`] per frame plus one final result on
    /// `results`. A malformed per-frame response is logged and reported as
    /// no-activity; a transport failure aborts with `Protocol`.
    async fn process_stream(
        &mut self,
        frames: mpsc::Receiver<AudioFrame>,
        results: mpsc::Sender<RecognitionResult>,
    ) -> Result<()>;

    /// Same protocol discipline for an eagerly supplied frame sequence
    /// (file mode). The sequence is finite and drives its own termination;
    /// there is no idle-timeout check. Results already emitted survive a
    /// mid-sequence failure, which is why this streams into a channel
    /// rather than returning a collected vector.
    async fn process_file(
        &mut self,
        frames: Vec<AudioFrame>,
        results: mpsc::Sender<RecognitionResult>,
    ) -> Result<()>;

    /// Closes the connection. Idempotent; safe to call even if
    /// `initialize` partially failed or never ran.
    async fn shutdown(&mut self) -> Result<()>;
}

/// Available backend vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognizerKind {
    /// Vosk websocket streaming server.
    Vosk,
}

/// Constructs a recognizer for the given vendor.
pub fn create_recognizer(kind: RecognizerKind) -> Box<dyn SpeechRecognizer> {
    match kind {
        RecognizerKind::Vosk => Box::new(crate::stream::vosk::VoskRecognizer::new()),
    }
}

/// Shared observation handle for [`MockRecognizer`] assertions.
#[derive(Debug, Default)]
pub struct MockObserver {
    /// Frames received across process_stream/process_file.
    pub frames_seen: AtomicUsize,
    /// Whether initialize ran successfully.
    pub initialized: AtomicBool,
    /// Number of shutdown calls.
    pub shutdowns: AtomicUsize,
}

/// Mock recognizer for testing.
///
/// Replies with a scripted queue of per-frame results (cycling silence once
/// exhausted) and a configurable final result.
pub struct MockRecognizer {
    responses: VecDeque<RecognitionResult>,
    final_result: RecognitionResult,
    fail_initialize: bool,
    observer: Arc<MockObserver>,
}

impl MockRecognizer {
    /// Creates a mock that reports silence for every frame.
    pub fn new() -> Self {
        Self {
            responses: VecDeque::new(),
            final_result: RecognitionResult::silence(),
            fail_initialize: false,
            observer: Arc::new(MockObserver::default()),
        }
    }

    /// Scripts the per-frame responses, consumed in order.
    pub fn with_responses(mut self, responses: Vec<RecognitionResult>) -> Self {
        self.responses = responses.into();
        self
    }

    /// Scripts the final end-of-stream result.
    pub fn with_final(mut self, result: RecognitionResult) -> Self {
        self.final_result = result;
        self
    }

    /// Configures initialize to fail with a connection error.
    pub fn with_initialize_failure(mut self) -> Self {
        self.fail_initialize = true;
        self
    }

    /// Handle for asserting on observed calls after the session consumed
    /// the mock.
    pub fn observer(&self) -> Arc<MockObserver> {
        Arc::clone(&self.observer)
    }

    fn next_response(&mut self) -> RecognitionResult {
        self.responses
            .pop_front()
            .unwrap_or_else(RecognitionResult::silence)
    }
}

impl Default for MockRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SpeechRecognizer for MockRecognizer {
    async fn initialize(&mut self, _config: &SessionConfig) -> Result<()> {
        if self.fail_initialize {
            return Err(crate::error::VoxlistError::Connection {
                message: "mock connection refused".to_string(),
            });
        }
        self.observer.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn process_stream(
        &mut self,
        mut frames: mpsc::Receiver<AudioFrame>,
        results: mpsc::Sender<RecognitionResult>,
    ) -> Result<()> {
        while let Some(_frame) = frames.recv().await {
            self.observer.frames_seen.fetch_add(1, Ordering::SeqCst);
            let response = self.next_response();
            if results.send(response).await.is_err() {
                break;
            }
        }
        let _ = results.send(self.final_result.clone()).await;
        Ok(())
    }

    async fn process_file(
        &mut self,
        frames: Vec<AudioFrame>,
        results: mpsc::Sender<RecognitionResult>,
    ) -> Result<()> {
        for _frame in &frames {
            self.observer.frames_seen.fetch_add(1, Ordering::SeqCst);
            let response = self.next_response();
            if results.send(response).await.is_err() {
                break;
            }
        }
        let _ = results.send(self.final_result.clone()).await;
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.observer.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
