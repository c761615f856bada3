//! Streaming transcription sessions.
//!
//! A session wires the capture/file frame source, the session queue, the
//! recognition client, the idle-timeout watchdog, and the transcript
//! accumulator together, and walks the lifecycle
//! `Idle → Connected → Streaming → Finalizing → Closed` (or `Failed`).
//!
//! Live mode runs three cooperating futures in one task: the feeder (queue
//! pop with a bounded wait, watchdog check on every return), the recognition
//! client's stream loop, and the result collector (activity renewal plus
//! accumulation). The cpal callback thread talks to them only through the
//! session queue.

use crate::audio::capture::LiveCapture;
use crate::audio::chunker::carve_frames;
use crate::audio::file::decode_wav;
use crate::config::SessionConfig;
use crate::defaults;
use crate::error::{Result, VoxlistError};
use crate::stream::frame::{RecognitionResult, SessionState};
use crate::stream::queue::{session_queue, Pop, QueueConsumer};
use crate::stream::recognizer::{create_recognizer, RecognizerKind, SpeechRecognizer};
use crate::stream::transcript::TranscriptAccumulator;
use crate::stream::watchdog::{IdleWatchdog, WatchdogState};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// One transcription session: independently constructible and disposable,
/// no shared state with other sessions.
pub struct Session {
    config: SessionConfig,
    state: SessionState,
    transcript: TranscriptAccumulator,
}

impl Session {
    /// Creates an idle session from an immutable configuration.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: SessionState::Idle,
            transcript: TranscriptAccumulator::new(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Interim read of the transcript accumulated so far.
    pub fn transcript(&self) -> String {
        self.transcript.join()
    }

    /// Transcribes a live capture session.
    ///
    /// Blocks until the idle-timeout watchdog expires, then returns the
    /// accumulated transcript. Silence is never an error; only connection
    /// and protocol failures are.
    pub async fn run_live(&mut self, recognizer: &mut dyn SpeechRecognizer) -> Result<String> {
        self.config.validate()?;
        self.connect(recognizer).await?;

        let (producer, consumer) = session_queue();
        let mut capture = match LiveCapture::new(&self.config) {
            Ok(capture) => capture,
            Err(e) => return Err(self.fail(recognizer, e).await),
        };
        if let Err(e) = capture.start(producer) {
            return Err(self.fail(recognizer, e).await);
        }
        info!("Live session started, speak into the microphone");

        let outcome = self.stream_from_queue(recognizer, consumer).await;

        if let Err(e) = capture.stop() {
            warn!(error = %e, "Failed to stop audio capture");
        }
        self.finish(recognizer, outcome).await
    }

    /// Transcribes a live session whose frames arrive on an externally fed
    /// queue. This is `run_live` minus the hardware: the capture device is
    /// replaced by whatever pushes into the producer half.
    pub async fn run_live_from_queue(
        &mut self,
        recognizer: &mut dyn SpeechRecognizer,
        consumer: QueueConsumer,
    ) -> Result<String> {
        self.config.validate()?;
        self.connect(recognizer).await?;
        let outcome = self.stream_from_queue(recognizer, consumer).await;
        self.finish(recognizer, outcome).await
    }

    /// Transcribes an audio file.
    ///
    /// The whole file is decoded and carved into frames up front; the frame
    /// sequence is finite and drives its own termination, so there is no
    /// watchdog. Blocks until the file is fully consumed.
    pub async fn run_file(
        &mut self,
        recognizer: &mut dyn SpeechRecognizer,
        path: &Path,
    ) -> Result<String> {
        self.config.validate()?;

        let samples = decode_wav(path, &self.config)?;
        let frames = carve_frames(&samples, self.config.frame_samples());
        debug!(
            frames = frames.len(),
            samples = samples.len(),
            "Decoded input file"
        );

        self.connect(recognizer).await?;
        self.state = SessionState::Streaming;

        let (result_tx, mut result_rx) = mpsc::channel::<RecognitionResult>(16);
        let transcript = &mut self.transcript;
        let collector = async {
            while let Some(result) = result_rx.recv().await {
                if !result.text.is_empty() {
                    info!(text = %result.text, "Recognized text");
                }
                transcript.observe(&result);
            }
        };

        let (outcome, ()) = tokio::join!(recognizer.process_file(frames, result_tx), collector);
        self.finish(recognizer, outcome).await
    }

    /// Opens the backend connection; `Idle → Connected`, or `Failed`.
    async fn connect(&mut self, recognizer: &mut dyn SpeechRecognizer) -> Result<()> {
        match recognizer.initialize(&self.config).await {
            Ok(()) => {
                self.state = SessionState::Connected;
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Failed;
                let _ = recognizer.shutdown().await;
                Err(e)
            }
        }
    }

    /// The live consumer side: feeder, recognition stream, and collector
    /// running concurrently until the watchdog expires or the queue closes.
    async fn stream_from_queue(
        &mut self,
        recognizer: &mut dyn SpeechRecognizer,
        mut consumer: QueueConsumer,
    ) -> Result<()> {
        self.state = SessionState::Streaming;

        let watchdog = Arc::new(IdleWatchdog::new(self.config.idle_timeout));
        let (frame_tx, frame_rx) = mpsc::channel(4);
        let (result_tx, mut result_rx) = mpsc::channel::<RecognitionResult>(16);

        // Feeder: bounded pop so the idle clock is re-checked at least once
        // a second even when no audio arrives.
        let feeder_watchdog = Arc::clone(&watchdog);
        let feeder = async move {
            loop {
                let popped = consumer.pop(defaults::QUEUE_POLL).await;
                if feeder_watchdog.check() == WatchdogState::Expired {
                    info!(
                        idle_secs = feeder_watchdog.threshold().as_secs(),
                        "No voice activity within the idle timeout, stopping"
                    );
                    break;
                }
                match popped {
                    Pop::Frame(frame) => {
                        if frame_tx.send(frame).await.is_err() {
                            break; // Recognition side is gone
                        }
                    }
                    Pop::TimedOut => continue,
                    Pop::Closed => break,
                }
            }
            // Dropping frame_tx ends the recognition stream, which then
            // sends the end-of-stream marker.
        };

        // Collector: renew the idle clock on every result that carries
        // voice activity — the second of the two watchdog check points.
        let collector_watchdog = Arc::clone(&watchdog);
        let transcript = &mut self.transcript;
        let collector = async move {
            let mut last_listening_log = Instant::now();
            while let Some(result) = result_rx.recv().await {
                if result.has_voice_activity {
                    collector_watchdog.record_activity();
                }
                if !result.text.is_empty() {
                    info!(text = %result.text, "Recognized text");
                } else if last_listening_log.elapsed() > defaults::LISTENING_LOG_INTERVAL {
                    debug!("Listening...");
                    last_listening_log = Instant::now();
                }
                transcript.observe(&result);
                let _ = collector_watchdog.check();
            }
        };

        let ((), outcome, ()) = tokio::join!(
            feeder,
            recognizer.process_stream(frame_rx, result_tx),
            collector
        );
        outcome
    }

    /// Walks `Finalizing → Closed` on success; on a fatal mid-session error
    /// moves to `Failed` and carries the partial transcript out with it.
    async fn finish(
        &mut self,
        recognizer: &mut dyn SpeechRecognizer,
        outcome: Result<()>,
    ) -> Result<String> {
        self.state = SessionState::Finalizing;
        match outcome {
            Ok(()) => {
                recognizer.shutdown().await?;
                self.state = SessionState::Closed;
                Ok(self.transcript.join())
            }
            Err(e) => Err(self.fail(recognizer, e).await),
        }
    }

    /// Transition to `Failed`, release the connection, and attach whatever
    /// transcript was accumulated — partial results have value.
    async fn fail(
        &mut self,
        recognizer: &mut dyn SpeechRecognizer,
        error: VoxlistError,
    ) -> VoxlistError {
        self.state = SessionState::Failed;
        let _ = recognizer.shutdown().await;
        VoxlistError::SessionAborted {
            message: error.to_string(),
            partial_transcript: self.transcript.join(),
        }
    }
}

/// Transcribes a live microphone session against the configured backend.
///
/// Returns when the watchdog expires or a fatal error occurs. This is the
/// surface the calling collaborator (e.g. an HTTP handler) awaits as a
/// single call.
pub async fn transcribe_live_session(config: &SessionConfig) -> Result<String> {
    let mut recognizer = create_recognizer(RecognizerKind::Vosk);
    let mut session = Session::new(config.clone());
    session.run_live(recognizer.as_mut()).await
}

/// Transcribes an audio file against the configured backend.
pub async fn transcribe_file(path: impl AsRef<Path>, config: &SessionConfig) -> Result<String> {
    let mut recognizer = create_recognizer(RecognizerKind::Vosk);
    let mut session = Session::new(config.clone().with_input_file(path.as_ref()));
    session.run_file(recognizer.as_mut(), path.as_ref()).await
}
