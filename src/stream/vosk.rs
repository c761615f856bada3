//! Vosk websocket streaming client.
//!
//! Speaks the Vosk server protocol over a persistent websocket: a JSON
//! configuration handshake on connect, one binary PCM frame per message with
//! exactly one JSON response awaited before the next frame (the backend is
//! stateful per-frame, no pipelining), then `{"eof": 1}` and one final
//! response.

use crate::config::SessionConfig;
use crate::error::{Result, VoxlistError};
use crate::stream::frame::{AudioFrame, RecognitionResult};
use crate::stream::recognizer::SpeechRecognizer;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Per-frame response shape. Either field may be absent; absence of both
/// means no activity was detected for that frame.
#[derive(Debug, Deserialize)]
struct BackendResponse {
    text: Option<String>,
    partial: Option<String>,
}

/// Decodes one backend response message into a recognition result.
///
/// A finalized hypothesis (`"text"`) carries the text and voice activity;
/// an in-progress hypothesis (`"partial"`) carries activity only. Malformed
/// JSON is a recoverable per-frame condition: logged and treated as
/// no-activity.
fn decode_response(raw: &str) -> RecognitionResult {
    let response: BackendResponse = match serde_json::from_str(raw) {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "Malformed backend response, treating as silence");
            return RecognitionResult::silence();
        }
    };

    if let Some(text) = response.text {
        let text = text.trim();
        if !text.is_empty() {
            return RecognitionResult::finalized(text);
        }
    }
    if let Some(partial) = response.partial {
        if !partial.trim().is_empty() {
            return RecognitionResult::partial();
        }
    }
    RecognitionResult::silence()
}

/// Streaming recognition client for a Vosk websocket server.
///
/// Owns exactly one live connection per session; never shared across
/// sessions or threads.
pub struct VoskRecognizer {
    ws: Option<WsStream>,
}

impl VoskRecognizer {
    /// Creates a disconnected client; `initialize` opens the connection.
    pub fn new() -> Self {
        Self { ws: None }
    }

    fn ws_mut(&mut self) -> Result<&mut WsStream> {
        self.ws.as_mut().ok_or_else(|| VoxlistError::Protocol {
            message: "client is not initialized".to_string(),
        })
    }

    /// Sends one frame and awaits its response — the strict
    /// request/response round trip the protocol demands.
    async fn round_trip(&mut self, frame: &AudioFrame) -> Result<RecognitionResult> {
        let ws = self.ws_mut()?;
        ws.send(Message::Binary(frame.to_le_bytes()))
            .await
            .map_err(|e| VoxlistError::Protocol {
                message: format!("Failed to send audio frame: {}", e),
            })?;
        let raw = recv_text(ws).await?;
        Ok(decode_response(&raw))
    }

    /// Sends the end-of-stream marker and awaits the final response.
    /// A malformed final response is fatal, unlike per-frame responses.
    async fn finish(&mut self) -> Result<RecognitionResult> {
        let ws = self.ws_mut()?;
        debug!("Audio stream ended, sending EOF");
        ws.send(Message::Text(r#"{"eof": 1}"#.to_string()))
            .await
            .map_err(|e| VoxlistError::Protocol {
                message: format!("Failed to send end-of-stream marker: {}", e),
            })?;
        let raw = recv_text(ws).await?;

        serde_json::from_str::<BackendResponse>(&raw)
            .map_err(|e| VoxlistError::Protocol {
                message: format!("Malformed end-of-stream response: {}", e),
            })
            .map(|_| decode_response(&raw))
    }
}

impl Default for VoskRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads messages until a text frame arrives. Control frames are handled by
/// the transport; a close or transport error is fatal to the session.
async fn recv_text(ws: &mut WsStream) -> Result<String> {
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => return Ok(text),
            Some(Ok(Message::Close(_))) | None => {
                return Err(VoxlistError::Protocol {
                    message: "backend closed the connection mid-stream".to_string(),
                });
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => {
                return Err(VoxlistError::Protocol {
                    message: format!("Transport failure: {}", e),
                });
            }
        }
    }
}

#[async_trait::async_trait]
impl SpeechRecognizer for VoskRecognizer {
    async fn initialize(&mut self, config: &SessionConfig) -> Result<()> {
        info!(endpoint = %config.endpoint, "Connecting to recognition backend");
        let (mut ws, _) =
            connect_async(config.endpoint.as_str())
                .await
                .map_err(|e| VoxlistError::Connection {
                    message: format!("Failed to connect to {}: {}", config.endpoint, e),
                })?;

        let handshake = serde_json::json!({
            "config": {
                "sample_rate": config.sample_rate,
                "lang": config.language,
            }
        });
        ws.send(Message::Text(handshake.to_string()))
            .await
            .map_err(|e| VoxlistError::Connection {
                message: format!("Configuration handshake rejected: {}", e),
            })?;

        debug!(
            sample_rate = config.sample_rate,
            language = %config.language,
            "Backend handshake sent"
        );
        self.ws = Some(ws);
        Ok(())
    }

    async fn process_stream(
        &mut self,
        mut frames: mpsc::Receiver<AudioFrame>,
        results: mpsc::Sender<RecognitionResult>,
    ) -> Result<()> {
        while let Some(frame) = frames.recv().await {
            let result = self.round_trip(&frame).await?;
            if results.send(result).await.is_err() {
                // Consumer is gone; stop sending but still close the
                // stream cleanly below.
                break;
            }
        }

        let final_result = self.finish().await?;
        let _ = results.send(final_result).await;
        Ok(())
    }

    async fn process_file(
        &mut self,
        frames: Vec<AudioFrame>,
        results: mpsc::Sender<RecognitionResult>,
    ) -> Result<()> {
        for frame in &frames {
            let result = self.round_trip(frame).await?;
            if results.send(result).await.is_err() {
                break;
            }
        }
        let final_result = self.finish().await?;
        let _ = results.send(final_result).await;
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        if let Some(mut ws) = self.ws.take() {
            // Best-effort close; the connection may already be gone.
            let _ = ws.close(None).await;
            debug!("Backend connection released");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_finalized_hypothesis() {
        let result = decode_response(r#"{"text": "milk"}"#);
        assert!(result.has_voice_activity);
        assert_eq!(result.text, "milk");
    }

    #[test]
    fn test_decode_partial_hypothesis() {
        let result = decode_response(r#"{"partial": "mi"}"#);
        assert!(result.has_voice_activity);
        assert_eq!(result.text, "");
    }

    #[test]
    fn test_decode_empty_object_is_silence() {
        let result = decode_response("{}");
        assert!(!result.has_voice_activity);
        assert_eq!(result.text, "");
    }

    #[test]
    fn test_decode_blank_text_is_silence() {
        let result = decode_response(r#"{"text": "   "}"#);
        assert!(!result.has_voice_activity);
        assert_eq!(result.text, "");
    }

    #[test]
    fn test_decode_blank_partial_is_silence() {
        let result = decode_response(r#"{"partial": ""}"#);
        assert!(!result.has_voice_activity);
    }

    #[test]
    fn test_decode_text_wins_over_partial() {
        let result = decode_response(r#"{"text": "bread", "partial": "bre"}"#);
        assert_eq!(result.text, "bread");
        assert!(result.has_voice_activity);
    }

    #[test]
    fn test_decode_malformed_json_is_recoverable_silence() {
        let result = decode_response("not json at all");
        assert!(!result.has_voice_activity);
        assert_eq!(result.text, "");
    }

    #[test]
    fn test_decode_trims_finalized_text() {
        let result = decode_response(r#"{"text": "  dos huevos  "}"#);
        assert_eq!(result.text, "dos huevos");
    }

    #[tokio::test]
    async fn test_round_trip_without_initialize_is_protocol_error() {
        let mut client = VoskRecognizer::new();
        let frame = AudioFrame::new(vec![0i16; 4]);
        let result = client.round_trip(&frame).await;
        assert!(matches!(result, Err(VoxlistError::Protocol { .. })));
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent_before_initialize() {
        let mut client = VoskRecognizer::new();
        assert!(client.shutdown().await.is_ok());
        assert!(client.shutdown().await.is_ok());
    }

    #[tokio::test]
    async fn test_initialize_unreachable_endpoint_is_connection_error() {
        let mut client = VoskRecognizer::new();
        // Port 1 on loopback: nothing listens there.
        let mut config = SessionConfig::default();
        config.endpoint = "ws://127.0.0.1:1/".to_string();

        let result = client.initialize(&config).await;
        assert!(matches!(result, Err(VoxlistError::Connection { .. })));
    }
}
