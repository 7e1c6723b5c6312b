//! Wire Types for voice-nav
//!
//! Everything that crosses the boundary between the browser client and the
//! voice backend lives here.
//!
//! ```text
//! ┌──────────────────┐  push (JSON frames)  ┌──────────────────┐
//! │  Voice backend   │ ───────────────────► │  WASM client     │
//! │                  │ ◄─────────────────── │                  │
//! └──────────────────┘  control (REST/JSON) └──────────────────┘
//! ```
//!
//! ## Rules
//!
//! 1. Push frames are envelopes: `{"event": "<name>", "data": {...}}`
//! 2. Event names are snake_case
//! 3. Optional fields default; unknown fields are ignored

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// PUSH CHANNEL
// ============================================================================

/// Raw frame received on the push channel.
///
/// Decoding is two-step so that an unknown event name is reported by name
/// instead of as an opaque serde error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushEnvelope {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// A server-initiated event, decoded from a [`PushEnvelope`].
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    /// Navigate the document to `url`
    Redirect { url: String },
    /// Read `text` aloud
    StartReading { text: String },
    /// Stop whatever is being read
    StopReading,
    /// Result of a capture/OCR run
    CaptureResponse(CaptureResponse),
}

/// Why a push frame could not be turned into a [`PushEvent`].
#[derive(Debug, Error)]
pub enum PushDecodeError {
    /// Frame was not valid JSON or not an envelope
    #[error("malformed push frame: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Envelope named an event this client does not know
    #[error("unknown push event '{0}'")]
    UnknownEvent(String),

    /// Known event, but its payload did not match
    #[error("bad payload for push event '{event}': {source}")]
    Payload {
        event: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
struct RedirectPayload {
    url: String,
}

#[derive(Deserialize)]
struct ReadingPayload {
    #[serde(default)]
    text: String,
}

impl PushEvent {
    pub const REDIRECT: &'static str = "redirect";
    pub const START_READING: &'static str = "start_reading";
    pub const STOP_READING: &'static str = "stop_reading";
    pub const CAPTURE_RESPONSE: &'static str = "capture_response";

    /// Decode a text frame straight off the wire.
    pub fn from_frame(frame: &str) -> Result<Self, PushDecodeError> {
        let envelope: PushEnvelope = serde_json::from_str(frame)?;
        Self::from_envelope(envelope)
    }

    pub fn from_envelope(envelope: PushEnvelope) -> Result<Self, PushDecodeError> {
        let PushEnvelope { event, data } = envelope;
        let payload_err = |source| PushDecodeError::Payload {
            event: event.clone(),
            source,
        };

        match event.as_str() {
            Self::REDIRECT => {
                let p: RedirectPayload = serde_json::from_value(data).map_err(payload_err)?;
                Ok(Self::Redirect { url: p.url })
            }
            Self::START_READING => {
                let p: ReadingPayload = serde_json::from_value(data).map_err(payload_err)?;
                Ok(Self::StartReading { text: p.text })
            }
            // Payload is ignored; servers send nothing, null or {}
            Self::STOP_READING => Ok(Self::StopReading),
            Self::CAPTURE_RESPONSE => {
                let p: CaptureResponse = serde_json::from_value(data).map_err(payload_err)?;
                Ok(Self::CaptureResponse(p))
            }
            _ => Err(PushDecodeError::UnknownEvent(event.clone())),
        }
    }

    /// Event name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Redirect { .. } => Self::REDIRECT,
            Self::StartReading { .. } => Self::START_READING,
            Self::StopReading => Self::STOP_READING,
            Self::CaptureResponse(_) => Self::CAPTURE_RESPONSE,
        }
    }
}

/// Payload of a `capture_response` push event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureResponse {
    pub success: bool,
    /// Recognized text (present on success)
    #[serde(default)]
    pub text: Option<String>,
    /// Opaque token for the narration audio, fetched via `give_audio/{path}`
    #[serde(default, alias = "audioPath")]
    pub audio_path: Option<String>,
    /// Server-supplied failure reason
    #[serde(default)]
    pub error: Option<String>,
}

// ============================================================================
// CONTROL ENDPOINTS
// ============================================================================

/// Body returned by `start-voice-recognition` / `stop-voice-recognition`.
///
/// The backend answers with a human readable status line; success is carried
/// by the HTTP status, not by this body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlResponse {
    #[serde(default, alias = "status")]
    pub message: Option<String>,
}

/// Body returned by `voice-status`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceStatusResponse {
    #[serde(default)]
    pub is_listening: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_redirect() {
        let event = PushEvent::from_frame(r#"{"event":"redirect","data":{"url":"/home"}}"#)
            .unwrap();
        assert_eq!(
            event,
            PushEvent::Redirect {
                url: "/home".to_string()
            }
        );
        assert_eq!(event.name(), "redirect");
    }

    #[test]
    fn test_decode_stop_reading_without_data() {
        assert_eq!(
            PushEvent::from_frame(r#"{"event":"stop_reading"}"#).unwrap(),
            PushEvent::StopReading
        );
        assert_eq!(
            PushEvent::from_frame(r#"{"event":"stop_reading","data":{}}"#).unwrap(),
            PushEvent::StopReading
        );
    }

    #[test]
    fn test_decode_capture_response_accepts_both_spellings() {
        let snake = PushEvent::from_frame(
            r#"{"event":"capture_response","data":{"success":true,"text":"HELLO","audio_path":"abc"}}"#,
        )
        .unwrap();
        let camel = PushEvent::from_frame(
            r#"{"event":"capture_response","data":{"success":true,"text":"HELLO","audioPath":"abc"}}"#,
        )
        .unwrap();
        assert_eq!(snake, camel);

        match snake {
            PushEvent::CaptureResponse(resp) => {
                assert!(resp.success);
                assert_eq!(resp.text.as_deref(), Some("HELLO"));
                assert_eq!(resp.audio_path.as_deref(), Some("abc"));
                assert!(resp.error.is_none());
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_decode_capture_failure() {
        let event = PushEvent::from_frame(
            r#"{"event":"capture_response","data":{"success":false,"error":"bad image"}}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            PushEvent::CaptureResponse(CaptureResponse {
                success: false,
                error: Some("bad image".to_string()),
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_unknown_event_is_reported_by_name() {
        let err = PushEvent::from_frame(r#"{"event":"teleport","data":{}}"#).unwrap_err();
        assert!(matches!(err, PushDecodeError::UnknownEvent(ref name) if name == "teleport"));
        assert_eq!(err.to_string(), "unknown push event 'teleport'");
    }

    #[test]
    fn test_bad_payload_and_malformed_frame() {
        let err = PushEvent::from_frame(r#"{"event":"redirect","data":{}}"#).unwrap_err();
        assert!(matches!(err, PushDecodeError::Payload { ref event, .. } if event == "redirect"));

        assert!(std::error::Error::source(&err).is_some());

        let err = PushEvent::from_frame("not json").unwrap_err();
        assert!(matches!(err, PushDecodeError::Malformed(_)));
        assert!(err.to_string().starts_with("malformed push frame: "));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_control_and_status_bodies() {
        let resp: ControlResponse =
            serde_json::from_str(r#"{"status":"Voice recognition started"}"#).unwrap();
        assert_eq!(resp.message.as_deref(), Some("Voice recognition started"));

        let resp: ControlResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.message.is_none());

        let status: VoiceStatusResponse =
            serde_json::from_str(r#"{"is_listening":true,"uptime":12}"#).unwrap();
        assert!(status.is_listening);
    }
}
