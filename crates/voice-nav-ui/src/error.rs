//! Client error type

use thiserror::Error;

/// Everything that can go wrong inside the client.
///
/// None of these are fatal: each is recovered locally, usually by leaving
/// state untouched and surfacing a status message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VoiceError {
    /// A control endpoint call failed (network, HTTP status or body)
    #[error("{operation} failed: {reason}")]
    Control {
        operation: &'static str,
        reason: String,
    },

    /// The browser has no speech synthesis
    #[error("speech synthesis is not available")]
    SpeechUnavailable,

    /// Nothing to read
    #[error("no text to read")]
    EmptyText,

    /// JSON payload could not be decoded
    #[error("malformed payload: {0}")]
    Decode(String),

    /// A web API call threw
    #[error("browser call failed: {0}")]
    Browser(String),
}

impl VoiceError {
    pub fn control(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Control {
            operation,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for VoiceError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

impl From<url::ParseError> for VoiceError {
    fn from(e: url::ParseError) -> Self {
        Self::Decode(e.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for VoiceError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        Self::Browser(format!("{:?}", value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_error_names_operation() {
        let err = VoiceError::control("start-voice-recognition", "HTTP 500");
        assert_eq!(err.to_string(), "start-voice-recognition failed: HTTP 500");
    }

    #[test]
    fn test_decode_from_serde() {
        let err: VoiceError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, VoiceError::Decode(_)));
    }
}
