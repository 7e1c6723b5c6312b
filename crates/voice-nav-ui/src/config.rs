//! Client configuration
//!
//! The hosting page may hand a partial config object to
//! `start_voice_control`; every field it leaves out takes the default below.

use crate::error::VoiceError;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Default auto-dismiss delay for info/success status messages (milliseconds).
pub const DEFAULT_STATUS_DISMISS_MS: u64 = 5000;

/// Default speech rate.
pub const DEFAULT_SPEECH_RATE: f32 = 0.9;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Origin the control endpoints are served from
    pub base_url: String,
    /// Path of the push channel, resolved against `base_url`
    pub push_path: String,
    /// Preferred synthesis voice; falls back to the browser default
    pub voice: String,
    pub rate: f32,
    pub status_dismiss_ms: u64,
    /// Words the backend listens for, used in the start hint
    pub command_words: Vec<String>,
    /// Text spoken when the pointer rests on the toggle
    pub preview_label: String,

    // DOM targets, looked up once at startup
    pub toggle_id: String,
    pub status_id: String,
    pub status_text_id: String,
    pub text_region_id: String,
    pub audio_id: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            push_path: "/voice-events".to_string(),
            voice: "UK English Female".to_string(),
            rate: DEFAULT_SPEECH_RATE,
            status_dismiss_ms: DEFAULT_STATUS_DISMISS_MS,
            command_words: vec!["capture".into(), "read".into(), "stop".into()],
            preview_label: "Voice Control".to_string(),
            toggle_id: "voice-control-btn".to_string(),
            status_id: "voice-status".to_string(),
            status_text_id: "voice-status-message".to_string(),
            text_region_id: "recognized-text".to_string(),
            audio_id: "audioOutput".to_string(),
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn default_base_url() -> String {
    web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_else(|| "http://localhost:5000".to_string())
}

#[cfg(not(target_arch = "wasm32"))]
fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

impl ClientConfig {
    pub fn dismiss_delay(&self) -> Duration {
        Duration::from_millis(self.status_dismiss_ms)
    }

    /// Message shown once a session has started, e.g.
    /// `Voice control started. Try saying "capture", "read", or "stop"`.
    pub fn command_hint(&self) -> String {
        let quoted: Vec<String> = self
            .command_words
            .iter()
            .map(|w| format!("\"{}\"", w))
            .collect();

        let words = match quoted.as_slice() {
            [] => return "Voice control started".to_string(),
            [one] => one.clone(),
            [a, b] => format!("{} or {}", a, b),
            [init @ .., last] => format!("{}, or {}", init.join(", "), last),
        };
        format!("Voice control started. Try saying {}", words)
    }

    /// WebSocket URL of the push channel (`http` → `ws`, `https` → `wss`).
    pub fn push_url(&self) -> Result<String, VoiceError> {
        let mut url = Url::parse(&self.base_url)?.join(&self.push_path)?;
        let scheme = match url.scheme() {
            "https" | "wss" => "wss",
            _ => "ws",
        };
        url.set_scheme(scheme)
            .map_err(|_| VoiceError::Decode(format!("cannot use {} as push scheme", scheme)))?;
        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_hint_matches_command_words() {
        let config = ClientConfig::default();
        assert_eq!(
            config.command_hint(),
            r#"Voice control started. Try saying "capture", "read", or "stop""#
        );
    }

    #[test]
    fn test_hint_with_few_words() {
        let mut config = ClientConfig::default();
        config.command_words = vec!["go".into(), "halt".into()];
        assert_eq!(
            config.command_hint(),
            r#"Voice control started. Try saying "go" or "halt""#
        );

        config.command_words.clear();
        assert_eq!(config.command_hint(), "Voice control started");
    }

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url":"https://voice.example","rate":1.2}"#).unwrap();
        assert_eq!(config.base_url, "https://voice.example");
        assert_eq!(config.rate, 1.2);
        assert_eq!(config.status_dismiss_ms, DEFAULT_STATUS_DISMISS_MS);
        assert_eq!(config.dismiss_delay(), Duration::from_secs(5));
    }

    #[test]
    fn test_push_url_scheme() {
        let mut config = ClientConfig::default();
        config.base_url = "https://voice.example".to_string();
        assert_eq!(config.push_url().unwrap(), "wss://voice.example/voice-events");

        config.base_url = "http://localhost:5000".to_string();
        assert_eq!(config.push_url().unwrap(), "ws://localhost:5000/voice-events");

        config.base_url = "not a url".to_string();
        assert!(config.push_url().is_err());
    }
}
