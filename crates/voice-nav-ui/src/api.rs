//! API client for the voice backend's control endpoints
//!
//! Uses web-sys fetch on WASM. Native builds only get the URL helpers, which
//! is all the tests need.

use crate::session::SessionRequest;

/// Control and resource endpoints exposed by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    StartRecognition,
    StopRecognition,
    VoiceStatus,
    /// Narration audio for a capture, addressed by an opaque token
    Audio(String),
}

impl Endpoint {
    pub fn path(&self) -> String {
        match self {
            Endpoint::StartRecognition => "/start-voice-recognition".to_string(),
            Endpoint::StopRecognition => "/stop-voice-recognition".to_string(),
            Endpoint::VoiceStatus => "/voice-status".to_string(),
            Endpoint::Audio(token) => format!("/give_audio/{}", token.trim_start_matches('/')),
        }
    }

    pub fn method(&self) -> &'static str {
        match self {
            Endpoint::StartRecognition | Endpoint::StopRecognition => "POST",
            Endpoint::VoiceStatus | Endpoint::Audio(_) => "GET",
        }
    }

    /// Name used in logs and error messages
    pub fn operation(&self) -> &'static str {
        match self {
            Endpoint::StartRecognition => "start-voice-recognition",
            Endpoint::StopRecognition => "stop-voice-recognition",
            Endpoint::VoiceStatus => "voice-status",
            Endpoint::Audio(_) => "give_audio",
        }
    }
}

impl From<SessionRequest> for Endpoint {
    fn from(request: SessionRequest) -> Self {
        match request {
            SessionRequest::Start => Endpoint::StartRecognition,
            SessionRequest::Stop => Endpoint::StopRecognition,
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, endpoint: &Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Playback URL for a capture's narration audio, served by the backend.
    pub fn audio_url(&self, token: &str) -> String {
        self.url(&Endpoint::Audio(token.to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
impl ApiClient {
    /// Issue a session start/stop request.
    pub async fn send_session(
        &self,
        request: SessionRequest,
    ) -> Result<voice_nav_types::ControlResponse, crate::error::VoiceError> {
        self.fetch_json(&Endpoint::from(request)).await
    }

    /// Ask the backend whether a session is already listening.
    pub async fn voice_status(
        &self,
    ) -> Result<voice_nav_types::VoiceStatusResponse, crate::error::VoiceError> {
        self.fetch_json(&Endpoint::VoiceStatus).await
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
    ) -> Result<T, crate::error::VoiceError> {
        use crate::error::VoiceError;
        use wasm_bindgen::JsCast;
        use wasm_bindgen_futures::JsFuture;
        use web_sys::{Request, RequestInit, RequestMode, Response};

        let operation = endpoint.operation();
        let fail = |reason: String| VoiceError::control(operation, reason);

        let opts = RequestInit::new();
        opts.set_method(endpoint.method());
        opts.set_mode(RequestMode::Cors);

        let request = Request::new_with_str_and_init(&self.url(endpoint), &opts)
            .map_err(|e| fail(format!("request error: {:?}", e)))?;
        if endpoint.method() == "POST" {
            request
                .headers()
                .set("Content-Type", "application/json")
                .map_err(|e| fail(format!("header error: {:?}", e)))?;
        }

        let window = web_sys::window().ok_or_else(|| fail("no window".to_string()))?;
        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| fail(format!("fetch error: {:?}", e)))?;

        let resp: Response = resp_value
            .dyn_into()
            .map_err(|_| fail("response is not a Response".to_string()))?;

        if !resp.ok() {
            return Err(fail(format!("HTTP {}", resp.status())));
        }

        let json = JsFuture::from(
            resp.json()
                .map_err(|e| fail(format!("json promise error: {:?}", e)))?,
        )
        .await
        .map_err(|e| fail(format!("json error: {:?}", e)))?;

        serde_wasm_bindgen::from_value(json).map_err(|e| fail(format!("deserialize error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_url_is_derived_from_token() {
        let api = ApiClient::new("https://voice.example");
        assert_eq!(api.audio_url("abc"), "https://voice.example/give_audio/abc");
        assert_eq!(
            api.audio_url("/abc.mp3"),
            "https://voice.example/give_audio/abc.mp3"
        );
    }

    #[test]
    fn test_session_request_endpoints() {
        assert_eq!(
            Endpoint::from(SessionRequest::Start).path(),
            "/start-voice-recognition"
        );
        assert_eq!(Endpoint::from(SessionRequest::Stop).method(), "POST");
        assert_eq!(Endpoint::VoiceStatus.method(), "GET");
    }

    #[test]
    fn test_client_url_joins_base() {
        let api = ApiClient::new("http://localhost:5000/");
        assert_eq!(
            api.url(&Endpoint::VoiceStatus),
            "http://localhost:5000/voice-status"
        );
    }
}
