//! Push Event Dispatcher
//!
//! Routes each push event to exactly one handler. Dispatch is synchronous:
//! a handler, including its state changes, finishes before the next event
//! is looked at.

use crate::api::ApiClient;
use crate::speech::{SpeakOptions, SpeechPlayback, UtteranceKind};
use crate::status::{Notice, StatusNotifier};
use voice_nav_types::{CaptureResponse, PushEvent};

pub const CAPTURE_SUCCESS_MESSAGE: &str = "Image captured and text recognized successfully";
pub const NOTHING_TO_READ_MESSAGE: &str = "No text to read or browser not supported";
pub const STOPPED_READING_MESSAGE: &str = "Stopped reading text";

pub trait Navigator {
    fn navigate(&mut self, url: &str);
}

/// Region showing the recognized text of the last capture
pub trait TextRegion {
    fn set_text(&mut self, text: &str);
}

/// Audio element for capture narration
pub trait AudioSink {
    /// Point the element at `url`, reload it and start playback
    fn play_source(&mut self, url: &str);
}

/// Render targets for capture responses. Either may be absent from the page.
#[derive(Default)]
pub struct CaptureTargets {
    pub text_region: Option<Box<dyn TextRegion>>,
    pub audio: Option<Box<dyn AudioSink>>,
}

pub struct PushDispatcher {
    navigator: Box<dyn Navigator>,
    targets: CaptureTargets,
    api: ApiClient,
    rate: f32,
}

impl PushDispatcher {
    pub fn new(
        navigator: Box<dyn Navigator>,
        targets: CaptureTargets,
        api: ApiClient,
        rate: f32,
    ) -> Self {
        Self {
            navigator,
            targets,
            api,
            rate,
        }
    }

    pub fn dispatch(
        &mut self,
        event: PushEvent,
        speech: &mut SpeechPlayback,
        status: &mut StatusNotifier,
    ) {
        tracing::debug!(event = event.name(), "push event");

        match event {
            PushEvent::Redirect { url } => {
                tracing::info!(%url, "redirect");
                self.navigator.navigate(&url);
            }
            PushEvent::StartReading { text } => {
                let options = SpeakOptions {
                    rate: self.rate,
                    kind: UtteranceKind::Reading,
                };
                if let Err(e) = speech.speak(&text, options) {
                    tracing::warn!(error = %e, "cannot start reading");
                    status.post(Notice::error(NOTHING_TO_READ_MESSAGE));
                }
            }
            PushEvent::StopReading => {
                if speech.stop().is_some() {
                    status.post(Notice::info(STOPPED_READING_MESSAGE));
                }
            }
            PushEvent::CaptureResponse(response) => {
                let notice = self.render_capture(response);
                status.post(notice);
            }
        }
    }

    fn render_capture(&mut self, response: CaptureResponse) -> Notice {
        if !response.success {
            let reason = response.error.as_deref().unwrap_or("unknown error");
            tracing::warn!(%reason, "capture failed");
            return Notice::error(format!("Failed to capture image: {}", reason));
        }

        if let (Some(region), Some(text)) = (self.targets.text_region.as_mut(), &response.text) {
            region.set_text(text);
        }

        if let Some(token) = response.audio_path.as_deref().filter(|t| !t.is_empty()) {
            if let Some(audio) = self.targets.audio.as_mut() {
                audio.play_source(&self.api.audio_url(token));
            }
        }

        Notice::success(CAPTURE_SUCCESS_MESSAGE)
    }
}
