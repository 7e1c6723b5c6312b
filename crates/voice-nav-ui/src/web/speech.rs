//! Speech synthesis and timers backed by the browser

use super::{post_weak, Host};
use crate::client::ClientEvent;
use crate::error::VoiceError;
use crate::speech::{SpeechEngine, SpeechSignal, Utterance, UtteranceId};
use crate::status::{Scheduler, TimerToken};
use std::rc::Weak;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{SpeechSynthesis, SpeechSynthesisUtterance, SpeechSynthesisVoice};

/// Fallback language when the configured voice name is not installed
const FALLBACK_LANG: &str = "en-GB";

/// The utterance handed to the browser plus the closures its handlers point
/// at. Dropping it detaches the handlers first so a late event never calls a
/// freed closure.
struct ActiveUtterance {
    utterance: SpeechSynthesisUtterance,
    _on_start: Closure<dyn FnMut()>,
    _on_end: Closure<dyn FnMut()>,
}

impl Drop for ActiveUtterance {
    fn drop(&mut self) {
        self.utterance.set_onstart(None);
        self.utterance.set_onend(None);
        self.utterance.set_onerror(None);
    }
}

pub(crate) struct WebSpeech {
    synth: Option<SpeechSynthesis>,
    host: Weak<Host>,
    current: Option<ActiveUtterance>,
}

impl WebSpeech {
    pub(crate) fn new(host: Weak<Host>) -> Self {
        let synth = web_sys::window().and_then(|w| w.speech_synthesis().ok());
        if synth.is_none() {
            tracing::warn!("speech synthesis not supported by this browser");
        }
        Self {
            synth,
            host,
            current: None,
        }
    }

    fn signal(&self, id: UtteranceId, signal: SpeechSignal) -> Closure<dyn FnMut()> {
        let host = self.host.clone();
        Closure::wrap(Box::new(move || {
            post_weak(
                &host,
                ClientEvent::Speech {
                    utterance: id,
                    signal,
                },
            );
        }) as Box<dyn FnMut()>)
    }
}

fn find_voice(synth: &SpeechSynthesis, name: &str) -> Option<SpeechSynthesisVoice> {
    let voices: Vec<SpeechSynthesisVoice> = synth
        .get_voices()
        .iter()
        .filter_map(|v| v.dyn_into::<SpeechSynthesisVoice>().ok())
        .collect();

    voices
        .iter()
        .find(|v| v.name() == name)
        .or_else(|| voices.iter().find(|v| v.lang() == FALLBACK_LANG))
        .cloned()
}

impl SpeechEngine for WebSpeech {
    fn is_available(&self) -> bool {
        self.synth.is_some()
    }

    fn speak(&mut self, utterance: &Utterance) -> Result<(), VoiceError> {
        let synth = self.synth.as_ref().ok_or(VoiceError::SpeechUnavailable)?;

        let native = SpeechSynthesisUtterance::new_with_text(&utterance.text)?;
        native.set_rate(utterance.rate);
        if let Some(voice) = find_voice(synth, &utterance.voice) {
            native.set_voice(Some(&voice));
        }

        let on_start = self.signal(utterance.id, SpeechSignal::Started);
        let on_end = self.signal(utterance.id, SpeechSignal::Ended);
        native.set_onstart(Some(on_start.as_ref().unchecked_ref()));
        native.set_onend(Some(on_end.as_ref().unchecked_ref()));
        // An utterance that errors out never fires `end`
        native.set_onerror(Some(on_end.as_ref().unchecked_ref()));

        synth.speak(&native);
        self.current = Some(ActiveUtterance {
            utterance: native,
            _on_start: on_start,
            _on_end: on_end,
        });
        Ok(())
    }

    fn cancel(&mut self) {
        self.current = None;
        if let Some(synth) = &self.synth {
            synth.cancel();
        }
    }
}

struct PendingTimer {
    token: TimerToken,
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

/// `setTimeout`-backed scheduler. The status slot only ever has one timer
/// outstanding, so only the latest is tracked.
pub(crate) struct WebScheduler {
    host: Weak<Host>,
    pending: Option<PendingTimer>,
}

impl WebScheduler {
    pub(crate) fn new(host: Weak<Host>) -> Self {
        Self {
            host,
            pending: None,
        }
    }
}

impl Scheduler for WebScheduler {
    fn schedule(&mut self, token: TimerToken, delay: Duration) {
        let Some(window) = web_sys::window() else { return };

        let host = self.host.clone();
        let callback = Closure::wrap(Box::new(move || {
            post_weak(&host, ClientEvent::StatusExpired(token));
        }) as Box<dyn FnMut()>);

        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            millis,
        ) {
            Ok(handle) => {
                self.pending = Some(PendingTimer {
                    token,
                    handle,
                    _callback: callback,
                });
            }
            Err(e) => tracing::warn!(error = ?e, "cannot schedule status dismissal"),
        }
    }

    fn cancel(&mut self, token: TimerToken) {
        if self.pending.as_ref().is_some_and(|t| t.token == token) {
            if let (Some(timer), Some(window)) = (self.pending.take(), web_sys::window()) {
                window.clear_timeout_with_handle(timer.handle);
            }
        }
    }
}
