//! Speech Playback Manager
//!
//! Single point of truth for "is something being spoken". Server-driven
//! reading and hover previews both go through here, so they can never layer
//! audio:
//!
//! ```text
//! StartReading ──► speak(Reading) ─┐
//!                                  ├─► cancel current ─► engine.speak(new)
//! pointer hover ─► preview() ──────┘
//! ```
//!
//! Every utterance gets an id. Engine callbacks carry that id back, and
//! callbacks for anything but the current utterance are dropped, so a late
//! `end` from a cancelled utterance cannot mark the new one as finished.

use crate::error::VoiceError;

pub type UtteranceId = u64;

/// Who asked for an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtteranceKind {
    /// Server-driven reading of captured text
    Reading,
    /// Hover preview of the toggle's label
    Preview,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    pub voice: String,
    pub rate: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeakOptions {
    pub rate: f32,
    pub kind: UtteranceKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    /// Submitted to the engine and not yet ended or cancelled
    Speaking {
        utterance: UtteranceId,
        kind: UtteranceKind,
    },
}

/// Callback from the engine about a specific utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechSignal {
    Started,
    Ended,
}

/// What a playback transition means for the rest of the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackNotice {
    Started(UtteranceKind),
    Finished(UtteranceKind),
}

/// The browser's speech synthesis, or a stand-in.
pub trait SpeechEngine {
    fn is_available(&self) -> bool;
    /// Queue `utterance` for playback. Start/end must later be reported
    /// against `utterance.id`.
    fn speak(&mut self, utterance: &Utterance) -> Result<(), VoiceError>;
    /// Silence everything the engine is playing or has queued
    fn cancel(&mut self);
}

pub struct SpeechPlayback {
    engine: Box<dyn SpeechEngine>,
    voice: String,
    state: PlaybackState,
    next_id: UtteranceId,
}

impl SpeechPlayback {
    pub fn new(engine: Box<dyn SpeechEngine>, voice: impl Into<String>) -> Self {
        Self {
            engine,
            voice: voice.into(),
            state: PlaybackState::Idle,
            next_id: 1,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_speaking(&self) -> bool {
        matches!(self.state, PlaybackState::Speaking { .. })
    }

    /// Speak `text`, cancelling whatever is currently playing first.
    ///
    /// Returns the new utterance's id. Empty text or a missing engine leave
    /// the state untouched and make no engine call; if the engine rejects the
    /// new utterance the manager ends up Idle.
    pub fn speak(&mut self, text: &str, options: SpeakOptions) -> Result<UtteranceId, VoiceError> {
        if text.trim().is_empty() {
            return Err(VoiceError::EmptyText);
        }
        if !self.engine.is_available() {
            return Err(VoiceError::SpeechUnavailable);
        }

        if let PlaybackState::Speaking { utterance, kind } = self.state {
            tracing::debug!(utterance, ?kind, "cancelling current utterance");
            self.engine.cancel();
            self.state = PlaybackState::Idle;
        }

        let id = self.next_id;
        self.next_id += 1;

        self.engine.speak(&Utterance {
            id,
            text: text.to_string(),
            voice: self.voice.clone(),
            rate: options.rate,
        })?;
        self.state = PlaybackState::Speaking {
            utterance: id,
            kind: options.kind,
        };
        tracing::debug!(utterance = id, kind = ?options.kind, "speaking");
        Ok(id)
    }

    /// Cancel playback. Returns the kind that was stopped; `None` (and no
    /// engine call) when already idle.
    pub fn stop(&mut self) -> Option<UtteranceKind> {
        match self.state {
            PlaybackState::Idle => None,
            PlaybackState::Speaking { utterance, kind } => {
                self.engine.cancel();
                self.state = PlaybackState::Idle;
                tracing::debug!(utterance, ?kind, "stopped");
                Some(kind)
            }
        }
    }

    /// Hover preview. Suppressed while a reading is playing; replaces an
    /// earlier preview.
    pub fn preview(&mut self, label: &str, rate: f32) -> Result<Option<UtteranceId>, VoiceError> {
        if let PlaybackState::Speaking {
            kind: UtteranceKind::Reading,
            ..
        } = self.state
        {
            tracing::debug!("preview suppressed by active reading");
            return Ok(None);
        }
        self.speak(
            label,
            SpeakOptions {
                rate,
                kind: UtteranceKind::Preview,
            },
        )
        .map(Some)
    }

    /// Pointer left the toggle. Only a preview is cancelled.
    pub fn end_preview(&mut self) -> bool {
        match self.state {
            PlaybackState::Speaking {
                kind: UtteranceKind::Preview,
                ..
            } => self.stop().is_some(),
            _ => false,
        }
    }

    /// Apply an engine callback. Signals for anything but the current
    /// utterance are ignored.
    pub fn on_signal(&mut self, id: UtteranceId, signal: SpeechSignal) -> Option<PlaybackNotice> {
        let kind = match self.state {
            PlaybackState::Speaking { utterance, kind } if utterance == id => kind,
            _ => {
                tracing::debug!(utterance = id, ?signal, "stale speech signal");
                return None;
            }
        };

        match signal {
            SpeechSignal::Started => Some(PlaybackNotice::Started(kind)),
            SpeechSignal::Ended => {
                self.state = PlaybackState::Idle;
                Some(PlaybackNotice::Finished(kind))
            }
        }
    }
}
