//! Voice Client
//!
//! Ties the managers together behind one entry point.
//!
//! ## Structure
//!
//! - **ClientEvent**: anything that happened (user input, engine callback,
//!   request completion, push event)
//! - **ClientCommand**: I/O the host must perform on the client's behalf
//! - **VoiceClient::handle**: the only place client state changes
//!
//! ```text
//! click / hover ─┐                         ┌─► SessionController ─► toggle
//! push frame ────┼─► ClientEvent ─► handle ┼─► SpeechPlayback ────► engine
//! engine / timer ┤                         ├─► StatusNotifier ────► surface
//! fetch result ──┘                         └─► PushDispatcher ────► page
//!                                                     │
//!                        take_commands() ◄────────────┘ (start/stop/status)
//! ```

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::dispatch::{CaptureTargets, Navigator, PushDispatcher};
use crate::error::VoiceError;
use crate::reconcile::StartupReconciler;
use crate::session::{SessionController, SessionRequest, SessionState, ToggleAffordance};
use crate::speech::{
    PlaybackNotice, PlaybackState, SpeechEngine, SpeechPlayback, SpeechSignal, UtteranceId,
    UtteranceKind,
};
use crate::status::{Notice, Scheduler, StatusMessage, StatusNotifier, StatusSurface, TimerToken};
use voice_nav_types::{ControlResponse, PushEvent, VoiceStatusResponse};

pub const READING_STARTED_MESSAGE: &str = "Reading text...";
pub const READING_FINISHED_MESSAGE: &str = "Finished reading text";

/// Input to the client
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// Page finished loading
    Startup,
    ToggleClicked,
    PointerEntered,
    PointerLeft,
    Push(PushEvent),
    Speech {
        utterance: UtteranceId,
        signal: SpeechSignal,
    },
    StatusExpired(TimerToken),
    SessionCompleted {
        request: SessionRequest,
        result: Result<ControlResponse, VoiceError>,
    },
    StatusLoaded(Result<VoiceStatusResponse, VoiceError>),
}

/// I/O requested by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    Session(SessionRequest),
    QueryStatus,
}

/// Collaborators the client drives, resolved once by the host.
pub struct ClientParts {
    pub toggle: Box<dyn ToggleAffordance>,
    pub status_surface: Box<dyn StatusSurface>,
    pub scheduler: Box<dyn Scheduler>,
    pub speech: Box<dyn SpeechEngine>,
    pub navigator: Box<dyn Navigator>,
    pub capture: CaptureTargets,
}

pub struct VoiceClient {
    session: SessionController,
    speech: SpeechPlayback,
    status: StatusNotifier,
    dispatcher: PushDispatcher,
    reconciler: StartupReconciler,
    preview_label: String,
    rate: f32,
    /// Commands to execute (populated by handle, consumed by take_commands)
    pending_commands: Vec<ClientCommand>,
}

impl VoiceClient {
    pub fn new(config: &ClientConfig, parts: ClientParts) -> Self {
        Self {
            session: SessionController::new(parts.toggle, config.command_hint()),
            speech: SpeechPlayback::new(parts.speech, config.voice.clone()),
            status: StatusNotifier::new(
                parts.status_surface,
                parts.scheduler,
                config.dismiss_delay(),
            ),
            dispatcher: PushDispatcher::new(
                parts.navigator,
                parts.capture,
                ApiClient::new(&config.base_url),
                config.rate,
            ),
            reconciler: StartupReconciler::new(),
            preview_label: config.preview_label.clone(),
            rate: config.rate,
            pending_commands: Vec::new(),
        }
    }

    pub fn handle(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::Startup => {
                if self.reconciler.begin(&self.session) {
                    self.pending_commands.push(ClientCommand::QueryStatus);
                }
            }
            ClientEvent::ToggleClicked => {
                let request = self.session.toggle();
                tracing::debug!(?request, "toggle");
                self.pending_commands.push(ClientCommand::Session(request));
            }
            ClientEvent::PointerEntered => {
                if let Err(e) = self.speech.preview(&self.preview_label, self.rate) {
                    tracing::debug!(error = %e, "preview unavailable");
                }
            }
            ClientEvent::PointerLeft => {
                self.speech.end_preview();
            }
            ClientEvent::Push(push) => {
                self.dispatcher
                    .dispatch(push, &mut self.speech, &mut self.status);
            }
            ClientEvent::Speech { utterance, signal } => {
                if let Some(notice) = self.speech.on_signal(utterance, signal) {
                    self.on_playback(notice);
                }
            }
            ClientEvent::StatusExpired(token) => {
                self.status.expire(token);
            }
            ClientEvent::SessionCompleted { request, result } => {
                let notice = self.session.complete(request, result);
                self.status.post(notice);
            }
            ClientEvent::StatusLoaded(result) => {
                let outcome = self.reconciler.apply(result, &mut self.session);
                tracing::debug!(?outcome, "startup reconciliation");
            }
        }
    }

    fn on_playback(&mut self, notice: PlaybackNotice) {
        match notice {
            PlaybackNotice::Started(UtteranceKind::Reading) => {
                self.status.post(Notice::info(READING_STARTED_MESSAGE));
            }
            PlaybackNotice::Finished(UtteranceKind::Reading) => {
                self.status.post(Notice::success(READING_FINISHED_MESSAGE));
            }
            PlaybackNotice::Started(UtteranceKind::Preview)
            | PlaybackNotice::Finished(UtteranceKind::Preview) => {}
        }
    }

    /// Take all pending commands
    pub fn take_commands(&mut self) -> Vec<ClientCommand> {
        std::mem::take(&mut self.pending_commands)
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.speech.state()
    }

    pub fn status_message(&self) -> Option<&StatusMessage> {
        self.status.message()
    }
}
