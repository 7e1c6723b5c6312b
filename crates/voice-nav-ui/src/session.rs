//! Session Controller
//!
//! Tracks whether the backend is listening. State only changes when the
//! backend confirms a request; a failed or still-outstanding request leaves
//! both the state and the toggle affordance exactly as they were.

use crate::error::VoiceError;
use crate::status::Notice;
use voice_nav_types::ControlResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Inactive,
    Active,
}

impl SessionState {
    pub fn is_active(self) -> bool {
        matches!(self, SessionState::Active)
    }
}

/// Request to the backend to change the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRequest {
    Start,
    Stop,
}

impl SessionRequest {
    /// State the backend is in once this request succeeds
    pub fn target(self) -> SessionState {
        match self {
            SessionRequest::Start => SessionState::Active,
            SessionRequest::Stop => SessionState::Inactive,
        }
    }
}

/// The on-page voice control toggle.
pub trait ToggleAffordance {
    fn set_active(&mut self, active: bool);
}

pub struct SessionController {
    state: SessionState,
    affordance: Box<dyn ToggleAffordance>,
    start_hint: String,
    /// Number of server-confirmed transitions, used to detect stale replies
    confirmed: u64,
}

impl SessionController {
    pub fn new(mut affordance: Box<dyn ToggleAffordance>, start_hint: impl Into<String>) -> Self {
        affordance.set_active(false);
        Self {
            state: SessionState::Inactive,
            affordance,
            start_hint: start_hint.into(),
            confirmed: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn confirmed_transitions(&self) -> u64 {
        self.confirmed
    }

    /// Which request a toggle should issue, based on the current state.
    /// Nothing changes until [`complete`](Self::complete) is called.
    pub fn toggle(&self) -> SessionRequest {
        match self.state {
            SessionState::Active => SessionRequest::Stop,
            SessionState::Inactive => SessionRequest::Start,
        }
    }

    /// Apply the backend's answer to `request`.
    pub fn complete(
        &mut self,
        request: SessionRequest,
        result: Result<ControlResponse, VoiceError>,
    ) -> Notice {
        match result {
            Ok(response) => {
                tracing::info!(?request, message = ?response.message, "session request confirmed");
                self.set_state(request.target());
                self.confirmed += 1;
                match request {
                    SessionRequest::Start => Notice::success(self.start_hint.clone()),
                    SessionRequest::Stop => Notice::info("Voice control stopped"),
                }
            }
            Err(e) => {
                tracing::warn!(?request, error = %e, "session request failed");
                match request {
                    SessionRequest::Start => Notice::error("Error starting voice control"),
                    SessionRequest::Stop => Notice::error("Error stopping voice control"),
                }
            }
        }
    }

    /// Adopt a session the backend already has running (no request issued).
    pub fn adopt_active(&mut self) {
        self.set_state(SessionState::Active);
    }

    fn set_state(&mut self, state: SessionState) {
        self.state = state;
        self.affordance.set_active(state.is_active());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Severity;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct FakeToggle(Rc<RefCell<Vec<bool>>>);

    impl ToggleAffordance for FakeToggle {
        fn set_active(&mut self, active: bool) {
            self.0.borrow_mut().push(active);
        }
    }

    fn controller() -> (SessionController, Rc<RefCell<Vec<bool>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let c = SessionController::new(Box::new(FakeToggle(log.clone())), "started");
        (c, log)
    }

    fn failure() -> Result<ControlResponse, VoiceError> {
        Err(VoiceError::control("start-voice-recognition", "HTTP 500"))
    }

    #[test]
    fn test_toggle_does_not_change_state() {
        let (c, log) = controller();
        assert_eq!(c.toggle(), SessionRequest::Start);
        assert_eq!(c.toggle(), SessionRequest::Start);
        assert_eq!(c.state(), SessionState::Inactive);
        assert_eq!(*log.borrow(), vec![false]);
    }

    #[test]
    fn test_start_then_stop() {
        let (mut c, log) = controller();

        let notice = c.complete(SessionRequest::Start, Ok(ControlResponse::default()));
        assert_eq!(notice, Notice::success("started"));
        assert_eq!(c.state(), SessionState::Active);
        assert_eq!(c.toggle(), SessionRequest::Stop);

        let notice = c.complete(SessionRequest::Stop, Ok(ControlResponse::default()));
        assert_eq!(notice, Notice::info("Voice control stopped"));
        assert_eq!(c.state(), SessionState::Inactive);

        assert_eq!(*log.borrow(), vec![false, true, false]);
        assert_eq!(c.confirmed_transitions(), 2);
    }

    #[test]
    fn test_failure_leaves_state_and_affordance() {
        let (mut c, log) = controller();
        let notice = c.complete(SessionRequest::Start, failure());

        assert_eq!(notice.severity, Severity::Error);
        assert_eq!(notice.text, "Error starting voice control");
        assert_eq!(c.state(), SessionState::Inactive);
        assert_eq!(*log.borrow(), vec![false]);
        assert_eq!(c.confirmed_transitions(), 0);
    }

    #[test]
    fn test_duplicate_start_confirmations_are_idempotent() {
        let (mut c, _) = controller();
        let first = c.toggle();
        let second = c.toggle();
        c.complete(first, Ok(ControlResponse::default()));
        c.complete(second, Ok(ControlResponse::default()));
        assert_eq!(c.state(), SessionState::Active);
    }

    #[test]
    fn test_adopt_active_updates_affordance() {
        let (mut c, log) = controller();
        c.adopt_active();
        assert_eq!(c.state(), SessionState::Active);
        assert_eq!(*log.borrow(), vec![false, true]);
    }
}
