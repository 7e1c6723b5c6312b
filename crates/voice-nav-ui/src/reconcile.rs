//! Startup Reconciler
//!
//! After a page (re)load the client assumes no session. The backend may
//! still be listening from before the navigation, so the reconciler asks once
//! and adopts the answer.

use crate::error::VoiceError;
use crate::session::SessionController;
use voice_nav_types::VoiceStatusResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    NotStarted,
    /// Query in flight; `baseline` is the controller's confirmed transition
    /// count when it was issued
    Querying { baseline: u64 },
    Done,
}

/// What a status reply did to local state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Backend is listening; local state set to Active
    Adopted,
    /// Backend agrees with local state
    Consistent,
    /// A toggle completed while the query was in flight; reply discarded
    Superseded,
    /// Query failed; local state left at its default
    Failed,
    /// No query was outstanding
    Ignored,
}

#[derive(Debug, Default)]
pub struct StartupReconciler {
    phase: Phase,
}

impl StartupReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true exactly once: the caller should issue the status query.
    pub fn begin(&mut self, session: &SessionController) -> bool {
        if self.phase != Phase::NotStarted {
            return false;
        }
        self.phase = Phase::Querying {
            baseline: session.confirmed_transitions(),
        };
        true
    }

    pub fn apply(
        &mut self,
        result: Result<VoiceStatusResponse, VoiceError>,
        session: &mut SessionController,
    ) -> ReconcileOutcome {
        let baseline = match self.phase {
            Phase::Querying { baseline } => baseline,
            _ => return ReconcileOutcome::Ignored,
        };
        self.phase = Phase::Done;

        let status = match result {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(error = %e, "voice status query failed");
                return ReconcileOutcome::Failed;
            }
        };

        if session.confirmed_transitions() != baseline {
            tracing::debug!("voice status reply superseded by toggle");
            return ReconcileOutcome::Superseded;
        }

        if status.is_listening && !session.state().is_active() {
            tracing::info!("backend session already listening; adopting");
            session.adopt_active();
            ReconcileOutcome::Adopted
        } else {
            ReconcileOutcome::Consistent
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionRequest, SessionState, ToggleAffordance};
    use voice_nav_types::ControlResponse;

    struct NullToggle;

    impl ToggleAffordance for NullToggle {
        fn set_active(&mut self, _active: bool) {}
    }

    fn session() -> SessionController {
        SessionController::new(Box::new(NullToggle), "started")
    }

    fn listening(is_listening: bool) -> Result<VoiceStatusResponse, VoiceError> {
        Ok(VoiceStatusResponse { is_listening })
    }

    #[test]
    fn test_begin_only_once() {
        let s = session();
        let mut r = StartupReconciler::new();
        assert!(r.begin(&s));
        assert!(!r.begin(&s));
    }

    #[test]
    fn test_adopts_listening_backend() {
        let mut s = session();
        let mut r = StartupReconciler::new();
        r.begin(&s);
        assert_eq!(r.apply(listening(true), &mut s), ReconcileOutcome::Adopted);
        assert_eq!(s.state(), SessionState::Active);
    }

    #[test]
    fn test_failure_degrades_silently() {
        let mut s = session();
        let mut r = StartupReconciler::new();
        r.begin(&s);
        let outcome = r.apply(Err(VoiceError::control("voice-status", "HTTP 502")), &mut s);
        assert_eq!(outcome, ReconcileOutcome::Failed);
        assert_eq!(s.state(), SessionState::Inactive);
    }

    #[test]
    fn test_reply_after_toggle_is_discarded() {
        let mut s = session();
        let mut r = StartupReconciler::new();
        r.begin(&s);

        s.complete(SessionRequest::Start, Ok(ControlResponse::default()));
        s.complete(SessionRequest::Stop, Ok(ControlResponse::default()));

        assert_eq!(r.apply(listening(true), &mut s), ReconcileOutcome::Superseded);
        assert_eq!(s.state(), SessionState::Inactive);
    }

    #[test]
    fn test_reply_without_query_is_ignored() {
        let mut s = session();
        let mut r = StartupReconciler::new();
        assert_eq!(r.apply(listening(true), &mut s), ReconcileOutcome::Ignored);
        assert_eq!(s.state(), SessionState::Inactive);
    }

    #[test]
    fn test_not_listening_is_consistent() {
        let mut s = session();
        let mut r = StartupReconciler::new();
        r.begin(&s);
        assert_eq!(r.apply(listening(false), &mut s), ReconcileOutcome::Consistent);
        assert_eq!(r.apply(listening(true), &mut s), ReconcileOutcome::Ignored);
    }
}
