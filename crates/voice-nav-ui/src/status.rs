//! Status Notifier
//!
//! Owns the single status slot. A new message always replaces the current one
//! in place; info/success messages hide themselves after a fixed delay, error
//! messages stay until something else is shown.

use std::time::Duration;

/// Status severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl Severity {
    pub fn auto_dismisses(self) -> bool {
        !matches!(self, Severity::Error)
    }

    /// Text colour used by the status surface
    pub fn color(self) -> &'static str {
        match self {
            Severity::Info => "#3498DB",
            Severity::Success => "#27AE60",
            Severity::Error => "#D63031",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Error => "error",
        }
    }
}

/// A message some component wants shown; applied via [`StatusNotifier::post`].
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub text: String,
    pub severity: Severity,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Info,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Success,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Error,
        }
    }
}

/// Identifies one scheduled auto-hide.
pub type TimerToken = u64;

/// The status message currently in the slot
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub severity: Severity,
    pub visible: bool,
    /// Pending auto-hide, if any
    pub expiry: Option<TimerToken>,
}

/// Where the status message is drawn.
pub trait StatusSurface {
    fn render(&mut self, text: &str, severity: Severity);
    fn set_visible(&mut self, visible: bool);
}

/// One-shot timers. When a scheduled timer fires, the host must deliver its
/// token back through [`StatusNotifier::expire`].
pub trait Scheduler {
    fn schedule(&mut self, token: TimerToken, delay: Duration);
    fn cancel(&mut self, token: TimerToken);
}

pub struct StatusNotifier {
    surface: Box<dyn StatusSurface>,
    scheduler: Box<dyn Scheduler>,
    dismiss_delay: Duration,
    current: Option<StatusMessage>,
    next_token: TimerToken,
}

impl StatusNotifier {
    pub fn new(
        surface: Box<dyn StatusSurface>,
        scheduler: Box<dyn Scheduler>,
        dismiss_delay: Duration,
    ) -> Self {
        Self {
            surface,
            scheduler,
            dismiss_delay,
            current: None,
            next_token: 1,
        }
    }

    pub fn show(&mut self, text: impl Into<String>, severity: Severity) {
        let text = text.into();

        if let Some(token) = self.current.as_ref().and_then(|m| m.expiry) {
            self.scheduler.cancel(token);
        }

        let expiry = if severity.auto_dismisses() {
            let token = self.next_token;
            self.next_token += 1;
            self.scheduler.schedule(token, self.dismiss_delay);
            Some(token)
        } else {
            None
        };

        tracing::debug!(severity = severity.as_str(), %text, "status");

        self.surface.render(&text, severity);
        self.surface.set_visible(true);
        self.current = Some(StatusMessage {
            text,
            severity,
            visible: true,
            expiry,
        });
    }

    pub fn post(&mut self, notice: Notice) {
        self.show(notice.text, notice.severity);
    }

    /// A scheduled timer fired. Hides the message only if `token` is still the
    /// current message's expiry; tokens of superseded messages are ignored.
    pub fn expire(&mut self, token: TimerToken) -> bool {
        match self.current.as_mut() {
            Some(message) if message.expiry == Some(token) => {
                message.visible = false;
                message.expiry = None;
                self.surface.set_visible(false);
                true
            }
            _ => false,
        }
    }

    pub fn message(&self) -> Option<&StatusMessage> {
        self.current.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.current.as_ref().is_some_and(|m| m.visible)
    }
}
