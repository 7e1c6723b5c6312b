//! Client event queue
//!
//! Browser callbacks (fetch completions, push frames, speech events, timers)
//! can arrive while the client is still handling an earlier event. They are
//! parked here and drained in arrival order, so handling never re-enters.

use crate::client::{ClientCommand, ClientEvent, VoiceClient};
use std::collections::VecDeque;

#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<ClientEvent>,
    draining: bool,
}

impl EventQueue {
    pub fn push(&mut self, event: ClientEvent) {
        self.events.push_back(event);
    }

    pub fn pop(&mut self) -> Option<ClientEvent> {
        self.events.pop_front()
    }

    #[cfg(test)]
    fn has_pending(&self) -> bool {
        !self.events.is_empty()
    }

    /// Claim the drain. Returns false if someone up the stack is already
    /// draining; they will pick up whatever was pushed.
    pub fn begin_drain(&mut self) -> bool {
        !std::mem::replace(&mut self.draining, true)
    }

    pub fn end_drain(&mut self) {
        self.draining = false;
    }
}

/// Drain `queue` into `client` synchronously, collecting the commands it
/// produced in order. Used by native hosts and tests; the browser host drains
/// through `RefCell`s instead so callbacks can push mid-drain.
pub fn drain_into(queue: &mut EventQueue, client: &mut VoiceClient) -> Vec<ClientCommand> {
    let mut commands = Vec::new();
    if !queue.begin_drain() {
        return commands;
    }
    while let Some(event) = queue.pop() {
        client.handle(event);
        commands.extend(client.take_commands());
    }
    queue.end_drain();
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::SpeechSignal;

    #[test]
    fn test_fifo_order() {
        let mut q = EventQueue::default();
        q.push(ClientEvent::Startup);
        q.push(ClientEvent::ToggleClicked);
        q.push(ClientEvent::StatusExpired(3));

        assert_eq!(q.pop(), Some(ClientEvent::Startup));
        assert_eq!(q.pop(), Some(ClientEvent::ToggleClicked));
        assert!(q.has_pending());
        assert_eq!(q.pop(), Some(ClientEvent::StatusExpired(3)));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn test_drain_is_not_reentrant() {
        let mut q = EventQueue::default();
        assert!(q.begin_drain());
        assert!(!q.begin_drain());

        // Event arriving mid-drain is parked, not lost
        q.push(ClientEvent::Speech {
            utterance: 1,
            signal: SpeechSignal::Ended,
        });
        assert!(q.has_pending());

        q.end_drain();
        assert!(q.begin_drain());
    }
}
