//! Queue of symbolic session requests between frames.
//!
//! Menus and key bindings push [`SessionEvent`]s at any time. The driver
//! drains the whole queue at the start of its next step, so a request pushed
//! while the host is waiting on the frame clock is held, not dropped. A held
//! pause key yields at most one `RequestPause` per step.

use std::collections::VecDeque;

use crate::session::SessionEvent;

pub struct InputQueue {
    pending: VecDeque<SessionEvent>,
    /// Held pause requests collapse to one per step.
    pause_requested: bool,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            pause_requested: false,
        }
    }

    pub fn push(&mut self, event: SessionEvent) {
        if event == SessionEvent::RequestPause {
            if self.pause_requested {
                return;
            }
            self.pause_requested = true;
        }
        self.pending.push_back(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = SessionEvent>) {
        for event in events {
            self.push(event);
        }
    }

    /// Hand every pending event to the current step, oldest first.
    pub fn take_for_step(&mut self) -> Vec<SessionEvent> {
        self.pause_requested = false;
        self.pending.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionState;

    #[test]
    fn events_delivered_in_order() {
        let mut input = InputQueue::new();
        input.push(SessionEvent::RequestState(SessionState::Help));
        input.push(SessionEvent::RequestRunStart(2));
        assert_eq!(
            input.take_for_step(),
            vec![
                SessionEvent::RequestState(SessionState::Help),
                SessionEvent::RequestRunStart(2),
            ]
        );
    }

    #[test]
    fn take_clears_transient_events() {
        let mut input = InputQueue::new();
        input.push(SessionEvent::RequestResume);
        assert_eq!(input.len(), 1);
        input.take_for_step();
        assert!(input.is_empty());
        assert!(input.take_for_step().is_empty());
    }

    #[test]
    fn events_survive_frames_without_steps() {
        let mut input = InputQueue::new();
        input.push(SessionEvent::RequestPause);
        // Frame with zero steps: nobody takes the events.
        assert!(!input.is_empty());
        assert_eq!(input.take_for_step(), vec![SessionEvent::RequestPause]);
    }

    #[test]
    fn repeated_pause_collapses_within_a_step() {
        let mut input = InputQueue::new();
        input.push(SessionEvent::RequestPause);
        input.push(SessionEvent::RequestPause);
        assert_eq!(input.take_for_step(), vec![SessionEvent::RequestPause]);

        // A new step accepts a new pause edge.
        input.push(SessionEvent::RequestPause);
        assert_eq!(input.take_for_step(), vec![SessionEvent::RequestPause]);
    }

    #[test]
    fn extend_applies_collapse_rules() {
        let mut input = InputQueue::new();
        input.extend([
            SessionEvent::RequestPause,
            SessionEvent::RequestResume,
            SessionEvent::RequestPause,
        ]);
        assert_eq!(input.len(), 2);
    }
}
