use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// How events inside an open window affect its deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DebounceMode {
    /// Deadline fixed at first event + window; later events are absorbed.
    #[default]
    FromFirst,
    /// Every event pushes the deadline to event + window.
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Pending { deadline: Instant },
}

/// Single-slot debounce timer.
///
/// Pure state machine: every transition takes the current instant as an
/// argument, so the caller owns the clock.
///
/// ```text
/// Idle ──event──► Pending{deadline} ──poll(now >= deadline)──► Idle (fire)
///                   │  ▲
///                   └──┘ event: FromFirst keeps deadline, Reset moves it
/// ```
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    mode: DebounceMode,
    state: State,
}

impl Debouncer {
    pub fn new(window: Duration, mode: DebounceMode) -> Self {
        Self {
            window,
            mode,
            state: State::Idle,
        }
    }

    /// Record an event at `now`.
    pub fn on_event(&mut self, now: Instant) {
        self.state = match (self.state, self.mode) {
            (State::Idle, _) | (State::Pending { .. }, DebounceMode::Reset) => State::Pending {
                deadline: now + self.window,
            },
            (pending @ State::Pending { .. }, DebounceMode::FromFirst) => pending,
        };
    }

    /// Returns true exactly once per burst, when the deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.state {
            State::Pending { deadline } if now >= deadline => {
                self.state = State::Idle;
                true
            }
            _ => false,
        }
    }

    /// Deadline of the open window, if any.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            State::Idle => None,
            State::Pending { deadline } => Some(deadline),
        }
    }
}
