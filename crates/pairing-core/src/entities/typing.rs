//! Remote typing indicator for one pairing chat

use std::time::{Duration, Instant};

/// Idle window after which a typing partner is considered stopped
pub const DEFAULT_TYPING_IDLE: Duration = Duration::from_secs(2);

/// Tracks whether the partner is typing.
///
/// A typing event keeps the flag up until `idle` passes without another one,
/// or until an explicit stop event arrives.
#[derive(Debug, Clone)]
pub struct TypingIndicator {
    idle: Duration,
    active_until: Option<Instant>,
}

impl Default for TypingIndicator {
    fn default() -> Self {
        Self::new(DEFAULT_TYPING_IDLE)
    }
}

impl TypingIndicator {
    pub fn new(idle: Duration) -> Self {
        Self {
            idle,
            active_until: None,
        }
    }

    /// Record a typing event; returns true when the visible state changed
    pub fn observe(&mut self, is_typing: bool, now: Instant) -> bool {
        let was_active = self.is_active(now);
        self.active_until = is_typing.then(|| now + self.idle);
        was_active != is_typing
    }

    /// Whether the partner should be shown as typing at `now`
    pub fn is_active(&self, now: Instant) -> bool {
        self.active_until.is_some_and(|until| now < until)
    }

    /// Instant at which the indicator expires if nothing else arrives
    pub fn expires_at(&self) -> Option<Instant> {
        self.active_until
    }

    /// Drop an expired deadline; returns true when the indicator just turned off
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.active_until {
            Some(until) if now >= until => {
                self.active_until = None;
                true
            }
            _ => false,
        }
    }

    pub fn idle(&self) -> Duration {
        self.idle
    }
}
