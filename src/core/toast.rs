//! Transient notifications.
//!
//! A toast starts its clock on the first `Tick` after it was raised, so the
//! reducer never has to read the wall clock itself.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub level: ToastLevel,
    pub text: String,
    pub ttl: Duration,
    shown_at: Option<Instant>,
}

impl Toast {
    pub fn new(level: ToastLevel, text: impl Into<String>, ttl: Duration) -> Self {
        Self {
            level,
            text: text.into(),
            ttl,
            shown_at: None,
        }
    }

    /// Start the clock (first tick) and report whether the toast has expired.
    pub fn expired(&mut self, now: Instant) -> bool {
        let shown_at = *self.shown_at.get_or_insert(now);
        now.saturating_duration_since(shown_at) >= self.ttl
    }
}
