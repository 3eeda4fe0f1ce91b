//! Quiet-period debouncing of series search input.

use std::time::Duration;

use crate::token::{RequestToken, TokenSequence};

/// What the caller must do after a keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebounceDecision {
    /// Cancel any running timer and start a new one for `token`.
    Schedule { token: RequestToken, delay: Duration },
    /// Input is blank: cancel any running timer and clear the suggestions.
    Clear,
}

/// Tracks the raw series input and the one timer allowed to be pending.
///
/// The debouncer never sleeps itself. It hands out a token per scheduled
/// timer and only honours the expiry of the most recent one.
#[derive(Debug)]
pub struct SearchDebouncer {
    quiet_period: Duration,
    raw_text: String,
    timers: TokenSequence,
}

impl SearchDebouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            raw_text: String::new(),
            timers: TokenSequence::new(),
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// The timer currently allowed to fire, if any.
    pub fn pending(&self) -> Option<RequestToken> {
        self.timers.live()
    }

    /// Record a keystroke and decide whether to (re)schedule a lookup.
    pub fn on_input(&mut self, text: &str) -> DebounceDecision {
        self.raw_text = text.to_string();

        if text.trim().is_empty() {
            self.timers.invalidate();
            return DebounceDecision::Clear;
        }

        DebounceDecision::Schedule {
            token: self.timers.issue(),
            delay: self.quiet_period,
        }
    }

    /// A timer expired. Returns the trimmed query if `token` is the latest
    /// timer, and `None` only when it was superseded or cancelled.
    ///
    /// A live timer always has non-blank text: blank input cancels it.
    pub fn fire(&mut self, token: RequestToken) -> Option<String> {
        if !self.timers.settle(token) {
            return None;
        }
        let query = self.raw_text.trim();
        debug_assert!(!query.is_empty(), "live timer with blank input");
        Some(query.to_string())
    }

    /// Overwrite the raw text without scheduling, cancelling any pending timer.
    pub fn replace_text(&mut self, text: &str) {
        self.raw_text = text.to_string();
        self.timers.invalidate();
    }

    /// Cancel the pending timer, keeping the text.
    pub fn cancel(&mut self) {
        self.timers.invalidate();
    }
}
