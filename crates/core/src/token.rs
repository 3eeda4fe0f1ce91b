//! Monotonic request tokens for discarding stale async completions.

use serde::{Deserialize, Serialize};

/// Identifier attached to every asynchronous operation a session starts.
///
/// Tokens from one [`TokenSequence`] strictly increase, so a completion can be
/// checked against the most recently issued token before it writes state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues tokens and remembers which one is live.
///
/// Only the latest issued token is accepted. `invalidate` bumps the
/// sequence without handing out a token, which turns every outstanding
/// completion into a no-op.
#[derive(Debug, Default, Clone)]
pub struct TokenSequence {
    counter: u64,
    live: Option<RequestToken>,
}

impl TokenSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new token; all previously issued tokens become stale.
    pub fn issue(&mut self) -> RequestToken {
        self.counter += 1;
        let token = RequestToken(self.counter);
        self.live = Some(token);
        token
    }

    /// Whether `token` is the one most recently issued and still live.
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.live == Some(token)
    }

    /// Accept a completion for `token`, retiring it if it was current.
    ///
    /// Returns false for stale tokens; callers must drop the completion.
    pub fn settle(&mut self, token: RequestToken) -> bool {
        if self.is_current(token) {
            self.live = None;
            true
        } else {
            false
        }
    }

    /// Make every outstanding token stale.
    pub fn invalidate(&mut self) {
        self.live = None;
    }

    /// The live token, if an operation is outstanding.
    pub fn live(&self) -> Option<RequestToken> {
        self.live
    }
}
