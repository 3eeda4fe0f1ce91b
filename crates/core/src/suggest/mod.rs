//! Debounced, race-safe series autocomplete.
//!
//! ```text
//! keystroke ──► SearchDebouncer ──(quiet period)──► SuggestionResolver
//!                                                        │
//!                    SuggestionBoard ◄──(latest token)───┘
//! ```
//!
//! The debouncer and the board are plain state; the session controller turns
//! their decisions into timer and lookup effects.

mod candidate;
mod debouncer;
mod resolver;

pub use candidate::{Candidate, CandidateList};
pub use debouncer::{DebounceDecision, SearchDebouncer};
pub use resolver::{SuggestionBoard, SuggestionResolver};
