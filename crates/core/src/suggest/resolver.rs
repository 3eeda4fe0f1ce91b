//! Turning a settled query into visible suggestions.

use std::sync::Arc;

use tracing::{debug, warn};

use super::candidate::CandidateList;
use crate::metrics::{STALE_COMPLETIONS, SUGGESTION_LOOKUPS};
use crate::search::SeriesSearcher;
use crate::token::{RequestToken, TokenSequence};

/// Queries the search provider and normalizes titles into candidates.
///
/// Resolution never fails: provider errors and empty results fall back to
/// the literal-use entry so the user can always proceed with their own text.
#[derive(Clone)]
pub struct SuggestionResolver {
    searcher: Arc<dyn SeriesSearcher>,
    max_suggestions: usize,
}

impl SuggestionResolver {
    pub fn new(searcher: Arc<dyn SeriesSearcher>, max_suggestions: usize) -> Self {
        Self {
            searcher,
            max_suggestions,
        }
    }

    pub async fn resolve(&self, query: &str) -> CandidateList {
        let query = query.trim();
        match self.searcher.search_series(query).await {
            Ok(titles) if titles.is_empty() => {
                debug!("{}: no series match '{}'", self.searcher.name(), query);
                SUGGESTION_LOOKUPS
                    .with_label_values(&["literal_fallback"])
                    .inc();
                CandidateList::literal_only(query)
            }
            Ok(titles) => {
                let list = CandidateList::from_titles(query, titles, self.max_suggestions);
                let outcome = if list.iter().any(|c| c.is_literal()) {
                    "literal_fallback"
                } else {
                    "matched"
                };
                SUGGESTION_LOOKUPS.with_label_values(&[outcome]).inc();
                list
            }
            Err(e) => {
                warn!(
                    "{} search failed for '{}', offering literal entry: {}",
                    self.searcher.name(),
                    query,
                    e
                );
                SUGGESTION_LOOKUPS
                    .with_label_values(&["provider_error"])
                    .inc();
                CandidateList::literal_only(query)
            }
        }
    }
}

/// The visible suggestion list plus the token of the lookup allowed to
/// replace it.
#[derive(Debug, Default)]
pub struct SuggestionBoard {
    lookups: TokenSequence,
    candidates: CandidateList,
}

impl SuggestionBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn candidates(&self) -> &CandidateList {
        &self.candidates
    }

    /// Start a lookup; any lookup still in flight becomes stale.
    pub fn issue(&mut self) -> RequestToken {
        self.lookups.issue()
    }

    /// Apply a resolved list if `token` belongs to the latest lookup.
    ///
    /// Returns false when the result was discarded as stale.
    pub fn apply(&mut self, token: RequestToken, candidates: CandidateList) -> bool {
        if !self.lookups.settle(token) {
            debug!("Discarding stale suggestions for lookup {}", token);
            STALE_COMPLETIONS.with_label_values(&["suggestions"]).inc();
            return false;
        }
        self.candidates = candidates;
        true
    }

    /// Clear the list and invalidate any lookup in flight.
    pub fn clear(&mut self) {
        self.lookups.invalidate();
        self.candidates = CandidateList::empty();
    }

    pub fn is_loading(&self) -> bool {
        self.lookups.live().is_some()
    }
}
