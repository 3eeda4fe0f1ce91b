//! Autocomplete candidates offered for the series picker.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// One entry in the suggestion dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Candidate {
    /// A title returned by the search provider.
    Title { title: String },
    /// Synthetic entry that commits the user's own text as the series.
    UseLiteral { query: String },
}

impl Candidate {
    pub fn title(title: impl Into<String>) -> Self {
        Candidate::Title {
            title: title.into(),
        }
    }

    pub fn literal(query: impl Into<String>) -> Self {
        Candidate::UseLiteral {
            query: query.into(),
        }
    }

    /// Text shown in the dropdown.
    pub fn label(&self) -> String {
        match self {
            Candidate::Title { title } => title.clone(),
            Candidate::UseLiteral { query } => format!("Use \"{}\"", query),
        }
    }

    /// Series name committed when this entry is selected.
    pub fn series(&self) -> &str {
        match self {
            Candidate::Title { title } => title,
            Candidate::UseLiteral { query } => query,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Candidate::UseLiteral { .. })
    }
}

/// Ordered, duplicate-free suggestions for one completed query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateList(Vec<Candidate>);

impl CandidateList {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The list offered when the provider fails or finds nothing.
    pub fn literal_only(query: &str) -> Self {
        Self(vec![Candidate::literal(query.trim())])
    }

    /// Normalize provider titles for `query`.
    ///
    /// Titles are deduplicated keeping first-seen order. Fewer than two
    /// distinct titles, none of which is the query itself, get a literal-use
    /// entry appended; otherwise the list is capped at `max`.
    pub fn from_titles<I>(query: &str, titles: I, max: usize) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let query = query.trim();
        let mut seen = HashSet::new();
        let unique: Vec<String> = titles
            .into_iter()
            .filter(|t| !t.trim().is_empty())
            .filter(|t| seen.insert(t.clone()))
            .collect();

        if unique.len() < 2 && !unique.iter().any(|t| t == query) {
            let mut entries: Vec<Candidate> = unique.into_iter().map(Candidate::title).collect();
            entries.push(Candidate::literal(query));
            return Self(entries);
        }

        Self(unique.into_iter().take(max).map(Candidate::title).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Candidate> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.0.iter()
    }

    /// Find an entry by its dropdown label.
    pub fn find_by_label(&self, label: &str) -> Option<&Candidate> {
        self.0.iter().find(|c| c.label() == label)
    }

    pub fn labels(&self) -> Vec<String> {
        self.0.iter().map(Candidate::label).collect()
    }
}
