//! Progressive disclosure of evaluation results.
//!
//! Each result field starts hidden and is revealed card by card, so a
//! player can stop before reading spoilers. Confidence is not a card; it is
//! always shown with the result.

mod cards;

pub use cards::{format_percent, ResultCard, ResultView};

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::evaluation::EvaluationResult;

/// Result fields that can be revealed individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultField {
    IsCorrect,
    Accuracy,
    TimePeriod,
    Explanation,
}

impl ResultField {
    pub const ALL: [ResultField; 4] = [
        ResultField::IsCorrect,
        ResultField::Accuracy,
        ResultField::TimePeriod,
        ResultField::Explanation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResultField::IsCorrect => "is_correct",
            ResultField::Accuracy => "accuracy",
            ResultField::TimePeriod => "time_period",
            ResultField::Explanation => "explanation",
        }
    }

    /// Fields of `result` that get a card. The time period is skipped when
    /// the service left it empty.
    pub fn displayable_for(result: &EvaluationResult) -> BTreeSet<ResultField> {
        Self::ALL
            .into_iter()
            .filter(|f| *f != ResultField::TimePeriod || result.has_time_period())
            .collect()
    }
}

impl fmt::Display for ResultField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown result field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for ResultField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "is_correct" | "correctness" => Ok(ResultField::IsCorrect),
            "accuracy" => Ok(ResultField::Accuracy),
            "time_period" | "time" => Ok(ResultField::TimePeriod),
            "explanation" => Ok(ResultField::Explanation),
            other => Err(UnknownField(other.to_string())),
        }
    }
}

/// Which fields of the current result are revealed.
///
/// The revealed set is always a subset of the displayable fields of the
/// bound result. With no result bound nothing is displayable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevealSet {
    displayable: BTreeSet<ResultField>,
    revealed: BTreeSet<ResultField>,
}

impl RevealSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh reveal cycle for `result`, with everything hidden.
    pub fn bind(&mut self, result: &EvaluationResult) {
        self.displayable = ResultField::displayable_for(result);
        self.revealed.clear();
    }

    /// Drop the bound result.
    pub fn unbind(&mut self) {
        self.displayable.clear();
        self.revealed.clear();
    }

    /// Hide every field, keeping the bound result.
    pub fn reset(&mut self) {
        self.revealed.clear();
    }

    /// Flip `field`. Returns whether it is revealed afterwards.
    ///
    /// Fields the current result does not display are left alone.
    pub fn toggle(&mut self, field: ResultField) -> bool {
        if !self.displayable.contains(&field) {
            return false;
        }
        if !self.revealed.remove(&field) {
            self.revealed.insert(field);
        }
        self.revealed.contains(&field)
    }

    pub fn reveal_all(&mut self) {
        self.revealed = self.displayable.clone();
    }

    pub fn is_revealed(&self, field: ResultField) -> bool {
        self.revealed.contains(&field)
    }

    pub fn is_displayable(&self, field: ResultField) -> bool {
        self.displayable.contains(&field)
    }

    pub fn all_revealed(&self) -> bool {
        !self.displayable.is_empty() && self.revealed == self.displayable
    }

    pub fn is_empty(&self) -> bool {
        self.revealed.is_empty()
    }

    /// Revealed fields in card order.
    pub fn revealed(&self) -> Vec<ResultField> {
        self.revealed.iter().copied().collect()
    }
}
