//! Display model for the result grid.

use serde::Serialize;

use super::{ResultField, RevealSet};
use crate::evaluation::EvaluationResult;

/// Render a unit-interval score as a rounded percentage, e.g. `"80%"`.
pub fn format_percent(score: f64) -> String {
    format!("{}%", (score * 100.0).round() as i64)
}

/// One card in the result grid. `value` is only filled in once revealed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultCard {
    pub field: ResultField,
    pub title: &'static str,
    pub icon: &'static str,
    pub revealed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ResultCard {
    fn build(field: ResultField, result: &EvaluationResult, revealed: bool) -> Self {
        let (title, icon) = match field {
            ResultField::IsCorrect => ("Correctness", "✓"),
            ResultField::Accuracy => ("Accuracy Score", "🎯"),
            ResultField::TimePeriod => ("Time Period", "📅"),
            ResultField::Explanation => ("Explanation", "💡"),
        };
        let value = revealed.then(|| match field {
            ResultField::IsCorrect if result.is_correct => "Correct! 🎉".to_string(),
            ResultField::IsCorrect => "Incorrect ❌".to_string(),
            ResultField::Accuracy => format_percent(result.accuracy),
            ResultField::TimePeriod => result.time_period.clone().unwrap_or_default(),
            ResultField::Explanation => result.explanation.clone(),
        });

        Self {
            field,
            title,
            icon,
            revealed,
            value,
        }
    }
}

/// The evaluation header plus its cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    /// "AI Confidence", always visible.
    pub confidence: String,
    pub cards: Vec<ResultCard>,
    pub all_revealed: bool,
}

impl ResultView {
    pub fn new(result: &EvaluationResult, reveal: &RevealSet) -> Self {
        let cards = ResultField::displayable_for(result)
            .into_iter()
            .map(|field| ResultCard::build(field, result, reveal.is_revealed(field)))
            .collect();

        Self {
            confidence: format_percent(result.confidence),
            cards,
            all_revealed: reveal.all_revealed(),
        }
    }
}
