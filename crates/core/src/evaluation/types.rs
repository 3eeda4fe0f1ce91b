//! Evaluation request and result types.

use serde::{Deserialize, Serialize};

use super::EvaluationError;

/// Body sent to the evaluation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub guess: String,
    pub tv_show_name: String,
}

/// The service's verdict on a plot guess.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub is_correct: bool,
    /// 0.0-1.0, optimistic for partially correct guesses.
    pub accuracy: f64,
    /// When in the show the guessed events happen. `None` when the service
    /// left it empty, which it does for incorrect guesses.
    #[serde(rename = "time")]
    pub time_period: Option<String>,
    pub explanation: String,
    /// 0.0-1.0, the service's confidence in its own verdict.
    pub confidence: f64,
}

impl EvaluationResult {
    /// Parse and validate a response body.
    ///
    /// Accepts the flat shape and the `{"response": {...}}` envelope some
    /// deployments wrap it in. Missing fields and out-of-range scores are
    /// rejected instead of rendering as blanks.
    pub fn from_json(body: &str) -> Result<Self, EvaluationError> {
        let payload: ResponsePayload = serde_json::from_str(body)
            .map_err(|e| EvaluationError::MalformedResponse(e.to_string()))?;
        let raw = match payload {
            ResponsePayload::Enveloped { response } => response,
            ResponsePayload::Flat(raw) => raw,
        };
        raw.validate()
    }

    pub fn has_time_period(&self) -> bool {
        self.time_period.is_some()
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ResponsePayload {
    Enveloped { response: RawEvaluation },
    Flat(RawEvaluation),
}

#[derive(Debug, Deserialize)]
struct RawEvaluation {
    is_correct: Option<bool>,
    accuracy: Option<f64>,
    #[serde(default)]
    time: Option<String>,
    explanation: Option<String>,
    confidence: Option<f64>,
}

impl RawEvaluation {
    fn validate(self) -> Result<EvaluationResult, EvaluationError> {
        let is_correct = self.is_correct.ok_or_else(|| missing("is_correct"))?;
        let accuracy = unit_interval("accuracy", self.accuracy)?;
        let explanation = self.explanation.ok_or_else(|| missing("explanation"))?;
        let confidence = unit_interval("confidence", self.confidence)?;
        let time_period = self
            .time
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(EvaluationResult {
            is_correct,
            accuracy,
            time_period,
            explanation,
            confidence,
        })
    }
}

fn missing(field: &str) -> EvaluationError {
    EvaluationError::MalformedResponse(format!("missing field `{}`", field))
}

fn unit_interval(field: &str, value: Option<f64>) -> Result<f64, EvaluationError> {
    let value = value.ok_or_else(|| missing(field))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(EvaluationError::MalformedResponse(format!(
            "`{}` must be within 0-1, got {}",
            field, value
        )));
    }
    Ok(value)
}
