pub mod config;
pub mod evaluation;
pub mod feedback;
pub mod metrics;
pub mod reveal;
pub mod search;
pub mod session;
pub mod suggest;
pub mod testing;
pub mod token;

#[cfg(test)]
mod test_support;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
    SearchBackend,
};
pub use evaluation::{
    EvaluationConfig, EvaluationCoordinator, EvaluationError, EvaluationRequest,
    EvaluationResult, EvaluationService, HttpEvaluationService, SubmitError, ValidationError,
};
pub use feedback::{
    DisabledFeedback, FeedbackConfig, FeedbackDraft, FeedbackError, FeedbackService,
    HttpFeedbackClient,
};
pub use reveal::{ResultField, RevealSet};
pub use search::{create_searcher, SearchError, SeriesSearcher};
pub use session::{
    spawn_session, Effect, Notice, SessionConfig, SessionController, SessionError,
    SessionHandle, SessionServices, SessionSnapshot, Stage,
};
pub use suggest::{Candidate, CandidateList, SearchDebouncer, SuggestionResolver};
pub use token::{RequestToken, TokenSequence};
