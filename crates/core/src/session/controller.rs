//! Session state machine.

use tracing::{debug, info};

use super::snapshot::{FeedbackView, NoticeView, SessionSnapshot};
use super::{Effect, Notice, SessionConfig, SessionError, Stage};
use crate::evaluation::{
    EvaluationCoordinator, EvaluationError, EvaluationResult, EvaluationState,
};
use crate::feedback::{FeedbackDraft, FeedbackError, FeedbackPanel};
use crate::metrics::STALE_COMPLETIONS;
use crate::reveal::{ResultField, ResultView, RevealSet};
use crate::suggest::{CandidateList, DebounceDecision, SearchDebouncer, SuggestionBoard};
use crate::token::RequestToken;

/// One player's game: series picking, guess submission, result reveal and
/// the feedback side channel.
///
/// The controller is the only writer of session state. It never awaits;
/// async work is requested through the returned [`Effect`]s and reported
/// back through the `*_completed` / `*_resolved` / `lookup_fired` methods.
#[derive(Debug)]
pub struct SessionController {
    config: SessionConfig,
    stage: Stage,
    debouncer: SearchDebouncer,
    board: SuggestionBoard,
    selected_series: Option<String>,
    guess_input: String,
    current_guess: Option<String>,
    evaluation: EvaluationCoordinator,
    reveal: RevealSet,
    feedback: FeedbackPanel,
    notice: Option<Notice>,
}

impl SessionController {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            stage: Stage::PickingSeries,
            debouncer: SearchDebouncer::new(config.debounce()),
            board: SuggestionBoard::new(),
            selected_series: None,
            guess_input: String::new(),
            current_guess: None,
            evaluation: EvaluationCoordinator::new(config.max_guess_chars),
            reveal: RevealSet::new(),
            feedback: FeedbackPanel::new(),
            notice: None,
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn series_input(&self) -> &str {
        self.debouncer.raw_text()
    }

    pub fn candidates(&self) -> &CandidateList {
        self.board.candidates()
    }

    pub fn selected_series(&self) -> Option<&str> {
        self.selected_series.as_deref()
    }

    pub fn guess_input(&self) -> &str {
        &self.guess_input
    }

    /// The last guess sent for evaluation.
    pub fn current_guess(&self) -> Option<&str> {
        self.current_guess.as_deref()
    }

    pub fn evaluation(&self) -> &EvaluationState {
        self.evaluation.state()
    }

    pub fn result(&self) -> Option<&EvaluationResult> {
        self.evaluation.result()
    }

    pub fn reveal(&self) -> &RevealSet {
        &self.reveal
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notice
    }

    pub fn feedback(&self) -> &FeedbackPanel {
        &self.feedback
    }

    // =========================================================================
    // Series picking
    // =========================================================================

    /// A keystroke in the series input.
    ///
    /// Editing the series after one was committed drops the selection and
    /// everything derived from it, including an evaluation still in flight.
    pub fn set_series_input(&mut self, text: &str) -> Vec<Effect> {
        if self.selected_series.is_some() || self.stage != Stage::PickingSeries {
            info!("Series input edited in stage {}, returning to series picking", self.stage);
            self.selected_series = None;
            self.current_guess = None;
            self.evaluation.invalidate();
            self.reveal.unbind();
            self.stage = Stage::PickingSeries;
        }

        match self.debouncer.on_input(text) {
            DebounceDecision::Schedule { token, delay } => {
                vec![Effect::ScheduleLookup { token, delay }]
            }
            DebounceDecision::Clear => {
                self.board.clear();
                vec![Effect::CancelLookup]
            }
        }
    }

    /// The debounce timer tagged `token` expired.
    pub fn lookup_fired(&mut self, token: RequestToken) -> Vec<Effect> {
        match self.debouncer.fire(token) {
            Some(query) => {
                let lookup = self.board.issue();
                debug!("Lookup {} for '{}'", lookup, query);
                vec![Effect::ResolveSuggestions {
                    token: lookup,
                    query,
                }]
            }
            None => {
                STALE_COMPLETIONS.with_label_values(&["lookup_timer"]).inc();
                Vec::new()
            }
        }
    }

    /// Suggestions for lookup `token` arrived. Returns false if discarded.
    pub fn suggestions_resolved(&mut self, token: RequestToken, candidates: CandidateList) -> bool {
        self.board.apply(token, candidates)
    }

    /// Commit the suggestion with the given dropdown label.
    pub fn select_candidate(&mut self, label: &str) -> Result<Vec<Effect>, SessionError> {
        if self.stage != Stage::PickingSeries {
            return Err(SessionError::InvalidStage {
                action: "select a series",
                stage: self.stage,
            });
        }
        let series = self
            .board
            .candidates()
            .find_by_label(label)
            .map(|c| c.series().to_string())
            .ok_or_else(|| SessionError::UnknownCandidate(label.to_string()))?;

        info!("Series selected: '{}'", series);
        self.debouncer.replace_text(&series);
        self.board.clear();
        self.selected_series = Some(series);
        self.stage = Stage::Guessing;
        Ok(vec![Effect::CancelLookup])
    }

    // =========================================================================
    // Guessing
    // =========================================================================

    /// Update the guess text, truncating at the configured length.
    pub fn set_guess_input(&mut self, text: &str) {
        let max = self.config.max_guess_chars;
        if text.chars().count() > max {
            debug!("Guess input truncated to {} characters", max);
            self.guess_input = text.chars().take(max).collect();
        } else {
            self.guess_input = text.to_string();
        }
    }

    /// Submit the current guess for the selected series.
    ///
    /// Precondition failures set a notice and produce no effects.
    pub fn submit_guess(&mut self) -> Result<Vec<Effect>, SessionError> {
        if self.stage == Stage::Evaluating {
            return Err(SessionError::EvaluationInFlight);
        }

        let Some(series) = self.selected_series.clone() else {
            debug!("Submit rejected: no series selected");
            self.notice = Some(Notice::SelectSeriesFirst);
            return Ok(Vec::new());
        };

        match self.evaluation.begin(&self.guess_input, &series) {
            Ok(ticket) => {
                self.reveal.unbind();
                self.current_guess = Some(ticket.request.guess.clone());
                self.guess_input.clear();
                self.notice = None;
                self.stage = Stage::Evaluating;
                Ok(vec![Effect::Evaluate {
                    token: ticket.token,
                    request: ticket.request,
                }])
            }
            Err(e) => {
                debug!("Submit rejected: {}", e);
                self.notice = Some(Notice::from(&e));
                Ok(Vec::new())
            }
        }
    }

    /// The evaluation tagged `token` finished. Returns false if discarded.
    pub fn evaluation_completed(
        &mut self,
        token: RequestToken,
        outcome: Result<EvaluationResult, EvaluationError>,
    ) -> bool {
        if !self.evaluation.complete(token, outcome) {
            return false;
        }

        self.stage = Stage::ShowingResult;
        match self.evaluation.result() {
            Some(result) => self.reveal.bind(result),
            None => {
                self.reveal.unbind();
                self.notice = Some(Notice::EvaluationFailed);
                // Put the failed guess back so it can be resubmitted as is.
                if self.guess_input.is_empty() {
                    if let Some(guess) = &self.current_guess {
                        self.guess_input = guess.clone();
                    }
                }
            }
        }
        true
    }

    // =========================================================================
    // Reveal
    // =========================================================================

    fn require_result(&self) -> Result<(), SessionError> {
        if self.evaluation.result().is_some() {
            Ok(())
        } else {
            Err(SessionError::NoResult)
        }
    }

    /// Flip one result card. Returns whether it is revealed afterwards.
    pub fn toggle_reveal(&mut self, field: ResultField) -> Result<bool, SessionError> {
        self.require_result()?;
        Ok(self.reveal.toggle(field))
    }

    pub fn reveal_all(&mut self) -> Result<(), SessionError> {
        self.require_result()?;
        self.reveal.reveal_all();
        Ok(())
    }

    pub fn hide_all(&mut self) -> Result<(), SessionError> {
        self.require_result()?;
        self.reveal.reset();
        Ok(())
    }

    // =========================================================================
    // Cycle control
    // =========================================================================

    /// Start over: back to series picking with nothing selected.
    pub fn new_guess(&mut self) -> Vec<Effect> {
        info!("New guess requested from stage {}", self.stage);
        self.debouncer.replace_text("");
        self.board.clear();
        self.selected_series = None;
        self.guess_input.clear();
        self.current_guess = None;
        self.evaluation.invalidate();
        self.reveal.unbind();
        self.notice = None;
        self.stage = Stage::PickingSeries;
        vec![Effect::CancelLookup]
    }

    pub fn dismiss_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    // =========================================================================
    // Feedback
    // =========================================================================

    pub fn open_feedback(&mut self) {
        self.feedback.open();
    }

    pub fn close_feedback(&mut self) {
        self.feedback.close();
    }

    pub fn set_feedback_draft(&mut self, draft: FeedbackDraft) {
        self.feedback.set_draft(draft);
    }

    pub fn submit_feedback(&mut self) -> Result<Vec<Effect>, SessionError> {
        let (token, submission) = self.feedback.begin_submit()?;
        Ok(vec![Effect::SubmitFeedback { token, submission }])
    }

    /// The feedback post tagged `token` finished. Returns false if discarded.
    pub fn feedback_completed(
        &mut self,
        token: RequestToken,
        outcome: Result<(), FeedbackError>,
    ) -> bool {
        match self.feedback.complete(token, outcome) {
            Some(Ok(())) => {
                self.notice = Some(Notice::FeedbackSent);
                true
            }
            Some(Err(_)) => {
                self.notice = Some(Notice::FeedbackFailed);
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            stage: self.stage,
            series_input: self.series_input().to_string(),
            suggestions: self.board.candidates().labels(),
            suggestions_loading: self.board.is_loading(),
            selected_series: self.selected_series.clone(),
            guess_input: self.guess_input.clone(),
            current_guess: self.current_guess.clone(),
            evaluation: self.evaluation.state().status(),
            result: self
                .evaluation
                .result()
                .map(|r| ResultView::new(r, &self.reveal)),
            revealed: self.reveal.revealed(),
            notice: self.notice.map(NoticeView::from),
            feedback: FeedbackView {
                open: self.feedback.is_open(),
                submitting: self.feedback.is_submitting(),
                draft: self.feedback.draft().clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::EvaluationRequest;
    use crate::testing::fixtures;

    fn controller() -> SessionController {
        SessionController::new(SessionConfig::default())
    }

    fn scheduled(effects: &[Effect]) -> RequestToken {
        match effects {
            [Effect::ScheduleLookup { token, .. }] => *token,
            other => panic!("expected a scheduled lookup, got {other:?}"),
        }
    }

    fn resolving(effects: &[Effect]) -> (RequestToken, String) {
        match effects {
            [Effect::ResolveSuggestions { token, query }] => (*token, query.clone()),
            other => panic!("expected a lookup, got {other:?}"),
        }
    }

    fn evaluating(effects: &[Effect]) -> (RequestToken, EvaluationRequest) {
        match effects {
            [Effect::Evaluate { token, request }] => (*token, request.clone()),
            other => panic!("expected an evaluation, got {other:?}"),
        }
    }

    /// Type `query`, let the timer fire and resolve with `titles`.
    fn search(c: &mut SessionController, query: &str, titles: &[&str]) {
        let timer = scheduled(&c.set_series_input(query));
        let (lookup, q) = resolving(&c.lookup_fired(timer));
        let list = CandidateList::from_titles(
            &q,
            titles.iter().map(|t| t.to_string()),
            c.config().max_suggestions,
        );
        assert!(c.suggestions_resolved(lookup, list));
    }

    fn pick(c: &mut SessionController, query: &str, titles: &[&str], label: &str) {
        search(c, query, titles);
        c.select_candidate(label).unwrap();
    }

    #[test]
    fn test_scenario_a_breaking_bad() {
        let mut c = controller();
        search(&mut c, "Breaking", &["Breaking Bad", "Breaking News"]);
        assert_eq!(c.candidates().labels(), vec!["Breaking Bad", "Breaking News"]);

        let effects = c.select_candidate("Breaking Bad").unwrap();
        assert_eq!(effects, vec![Effect::CancelLookup]);
        assert_eq!(c.stage(), Stage::Guessing);
        assert_eq!(c.series_input(), "Breaking Bad");
        assert!(c.candidates().is_empty());

        c.set_guess_input("Walter becomes a drug lord");
        let (token, request) = evaluating(&c.submit_guess().unwrap());
        assert_eq!(
            request,
            EvaluationRequest {
                guess: "Walter becomes a drug lord".to_string(),
                tv_show_name: "Breaking Bad".to_string(),
            }
        );
        assert_eq!(c.stage(), Stage::Evaluating);
        assert_eq!(c.guess_input(), "");
        assert_eq!(c.current_guess(), Some("Walter becomes a drug lord"));

        assert!(c.evaluation_completed(token, Ok(fixtures::breaking_bad_result())));
        assert_eq!(c.stage(), Stage::ShowingResult);
        assert!(c.reveal().is_empty());

        let snapshot = c.snapshot();
        let view = snapshot.result.unwrap();
        assert_eq!(view.confidence, "90%");
        assert!(view.cards.iter().all(|card| card.field != ResultField::TimePeriod));
    }

    #[test]
    fn test_scenario_b_literal_selection() {
        let mut c = controller();
        search(&mut c, "Xyzzy", &[]);
        assert_eq!(c.candidates().labels(), vec!["Use \"Xyzzy\""]);

        c.select_candidate("Use \"Xyzzy\"").unwrap();
        assert_eq!(c.selected_series(), Some("Xyzzy"));
        assert_eq!(c.stage(), Stage::Guessing);
    }

    #[test]
    fn test_scenario_c_evaluation_failure() {
        let mut c = controller();
        pick(&mut c, "Lost", &["Lost", "Lost Girl"], "Lost");
        c.set_guess_input("They were dead all along");
        let (token, _) = evaluating(&c.submit_guess().unwrap());

        assert!(c.evaluation_completed(
            token,
            Err(EvaluationError::Transport("connection refused".into()))
        ));
        assert_eq!(c.stage(), Stage::ShowingResult);
        assert_eq!(c.notice(), Some(Notice::EvaluationFailed));
        assert!(c.result().is_none());
        assert!(c.reveal().is_empty());
        assert_eq!(c.toggle_reveal(ResultField::Accuracy), Err(SessionError::NoResult));

        // The guess is back in the input and can go out again.
        assert_eq!(c.guess_input(), "They were dead all along");
        let (retry, request) = evaluating(&c.submit_guess().unwrap());
        assert!(retry > token);
        assert_eq!(request.tv_show_name, "Lost");
        assert_eq!(c.notice(), None);
    }

    #[test]
    fn test_scenario_d_new_guess_resets_everything() {
        let mut c = controller();
        pick(&mut c, "Breaking", &["Breaking Bad", "Breaking News"], "Breaking Bad");
        c.set_guess_input("Walter becomes a drug lord");
        let (token, _) = evaluating(&c.submit_guess().unwrap());
        c.evaluation_completed(token, Ok(fixtures::evaluation_result(true)));
        c.reveal_all().unwrap();

        assert_eq!(c.new_guess(), vec![Effect::CancelLookup]);
        assert_eq!(c.stage(), Stage::PickingSeries);
        assert_eq!(c.selected_series(), None);
        assert_eq!(c.guess_input(), "");
        assert_eq!(c.current_guess(), None);
        assert!(c.result().is_none());
        assert!(c.reveal().is_empty());
        assert_eq!(c.series_input(), "");
    }

    #[test]
    fn test_submit_without_series_stays_put() {
        let mut c = controller();
        c.set_guess_input("Something happens");
        assert!(c.submit_guess().unwrap().is_empty());
        assert_eq!(c.stage(), Stage::PickingSeries);
        assert_eq!(c.notice(), Some(Notice::SelectSeriesFirst));
        assert_eq!(c.evaluation(), &EvaluationState::Idle);
        assert_eq!(c.guess_input(), "Something happens");
    }

    #[test]
    fn test_submit_empty_guess_sets_notice() {
        let mut c = controller();
        pick(&mut c, "Lost", &["Lost", "Lost Girl"], "Lost");
        c.set_guess_input("   ");
        assert!(c.submit_guess().unwrap().is_empty());
        assert_eq!(c.stage(), Stage::Guessing);
        assert_eq!(c.notice(), Some(Notice::EmptyGuess));
        assert_eq!(c.dismiss_notice(), Some(Notice::EmptyGuess));
        assert_eq!(c.notice(), None);
    }

    #[test]
    fn test_duplicate_submit_is_rejected() {
        let mut c = controller();
        pick(&mut c, "Lost", &["Lost", "Lost Girl"], "Lost");
        c.set_guess_input("Island");
        c.submit_guess().unwrap();
        c.set_guess_input("Island again");
        assert_eq!(c.submit_guess(), Err(SessionError::EvaluationInFlight));
    }

    #[test]
    fn test_guess_input_is_truncated() {
        let mut c = controller();
        c.set_guess_input(&"é".repeat(1500));
        assert_eq!(c.guess_input().chars().count(), 1000);
    }

    #[test]
    fn test_resubmit_from_result_with_same_series() {
        let mut c = controller();
        pick(&mut c, "Lost", &["Lost", "Lost Girl"], "Lost");
        c.set_guess_input("Island");
        let (first, _) = evaluating(&c.submit_guess().unwrap());
        c.evaluation_completed(first, Ok(fixtures::evaluation_result(true)));
        c.toggle_reveal(ResultField::Accuracy).unwrap();

        c.set_guess_input("Plane crash");
        let (second, request) = evaluating(&c.submit_guess().unwrap());
        assert_eq!(request.tv_show_name, "Lost");
        assert_eq!(c.stage(), Stage::Evaluating);
        // The reveal set is cleared before the new result can be toggled.
        assert!(c.reveal().is_empty());
        assert!(c.result().is_none());

        assert!(c.evaluation_completed(second, Ok(fixtures::evaluation_result(false))));
        assert!(c.reveal().is_empty());
    }

    #[test]
    fn test_editing_series_cancels_evaluation() {
        let mut c = controller();
        pick(&mut c, "Lost", &["Lost", "Lost Girl"], "Lost");
        c.set_guess_input("Island");
        let (token, _) = evaluating(&c.submit_guess().unwrap());

        let effects = c.set_series_input("Lost Gir");
        assert!(matches!(effects.as_slice(), [Effect::ScheduleLookup { .. }]));
        assert_eq!(c.stage(), Stage::PickingSeries);
        assert_eq!(c.selected_series(), None);

        assert!(!c.evaluation_completed(token, Ok(fixtures::evaluation_result(true))));
        assert_eq!(c.stage(), Stage::PickingSeries);
        assert!(c.result().is_none());
    }

    #[test]
    fn test_select_outside_picking_stage() {
        let mut c = controller();
        pick(&mut c, "Lost", &["Lost", "Lost Girl"], "Lost");
        assert_eq!(
            c.select_candidate("Lost Girl"),
            Err(SessionError::InvalidStage {
                action: "select a series",
                stage: Stage::Guessing
            })
        );
    }

    #[test]
    fn test_select_unknown_label() {
        let mut c = controller();
        search(&mut c, "Lost", &["Lost", "Lost Girl"]);
        assert_eq!(
            c.select_candidate("Dexter"),
            Err(SessionError::UnknownCandidate("Dexter".to_string()))
        );
    }

    #[test]
    fn test_blank_series_input_clears_without_lookup() {
        let mut c = controller();
        search(&mut c, "Lost", &["Lost", "Lost Girl"]);
        assert_eq!(c.set_series_input("  "), vec![Effect::CancelLookup]);
        assert!(c.candidates().is_empty());
    }

    #[test]
    fn test_superseded_timer_does_not_resolve() {
        let mut c = controller();
        let first = scheduled(&c.set_series_input("Bre"));
        let second = scheduled(&c.set_series_input("Breaking"));
        assert!(c.lookup_fired(first).is_empty());
        let (_, query) = resolving(&c.lookup_fired(second));
        assert_eq!(query, "Breaking");
    }

    #[test]
    fn test_feedback_round_trip_sets_notices() {
        let mut c = controller();
        c.open_feedback();
        c.set_feedback_draft(FeedbackDraft {
            feedback: "Fun".to_string(),
            ..Default::default()
        });

        let token = match c.submit_feedback().unwrap().as_slice() {
            [Effect::SubmitFeedback { token, submission }] => {
                assert_eq!(submission.feedback, "Fun");
                *token
            }
            other => panic!("unexpected effects: {other:?}"),
        };
        assert!(c.feedback_completed(token, Err(FeedbackError::Transport("x".into()))));
        assert_eq!(c.notice(), Some(Notice::FeedbackFailed));
        assert_eq!(c.feedback().draft().feedback, "Fun");

        let token = match c.submit_feedback().unwrap().as_slice() {
            [Effect::SubmitFeedback { token, .. }] => *token,
            other => panic!("unexpected effects: {other:?}"),
        };
        assert!(c.feedback_completed(token, Ok(())));
        assert_eq!(c.notice(), Some(Notice::FeedbackSent));
        assert!(!c.feedback().is_open());
    }

    #[test]
    fn test_empty_feedback_is_an_error() {
        let mut c = controller();
        assert_eq!(
            c.submit_feedback(),
            Err(SessionError::Feedback(FeedbackError::EmptyFeedback))
        );
    }
}
