//! Runs a [`SessionController`] on its own task.
//!
//! The actor owns the controller, so all mutation happens on one task and
//! no locking is needed. Commands arrive over an mpsc channel and are
//! answered with a snapshot. Timers and service calls run as spawned tasks
//! that report back through the same channel.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::{Effect, SessionConfig, SessionController, SessionError, SessionSnapshot};
use crate::evaluation::{EvaluationError, EvaluationResult, EvaluationService};
use crate::feedback::{FeedbackDraft, FeedbackError, FeedbackService};
use crate::reveal::ResultField;
use crate::search::SeriesSearcher;
use crate::suggest::{CandidateList, SuggestionResolver};
use crate::token::RequestToken;

const COMMAND_BUFFER: usize = 32;

/// External collaborators shared by every session.
#[derive(Clone)]
pub struct SessionServices {
    pub searcher: Arc<dyn SeriesSearcher>,
    pub evaluator: Arc<dyn EvaluationService>,
    pub feedback: Arc<dyn FeedbackService>,
}

type Action =
    Box<dyn FnOnce(&mut SessionController) -> Result<Vec<Effect>, SessionError> + Send>;

enum Message {
    Apply {
        action: Action,
        reply: oneshot::Sender<Result<SessionSnapshot, SessionError>>,
    },
    LookupFired(RequestToken),
    SuggestionsResolved(RequestToken, CandidateList),
    EvaluationCompleted(RequestToken, Result<EvaluationResult, EvaluationError>),
    FeedbackCompleted(RequestToken, Result<(), FeedbackError>),
}

/// Cloneable handle to a running session.
///
/// The session task stops once every handle is dropped.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Message>,
}

impl SessionHandle {
    async fn apply<F>(&self, action: F) -> Result<SessionSnapshot, SessionError>
    where
        F: FnOnce(&mut SessionController) -> Result<Vec<Effect>, SessionError> + Send + 'static,
    {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Message::Apply {
                action: Box::new(action),
                reply,
            })
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)?
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        self.apply(|_| Ok(Vec::new())).await
    }

    pub async fn series_input(&self, text: impl Into<String>) -> Result<SessionSnapshot, SessionError> {
        let text = text.into();
        self.apply(move |c| Ok(c.set_series_input(&text))).await
    }

    pub async fn select(&self, label: impl Into<String>) -> Result<SessionSnapshot, SessionError> {
        let label = label.into();
        self.apply(move |c| c.select_candidate(&label)).await
    }

    pub async fn guess_input(&self, text: impl Into<String>) -> Result<SessionSnapshot, SessionError> {
        let text = text.into();
        self.apply(move |c| {
            c.set_guess_input(&text);
            Ok(Vec::new())
        })
        .await
    }

    pub async fn submit(&self) -> Result<SessionSnapshot, SessionError> {
        self.apply(|c| c.submit_guess()).await
    }

    pub async fn toggle_reveal(&self, field: ResultField) -> Result<SessionSnapshot, SessionError> {
        self.apply(move |c| c.toggle_reveal(field).map(|_| Vec::new()))
            .await
    }

    pub async fn reveal_all(&self) -> Result<SessionSnapshot, SessionError> {
        self.apply(|c| c.reveal_all().map(|_| Vec::new())).await
    }

    pub async fn hide_all(&self) -> Result<SessionSnapshot, SessionError> {
        self.apply(|c| c.hide_all().map(|_| Vec::new())).await
    }

    pub async fn new_guess(&self) -> Result<SessionSnapshot, SessionError> {
        self.apply(|c| Ok(c.new_guess())).await
    }

    pub async fn dismiss_notice(&self) -> Result<SessionSnapshot, SessionError> {
        self.apply(|c| {
            c.dismiss_notice();
            Ok(Vec::new())
        })
        .await
    }

    pub async fn open_feedback(&self) -> Result<SessionSnapshot, SessionError> {
        self.apply(|c| {
            c.open_feedback();
            Ok(Vec::new())
        })
        .await
    }

    pub async fn close_feedback(&self) -> Result<SessionSnapshot, SessionError> {
        self.apply(|c| {
            c.close_feedback();
            Ok(Vec::new())
        })
        .await
    }

    /// Store `draft` and submit it.
    pub async fn submit_feedback(&self, draft: FeedbackDraft) -> Result<SessionSnapshot, SessionError> {
        self.apply(move |c| {
            c.set_feedback_draft(draft);
            c.submit_feedback()
        })
        .await
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Start a session task and return its handle.
pub fn spawn_session(config: SessionConfig, services: SessionServices) -> SessionHandle {
    let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
    let actor = SessionActor {
        resolver: SuggestionResolver::new(
            Arc::clone(&services.searcher),
            config.max_suggestions,
        ),
        controller: SessionController::new(config),
        services,
        rx,
        inbox: tx.downgrade(),
        timer: None,
    };
    tokio::spawn(actor.run());
    SessionHandle { tx }
}

struct SessionActor {
    controller: SessionController,
    services: SessionServices,
    resolver: SuggestionResolver,
    rx: mpsc::Receiver<Message>,
    /// Weak so that spawned work never keeps an abandoned session alive.
    inbox: mpsc::WeakSender<Message>,
    timer: Option<JoinHandle<()>>,
}

impl SessionActor {
    async fn run(mut self) {
        debug!("Session task started");

        while let Some(message) = self.rx.recv().await {
            self.handle(message);
        }

        self.cancel_timer();
        info!("Session task stopped");
    }

    fn handle(&mut self, message: Message) {
        match message {
            Message::Apply { action, reply } => {
                let outcome = action(&mut self.controller).map(|effects| {
                    self.execute(effects);
                    self.controller.snapshot()
                });
                let _ = reply.send(outcome);
            }
            Message::LookupFired(token) => {
                self.timer = None;
                let effects = self.controller.lookup_fired(token);
                self.execute(effects);
            }
            Message::SuggestionsResolved(token, candidates) => {
                self.controller.suggestions_resolved(token, candidates);
            }
            Message::EvaluationCompleted(token, outcome) => {
                self.controller.evaluation_completed(token, outcome);
            }
            Message::FeedbackCompleted(token, outcome) => {
                self.controller.feedback_completed(token, outcome);
            }
        }
    }

    fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ScheduleLookup { token, delay } => {
                    self.cancel_timer();
                    let inbox = self.inbox.clone();
                    self.timer = Some(tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        deliver(&inbox, Message::LookupFired(token)).await;
                    }));
                }
                Effect::CancelLookup => self.cancel_timer(),
                Effect::ResolveSuggestions { token, query } => {
                    let resolver = self.resolver.clone();
                    let inbox = self.inbox.clone();
                    tokio::spawn(async move {
                        let candidates = resolver.resolve(&query).await;
                        deliver(&inbox, Message::SuggestionsResolved(token, candidates)).await;
                    });
                }
                Effect::Evaluate { token, request } => {
                    let evaluator = Arc::clone(&self.services.evaluator);
                    let inbox = self.inbox.clone();
                    tokio::spawn(async move {
                        let outcome = evaluator.evaluate(&request).await;
                        deliver(&inbox, Message::EvaluationCompleted(token, outcome)).await;
                    });
                }
                Effect::SubmitFeedback { token, submission } => {
                    let feedback = Arc::clone(&self.services.feedback);
                    let inbox = self.inbox.clone();
                    tokio::spawn(async move {
                        let outcome = feedback.submit(&submission).await;
                        deliver(&inbox, Message::FeedbackCompleted(token, outcome)).await;
                    });
                }
            }
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

async fn deliver(inbox: &mpsc::WeakSender<Message>, message: Message) {
    if let Some(tx) = inbox.upgrade() {
        let _ = tx.send(message).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockEvaluationService, MockFeedbackService, MockSeriesSearcher};
    use std::time::Duration;

    fn services(
        searcher: &Arc<MockSeriesSearcher>,
        evaluator: &Arc<MockEvaluationService>,
    ) -> SessionServices {
        SessionServices {
            searcher: Arc::clone(searcher) as Arc<dyn SeriesSearcher>,
            evaluator: Arc::clone(evaluator) as Arc<dyn EvaluationService>,
            feedback: Arc::new(MockFeedbackService::new()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_fires_after_quiet_period() {
        let searcher = Arc::new(MockSeriesSearcher::new());
        searcher.set_titles(vec!["Lost", "Lost Girl"]).await;
        let evaluator = Arc::new(MockEvaluationService::new());
        let session = spawn_session(SessionConfig::default(), services(&searcher, &evaluator));

        session.series_input("Lost").await.unwrap();
        tokio::time::sleep(Duration::from_millis(299)).await;
        assert_eq!(searcher.search_count().await, 0);

        tokio::time::sleep(Duration::from_millis(10)).await;
        let snapshot = session.snapshot().await.unwrap();
        assert_eq!(snapshot.suggestions, vec!["Lost", "Lost Girl"]);
        assert_eq!(searcher.recorded_queries().await, vec!["Lost"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handles_stops_session() {
        let searcher = Arc::new(MockSeriesSearcher::new());
        let evaluator = Arc::new(MockEvaluationService::new());
        let session = spawn_session(SessionConfig::default(), services(&searcher, &evaluator));
        let other = session.clone();

        session.series_input("Lost").await.unwrap();
        drop(session);
        assert!(!other.is_closed());
        drop(other);

        // The pending timer dies with the session.
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(searcher.search_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_then_result_arrives() {
        let searcher = Arc::new(MockSeriesSearcher::new());
        searcher.set_titles(vec!["Breaking Bad", "Breaking News"]).await;
        let evaluator = Arc::new(MockEvaluationService::new());
        evaluator
            .set_result(Ok(fixtures::breaking_bad_result()))
            .await;
        evaluator.set_delay(Duration::from_secs(2)).await;
        let session = spawn_session(SessionConfig::default(), services(&searcher, &evaluator));

        session.series_input("Breaking").await.unwrap();
        tokio::time::sleep(Duration::from_millis(400)).await;
        session.select("Breaking Bad").await.unwrap();
        session.guess_input("Walter becomes a drug lord").await.unwrap();

        let pending = session.submit().await.unwrap();
        assert_eq!(pending.evaluation, "pending");

        tokio::time::sleep(Duration::from_secs(3)).await;
        let done = session.snapshot().await.unwrap();
        assert_eq!(done.evaluation, "succeeded");
        assert!(done.revealed.is_empty());
        assert_eq!(done.result.map(|r| r.confidence), Some("90%".to_string()));
    }
}
