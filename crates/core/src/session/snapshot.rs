//! Serializable view of a session.

use serde::Serialize;

use super::{Notice, Stage};
use crate::feedback::FeedbackDraft;
use crate::reveal::{ResultField, ResultView};

/// Everything a front end needs to render the session.
///
/// Result values only appear for revealed cards; the raw evaluation is
/// never exposed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub stage: Stage,
    pub series_input: String,
    /// Dropdown labels in display order.
    pub suggestions: Vec<String>,
    pub suggestions_loading: bool,
    pub selected_series: Option<String>,
    pub guess_input: String,
    pub current_guess: Option<String>,
    /// `idle`, `pending`, `succeeded` or `failed`.
    pub evaluation: &'static str,
    pub result: Option<ResultView>,
    pub revealed: Vec<ResultField>,
    pub notice: Option<NoticeView>,
    pub feedback: FeedbackView,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoticeView {
    pub kind: Notice,
    pub message: &'static str,
    pub blocking: bool,
}

impl From<Notice> for NoticeView {
    fn from(notice: Notice) -> Self {
        Self {
            kind: notice,
            message: notice.message(),
            blocking: notice.is_blocking(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackView {
    pub open: bool,
    pub submitting: bool,
    pub draft: FeedbackDraft,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionConfig, SessionController};

    #[test]
    fn test_fresh_session_json() {
        let snapshot = SessionController::new(SessionConfig::default()).snapshot();
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["stage"], "picking_series");
        assert_eq!(json["evaluation"], "idle");
        assert_eq!(json["suggestions"], serde_json::json!([]));
        assert!(json["result"].is_null());
        assert!(json["notice"].is_null());
        assert_eq!(json["feedback"]["open"], false);
    }

    #[test]
    fn test_notice_view_json() {
        let json = serde_json::to_value(NoticeView::from(Notice::SelectSeriesFirst)).unwrap();
        assert_eq!(json["kind"], "select_series_first");
        assert_eq!(json["message"], "Please select a TV series first.");
        assert_eq!(json["blocking"], true);
    }
}
