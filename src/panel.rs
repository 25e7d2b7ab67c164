//! QueryPanel state machine
//!
//! Holds the text box contents and everything derived from the last request:
//! the answer, the error text, and the single active request handle. No I/O
//! happens here. [`QueryPanel::submit_query`] hands out a [`RequestTicket`]
//! that the caller turns into a network call, and the call's result is fed
//! back through [`QueryPanel::apply`].
//!
//! Invariants:
//! - `is_pending()` is true exactly while an active handle exists.
//! - `answer` and `error_message` are never both non-empty.
//! - An outcome is applied at most once, and only while its handle is the
//!   active one. Outcomes for cancelled or superseded requests are dropped.

use crate::error::AskError;
use crate::logging;
use crate::service::AskResponse;
use chrono::{DateTime, Local};
use serde_json::{Map, Value};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Monotonic id tagging one request attempt
pub type RequestId = u64;

/// A request the panel has started and expects an outcome for
#[derive(Debug, Clone)]
pub struct RequestTicket {
    pub id: RequestId,
    pub query: String,
    pub token: CancellationToken,
}

/// The single outstanding request
#[derive(Debug)]
struct ActiveRequest {
    id: RequestId,
    token: CancellationToken,
    started: Instant,
}

/// Timing of the last request whose outcome was applied
#[derive(Debug, Clone, PartialEq)]
pub struct RequestStats {
    pub id: RequestId,
    pub elapsed: Duration,
    pub answer_bytes: usize,
    pub finished_at: DateTime<Local>,
}

/// What [`QueryPanel::apply`] did with an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyResult {
    Answered,
    Failed,
    Cancelled,
    /// The outcome belonged to a request that is no longer active
    Discarded,
}

/// What the primary action control currently does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    Search,
    Stop,
}

impl PrimaryAction {
    pub fn label(&self) -> &'static str {
        match self {
            PrimaryAction::Search => "Search",
            PrimaryAction::Stop => "Stop generating",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            PrimaryAction::Search => "\u{1F50D}", // magnifier
            PrimaryAction::Stop => "\u{23F9}",    // stop square
        }
    }
}

/// Result of pressing the primary action control
#[derive(Debug)]
pub enum PrimaryPress {
    Submitted(RequestTicket),
    Cancelled,
    /// Idle with an empty or whitespace-only query
    Ignored,
}

/// Query panel state
#[derive(Debug, Default)]
pub struct QueryPanel {
    /// Current text box contents
    pub query: String,
    answer: String,
    meta: Map<String, Value>,
    error_message: String,
    active: Option<ActiveRequest>,
    next_id: RequestId,
    last_request: Option<RequestStats>,
}

impl QueryPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Metadata of the last successful answer
    pub fn meta(&self) -> &Map<String, Value> {
        &self.meta
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    pub fn is_pending(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_id(&self) -> Option<RequestId> {
        self.active.as_ref().map(|a| a.id)
    }

    pub fn last_request(&self) -> Option<&RequestStats> {
        self.last_request.as_ref()
    }

    /// Time since the active request started
    pub fn pending_for(&self) -> Option<Duration> {
        self.active.as_ref().map(|a| a.started.elapsed())
    }

    pub fn primary_action(&self) -> PrimaryAction {
        if self.is_pending() {
            PrimaryAction::Stop
        } else {
            PrimaryAction::Search
        }
    }

    /// Start a request for `text`.
    ///
    /// Whitespace-only text is ignored and leaves every field untouched. A
    /// request still pending is cancelled and superseded by the new one.
    pub fn submit_query(&mut self, text: &str) -> Option<RequestTicket> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Some(previous) = self.active.take() {
            previous.token.cancel();
            tracing::info!(id = previous.id, "request superseded");
        }

        self.error_message.clear();
        self.answer.clear();
        self.meta.clear();

        self.next_id += 1;
        let id = self.next_id;
        let token = CancellationToken::new();
        self.active = Some(ActiveRequest {
            id,
            token: token.clone(),
            started: Instant::now(),
        });

        tracing::info!(
            id,
            query = %logging::preview(text, logging::QUERY_PREVIEW_CHARS),
            "request started"
        );

        Some(RequestTicket {
            id,
            query: text.to_string(),
            token,
        })
    }

    /// Submit the current text box contents
    pub fn submit(&mut self) -> Option<RequestTicket> {
        let query = self.query.clone();
        self.submit_query(&query)
    }

    /// Abort the active request without waiting for the transport.
    ///
    /// Returns `false` when nothing was pending.
    pub fn cancel_query(&mut self) -> bool {
        match self.active.take() {
            Some(active) => {
                active.token.cancel();
                tracing::info!(
                    id = active.id,
                    elapsed_ms = active.started.elapsed().as_millis() as u64,
                    "request cancelled"
                );
                true
            }
            None => false,
        }
    }

    /// Primary control: search when idle, stop when pending
    pub fn press_primary(&mut self) -> PrimaryPress {
        if self.cancel_query() {
            return PrimaryPress::Cancelled;
        }
        match self.submit() {
            Some(ticket) => PrimaryPress::Submitted(ticket),
            None => PrimaryPress::Ignored,
        }
    }

    /// Apply the finished outcome of request `id`
    pub fn apply(&mut self, id: RequestId, outcome: Result<AskResponse, AskError>) -> ApplyResult {
        if self.active_id() != Some(id) {
            tracing::debug!(id, "discarding outcome of inactive request");
            return ApplyResult::Discarded;
        }
        let elapsed = self
            .active
            .take()
            .map(|a| a.started.elapsed())
            .unwrap_or_default();

        match outcome {
            Ok(response) => {
                tracing::info!(
                    id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    bytes = response.answer.len(),
                    "request answered"
                );
                self.error_message.clear();
                self.last_request = Some(RequestStats {
                    id,
                    elapsed,
                    answer_bytes: response.answer.len(),
                    finished_at: Local::now(),
                });
                self.answer = response.answer;
                self.meta = response.meta;
                ApplyResult::Answered
            }
            Err(err) if err.is_cancellation() => {
                tracing::info!(id, "request ended by cancellation");
                ApplyResult::Cancelled
            }
            Err(err) => {
                tracing::warn!(id, elapsed_ms = elapsed.as_millis() as u64, error = %err, "request failed");
                self.answer.clear();
                self.meta.clear();
                self.error_message = err.to_string();
                self.last_request = Some(RequestStats {
                    id,
                    elapsed,
                    answer_bytes: 0,
                    finished_at: Local::now(),
                });
                ApplyResult::Failed
            }
        }
    }
}

impl Drop for QueryPanel {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn answer(text: &str) -> Result<AskResponse, AskError> {
        Ok(AskResponse {
            answer: text.to_string(),
            meta: Map::new(),
        })
    }

    fn failure() -> Result<AskResponse, AskError> {
        Err(AskError::Status {
            status: 500,
            detail: Some("internal".into()),
        })
    }

    fn assert_invariants(panel: &QueryPanel) {
        assert_eq!(panel.is_pending(), panel.active_id().is_some());
        assert!(panel.answer().is_empty() || panel.error_message().is_empty());
    }

    #[test]
    fn blank_submission_changes_nothing() {
        let mut panel = QueryPanel::new();
        let ticket = panel.submit_query("first").unwrap();
        panel.apply(ticket.id, answer("kept"));

        for blank in ["", "   ", "\t\n "] {
            assert!(panel.submit_query(blank).is_none());
            assert!(!panel.is_pending());
            assert_eq!(panel.answer(), "kept");
            assert_eq!(panel.error_message(), "");
        }

        let ticket = panel.submit_query("second").unwrap();
        panel.apply(ticket.id, failure());
        assert!(panel.submit_query("  ").is_none());
        assert!(!panel.error_message().is_empty());
        assert_invariants(&panel);
    }

    #[test]
    fn submit_clears_previous_results_and_goes_pending() {
        let mut panel = QueryPanel::new();
        let ticket = panel.submit_query("one").unwrap();
        panel.apply(ticket.id, failure());
        assert!(!panel.error_message().is_empty());

        let ticket = panel.submit_query("  two  ").unwrap();
        assert_eq!(ticket.query, "two");
        assert!(panel.is_pending());
        assert_eq!(panel.answer(), "");
        assert_eq!(panel.error_message(), "");
        assert_eq!(panel.primary_action(), PrimaryAction::Stop);
        assert!(!ticket.token.is_cancelled());
        assert_invariants(&panel);
    }

    #[test]
    fn success_sets_answer() {
        let mut panel = QueryPanel::new();
        let ticket = panel.submit_query("what is six times seven").unwrap();
        let outcome = Ok(AskResponse {
            answer: "42".into(),
            meta: json!({"cached": true}).as_object().cloned().unwrap(),
        });

        assert_eq!(panel.apply(ticket.id, outcome), ApplyResult::Answered);
        assert_eq!(panel.answer(), "42");
        assert_eq!(panel.error_message(), "");
        assert!(!panel.is_pending());
        assert_eq!(panel.meta().get("cached"), Some(&json!(true)));
        let stats = panel.last_request().unwrap();
        assert_eq!(stats.id, ticket.id);
        assert_eq!(stats.answer_bytes, 2);
        assert_invariants(&panel);
    }

    #[test]
    fn failure_sets_error_and_no_answer() {
        let mut panel = QueryPanel::new();
        let ticket = panel.submit_query("q").unwrap();

        assert_eq!(panel.apply(ticket.id, failure()), ApplyResult::Failed);
        assert_eq!(panel.answer(), "");
        assert_eq!(panel.error_message(), "Answer service returned 500: internal");
        assert!(!panel.is_pending());
        assert_invariants(&panel);
    }

    #[test]
    fn new_failure_overwrites_old_error() {
        let mut panel = QueryPanel::new();
        let ticket = panel.submit_query("q").unwrap();
        panel.apply(ticket.id, failure());
        let ticket = panel.submit_query("q").unwrap();
        panel.apply(ticket.id, Err(AskError::Timeout(30)));
        assert_eq!(panel.error_message(), "Request timed out after 30s");
    }

    #[test]
    fn cancel_is_immediate_and_silent() {
        let mut panel = QueryPanel::new();
        let ticket = panel.submit_query("q").unwrap();

        assert!(panel.cancel_query());
        assert!(ticket.token.is_cancelled());
        assert!(!panel.is_pending());
        assert_eq!(panel.error_message(), "");
        assert_eq!(panel.primary_action(), PrimaryAction::Search);

        // Late arrivals for the cancelled request are dropped
        assert_eq!(panel.apply(ticket.id, answer("late")), ApplyResult::Discarded);
        assert_eq!(panel.apply(ticket.id, failure()), ApplyResult::Discarded);
        assert_eq!(panel.apply(ticket.id, Err(AskError::Cancelled)), ApplyResult::Discarded);
        assert_eq!(panel.answer(), "");
        assert_eq!(panel.error_message(), "");
        assert!(panel.last_request().is_none());
        assert_invariants(&panel);
    }

    #[test]
    fn cancel_when_idle_is_a_noop() {
        let mut panel = QueryPanel::new();
        assert!(!panel.cancel_query());
        let ticket = panel.submit_query("q").unwrap();
        panel.apply(ticket.id, answer("done"));
        assert!(!panel.cancel_query());
        assert_eq!(panel.answer(), "done");
    }

    #[test]
    fn cancellation_outcome_for_active_request_sets_no_error() {
        let mut panel = QueryPanel::new();
        let ticket = panel.submit_query("q").unwrap();
        assert_eq!(panel.apply(ticket.id, Err(AskError::Cancelled)), ApplyResult::Cancelled);
        assert!(!panel.is_pending());
        assert_eq!(panel.error_message(), "");
        assert_eq!(panel.answer(), "");
    }

    #[test]
    fn second_submit_supersedes_first() {
        let mut panel = QueryPanel::new();
        let first = panel.submit_query("first").unwrap();
        let second = panel.submit_query("second").unwrap();

        assert_ne!(first.id, second.id);
        assert!(first.token.is_cancelled());
        assert!(!second.token.is_cancelled());
        assert_eq!(panel.active_id(), Some(second.id));

        let mut applied = 0;
        for (id, outcome) in [
            (first.id, answer("stale")),
            (second.id, answer("fresh")),
            (first.id, failure()),
        ] {
            if panel.apply(id, outcome) != ApplyResult::Discarded {
                applied += 1;
            }
        }
        assert_eq!(applied, 1);
        assert_eq!(panel.answer(), "fresh");
        assert_eq!(panel.error_message(), "");
    }

    #[test]
    fn outcome_applies_at_most_once() {
        let mut panel = QueryPanel::new();
        let ticket = panel.submit_query("q").unwrap();
        assert_eq!(panel.apply(ticket.id, answer("a")), ApplyResult::Answered);
        assert_eq!(panel.apply(ticket.id, failure()), ApplyResult::Discarded);
        assert_eq!(panel.answer(), "a");
        assert_eq!(panel.error_message(), "");
    }

    #[test]
    fn primary_press_toggles_between_search_and_stop() {
        let mut panel = QueryPanel::new();
        assert!(matches!(panel.press_primary(), PrimaryPress::Ignored));

        panel.query = "hello".into();
        let ticket = match panel.press_primary() {
            PrimaryPress::Submitted(ticket) => ticket,
            other => panic!("expected submit, got {other:?}"),
        };
        assert_eq!(ticket.query, "hello");
        assert_eq!(panel.query, "hello");

        assert!(matches!(panel.press_primary(), PrimaryPress::Cancelled));
        assert!(ticket.token.is_cancelled());
        assert!(!panel.is_pending());
    }

    #[test]
    fn dropping_the_panel_cancels_the_request() {
        let mut panel = QueryPanel::new();
        let ticket = panel.submit_query("q").unwrap();
        drop(panel);
        assert!(ticket.token.is_cancelled());
    }
}
