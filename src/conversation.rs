//! Conversation state for the assistant request flow.
//!
//! UI-agnostic: the event loop owns a `Conversation` per chat surface and
//! drives it with `submit` / `settle`. The log is append-only and a single
//! `pending` flag is the only concurrency guard the flow needs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One message in the assistant conversation log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// The author of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
}

/// Rejected submissions. Neither variant changes the log.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    #[error("message is empty")]
    Empty,
    #[error("a request is already in flight")]
    RequestInFlight,
}

/// An ordered, append-only log of exchange turns plus the in-flight flag.
///
/// Two states: idle (`pending == false`) and pending. A non-empty submission
/// while idle appends the user turn immediately and moves to pending, before
/// any network activity. Settling moves back to idle and appends the
/// assistant turn. Submissions while pending are rejected, so at most one
/// request is ever in flight. The log never shrinks and there is no terminal
/// state; the machine is reused for the whole session.
#[derive(Debug, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
    pending: bool,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept or reject a submission.
    ///
    /// Whitespace-only input is rejected before any other effect. While a
    /// request is pending the input is rejected unchanged; the caller must
    /// not start a network call for a rejected submission. On success the
    /// user turn is already in the log when this returns.
    pub fn submit(&mut self, input: &str) -> Result<(), SubmitError> {
        if input.trim().is_empty() {
            return Err(SubmitError::Empty);
        }
        if self.pending {
            return Err(SubmitError::RequestInFlight);
        }
        self.turns.push(Turn::user(input));
        self.pending = true;
        Ok(())
    }

    /// Record the settled reply and return to idle.
    ///
    /// Called exactly once per accepted submission, with either the model's
    /// text or the gateway's fallback message; the conversation does not
    /// distinguish the two.
    pub fn settle(&mut self, reply: impl Into<String>) {
        self.turns.push(Turn::assistant(reply));
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Most recent assistant turn, if any.
    pub fn last_reply(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == Role::Assistant)
            .map(|t| t.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_appends_user_turn_and_goes_pending() {
        let mut conv = Conversation::new();
        conv.submit("What causes headaches?").unwrap();

        assert!(conv.is_pending());
        assert_eq!(conv.len(), 1);
        assert_eq!(conv.turns()[0].role, Role::User);
        assert_eq!(conv.turns()[0].content, "What causes headaches?");
    }

    #[test]
    fn empty_submission_is_rejected_without_state_change() {
        let mut conv = Conversation::new();

        assert_eq!(conv.submit(""), Err(SubmitError::Empty));
        assert_eq!(conv.submit("   \t\n"), Err(SubmitError::Empty));
        assert!(!conv.is_pending());
        assert!(conv.is_empty());
    }

    #[test]
    fn submission_while_pending_leaves_log_unchanged() {
        let mut conv = Conversation::new();
        conv.submit("first question").unwrap();

        let before = conv.len();
        assert_eq!(conv.submit("second question"), Err(SubmitError::RequestInFlight));
        assert_eq!(conv.len(), before);
        assert!(conv.is_pending());
        assert_eq!(conv.turns()[0].content, "first question");
    }

    #[test]
    fn settle_appends_assistant_turn_and_returns_idle() {
        let mut conv = Conversation::new();
        conv.submit("Tips for better sleep").unwrap();
        conv.settle("Keep a consistent bedtime.");

        assert!(!conv.is_pending());
        assert_eq!(conv.len(), 2);
        assert_eq!(conv.turns()[1].role, Role::Assistant);
        assert_eq!(conv.turns()[1].content, "Keep a consistent bedtime.");
    }

    #[test]
    fn machine_is_reusable_after_settling() {
        let mut conv = Conversation::new();
        conv.submit("one").unwrap();
        conv.settle("reply one");
        conv.submit("two").unwrap();
        conv.settle("reply two");

        assert!(!conv.is_pending());
        assert_eq!(conv.len(), 4);
        let roles: Vec<Role> = conv.turns().iter().map(|t| t.role).collect();
        assert_eq!(roles, [Role::User, Role::Assistant, Role::User, Role::Assistant]);
    }

    #[test]
    fn log_keeps_insertion_order_and_never_shrinks() {
        let mut conv = Conversation::new();
        let mut lengths = Vec::new();
        for i in 0..3 {
            conv.submit(format!("question {i}").as_str()).unwrap();
            lengths.push(conv.len());
            conv.settle(format!("answer {i}"));
            lengths.push(conv.len());
        }
        assert!(lengths.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(conv.turns()[4].content, "question 2");
    }

    #[test]
    fn last_reply_sees_the_latest_assistant_turn() {
        let mut conv = Conversation::new();
        assert_eq!(conv.last_reply(), None);

        conv.submit("q1").unwrap();
        assert_eq!(conv.last_reply(), None);

        conv.settle("a1");
        conv.submit("q2").unwrap();
        conv.settle("a2");
        assert_eq!(conv.last_reply(), Some("a2"));
    }
}
