//! Session state for one document's interactive conversion.
//!
//! A [`Session`] is an explicit value passed by reference into each
//! component call — no module-level singleton, no hidden global state.
//! Lifecycle:
//!
//! ```text
//! Active ──(queue exhausted / zero-pending fast path)──► Completed
//!    └────────────(confirmed cancel)────────────────────► Cancelled
//! ```
//!
//! `Completed` and `Cancelled` are terminal: local transitions never
//! regress out of them, whatever a later response claims.

pub mod cancel;
pub mod completion;
pub mod controller;
pub mod history;
pub mod queue;
pub mod submit;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decision::Artifact;

pub use cancel::CancelToken;
pub use completion::CompletionResolver;
pub use controller::{DecisionChooser, SessionController};
pub use history::HistoryRecorder;
pub use queue::DecisionQueueClient;
pub use submit::{ResolutionSubmitter, ResolveOutcome};

/// Lifecycle state of a conversion session.
///
/// The bridge server reports a handful of pre-completion strings
/// (`started`, `pending`, `initialized`); they all mean Active here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[serde(alias = "started", alias = "pending", alias = "initialized")]
    Active,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// The lifecycle container for one document's conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque id assigned by the resolver; immutable once set.
    pub id: String,
    pub source_format: String,
    pub target_format: String,
    pub status: SessionStatus,
    /// Server-advisory count for display only. Completion is driven by
    /// `status`, never by this reaching zero.
    pub pending_count: u32,
    pub started_at: DateTime<Utc>,
    /// Completion result, cached once known.
    artifact: Option<Artifact>,
}

impl Session {
    pub(crate) fn new(
        id: String,
        source_format: impl Into<String>,
        target_format: impl Into<String>,
        pending_count: u32,
    ) -> Self {
        Self {
            id,
            source_format: source_format.into(),
            target_format: target_format.into(),
            status: SessionStatus::Active,
            pending_count,
            started_at: Utc::now(),
            artifact: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// The cached completion result, if the session finished.
    pub fn artifact(&self) -> Option<&Artifact> {
        self.artifact.as_ref()
    }

    /// Record the advisory pending count from a server response.
    pub(crate) fn note_pending(&mut self, count: u32) {
        self.pending_count = count;
    }

    /// Transition to Completed and cache the artifact. No-op on an already
    /// terminal session — terminal states never regress or swap.
    pub(crate) fn complete(&mut self, artifact: Option<Artifact>) {
        if self.is_terminal() {
            return;
        }
        self.status = SessionStatus::Completed;
        self.pending_count = 0;
        self.artifact = artifact;
    }

    /// Attach the artifact to an already-completed session that finished
    /// without one in hand (status-race reconciliation).
    pub(crate) fn cache_artifact(&mut self, artifact: Artifact) {
        if self.artifact.is_none() {
            self.artifact = Some(artifact);
        }
    }

    /// Transition to Cancelled. A server-reported Completed always wins;
    /// cancelling a completed session is a no-op.
    pub(crate) fn cancel(&mut self) {
        if self.status == SessionStatus::Active {
            self.status = SessionStatus::Cancelled;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new("s-1".into(), "cmme", "mei", 2)
    }

    #[test]
    fn test_new_session_is_active() {
        let s = session();
        assert!(s.is_active());
        assert!(!s.is_terminal());
        assert!(s.artifact().is_none());
    }

    #[test]
    fn test_completed_is_terminal_and_sticky() {
        let mut s = session();
        s.complete(Some(Artifact::new("<converted/>")));
        assert_eq!(s.status, SessionStatus::Completed);
        assert_eq!(s.pending_count, 0);

        // Neither a later cancel nor a second complete may change anything.
        s.cancel();
        assert_eq!(s.status, SessionStatus::Completed);
        s.complete(Some(Artifact::new("<other/>")));
        assert_eq!(s.artifact().unwrap().content, "<converted/>");
    }

    #[test]
    fn test_cancelled_never_regresses() {
        let mut s = session();
        s.cancel();
        assert_eq!(s.status, SessionStatus::Cancelled);
        s.complete(Some(Artifact::new("<converted/>")));
        assert_eq!(s.status, SessionStatus::Cancelled);
        assert!(s.artifact().is_none());
    }

    #[test]
    fn test_status_aliases_parse() {
        let s: SessionStatus = serde_json::from_str(r#""started""#).unwrap();
        assert_eq!(s, SessionStatus::Active);
        let s: SessionStatus = serde_json::from_str(r#""completed""#).unwrap();
        assert_eq!(s, SessionStatus::Completed);
    }
}
