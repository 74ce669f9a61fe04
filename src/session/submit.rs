//! Resolution submission with at-most-once semantics.

use std::sync::Arc;

use tracing::{debug, info};

use crate::client::ResolverApi;
use crate::decision::{Artifact, HistoryEntry, Resolution};
use crate::error::{BridgeError, Result};
use crate::proto::ResolveRequest;
use crate::session::{history::HistoryRecorder, Session, SessionStatus};

/// Authoritative outcome of one resolve round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveOutcome {
    /// Advisory count of decisions still pending. Zero does not imply
    /// completion; only `completed` does.
    pub pending_remaining: u32,
    /// True when the session reached its terminal Completed state.
    pub completed: bool,
    /// Final converted artifact, present when `completed` is true.
    pub result: Option<Artifact>,
}

/// Submits one user choice per call. A failed submission is *not applied*:
/// no history entry, no status change, and never a silent retry — a retry
/// of a request that landed server-side could double-apply the choice.
#[derive(Clone)]
pub struct ResolutionSubmitter {
    api: Arc<dyn ResolverApi>,
}

impl ResolutionSubmitter {
    pub fn new(api: Arc<dyn ResolverApi>) -> Self {
        Self { api }
    }

    pub async fn resolve(
        &self,
        session: &mut Session,
        history: &mut HistoryRecorder,
        resolution: Resolution,
    ) -> Result<ResolveOutcome> {
        if session.is_terminal() {
            return Err(BridgeError::user_input(format!(
                "session {} is {}; resolutions are no longer accepted",
                session.id, session.status
            )));
        }
        // Local duplicate guard before any request goes out: a decision is
        // resolved at most once per session.
        if history.contains(&resolution.decision_id) {
            return Err(BridgeError::user_input(format!(
                "decision {} was already resolved in this session",
                resolution.decision_id
            )));
        }

        let request = ResolveRequest {
            session_id: session.id.clone(),
            decision_id: resolution.decision_id.clone(),
            choice: resolution.choice.clone(),
            save_preference: resolution.save_preference,
        };
        debug!(
            session = %session.id,
            decision = %resolution.decision_id,
            save_preference = resolution.save_preference,
            "submitting resolution"
        );
        let response = self.api.resolve_decision(request).await?;

        // The request succeeded: record it exactly once, then fold the
        // authoritative state into the session.
        history.append(HistoryEntry::new(
            resolution.decision_id,
            resolution.choice,
        ))?;
        session.note_pending(response.pending_decisions);

        // Completion is read from the status field alone; a zero pending
        // count with an active status keeps the loop going.
        let completed = response.session_status == SessionStatus::Completed;
        if completed {
            let artifact = response.result.map(|content| Artifact {
                content,
                evaluation: response.evaluation,
            });
            session.complete(artifact);
            info!(session = %session.id, "conversion completed");
        }

        Ok(ResolveOutcome {
            pending_remaining: response.pending_decisions,
            completed,
            result: if completed {
                session.artifact().cloned()
            } else {
                None
            },
        })
    }
}
