//! Session lifecycle orchestration.
//!
//! `SessionController` composes the queue client, submitter, and completion
//! resolver into the full workflow: start → decision loop → complete, or
//! start → cancel. Every step is an explicit async method returning a
//! result — no ambient event handlers, no global session singleton.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::client::ResolverApi;
use crate::decision::{Artifact, Decision, Resolution};
use crate::error::{BridgeError, Result};
use crate::proto::StartSessionRequest;
use crate::session::{
    cancel::CancelToken, completion::CompletionResolver, history::HistoryRecorder,
    queue::DecisionQueueClient, submit::ResolutionSubmitter, submit::ResolveOutcome, Session,
    SessionStatus,
};

/// Presentation-layer seam: given a decision, produce the user's choice.
/// The controller renders nothing itself.
#[async_trait]
pub trait DecisionChooser: Send + Sync {
    async fn choose(&self, decision: &Decision) -> Result<Resolution>;
}

/// Orchestrates exactly one conversion session at a time.
pub struct SessionController {
    api: Arc<dyn ResolverApi>,
    queue: DecisionQueueClient,
    submitter: ResolutionSubmitter,
    completion: CompletionResolver,
    session: Option<Session>,
    history: HistoryRecorder,
}

impl SessionController {
    pub fn new(api: Arc<dyn ResolverApi>) -> Self {
        Self {
            queue: DecisionQueueClient::new(api.clone()),
            submitter: ResolutionSubmitter::new(api.clone()),
            completion: CompletionResolver::new(api.clone()),
            api,
            session: None,
            history: HistoryRecorder::new(),
        }
    }

    /// The tracked session, if any.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Local audit ledger for the tracked session. Valid to read in any
    /// state, including after completion or cancellation.
    pub fn history(&self) -> &HistoryRecorder {
        &self.history
    }

    /// Open a new session for a document.
    ///
    /// Rejected while another session is Active — a second `start()` would
    /// orphan the remote session. On remote failure nothing changes
    /// locally. A session that opens with zero pending decisions is taken
    /// straight to completion.
    pub async fn start(
        &mut self,
        file: &str,
        source_format: &str,
        target_format: &str,
    ) -> Result<Session> {
        if let Some(session) = &self.session {
            if session.is_active() {
                return Err(BridgeError::user_input(format!(
                    "session {} is still active; complete or cancel it first",
                    session.id
                )));
            }
        }
        if file.trim().is_empty() {
            return Err(BridgeError::user_input("no file selected"));
        }
        if source_format.is_empty() || target_format.is_empty() {
            return Err(BridgeError::user_input(
                "source and target formats are required",
            ));
        }
        if source_format == target_format {
            return Err(BridgeError::user_input(format!(
                "source and target formats are both {}",
                source_format
            )));
        }

        let response = self
            .api
            .start_session(StartSessionRequest {
                file: file.to_string(),
                source_format: source_format.to_string(),
                target_format: target_format.to_string(),
            })
            .await?;

        let mut session = Session::new(
            response.session_id,
            source_format,
            target_format,
            response.pending_decisions,
        );
        info!(
            session = %session.id,
            pending = response.pending_decisions,
            "session started"
        );

        // Zero-pending fast path: nothing to ask the user, finalize now.
        if response.pending_decisions == 0 {
            self.completion.ensure_completed(&mut session).await?;
        }

        self.history = HistoryRecorder::new();
        self.session = Some(session.clone());
        Ok(session)
    }

    /// Fetch the next pending decision for the tracked session.
    pub async fn next_decision(&self) -> Result<Option<Decision>> {
        let session = self.require_session()?;
        self.queue.next_decision(session).await
    }

    /// Submit one resolution for the tracked session.
    pub async fn resolve(&mut self, resolution: Resolution) -> Result<ResolveOutcome> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| BridgeError::user_input("no session has been started"))?;
        self.submitter
            .resolve(session, &mut self.history, resolution)
            .await
    }

    /// Finalize the tracked session, idempotently.
    pub async fn ensure_completed(&mut self) -> Result<Artifact> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| BridgeError::user_input("no session has been started"))?;
        self.completion.ensure_completed(session).await
    }

    /// Cancel the tracked session, best-effort.
    ///
    /// Requires an explicit prior confirmation (`confirmed`). If the remote
    /// session completed between the user's request and this call, the
    /// server's Completed wins: no cancel request is issued and the local
    /// status reconciles to Completed. Cancelling an already-terminal
    /// session is a no-op.
    pub async fn cancel(&mut self, reason: Option<&str>, confirmed: bool) -> Result<SessionStatus> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| BridgeError::user_input("no session has been started"))?;
        if session.is_terminal() {
            return Ok(session.status);
        }
        if !confirmed {
            return Err(BridgeError::user_input(
                "cancellation requires explicit confirmation",
            ));
        }

        let status = self.api.session_status(&session.id).await?;
        if status.session_status == SessionStatus::Completed {
            warn!(
                session = %session.id,
                "session completed before cancel landed; keeping completed"
            );
            let artifact = status.completion.map(|info| Artifact {
                content: info.result,
                evaluation: info.evaluation,
            });
            session.complete(artifact);
            return Ok(SessionStatus::Completed);
        }

        self.api.cancel_session(&session.id, reason).await?;
        session.cancel();
        info!(session = %session.id, reason = ?reason, "session cancelled");
        Ok(SessionStatus::Cancelled)
    }

    /// Drive the decision loop to completion: fetch a decision, let the
    /// chooser pick an option, submit, repeat until the queue is empty,
    /// then finalize.
    ///
    /// Returns `Ok(None)` when `token` was cancelled between steps; the
    /// session stays Active for an explicit [`cancel`](Self::cancel). The
    /// token never aborts a request already in flight.
    pub async fn run_to_completion(
        &mut self,
        chooser: &dyn DecisionChooser,
        token: &CancelToken,
    ) -> Result<Option<Artifact>> {
        {
            let session = self.require_session()?;
            if let Some(artifact) = session.artifact() {
                return Ok(Some(artifact.clone()));
            }
            if session.status == SessionStatus::Cancelled {
                return Err(BridgeError::user_input(format!(
                    "session {} was cancelled",
                    session.id
                )));
            }
        }

        loop {
            if token.is_cancelled() {
                info!("decision loop stopped by cancellation token");
                return Ok(None);
            }
            let decision = match self.next_decision().await? {
                Some(decision) => decision,
                // Queue exhausted; completion is settled by status below.
                None => break,
            };
            let resolution = chooser.choose(&decision).await?;
            let outcome = self.resolve(resolution).await?;
            if outcome.completed {
                return match outcome.result {
                    Some(artifact) => Ok(Some(artifact)),
                    None => Ok(Some(self.ensure_completed().await?)),
                };
            }
            // pending_remaining == 0 with an active status is advisory
            // only: loop back and let the server-fresh queue decide.
        }

        Ok(Some(self.ensure_completed().await?))
    }

    fn require_session(&self) -> Result<&Session> {
        self.session
            .as_ref()
            .ok_or_else(|| BridgeError::user_input("no session has been started"))
    }
}
