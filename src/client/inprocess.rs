//! In-process implementation of [`ResolverApi`].
//!
//! Runs the resolver's session bookkeeping in memory from a scripted set of
//! decisions. Used by the integration tests and by offline demos — no
//! network, same trait surface as [`HttpResolver`](super::HttpResolver).

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::client::ResolverApi;
use crate::decision::{Decision, HistoryEntry};
use crate::error::{BridgeError, Result};
use crate::proto::{
    CompleteResponse, CompletionInfo, PendingDecisionsResponse, ResolveRequest, ResolveResponse,
    SessionStatusResponse, StartSessionRequest, StartSessionResponse,
};
use crate::session::SessionStatus;

/// What the scripted resolver serves for each session it opens.
#[derive(Debug, Clone, Default)]
pub struct ResolverScript {
    /// Decision queue handed to every new session, in order.
    pub decisions: Vec<Decision>,
    /// Converted document returned on completion.
    pub artifact_content: String,
    /// Optional evaluation report attached to the completion result.
    pub evaluation: Option<Value>,
    /// decision id → further decision ids that the same resolution also
    /// satisfies (the queue can shrink by more than one per resolve).
    pub satisfied_by: HashMap<String, Vec<String>>,
    /// When set, an exhausted queue reports `pending: 0` while the status
    /// stays active until an explicit finalize request arrives.
    pub hold_completion: bool,
}

impl ResolverScript {
    pub fn new(decisions: Vec<Decision>, artifact_content: impl Into<String>) -> Self {
        Self {
            decisions,
            artifact_content: artifact_content.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug)]
struct SessionRecord {
    pending: Vec<Decision>,
    status: SessionStatus,
    history: Vec<HistoryEntry>,
}

#[derive(Debug, Default)]
struct Inner {
    sessions: HashMap<String, SessionRecord>,
    resolve_requests: Vec<ResolveRequest>,
    finalize_calls: usize,
    cancel_reasons: Vec<Option<String>>,
}

/// Scripted resolver holding all session state in memory.
pub struct InProcessResolver {
    script: ResolverScript,
    inner: Mutex<Inner>,
}

impl InProcessResolver {
    pub fn new(script: ResolverScript) -> Self {
        Self {
            script,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Raw resolve payloads as received, oldest first.
    pub async fn recorded_resolve_requests(&self) -> Vec<ResolveRequest> {
        self.inner.lock().await.resolve_requests.clone()
    }

    /// How many finalize requests have landed.
    pub async fn finalize_calls(&self) -> usize {
        self.inner.lock().await.finalize_calls
    }

    /// Cancellation reasons as received.
    pub async fn cancel_reasons(&self) -> Vec<Option<String>> {
        self.inner.lock().await.cancel_reasons.clone()
    }

    /// Force a session to completed server-side, as if another client (or
    /// the zero-pending path) finished it. Test hook for race scenarios.
    pub async fn complete_server_side(&self, session_id: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let record = lookup(&mut inner.sessions, session_id)?;
        record.status = SessionStatus::Completed;
        record.pending.clear();
        Ok(())
    }

    fn completion_info(&self) -> CompletionInfo {
        CompletionInfo {
            result: self.script.artifact_content.clone(),
            evaluation: self.script.evaluation.clone(),
        }
    }
}

fn lookup<'a>(
    sessions: &'a mut HashMap<String, SessionRecord>,
    session_id: &str,
) -> Result<&'a mut SessionRecord> {
    sessions
        .get_mut(session_id)
        .ok_or_else(|| BridgeError::server(format!("Invalid session ID: {}", session_id)))
}

#[async_trait]
impl ResolverApi for InProcessResolver {
    async fn start_session(&self, req: StartSessionRequest) -> Result<StartSessionResponse> {
        if req.file.trim().is_empty() {
            return Err(BridgeError::server("No file provided"));
        }
        let session_id = Uuid::new_v4().to_string();
        let pending = self.script.decisions.clone();
        let pending_decisions = pending.len() as u32;
        let mut inner = self.inner.lock().await;
        inner.sessions.insert(
            session_id.clone(),
            SessionRecord {
                pending,
                status: SessionStatus::Active,
                history: Vec::new(),
            },
        );
        Ok(StartSessionResponse {
            session_id,
            pending_decisions,
        })
    }

    async fn pending_decisions(&self, session_id: &str) -> Result<PendingDecisionsResponse> {
        let mut inner = self.inner.lock().await;
        let record = lookup(&mut inner.sessions, session_id)?;
        Ok(PendingDecisionsResponse {
            pending: record.pending.clone(),
            history: record.history.clone(),
        })
    }

    async fn resolve_decision(&self, req: ResolveRequest) -> Result<ResolveResponse> {
        let mut inner = self.inner.lock().await;
        inner.resolve_requests.push(req.clone());

        let record = lookup(&mut inner.sessions, &req.session_id)?;
        if record.status != SessionStatus::Active {
            return Err(BridgeError::server(format!(
                "session is {}, not accepting resolutions",
                record.status
            )));
        }
        let position = record
            .pending
            .iter()
            .position(|d| d.id == req.decision_id)
            .ok_or_else(|| {
                BridgeError::server(format!("Unknown decision ID: {}", req.decision_id))
            })?;
        record.pending.remove(position);
        record
            .history
            .push(HistoryEntry::new(req.decision_id.clone(), req.choice));

        // One resolution can satisfy several related ambiguities at once.
        if let Some(also) = self.script.satisfied_by.get(&req.decision_id) {
            record.pending.retain(|d| !also.contains(&d.id));
        }

        let pending_decisions = record.pending.len() as u32;
        if pending_decisions == 0 && !self.script.hold_completion {
            record.status = SessionStatus::Completed;
            return Ok(ResolveResponse {
                pending_decisions,
                session_status: SessionStatus::Completed,
                result: Some(self.script.artifact_content.clone()),
                evaluation: self.script.evaluation.clone(),
            });
        }
        Ok(ResolveResponse {
            pending_decisions,
            session_status: record.status,
            result: None,
            evaluation: None,
        })
    }

    async fn session_status(&self, session_id: &str) -> Result<SessionStatusResponse> {
        let mut inner = self.inner.lock().await;
        let record = lookup(&mut inner.sessions, session_id)?;
        let completion = (record.status == SessionStatus::Completed)
            .then(|| self.completion_info());
        Ok(SessionStatusResponse {
            session_status: record.status,
            completion,
        })
    }

    async fn force_complete(&self, session_id: &str) -> Result<CompleteResponse> {
        let mut inner = self.inner.lock().await;
        inner.finalize_calls += 1;
        let record = lookup(&mut inner.sessions, session_id)?;
        if record.status == SessionStatus::Cancelled {
            return Err(BridgeError::server("cannot complete a cancelled session"));
        }
        if !record.pending.is_empty() {
            return Err(BridgeError::server(format!(
                "{} decisions still pending",
                record.pending.len()
            )));
        }
        record.status = SessionStatus::Completed;
        Ok(CompleteResponse {
            result: self.script.artifact_content.clone(),
            evaluation: self.script.evaluation.clone(),
        })
    }

    async fn cancel_session(&self, session_id: &str, reason: Option<&str>) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.cancel_reasons.push(reason.map(str::to_string));
        let record = lookup(&mut inner.sessions, session_id)?;
        // A finished conversion stays finished.
        if record.status != SessionStatus::Completed {
            record.status = SessionStatus::Cancelled;
        }
        Ok(())
    }
}
