//! Next-decision retrieval.

use std::sync::Arc;

use tracing::debug;

use crate::client::ResolverApi;
use crate::decision::Decision;
use crate::error::{BridgeError, Result};
use crate::session::Session;

/// Fetches the next pending decision for a session, server-fresh on every
/// call. The pending set is server-authoritative and can shrink by more
/// than one per resolution, so nothing is cached locally.
#[derive(Clone)]
pub struct DecisionQueueClient {
    api: Arc<dyn ResolverApi>,
}

impl DecisionQueueClient {
    pub fn new(api: Arc<dyn ResolverApi>) -> Self {
        Self { api }
    }

    /// The next decision awaiting resolution, or `None` when the queue is
    /// empty. An empty queue is a normal outcome directing the caller to
    /// completion — it is never a transport failure.
    pub async fn next_decision(&self, session: &Session) -> Result<Option<Decision>> {
        if session.is_terminal() {
            return Err(BridgeError::user_input(format!(
                "session {} is {}; no further decisions",
                session.id, session.status
            )));
        }
        let response = self.api.pending_decisions(&session.id).await?;
        debug!(
            session = %session.id,
            pending = response.pending.len(),
            "fetched pending decisions"
        );
        Ok(response.pending.into_iter().next())
    }
}
