//! ResolverApi trait — the sole boundary between the session core and the
//! remote resolver. The session components depend on this trait, never on a
//! concrete transport.

pub mod http;
pub mod inprocess;

use async_trait::async_trait;

use crate::error::Result;
use crate::proto::{
    CompleteResponse, PendingDecisionsResponse, ResolveRequest, ResolveResponse,
    SessionStatusResponse, StartSessionRequest, StartSessionResponse,
};

pub use http::HttpResolver;
pub use inprocess::{InProcessResolver, ResolverScript};

/// One async method per resolver endpoint. Object-safe so the session
/// components can hold an `Arc<dyn ResolverApi>`.
#[async_trait]
pub trait ResolverApi: Send + Sync {
    /// Open a new conversion session for a document.
    async fn start_session(&self, req: StartSessionRequest) -> Result<StartSessionResponse>;

    /// List the session's currently pending decisions, server-fresh.
    async fn pending_decisions(&self, session_id: &str) -> Result<PendingDecisionsResponse>;

    /// Submit the user's choice for one decision.
    async fn resolve_decision(&self, req: ResolveRequest) -> Result<ResolveResponse>;

    /// Read the authoritative session status.
    async fn session_status(&self, session_id: &str) -> Result<SessionStatusResponse>;

    /// Finalize a session whose decision queue is exhausted.
    async fn force_complete(&self, session_id: &str) -> Result<CompleteResponse>;

    /// Cancel a session, best-effort.
    async fn cancel_session(&self, session_id: &str, reason: Option<&str>) -> Result<()>;
}
