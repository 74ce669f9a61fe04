//! Wire types for the resolver's `/interactive/*` endpoints.
//!
//! Every response from the resolver arrives inside a flat envelope:
//!
//! ```json
//! {"status": "success", ...payload fields...}
//! {"status": "error", "message": "what went wrong"}
//! ```
//!
//! [`decode_envelope`] peels that apart: an error envelope becomes
//! `BridgeError::Server`, a success envelope deserializes the remaining
//! fields into the typed response.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::decision::{Decision, HistoryEntry, OptionValue};
use crate::error::{BridgeError, Result};
use crate::session::SessionStatus;

/// `POST /interactive/start`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartSessionRequest {
    pub file: String,
    pub source_format: String,
    pub target_format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    #[serde(default)]
    pub pending_decisions: u32,
}

/// `GET /interactive/decisions/{session_id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PendingDecisionsResponse {
    #[serde(default)]
    pub pending: Vec<Decision>,
    /// Server-side copy of the resolution ledger, for review UIs.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// `POST /interactive/resolve`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveRequest {
    pub session_id: String,
    pub decision_id: String,
    pub choice: OptionValue,
    pub save_preference: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolveResponse {
    #[serde(default)]
    pub pending_decisions: u32,
    pub session_status: SessionStatus,
    /// Converted document, present only once the session completed.
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub evaluation: Option<Value>,
}

/// `GET /interactive/status/{session_id}`
#[derive(Debug, Clone, Deserialize)]
pub struct SessionStatusResponse {
    pub session_status: SessionStatus,
    #[serde(default)]
    pub completion: Option<CompletionInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionInfo {
    pub result: String,
    #[serde(default)]
    pub evaluation: Option<Value>,
}

/// `POST /interactive/complete/{session_id}`
#[derive(Debug, Clone, Deserialize)]
pub struct CompleteResponse {
    pub result: String,
    #[serde(default)]
    pub evaluation: Option<Value>,
}

/// `POST /interactive/cancel/{session_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Decode a resolver response envelope into a typed payload.
pub fn decode_envelope<T: DeserializeOwned>(body: Value) -> Result<T> {
    match body.get("status").and_then(Value::as_str) {
        Some("error") => {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("resolver reported an error without a message")
                .to_string();
            Err(BridgeError::Server { message })
        }
        // The payload fields sit alongside "status"; serde ignores the
        // envelope marker when deserializing the typed response.
        _ => Ok(serde_json::from_value(body)?),
    }
}
