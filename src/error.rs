//! Error taxonomy for the interactive conversion client.
//!
//! Every failure maps to exactly one `BridgeError` variant:
//!
//! ```text
//! UserInput     → caller mistake (no file, terminal session, duplicate resolve)
//! Transport     → request never completed (connection, timeout, bad URL)
//! Server        → resolver answered with an error envelope
//! Serialization → a choice could not be encoded/decoded losslessly
//! ```
//!
//! A failed operation leaves all local state (session status, history)
//! unchanged; no variant is fatal to the process.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors produced by the conversion session client.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The caller asked for something the session cannot do.
    #[error("invalid input: {reason}")]
    UserInput { reason: String },

    /// The request could not complete at the transport level.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The resolver responded with an error envelope.
    #[error("resolver error: {message}")]
    Server { message: String },

    /// A structured choice failed to encode or decode.
    #[error("serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BridgeError {
    pub fn user_input(reason: impl Into<String>) -> Self {
        Self::UserInput {
            reason: reason.into(),
        }
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    /// True when retrying the triggering action could succeed without
    /// any local cleanup (everything except caller mistakes).
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::UserInput { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_variants_display_non_empty() {
        let variants: Vec<BridgeError> = vec![
            BridgeError::user_input("no file selected"),
            BridgeError::server("internal resolver failure"),
            BridgeError::Serialization(serde_json::from_str::<u32>("not json").unwrap_err()),
        ];
        for v in &variants {
            assert!(!v.to_string().is_empty(), "Display must be non-empty for {:?}", v);
        }
    }

    #[test]
    fn test_user_input_not_retryable() {
        assert!(!BridgeError::user_input("duplicate resolution").is_retryable());
        assert!(BridgeError::server("boom").is_retryable());
    }
}
