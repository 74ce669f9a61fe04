//! xml-bridge-client — interactive conversion session client.
//!
//! Converting a score between incompatible notation schemas (CMME, MEI,
//! JSON) can hit structural ambiguities no algorithm should settle alone.
//! The bridge resolver turns each ambiguity into a `Decision` with a fixed
//! set of options; this crate drives the session that walks a user through
//! them one at a time and lands the final converted artifact.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use xml_bridge_client::client::{HttpResolver, ResolverApi};
//! use xml_bridge_client::config::BridgeConfig;
//! use xml_bridge_client::session::SessionController;
//!
//! # async fn run() -> xml_bridge_client::error::Result<()> {
//! let api: Arc<dyn ResolverApi> = Arc::new(HttpResolver::new(BridgeConfig::from_env()?)?);
//! let mut controller = SessionController::new(api);
//! let session = controller.start("<cmme>...</cmme>", "cmme", "mei").await?;
//! while let Some(decision) = controller.next_decision().await? {
//!     // render `decision`, collect a choice, then controller.resolve(...)
//!     # let _ = decision;
//!     # break;
//! }
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Domain types: decisions, options, resolutions, artifacts
pub mod decision;

// Wire types for the resolver endpoints
pub mod proto;

// Resolver connection settings
pub mod config;

// Transport boundary: trait + HTTP and in-process implementations
pub mod client;

// Session lifecycle: controller, queue, submitter, completion, history
pub mod session;

pub use decision::{Artifact, Decision, DecisionType, HistoryEntry, OptionValue, Resolution};
pub use error::{BridgeError, Result};
pub use session::{
    CancelToken, DecisionChooser, HistoryRecorder, ResolveOutcome, Session, SessionController,
    SessionStatus,
};
