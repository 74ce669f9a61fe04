//! HTTP implementation of [`ResolverApi`] over the bridge server's
//! `/interactive/*` routes.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::client::ResolverApi;
use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::proto::{
    decode_envelope, CancelRequest, CompleteResponse, PendingDecisionsResponse, ResolveRequest,
    ResolveResponse, SessionStatusResponse, StartSessionRequest, StartSessionResponse,
};

/// Longest error-body excerpt carried into an error message.
const ERROR_BODY_EXCERPT: usize = 200;

/// Resolver client over HTTP.
pub struct HttpResolver {
    http: Client,
    config: BridgeConfig,
}

impl HttpResolver {
    pub fn new(config: BridgeConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    /// Connect using environment configuration.
    pub fn from_env() -> Result<Self> {
        Self::new(BridgeConfig::from_env()?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.config.endpoint(path)?;
        debug!(%url, "GET");
        let response = self.http.get(url).send().await?;
        Self::read_body(path, response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.config.endpoint(path)?;
        debug!(%url, "POST");
        let response = self.http.post(url).json(body).send().await?;
        Self::read_body(path, response).await
    }

    async fn read_body<T: DeserializeOwned>(path: &str, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Error responses usually carry the envelope; fall back to the
            // raw body excerpt when they don't parse.
            if let Ok(value) = serde_json::from_str::<Value>(&body) {
                if value.get("status").and_then(Value::as_str) == Some("error") {
                    return decode_envelope::<T>(value);
                }
            }
            return Err(BridgeError::server(format!(
                "resolver returned {} for {}: {}",
                status,
                path,
                body.chars().take(ERROR_BODY_EXCERPT).collect::<String>()
            )));
        }
        let value: Value = response.json().await?;
        decode_envelope(value)
    }
}

#[async_trait]
impl ResolverApi for HttpResolver {
    async fn start_session(&self, req: StartSessionRequest) -> Result<StartSessionResponse> {
        self.post("/interactive/start", &req).await
    }

    async fn pending_decisions(&self, session_id: &str) -> Result<PendingDecisionsResponse> {
        self.get(&format!("/interactive/decisions/{}", session_id))
            .await
    }

    async fn resolve_decision(&self, req: ResolveRequest) -> Result<ResolveResponse> {
        self.post("/interactive/resolve", &req).await
    }

    async fn session_status(&self, session_id: &str) -> Result<SessionStatusResponse> {
        self.get(&format!("/interactive/status/{}", session_id))
            .await
    }

    async fn force_complete(&self, session_id: &str) -> Result<CompleteResponse> {
        self.post(&format!("/interactive/complete/{}", session_id), &())
            .await
    }

    async fn cancel_session(&self, session_id: &str, reason: Option<&str>) -> Result<()> {
        let req = CancelRequest {
            reason: reason.map(str::to_string),
        };
        // The cancel ack has no payload fields beyond the envelope.
        let _: Value = self
            .post(&format!("/interactive/cancel/{}", session_id), &req)
            .await?;
        Ok(())
    }
}
