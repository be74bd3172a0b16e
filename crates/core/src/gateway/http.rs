use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::config::GatewayConfig;
use crate::error::{CatalogError, Result};
use crate::gateway::{BackendGateway, normalize};
use crate::model::StreamEntry;

/// Body of `POST /start`.
#[derive(Debug, Serialize)]
struct StartRequest<'a> {
    uri: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    alias: Option<&'a str>,
}

/// [`BackendGateway`] over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    config: GatewayConfig,
}

impl HttpGateway {
    /// Build a gateway with its own connection pool.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Self::with_client(client, config)
    }

    /// Build a gateway around an existing `reqwest::Client`.
    ///
    /// `config.request_timeout` is set on every request and overrides any
    /// timeout the client was built with.
    pub fn with_client(client: Client, config: GatewayConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }
}

#[async_trait]
impl BackendGateway for HttpGateway {
    fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn list_streams(&self) -> Result<Vec<StreamEntry>> {
        let url = self.endpoint("/list");
        tracing::debug!(%url, "GET list");

        let response = self
            .client
            .get(&url)
            .timeout(self.config.request_timeout)
            .send()
            .await?;
        let body: Value = check_status(response).await?.json().await?;

        let entries = normalize::entries_from_listing(&self.config.base_url, &body)?;
        tracing::debug!(count = entries.len(), "listing received");
        Ok(entries)
    }

    async fn start_stream_with_alias(
        &self,
        uri: &str,
        alias: Option<&str>,
    ) -> Result<StreamEntry> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(CatalogError::validation("stream URI is empty"));
        }
        let alias = alias.map(str::trim).filter(|a| !a.is_empty());

        let url = self.endpoint("/start");
        tracing::debug!(%url, source = uri, ?alias, "POST start");

        let response = self
            .client
            .post(&url)
            .timeout(self.config.request_timeout)
            .json(&StartRequest { uri, alias })
            .send()
            .await?;
        let body: Value = check_status(response).await?.json().await?;

        let entry = normalize::entry_from_value(&self.config.base_url, &body)?;
        tracing::debug!(id = %entry.id, url = %entry.playback_url, "stream started");
        Ok(entry)
    }
}

/// Map non-2xx answers to errors, keeping the backend's `{"error": ...}`
/// message when there is one.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = error_message(status, &text);

    if status == StatusCode::CONFLICT {
        return Err(CatalogError::Conflict(message));
    }
    Err(CatalogError::transport(Some(status.as_u16()), message))
}

fn error_message(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        v.get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
    });

    match from_json {
        Some(msg) if !msg.is_empty() => msg,
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string(),
    }
}
