use async_trait::async_trait;
use reqwest::header::HeaderValue;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    client::AgentApi,
    config::ClientConfig,
    error::{Error, RequestFailure, Result},
    models::ExecuteRequest,
};

const API_KEY_HEADER: &str = "x-api-key";

/// `reqwest` implementation of [`AgentApi`]. No retries, no caching.
#[derive(Debug, Clone)]
pub struct HttpAgentClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl HttpAgentClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn post(&self, url: String, request: &ExecuteRequest) -> core::result::Result<Value, RequestFailure> {
        info!(
            %url,
            goal = %request.plan_request.goal,
            max_steps = request.plan_request.max_steps.get(),
            "sending agent request"
        );

        let mut builder = self.http.post(&url).json(request);
        if let Some(key) = &self.config.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|_| RequestFailure::transport("API key contains invalid header characters"))?;
            builder = builder.header(API_KEY_HEADER, value);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status();
        let body = response.bytes().await.map_err(classify)?;
        debug!(%url, status = status.as_u16(), bytes = body.len(), "agent responded");

        if !status.is_success() {
            let detail = error_detail(&body);
            warn!(%url, status = status.as_u16(), detail = ?detail, "agent request rejected");
            return Err(RequestFailure::status(status.as_u16(), detail));
        }

        serde_json::from_slice(&body)
            .map_err(|e| RequestFailure::decode(format!("Malformed agent response: {e}")))
    }
}

#[async_trait]
impl AgentApi for HttpAgentClient {
    async fn execute(&self, request: &ExecuteRequest) -> core::result::Result<Value, RequestFailure> {
        self.post(self.config.execute_url(), request).await
    }

    async fn plan(&self, request: &ExecuteRequest) -> core::result::Result<Value, RequestFailure> {
        self.post(self.config.plan_url(), request).await
    }
}

fn classify(err: reqwest::Error) -> RequestFailure {
    if err.is_timeout() {
        warn!("agent request timed out");
        RequestFailure::timeout()
    } else {
        warn!(error = %err, "agent request failed in transport");
        RequestFailure::transport(err.to_string())
    }
}

/// Pulls a human-readable message out of an error body.
///
/// `detail` wins. A list-shaped `detail` (request validation errors) is joined by
/// its `msg` entries. Bodies from the service's catch-all handler carry `message`
/// and `error` instead.
fn error_detail(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let obj = value.as_object()?;

    match obj.get("detail") {
        Some(Value::String(detail)) if !detail.trim().is_empty() => return Some(detail.clone()),
        Some(Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if !messages.is_empty() {
                return Some(messages.join("; "));
            }
        }
        _ => {}
    }

    ["message", "error"].iter().find_map(|key| {
        obj.get(*key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::error_detail;

    #[test]
    fn detail_string_wins() {
        let body = br#"{"detail":"rate limited","message":"other"}"#;
        assert_eq!(error_detail(body).as_deref(), Some("rate limited"));
    }

    #[test]
    fn validation_detail_list_is_joined() {
        let body = br#"{"detail":[{"msg":"field required"},{"msg":"value too large"}]}"#;
        assert_eq!(error_detail(body).as_deref(), Some("field required; value too large"));
    }

    #[test]
    fn catch_all_handler_shape_is_accepted() {
        let body = br#"{"error":"internal_server_error","message":"boom"}"#;
        assert_eq!(error_detail(body).as_deref(), Some("boom"));
    }

    #[test]
    fn non_json_body_has_no_detail() {
        assert_eq!(error_detail(b"Unauthorized"), None);
        assert_eq!(error_detail(br#"{"detail":""}"#), None);
    }
}
