//! Transport for the remote agent service.

pub mod http;

use async_trait::async_trait;
use serde_json::Value;

use crate::{error::RequestFailure, models::ExecuteRequest};

pub use http::HttpAgentClient;

/// The two agent operations. Each is one round trip returning the decoded JSON
/// body untouched; shape checks happen in [`crate::decoder`].
#[async_trait]
pub trait AgentApi: Send + Sync {
    async fn execute(&self, request: &ExecuteRequest) -> Result<Value, RequestFailure>;

    async fn plan(&self, request: &ExecuteRequest) -> Result<Value, RequestFailure>;
}
