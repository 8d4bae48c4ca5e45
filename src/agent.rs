//! Client for the manager and publisher agents.
//!
//! Both agents sit behind one HTTP endpoint. A call posts the instruction and
//! the agent identifier; the answer carries a success flag, a payload of
//! agent-defined shape, and an error string on failure.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AgentError;

/// Request body for one agent call.
#[derive(Debug, Clone, Serialize)]
pub struct AgentRequest<'a> {
    pub message: &'a str,
    pub agent_id: &'a str,
}

/// Raw agent answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub response: Value,
    #[serde(default)]
    pub error: Option<String>,
}

impl AgentResult {
    pub fn ok(response: Value) -> Self {
        Self {
            success: true,
            response,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            response: Value::Null,
            error: Some(error.into()),
        }
    }

    /// The payload on success, the agent's message as an error otherwise.
    pub fn into_response(self) -> Result<Value, AgentError> {
        if self.success {
            Ok(self.response)
        } else {
            Err(AgentError::Reported(self.error.unwrap_or_default()))
        }
    }
}

#[async_trait]
pub trait AgentClient: Send + Sync {
    async fn call_agent(&self, message: &str, agent_id: &str) -> Result<AgentResult, AgentError>;
}

/// Agent client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAgentClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpAgentClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Option<Duration>,
    ) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AgentClient for HttpAgentClient {
    async fn call_agent(&self, message: &str, agent_id: &str) -> Result<AgentResult, AgentError> {
        tracing::info!(agent_id, chars = message.len(), "calling agent");
        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Accept", "application/json")
            .json(&AgentRequest { message, agent_id });
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let resp = request.send().await.map_err(AgentError::Transport)?;
        let status = resp.status();
        let body = resp.text().await.map_err(AgentError::Transport)?;

        match serde_json::from_str::<AgentResult>(&body) {
            Ok(result) => {
                tracing::debug!(
                    agent_id,
                    status = status.as_u16(),
                    success = result.success,
                    "agent answered"
                );
                Ok(result)
            }
            Err(_) if !status.is_success() => Err(AgentError::Status {
                status: status.as_u16(),
            }),
            Err(e) => Err(AgentError::Decode(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn successful_result_yields_response() {
        let result = AgentResult::ok(json!({"a": 1}));
        assert_eq!(result.into_response().unwrap(), json!({"a": 1}));
    }

    #[test]
    fn failed_result_carries_message() {
        let err = AgentResult::failed("rate limited").into_response().unwrap_err();
        assert_eq!(err.user_message(), "rate limited");
    }

    #[test]
    fn result_decodes_with_missing_fields() {
        let result: AgentResult = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(result.success);
        assert_eq!(result.response, Value::Null);
        let result: AgentResult = serde_json::from_str("{}").unwrap();
        assert!(!result.success);
    }

    #[test]
    fn request_serializes_message_and_agent_id() {
        let body = serde_json::to_value(AgentRequest {
            message: "hello",
            agent_id: "mgr",
        })
        .unwrap();
        assert_eq!(body, json!({"message": "hello", "agent_id": "mgr"}));
    }
}
