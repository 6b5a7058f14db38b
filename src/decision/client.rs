//! HTTP client for an OpenAI-compatible chat completions decision service.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::DecisionConfig;
use crate::decision::{protocol, DecisionQuery};
use crate::error::{GavelError, QueryError, Result};

/// Chat completions client used by reasoning-agent bidders.
///
/// Temperature is pinned to 0 so repeated trials see the service's most
/// deterministic behavior. Transport and 5xx failures are retried up to
/// `max_retries` times with linear backoff; 4xx and parse failures are not.
pub struct ChatDecisionClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: String,
    max_retries: u8,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl ChatDecisionClient {
    pub fn new(cfg: &DecisionConfig) -> Result<Self> {
        let api_key = std::env::var(&cfg.api_key_env).map_err(|_| {
            GavelError::InvalidConfig(format!(
                "decision service API key not found in ${}",
                cfg.api_key_env
            ))
        })?;

        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| GavelError::InvalidConfig(format!("HTTP client build failed: {e}")))?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            api_key,
            max_retries: cfg.max_retries,
        })
    }

    /// One round trip to the service, returning the raw completion text.
    async fn complete(
        &self,
        system: &str,
        query: &str,
    ) -> std::result::Result<String, QueryError> {
        let body = json!({
            "model": self.model,
            "temperature": 0.0,
            "max_tokens": 32,
            "messages": [
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: query },
            ],
        });

        let mut attempt = 0u8;
        loop {
            match self.send_once(&body).await {
                Ok(text) => return Ok(text),
                Err(err) if attempt < self.max_retries && is_retryable(&err) => {
                    attempt += 1;
                    warn!(attempt, error = %err, "decision query failed, retrying");
                    tokio::time::sleep(Duration::from_millis(250 * attempt as u64)).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn send_once(
        &self,
        body: &serde_json::Value,
    ) -> std::result::Result<String, QueryError> {
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QueryError::Status {
                status: status.as_u16(),
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| QueryError::Malformed(e.to_string()))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| QueryError::Malformed("response carried no choices".to_string()))?;

        debug!(raw = %text, "decision service response");
        Ok(text)
    }
}

fn is_retryable(err: &QueryError) -> bool {
    match err {
        QueryError::Transport(_) => true,
        QueryError::Status { status } => *status >= 500,
        QueryError::Malformed(_) | QueryError::Unparseable { .. } => false,
    }
}

#[async_trait]
impl DecisionQuery for ChatDecisionClient {
    async fn query_bid(
        &self,
        private_value: f64,
        context: &str,
    ) -> std::result::Result<f64, QueryError> {
        let query = protocol::bid_query(private_value, context);
        let text = self.complete(protocol::BID_SYSTEM_PROMPT, &query).await?;
        protocol::parse_bid(&text)
    }

    async fn query_continue(
        &self,
        private_value: f64,
        current_price: f64,
        context: &str,
    ) -> std::result::Result<bool, QueryError> {
        let query = protocol::continue_query(private_value, current_price, context);
        let text = self
            .complete(protocol::CONTINUE_SYSTEM_PROMPT, &query)
            .await?;
        protocol::parse_continue(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(is_retryable(&QueryError::Transport("timeout".into())));
        assert!(is_retryable(&QueryError::Status { status: 503 }));
        assert!(!is_retryable(&QueryError::Status { status: 401 }));
        assert!(!is_retryable(&QueryError::Unparseable {
            payload: "hmm".into()
        }));
    }
}
