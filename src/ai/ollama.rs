//! HTTP client for a local Ollama server.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

use super::error::AIError;
use super::response::{ChatRequest, ChatResponse};
use super::InferenceBackend;
use crate::config::AIConfig;

pub struct OllamaClient {
    endpoint: String,
    model: String,
    http_client: Client,
    timeout: Option<Duration>,
}

impl OllamaClient {
    /// Builds a client for `endpoint`. Without a timeout a request blocks
    /// until the server answers.
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, timeout: Option<Duration>) -> Result<Self, AIError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| AIError::ConfigurationError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            http_client,
            timeout,
        })
    }

    pub fn from_config(config: &AIConfig) -> Result<Self, AIError> {
        Self::new(
            config.endpoint.clone(),
            config.model.clone(),
            config.timeout_secs.map(Duration::from_secs),
        )
    }

    /// Probes `/api/tags`; `Ok(false)` when the server answers with an error
    /// status or cannot be reached.
    pub async fn health_check(&self) -> Result<bool, AIError> {
        let url = format!("{}/api/tags", self.endpoint);
        debug!("Checking Ollama health at {}", url);

        match self.http_client.get(&url).send().await {
            Ok(response) => {
                let healthy = response.status().is_success();
                if !healthy {
                    warn!("Ollama health check failed with status: {}", response.status());
                }
                Ok(healthy)
            }
            Err(e) if e.is_connect() || e.is_timeout() => {
                warn!("Cannot reach Ollama at {}: {}", self.endpoint, e);
                Ok(false)
            }
            Err(e) => Err(AIError::NetworkError(format!("Health check failed: {}", e))),
        }
    }

    fn map_send_error(&self, e: reqwest::Error) -> AIError {
        if e.is_timeout() {
            AIError::TimeoutError(self.timeout.map(|t| t.as_secs()).unwrap_or_default())
        } else if e.is_connect() {
            AIError::NetworkError(format!("Cannot connect to Ollama at {}: {}", self.endpoint, e))
        } else {
            AIError::NetworkError(format!("Request failed: {}", e))
        }
    }
}

#[async_trait]
impl InferenceBackend for OllamaClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, AIError> {
        let url = format!("{}/api/chat", self.endpoint);
        debug!(
            "Sending request to Ollama: model={}, prompt_length={}",
            request.model,
            request.messages.iter().map(|m| m.content.len()).sum::<usize>()
        );

        let start = Instant::now();
        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        match response.status() {
            status if status.is_success() => (),
            StatusCode::NOT_FOUND => {
                let body = response.text().await.unwrap_or_default();
                error!("Ollama returned 404: {}", body);
                return Err(if body.contains("model") {
                    AIError::ModelNotFound(request.model.clone())
                } else {
                    AIError::APIError {
                        status: 404,
                        message: body,
                    }
                });
            }
            status => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Could not read error response".to_string());
                error!("Ollama API returned error status {}: {}", status, body);
                return Err(AIError::APIError {
                    status: status.as_u16(),
                    message: body,
                });
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| AIError::NetworkError(format!("Failed to read response body: {}", e)))?;

        let chat_response: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            AIError::InvalidResponse(format!(
                "{} - Raw response: {}",
                e,
                body.chars().take(200).collect::<String>()
            ))
        })?;

        if !chat_response.done {
            warn!("Ollama response indicates incomplete generation");
        }
        debug!(
            "Ollama answered in {:.2}s (eval_tokens={})",
            start.elapsed().as_secs_f64(),
            chat_response.eval_count.unwrap_or(0)
        );

        Ok(chat_response)
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

impl fmt::Debug for OllamaClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OllamaClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}
