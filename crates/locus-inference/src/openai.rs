//! OpenAI-compatible streaming chat backend.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use locus_core::{Error, Result};

use crate::streaming::{parse_sse_stream, ChatBackend, TokenStream};
use crate::types::*;

/// Default OpenAI API endpoint.
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default generation model.
pub const DEFAULT_GEN_MODEL: &str = "gpt-4o-mini";

/// Default sampling temperature. Kept low so explanations stay close to the
/// source text.
pub const DEFAULT_TEMPERATURE: f32 = 0.05;

/// Default timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// System prompt prepended to every conversation.
pub const ACADEMIC_ASSISTANT_PROMPT: &str = "You are a helpful, academic assistant \
that translates academic language into plain English. If you don't know what \
something means, ask clarifying questions.";

/// Configuration for the OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key for authentication (optional for local endpoints).
    pub api_key: Option<String>,
    /// Model to use for generation.
    pub gen_model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OPENAI_URL.to_string(),
            api_key: None,
            gen_model: DEFAULT_GEN_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// OpenAI-compatible chat backend.
pub struct OpenAIBackend {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIBackend {
    /// Create a new backend with the given configuration.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Inference(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = "openai",
            op = "init",
            base_url = %config.base_url,
            model = %config.gen_model,
            "Initializing OpenAI backend"
        );
        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        let config = OpenAIConfig {
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_URL.to_string()),
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            gen_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEN_MODEL.to_string()),
            temperature: std::env::var("OPENAI_TEMPERATURE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TEMPERATURE),
            timeout_seconds: std::env::var("OPENAI_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        Self::new(config)
    }

    /// Get the current configuration.
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// Build a POST request with authentication if configured.
    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);
        let mut req = self.client.post(&url);

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        req.header("Content-Type", "application/json")
    }

    /// Ensure the conversation opens with the assistant persona.
    fn with_system_prompt(messages: &[ChatMessage]) -> Vec<ChatMessage> {
        let mut full = Vec::with_capacity(messages.len() + 1);
        if messages.first().map(|m| m.role.as_str()) != Some("system") {
            full.push(ChatMessage::system(ACADEMIC_ASSISTANT_PROMPT));
        }
        full.extend_from_slice(messages);
        full
    }
}

#[async_trait]
impl ChatBackend for OpenAIBackend {
    async fn stream_chat(&self, messages: &[ChatMessage]) -> Result<TokenStream> {
        let request = ChatCompletionRequest {
            model: self.config.gen_model.clone(),
            messages: Self::with_system_prompt(messages),
            temperature: Some(self.config.temperature),
            max_tokens: None,
            stream: true,
        };

        debug!(
            subsystem = "inference",
            component = "openai",
            op = "stream_chat",
            message_count = request.messages.len(),
            model = %self.config.gen_model,
            "Starting streamed chat completion"
        );

        let response = self
            .build_request("/chat/completions")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body: OpenAIErrorResponse = response.json().await.unwrap_or(OpenAIErrorResponse {
                error: OpenAIError {
                    message: "Unknown error".to_string(),
                    error_type: "unknown".to_string(),
                    code: None,
                },
            });
            return Err(Error::Inference(format!(
                "OpenAI returned {}: {}",
                status, body.error.message
            )));
        }

        Ok(parse_sse_stream(response.bytes_stream()))
    }
}
