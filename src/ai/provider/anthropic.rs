//! Anthropic API Provider
//!
//! Text generation via Anthropic's Messages API.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{GeneratorConfig, TextGenerator, build_client, validate_api_base};
use crate::types::{Result, TicketError};

const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";
const API_VERSION: &str = "2023-06-01";

/// Anthropic Messages strategy with secure API key handling
pub struct AnthropicGenerator {
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    client: reqwest::Client,
}

impl AnthropicGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let api_base = match &config.api_base {
            Some(base) => validate_api_base(base, DEFAULT_API_BASE)?,
            None => DEFAULT_API_BASE.to_string(),
        };
        let model = config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let client = build_client(config.timeout)?;

        Ok(Self {
            api_key: config.api_key,
            api_base,
            model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    fn build_request(&self, prompt: &str) -> MessagesRequest {
        MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        }
    }
}

#[async_trait]
impl TextGenerator for AnthropicGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = self.build_request(prompt);
        let url = format!("{}/v1/messages", self.api_base);

        debug!(model = %self.model, "Sending request to Anthropic API");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| TicketError::LlmApi(format!("Anthropic request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TicketError::LlmApi(format!(
                "Anthropic API error ({}): {}",
                status, body
            )));
        }

        let response_body: MessagesResponse = response.json().await.map_err(|e| {
            TicketError::LlmApi(format!("Failed to parse Anthropic response: {}", e))
        })?;

        let content = response_body
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(|| TicketError::LlmApi("No text in Anthropic response".to_string()))?;

        Ok(content)
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}
