//! OpenAI API Provider
//!
//! Text generation via OpenAI's Chat Completions API.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{GeneratorConfig, TextGenerator, build_client, validate_api_base};
use crate::types::{Result, TicketError};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// OpenAI Chat Completions strategy with secure API key handling
pub struct OpenAiGenerator {
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    client: reqwest::Client,
}

impl OpenAiGenerator {
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

    fn build_request(&self, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = self.build_request(prompt);
        let url = format!("{}/chat/completions", self.api_base);

        debug!(model = %self.model, "Sending request to OpenAI API");

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| TicketError::LlmApi(format!("OpenAI request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TicketError::LlmApi(format!(
                "OpenAI API error ({}): {}",
                status, body
            )));
        }

        let response_body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| TicketError::LlmApi(format!("Failed to parse OpenAI response: {}", e)))?;

        let content = response_body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| TicketError::LlmApi("No content in OpenAI response".to_string()))?;

        Ok(content)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn generator() -> OpenAiGenerator {
        OpenAiGenerator::new(GeneratorConfig {
            api_key: SecretString::from("test-key"),
            model: None,
            api_base: None,
            timeout: Duration::from_secs(10),
            temperature: 0.3,
            max_tokens: 100,
        })
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let g = generator();
        assert_eq!(g.api_base, DEFAULT_API_BASE);
        assert_eq!(g.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_request_shape() {
        let g = generator();
        let request = g.build_request("classify this");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], DEFAULT_MODEL);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "classify this");
        assert_eq!(json["max_tokens"], 100);
    }

    #[test]
    fn test_response_text_extraction() {
        let body: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"content": "{\"category\": \"billing\"}"}}]}"#,
        )
        .unwrap();
        let content = body.choices[0].message.content.as_deref();
        assert_eq!(content, Some("{\"category\": \"billing\"}"));
    }
}
