//! Text Generation Provider Abstraction
//!
//! Defines the `TextGenerator` trait: given prompt text, return the
//! provider's raw response text. The three strategies are parallel
//! implementations of this one capability against different network
//! protocols; everything after the raw text (fence stripping, parsing,
//! enum validation) is shared and lives in [`crate::ai::response`].

mod anthropic;
mod gemini;
mod openai;

pub use anthropic::AnthropicGenerator;
pub use gemini::GeminiGenerator;
pub use openai::OpenAiGenerator;

use async_trait::async_trait;
use secrecy::SecretString;
use std::time::Duration;
use tracing::warn;

use crate::config::LlmConfig;
use crate::types::{Result, TicketError};

// =============================================================================
// Provider Trait
// =============================================================================

/// One outbound text-generation call: prompt in, raw response text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send the prompt to the provider and return the raw response text.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

// =============================================================================
// Generator Configuration
// =============================================================================

/// Immutable per-generator settings derived from [`LlmConfig`].
#[derive(Clone)]
pub struct GeneratorConfig {
    pub api_key: SecretString,
    pub model: Option<String>,
    pub api_base: Option<String>,
    pub timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GeneratorConfig {
    /// Build from the loaded config. Returns None when no credential is set.
    pub fn from_llm_config(config: &LlmConfig) -> Option<Self> {
        let key = config.api_key.as_deref()?.trim();
        if key.is_empty() {
            return None;
        }
        Some(Self {
            api_key: SecretString::from(key.to_string()),
            model: config.model.clone(),
            api_base: config.api_base.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

impl std::fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

// =============================================================================
// Provider Lookup
// =============================================================================

/// Normalize a configured provider name to its canonical form.
///
/// Case-insensitive; "google" is a synonym for "gemini". Returns None for
/// anything outside the known set.
pub fn normalize_provider(name: &str) -> Option<&'static str> {
    match name.trim().to_lowercase().as_str() {
        "openai" => Some("openai"),
        "anthropic" => Some("anthropic"),
        "gemini" | "google" => Some("gemini"),
        _ => None,
    }
}

/// Create a generator for a canonical provider name.
pub fn create_generator(provider: &str, config: GeneratorConfig) -> Result<Box<dyn TextGenerator>> {
    match provider {
        "openai" => Ok(Box::new(OpenAiGenerator::new(config)?)),
        "anthropic" => Ok(Box::new(AnthropicGenerator::new(config)?)),
        "gemini" => Ok(Box::new(GeminiGenerator::new(config)?)),
        _ => Err(TicketError::Config(format!(
            "Unknown provider: {}. Supported: openai, anthropic, gemini",
            provider
        ))),
    }
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Build the HTTP client with the configured request timeout.
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| TicketError::LlmApi(format!("Failed to create HTTP client: {}", e)))
}

/// Validate a custom API base URL.
///
/// Only allows http/https schemes and warns for overridden hosts.
pub(crate) fn validate_api_base(endpoint: &str, default: &str) -> Result<String> {
    let url = url::Url::parse(endpoint)
        .map_err(|e| TicketError::Config(format!("Invalid API base URL '{}': {}", endpoint, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(TicketError::Config(format!(
            "API base must use http or https scheme, got: {}",
            url.scheme()
        )));
    }

    if url.as_str().trim_end_matches('/') != default.trim_end_matches('/')
        && let Some(host) = url.host_str()
    {
        warn!("Using non-default API base host: {}", host);
    }

    let mut result = url.to_string();
    if result.ends_with('/') {
        result.pop();
    }
    Ok(result)
}
