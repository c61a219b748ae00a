//! Ticket Classifier
//!
//! Maps a free-text ticket description to a (category, priority) pair by
//! calling the configured text-generation provider. Classification is
//! best-effort by contract: any failure, from missing credentials to
//! provider errors to malformed output, degrades to the default pair
//! instead of surfacing an error to the caller.

use tracing::{debug, error, warn};

use crate::ai::prompt::classification_prompt;
use crate::ai::provider::{GeneratorConfig, TextGenerator, create_generator, normalize_provider};
use crate::ai::response::parse_classification;
use crate::config::LlmConfig;
use crate::types::{Classification, Result};

/// Why the classifier cannot reach a provider.
#[derive(Debug)]
enum DisabledReason {
    MissingCredential,
    UnknownProvider(String),
    Construction(String),
}

enum Backend {
    Ready(Box<dyn TextGenerator>),
    Disabled(DisabledReason),
}

/// Best-effort description classifier.
///
/// Construction never fails: configuration problems are recorded and the
/// classifier answers with the default pair until fixed.
pub struct Classifier {
    backend: Backend,
}

impl Classifier {
    /// Build a classifier from the loaded LLM config.
    pub fn new(config: &LlmConfig) -> Self {
        let backend = match Self::build_backend(config) {
            Ok(generator) => Backend::Ready(generator),
            Err(reason) => Backend::Disabled(reason),
        };
        Self { backend }
    }

    /// Build a classifier around an existing generator. Used by tests to
    /// substitute a scripted provider.
    #[cfg(test)]
    pub fn with_generator(generator: Box<dyn TextGenerator>) -> Self {
        Self {
            backend: Backend::Ready(generator),
        }
    }

    fn build_backend(config: &LlmConfig) -> std::result::Result<Box<dyn TextGenerator>, DisabledReason> {
        let Some(provider) = normalize_provider(&config.provider) else {
            return Err(DisabledReason::UnknownProvider(config.provider.clone()));
        };
        let Some(generator_config) = GeneratorConfig::from_llm_config(config) else {
            return Err(DisabledReason::MissingCredential);
        };
        create_generator(provider, generator_config)
            .map_err(|e| DisabledReason::Construction(e.to_string()))
    }

    /// Whether a provider is configured and reachable in principle.
    pub fn is_enabled(&self) -> bool {
        matches!(self.backend, Backend::Ready(_))
    }

    /// Classify a ticket description.
    ///
    /// Makes at most one provider call. Never fails; every error path
    /// logs and returns [`Classification::default`].
    pub async fn classify(&self, description: &str) -> Classification {
        let generator = match &self.backend {
            Backend::Ready(generator) => generator,
            Backend::Disabled(reason) => {
                match reason {
                    DisabledReason::MissingCredential => {
                        warn!("No LLM API key configured, using default classification");
                    }
                    DisabledReason::UnknownProvider(name) => {
                        warn!(provider = %name, "Unknown LLM provider, using default classification");
                    }
                    DisabledReason::Construction(message) => {
                        warn!(%message, "LLM provider unavailable, using default classification");
                    }
                }
                return Classification::default();
            }
        };

        match self.classify_with(generator.as_ref(), description).await {
            Ok(classification) => classification,
            Err(e) => {
                error!(provider = generator.name(), error = %e, "Classification failed, using defaults");
                Classification::default()
            }
        }
    }

    async fn classify_with(
        &self,
        generator: &dyn TextGenerator,
        description: &str,
    ) -> Result<Classification> {
        let prompt = classification_prompt(description);
        let raw = generator.generate(&prompt).await?;
        let classification = parse_classification(&raw)?;
        debug!(
            provider = generator.name(),
            category = classification.category.as_str(),
            priority = classification.priority.as_str(),
            "Classified description"
        );
        Ok(classification)
    }
}
