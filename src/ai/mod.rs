//! AI Classification
//!
//! Provider strategies, the shared prompt, response post-processing, and
//! the best-effort [`Classifier`] that ties them together.

pub mod classifier;
pub mod prompt;
pub mod provider;
pub mod response;

pub use classifier::Classifier;
pub use provider::{GeneratorConfig, TextGenerator};
