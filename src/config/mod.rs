//! Configuration loading and types.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{Config, DatabaseConfig, LlmConfig, ServerConfig};
