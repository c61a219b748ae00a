//! Global Constants
//!
//! Centralized defaults for configuration and tuning.

/// Server defaults
pub mod server {
    /// Default bind address for the HTTP listener
    pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
}

/// Database defaults
pub mod database {
    /// Default SQLite database path
    pub const DEFAULT_PATH: &str = "ticketd.db";
}

/// Classification adapter defaults
pub mod llm {
    /// Default provider name
    pub const DEFAULT_PROVIDER: &str = "openai";

    /// Request timeout for provider calls (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

    /// Low sampling temperature favoring deterministic output
    pub const DEFAULT_TEMPERATURE: f32 = 0.3;

    /// Output cap: the expected response is a two-key JSON object
    pub const DEFAULT_MAX_TOKENS: u32 = 100;
}
