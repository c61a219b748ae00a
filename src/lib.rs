//! ticketd - Support Ticket Tracking Service
//!
//! A small HTTP backend that stores support tickets, exposes CRUD and
//! filtered listing over them, computes aggregate statistics, and can ask
//! an external language model to suggest a (category, priority) pair for
//! a free-text description.
//!
//! ## Modules
//!
//! - [`ai`]: provider abstraction and the best-effort classifier
//! - [`api`]: axum router, handlers, and HTTP error mapping
//! - [`storage`]: SQLite persistence with connection pooling
//! - [`config`]: layered configuration loading
//! - [`types`]: ticket entity, closed enumerations, error types

pub mod ai;
pub mod api;
pub mod config;
pub mod constants;
pub mod storage;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, DatabaseConfig, LlmConfig, ServerConfig};

// Error Types
pub use types::error::{Result, ResultExt, TicketError};

// Domain Types
pub use types::{Category, Classification, NewTicket, Priority, Status, Ticket, TicketPatch};

// Storage
pub use storage::database::PoolConfig;
pub use storage::{Database, SharedDatabase, TicketFilter, TicketStats, TicketStore};

// AI
pub use ai::{Classifier, TextGenerator};

// API
pub use api::{AppState, router};
