//! Storage Layer
//!
//! Pooled SQLite database and the ticket store built on top of it.

pub mod database;
pub mod ticket_store;

pub use database::{Database, PoolConfig, SharedDatabase};
pub use ticket_store::{TicketFilter, TicketStats, TicketStore};
