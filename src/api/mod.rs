//! HTTP API Surface
//!
//! Router wiring and shared request state. Handlers live in [`routes`],
//! error mapping in [`error`].

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::ai::Classifier;
use crate::storage::TicketStore;

/// Shared state cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: TicketStore,
    pub classifier: Arc<Classifier>,
}

/// Build the application router.
///
/// Static `/tickets/stats` and `/tickets/classify` routes take precedence
/// over the `/tickets/:id` capture.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route(
            "/tickets",
            get(routes::list_tickets).post(routes::create_ticket),
        )
        .route("/tickets/stats", get(routes::ticket_stats))
        .route("/tickets/classify", post(routes::classify_ticket))
        .route(
            "/tickets/:id",
            get(routes::get_ticket)
                .put(routes::update_ticket)
                .patch(routes::update_ticket)
                .delete(routes::delete_ticket),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
