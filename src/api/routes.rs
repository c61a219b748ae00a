//! Ticket API Routes
//!
//! Handlers and request/response DTOs. Enum query parameters are parsed
//! strictly so an unknown value is a 400 with the valid set named, rather
//! than silently matching nothing.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::AppState;
use super::error::ApiError;
use crate::storage::{TicketFilter, TicketStats};
use crate::types::{Category, NewTicket, Priority, Status, Ticket, TicketError, TicketPatch};

/// Minimum description length for classification, in characters.
const MIN_CLASSIFY_DESCRIPTION: usize = 10;

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    category: Option<String>,
    priority: Option<String>,
    status: Option<String>,
    search: Option<String>,
}

impl ListQuery {
    /// Strict conversion: an out-of-enum filter value is a client error.
    fn into_filter(self) -> Result<TicketFilter, ApiError> {
        Ok(TicketFilter {
            category: parse_enum::<Category>(self.category)?,
            priority: parse_enum::<Priority>(self.priority)?,
            status: parse_enum::<Status>(self.status)?,
            search: self.search.filter(|s| !s.is_empty()),
        })
    }
}

fn parse_enum<T>(value: Option<String>) -> Result<Option<T>, ApiError>
where
    T: std::str::FromStr<Err = String>,
{
    value
        .filter(|v| !v.is_empty())
        .map(|v| v.parse::<T>().map_err(ApiError::validation))
        .transpose()
}

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    description: String,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub suggested_category: Category,
    pub suggested_priority: Priority,
}

// ============================================================================
// Handlers
// ============================================================================

/// Run a store call on the blocking thread pool so SQLite waits (disk,
/// busy_timeout) never stall the async workers.
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> crate::types::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| TicketError::Storage(format!("Blocking task failed: {}", e)))?;
    result.map_err(ApiError::from)
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn list_tickets(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Ticket>>, ApiError> {
    let filter = query.into_filter()?;
    let store = state.store.clone();
    let tickets = run_blocking(move || store.list(&filter)).await?;
    Ok(Json(tickets))
}

pub async fn create_ticket(
    State(state): State<AppState>,
    Json(new): Json<NewTicket>,
) -> Result<(StatusCode, Json<Ticket>), ApiError> {
    new.validate().map_err(ApiError::validation)?;
    let store = state.store.clone();
    let ticket = run_blocking(move || store.create(&new)).await?;
    info!(id = ticket.id, "Created ticket");
    Ok((StatusCode::CREATED, Json(ticket)))
}

pub async fn get_ticket(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Ticket>, ApiError> {
    let store = state.store.clone();
    let ticket = run_blocking(move || store.get(id)).await?;
    Ok(Json(ticket))
}

/// Partial update; bound to both PUT and PATCH.
pub async fn update_ticket(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<TicketPatch>,
) -> Result<Json<Ticket>, ApiError> {
    patch.validate().map_err(ApiError::validation)?;
    let store = state.store.clone();
    let ticket = run_blocking(move || store.update(id, &patch)).await?;
    Ok(Json(ticket))
}

pub async fn delete_ticket(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let store = state.store.clone();
    run_blocking(move || store.delete(id)).await?;
    info!(id, "Deleted ticket");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn ticket_stats(
    State(state): State<AppState>,
) -> Result<Json<TicketStats>, ApiError> {
    let store = state.store.clone();
    let stats = run_blocking(move || store.stats()).await?;
    Ok(Json(stats))
}

/// Suggest a (category, priority) pair for a free-text description.
///
/// Input shape is validated here; classification itself never fails.
pub async fn classify_ticket(
    State(state): State<AppState>,
    Json(request): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let description = request.description.trim();
    if description.chars().count() < MIN_CLASSIFY_DESCRIPTION {
        return Err(ApiError::validation(format!(
            "description must be at least {} characters",
            MIN_CLASSIFY_DESCRIPTION
        )));
    }

    let classification = state.classifier.classify(description).await;
    Ok(Json(ClassifyResponse {
        suggested_category: classification.category,
        suggested_priority: classification.priority,
    }))
}
