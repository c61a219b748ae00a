//! HTTP error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use crate::types::TicketError;

/// Wrapper that maps domain errors onto HTTP responses with a JSON body
/// of the form `{"error": message}`.
#[derive(Debug)]
pub struct ApiError(TicketError);

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self(TicketError::Validation(message.into()))
    }
}

impl<E: Into<TicketError>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            TicketError::NotFound(id) => {
                (StatusCode::NOT_FOUND, format!("Ticket {} not found", id))
            }
            TicketError::Validation(message) => (StatusCode::BAD_REQUEST, message.clone()),
            err => {
                error!(error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
