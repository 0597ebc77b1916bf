use axum::{
    http::{header::RETRY_AFTER, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::InterestStatus;

/// Seconds a client should wait before retrying after a store failure.
const RETRY_AFTER_SECS: &str = "1";

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "Conflict",
    "message": "Time unavailable: overlaps 1 existing booking(s)",
    "details": "7d9f0c4e-4f38-4d5e-9a53-0b1f0c1f2a11",
    "request_id": "req-abc123xyz",
    "timestamp": "2025-08-01T10:30:00.000Z"
}))]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Conflict")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// Machine-usable detail, e.g. the ids of conflicting bookings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// RFC 3339 timestamp when the error was produced
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The location query could not be resolved to a coordinate.
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// The proposed window overlaps existing bookings of the same entity.
    #[error("Time unavailable: overlaps {} existing booking(s)", conflicting_ids.len())]
    BookingConflict { conflicting_ids: Vec<Uuid> },

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        from: InterestStatus,
        to: InterestStatus,
    },

    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::LocationNotFound(_) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidCoordinate { .. } | Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::BookingConflict { .. } | Self::InvalidStateTransition { .. } => {
                StatusCode::CONFLICT
            }
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::DatabaseError(_) | Self::InternalError(_) | Self::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Internal errors return generic messages to avoid leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::InternalError(_) | Self::Other(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Structured detail rendered next to the message.
    pub fn details(&self) -> Option<String> {
        match self {
            Self::BookingConflict { conflicting_ids } => Some(
                conflicting_ids
                    .iter()
                    .map(Uuid::to_string)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            Self::InvalidStateTransition { from, to } => Some(format!("{}->{}", from, to)),
            _ => None,
        }
    }

    /// Whether a client may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::DatabaseError(_))
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            details: self.details(),
            request_id: current_request_id(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        if self.is_retryable() {
            tracing::warn!(error = %self, "retryable store failure");
            return (status, [(RETRY_AFTER, RETRY_AFTER_SECS)], Json(err)).into_response();
        }
        (status, Json(err)).into_response()
    }
}
