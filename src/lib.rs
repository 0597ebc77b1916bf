//! Showmatch API Library
//!
//! Booking scheduling and geographic matching core of the artist/venue marketplace.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod repositories;
pub mod services;
pub mod tracing;

use axum::{
    extract::State,
    http::HeaderValue,
    response::Json,
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::ToSchema;

// App state definition
#[derive(Clone)]
pub struct AppState {
    /// `None` when running on the in-memory stores.
    pub db: Option<Arc<DatabaseConnection>>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[tokio::test]
    async fn error_response_has_no_data() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-err"), async {
                ApiResponse::<()>::error("oops".into())
            })
            .await;

        assert!(!response.success);
        assert!(response.data.is_none());
        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-err"));
    }

    #[test]
    fn message_is_attached_to_success() {
        let response = ApiResponse::success(3).with_message("repaired");
        assert!(response.success);
        assert_eq!(response.message.as_deref(), Some("repaired"));
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

pub fn api_v1_routes() -> Router<AppState> {
    let search = Router::new()
        .route("/city", get(handlers::search::search_by_city_state))
        .route(
            "/postal-code/:code",
            get(handlers::search::search_by_postal_code),
        )
        .route("/coordinates", get(handlers::search::search_by_coordinates));

    let bookings = Router::new()
        .route("/", post(handlers::bookings::create_booking))
        .route("/validate", post(handlers::bookings::validate_booking))
        .route(
            "/:id",
            get(handlers::bookings::get_booking)
                .put(handlers::bookings::update_booking_window)
                .delete(handlers::bookings::cancel_booking),
        );

    let interests = Router::new()
        .route("/", post(handlers::interests::create_interest))
        .route("/:id", get(handlers::interests::get_interest))
        .route(
            "/:id/transition",
            post(handlers::interests::transition_interest),
        );

    Router::new()
        .nest("/search", search)
        .nest("/bookings", bookings)
        .route(
            "/entities/:id/bookings",
            get(handlers::bookings::list_entity_bookings),
        )
        .nest("/interests", interests)
        .route(
            "/geo-reference",
            put(handlers::geo_reference::upsert_geo_reference),
        )
        .route(
            "/geo-reference/repair",
            post(handlers::geo_reference::repair_normalized_index),
        )
        .route(
            "/postal-codes",
            put(handlers::geo_reference::upsert_postal_code),
        )
}

/// Full application router: health, OpenAPI document, the v1 API and the HTTP layers.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(health_check))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .nest("/api/v1", api_v1_routes())
        .layer(crate::tracing::configure_http_tracing())
        .layer(cors)
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}

fn cors_layer(cfg: &config::AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cfg
        .cors_origins()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if !origins.is_empty() {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    } else if cfg.is_development() {
        ::tracing::info!("Using permissive CORS in the development environment");
        CorsLayer::permissive()
    } else {
        ::tracing::warn!("No CORS origins configured; cross-origin requests will be refused");
        CorsLayer::new()
    }
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let database = match &state.db {
        Some(db) => match db::check_connection(db).await {
            Ok(()) => "healthy",
            Err(_) => "unhealthy",
        },
        None => "in-memory",
    };

    let health_data = json!({
        "status": if database == "unhealthy" { "unhealthy" } else { "healthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {
            "database": database,
        },
        "environment": state.config.environment,
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}
