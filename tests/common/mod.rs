#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::Value;
use showmatch_api::{
    config::AppConfig,
    entities::profile,
    events::{self, EventSender},
    handlers::AppServices,
    models::{Coordinate, ProfileKind},
    repositories::Stores,
    AppState,
};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

/// Helper harness for spinning up the application on the in-memory stores.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub stores: Stores,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Construct a test application after letting the caller adjust the configuration.
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut cfg = AppConfig::new(
            "memory".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        adjust(&mut cfg);

        let stores = Stores::in_memory();
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let services = AppServices::new(&stores, &cfg, event_sender.clone());
        let state = AppState {
            db: None,
            config: cfg,
            event_sender,
            services,
        };

        Self {
            router: showmatch_api::app(state.clone()),
            state,
            stores,
            _event_task: event_task,
        }
    }

    /// Send a request against the router, with a JSON body when given.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Sends a request and returns the status with the decoded JSON body.
    pub async fn json(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.request(method, uri, body).await;
        let status = response.status();
        (status, response_json(response).await)
    }

    pub async fn add_city(&self, city: &str, state: &str, latitude: f64, longitude: f64) {
        self.state
            .services
            .geo_reference
            .upsert_entry(
                city,
                state,
                Coordinate::new(latitude, longitude).expect("valid coordinate"),
            )
            .await
            .expect("geo reference stored");
    }

    pub async fn add_postal_code(&self, code: &str, city: &str, state: &str) {
        self.state
            .services
            .geo_reference
            .upsert_postal_code(code, city, state)
            .await
            .expect("postal code stored");
    }

    /// Stores a profile, optionally located, and returns its id.
    pub async fn add_profile(
        &self,
        kind: ProfileKind,
        name: &str,
        location: Option<(f64, f64)>,
        service_radius_km: Option<f64>,
    ) -> Uuid {
        let model = profile::Model {
            id: Uuid::new_v4(),
            kind,
            display_name: name.to_string(),
            city: None,
            state: None,
            postal_code: None,
            latitude: location.map(|(lat, _)| lat),
            longitude: location.map(|(_, lng)| lng),
            service_radius_km,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.stores
            .profiles
            .insert(model)
            .await
            .expect("profile stored")
            .id
    }
}

pub async fn response_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("response body is JSON")
}
