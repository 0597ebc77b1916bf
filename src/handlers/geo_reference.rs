use crate::{
    entities::{geo_reference, postal_code},
    models::Coordinate,
    ApiResponse, ApiResult, AppState,
};
use axum::{extract::State, response::Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "city": "São Paulo",
    "state": "SP",
    "latitude": -23.5505,
    "longitude": -46.6333
}))]
pub struct UpsertGeoReferenceRequest {
    #[validate(length(min = 1, max = 120))]
    pub city: String,
    #[validate(length(min = 2, max = 2))]
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "code": "01310-100",
    "city": "São Paulo",
    "state": "SP"
}))]
pub struct UpsertPostalCodeRequest {
    #[validate(length(min = 1, max = 16))]
    pub code: String,
    #[validate(length(min = 1, max = 120))]
    pub city: String,
    #[validate(length(min = 2, max = 2))]
    pub state: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GeoReferenceSummary {
    pub id: Uuid,
    pub city: String,
    pub state: String,
    /// Accent-free lowercase lookup key derived from `city`
    pub normalized_city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub updated_at: DateTime<Utc>,
}

impl From<geo_reference::Model> for GeoReferenceSummary {
    fn from(model: geo_reference::Model) -> Self {
        Self {
            id: model.id,
            city: model.city,
            state: model.state,
            normalized_city: model.normalized_city,
            latitude: model.latitude,
            longitude: model.longitude,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PostalCodeSummary {
    pub code: String,
    pub city: String,
    pub state: String,
}

impl From<postal_code::Model> for PostalCodeSummary {
    fn from(model: postal_code::Model) -> Self {
        Self {
            code: model.code,
            city: model.city,
            state: model.state,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RepairSummary {
    /// Rows whose lookup key was rewritten
    pub changed: usize,
}

/// Insert or update the coordinate of a (city, state) pair
#[utoipa::path(
    put,
    path = "/api/v1/geo-reference",
    request_body = UpsertGeoReferenceRequest,
    responses(
        (status = 200, description = "Entry stored", body = ApiResponse<GeoReferenceSummary>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "geo-reference"
)]
pub async fn upsert_geo_reference(
    State(state): State<AppState>,
    Json(payload): Json<UpsertGeoReferenceRequest>,
) -> ApiResult<GeoReferenceSummary> {
    payload.validate()?;
    let coordinate = Coordinate::new(payload.latitude, payload.longitude)?;
    let entry = state
        .services
        .geo_reference
        .upsert_entry(&payload.city, &payload.state, coordinate)
        .await?;
    Ok(Json(ApiResponse::success(GeoReferenceSummary::from(entry))))
}

#[utoipa::path(
    put,
    path = "/api/v1/postal-codes",
    request_body = UpsertPostalCodeRequest,
    responses(
        (status = 200, description = "Postal code stored", body = ApiResponse<PostalCodeSummary>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "geo-reference"
)]
pub async fn upsert_postal_code(
    State(state): State<AppState>,
    Json(payload): Json<UpsertPostalCodeRequest>,
) -> ApiResult<PostalCodeSummary> {
    payload.validate()?;
    let entry = state
        .services
        .geo_reference
        .upsert_postal_code(&payload.code, &payload.city, &payload.state)
        .await?;
    Ok(Json(ApiResponse::success(PostalCodeSummary::from(entry))))
}

/// Recompute every normalized city key from its city name
#[utoipa::path(
    post,
    path = "/api/v1/geo-reference/repair",
    responses(
        (status = 200, description = "Index repaired", body = ApiResponse<RepairSummary>)
    ),
    tag = "geo-reference"
)]
pub async fn repair_normalized_index(State(state): State<AppState>) -> ApiResult<RepairSummary> {
    let changed = state
        .services
        .geo_reference
        .repair_normalized_index()
        .await?;
    Ok(Json(
        ApiResponse::success(RepairSummary { changed })
            .with_message(format!("{} normalized key(s) rewritten", changed)),
    ))
}
