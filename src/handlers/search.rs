use crate::{
    models::ProfileKind,
    services::location_search::{RankedProfiles, SearchOptions},
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Filters shared by every search endpoint.
#[derive(Debug, Deserialize, Default, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchFilters {
    /// Only return profiles of this kind
    pub kind: Option<ProfileKind>,
    /// Keep only profiles whose service radius reaches the origin. Defaults to the server
    /// setting, except for `kind=space`, which defaults to plain ranking since spaces carry
    /// no radius.
    pub respect_service_radius: Option<bool>,
    /// Maximum number of results; capped by configuration
    pub max_results: Option<usize>,
}

impl SearchFilters {
    fn options(&self) -> SearchOptions {
        SearchOptions {
            kind: self.kind,
            respect_service_radius: self.respect_service_radius,
            max_results: self.max_results,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CitySearchQuery {
    /// City name; accents and case are ignored
    #[validate(length(min = 1, max = 120))]
    #[param(example = "Sao Paulo")]
    pub city: String,
    /// Two-letter state code
    #[validate(length(min = 1, max = 8))]
    #[param(example = "SP")]
    pub state: String,
    pub kind: Option<ProfileKind>,
    /// Same default rules as the other search endpoints; spaces rank plainly unless set
    pub respect_service_radius: Option<bool>,
    pub max_results: Option<usize>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CoordinateSearchQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub kind: Option<ProfileKind>,
    /// Same default rules as the other search endpoints; spaces rank plainly unless set
    pub respect_service_radius: Option<bool>,
    pub max_results: Option<usize>,
}

/// Search profiles around a city
#[utoipa::path(
    get,
    path = "/api/v1/search/city",
    params(CitySearchQuery),
    responses(
        (status = 200, description = "Profiles ranked by distance", body = ApiResponse<RankedProfiles>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Location not found", body = crate::errors::ErrorResponse)
    ),
    tag = "search"
)]
pub async fn search_by_city_state(
    State(state): State<AppState>,
    Query(query): Query<CitySearchQuery>,
) -> ApiResult<RankedProfiles> {
    query.validate()?;
    let options = SearchOptions {
        kind: query.kind,
        respect_service_radius: query.respect_service_radius,
        max_results: query.max_results,
    };
    let ranked = state
        .services
        .location_search
        .search_by_city_state(&query.city, &query.state, options)
        .await?;
    Ok(Json(ApiResponse::success(ranked)))
}

/// Search profiles around the city a postal code belongs to
#[utoipa::path(
    get,
    path = "/api/v1/search/postal-code/:code",
    params(
        ("code" = String, Path, description = "Postal code; spaces and dashes are ignored"),
        SearchFilters
    ),
    responses(
        (status = 200, description = "Profiles ranked by distance", body = ApiResponse<RankedProfiles>),
        (status = 404, description = "Postal code or its city not found", body = crate::errors::ErrorResponse)
    ),
    tag = "search"
)]
pub async fn search_by_postal_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(filters): Query<SearchFilters>,
) -> ApiResult<RankedProfiles> {
    let ranked = state
        .services
        .location_search
        .search_by_postal_code(&code, filters.options())
        .await?;
    Ok(Json(ApiResponse::success(ranked)))
}

/// Search profiles around a raw coordinate
#[utoipa::path(
    get,
    path = "/api/v1/search/coordinates",
    params(CoordinateSearchQuery),
    responses(
        (status = 200, description = "Profiles ranked by distance", body = ApiResponse<RankedProfiles>),
        (status = 400, description = "Coordinate out of range", body = crate::errors::ErrorResponse)
    ),
    tag = "search"
)]
pub async fn search_by_coordinates(
    State(state): State<AppState>,
    Query(query): Query<CoordinateSearchQuery>,
) -> ApiResult<RankedProfiles> {
    let options = SearchOptions {
        kind: query.kind,
        respect_service_radius: query.respect_service_radius,
        max_results: query.max_results,
    };
    let ranked = state
        .services
        .location_search
        .search_by_coordinates(query.latitude, query.longitude, options)
        .await?;
    Ok(Json(ApiResponse::success(ranked)))
}
