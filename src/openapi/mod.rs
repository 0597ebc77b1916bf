use axum::response::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Showmatch API",
        version = "0.1.0",
        description = r#"
# Showmatch Booking & Matching API

Scheduling and geographic matching for the artist/venue marketplace.

## Features

- **Location search**: rank artists and spaces by great-circle distance from a city, postal code or coordinate
- **Bookings**: conflict-checked booking windows per artist or space
- **Interests**: offers between profiles with an accept/reject/cancel lifecycle
- **Geo reference**: maintenance of the city and postal-code coordinate tables

## Error Handling

Failures share one JSON body:

```json
{
  "error": "Conflict",
  "message": "Time unavailable: overlaps 1 existing booking(s)",
  "details": "7d9f0c4e-4f38-4d5e-9a53-0b1f0c1f2a11",
  "request_id": "req-abc123xyz",
  "timestamp": "2025-08-01T10:30:00Z"
}
```
"#,
    ),
    paths(
        crate::handlers::search::search_by_city_state,
        crate::handlers::search::search_by_postal_code,
        crate::handlers::search::search_by_coordinates,
        crate::handlers::bookings::create_booking,
        crate::handlers::bookings::validate_booking,
        crate::handlers::bookings::get_booking,
        crate::handlers::bookings::update_booking_window,
        crate::handlers::bookings::cancel_booking,
        crate::handlers::bookings::list_entity_bookings,
        crate::handlers::interests::create_interest,
        crate::handlers::interests::get_interest,
        crate::handlers::interests::transition_interest,
        crate::handlers::geo_reference::upsert_geo_reference,
        crate::handlers::geo_reference::upsert_postal_code,
        crate::handlers::geo_reference::repair_normalized_index,
    ),
    components(
        schemas(
            crate::errors::ErrorResponse,
            crate::ResponseMeta,
            crate::models::Coordinate,
            crate::models::ProfileKind,
            crate::models::InterestStatus,
            crate::services::proximity::RankedProfile,
            crate::services::location_search::RankedProfiles,
            crate::handlers::search::SearchFilters,
            crate::handlers::bookings::WindowRequest,
            crate::handlers::bookings::CreateBookingRequest,
            crate::handlers::bookings::ValidateBookingRequest,
            crate::handlers::bookings::BookingSummary,
            crate::handlers::bookings::AvailabilityResponse,
            crate::handlers::interests::CreateInterestRequest,
            crate::handlers::interests::TransitionInterestRequest,
            crate::handlers::interests::InterestSummary,
            crate::handlers::interests::TransitionResponse,
            crate::handlers::geo_reference::UpsertGeoReferenceRequest,
            crate::handlers::geo_reference::UpsertPostalCodeRequest,
            crate::handlers::geo_reference::GeoReferenceSummary,
            crate::handlers::geo_reference::PostalCodeSummary,
            crate::handlers::geo_reference::RepairSummary,
        )
    ),
    tags(
        (name = "search", description = "Distance-ranked profile search"),
        (name = "bookings", description = "Booking windows and conflict checks"),
        (name = "interests", description = "Offers between profiles"),
        (name = "geo-reference", description = "City and postal-code coordinate tables"),
    )
)]
pub struct ApiDoc;

/// Serves the generated OpenAPI document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
