use crate::{
    entities::booking,
    errors::ServiceError,
    models::{BookingWindow, ProfileKind},
    repositories::NewBooking,
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Start and end of a booking, each given as a date plus a time of day.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({
    "start_date": "2025-08-02",
    "start_time": "20:00:00",
    "end_date": "2025-08-02",
    "end_time": "22:00:00"
}))]
pub struct WindowRequest {
    pub start_date: NaiveDate,
    #[schema(value_type = String, example = "20:00:00")]
    pub start_time: NaiveTime,
    pub end_date: NaiveDate,
    #[schema(value_type = String, example = "22:00:00")]
    pub end_time: NaiveTime,
}

impl WindowRequest {
    fn window(&self) -> Result<BookingWindow, ServiceError> {
        BookingWindow::new(self.start_date, self.start_time, self.end_date, self.end_time)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookingRequest {
    /// Profile making the booking
    pub owner_profile_id: Uuid,
    /// Artist or space being booked
    pub entity_id: Uuid,
    pub entity_kind: ProfileKind,
    pub start_date: NaiveDate,
    #[schema(value_type = String, example = "20:00:00")]
    pub start_time: NaiveTime,
    pub end_date: NaiveDate,
    #[schema(value_type = String, example = "22:00:00")]
    pub end_time: NaiveTime,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateBookingRequest {
    pub entity_id: Uuid,
    /// Booking to leave out of the check, e.g. the one being rescheduled
    pub exclude_booking_id: Option<Uuid>,
    pub start_date: NaiveDate,
    #[schema(value_type = String, example = "20:00:00")]
    pub start_time: NaiveTime,
    pub end_date: NaiveDate,
    #[schema(value_type = String, example = "22:00:00")]
    pub end_time: NaiveTime,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingSummary {
    pub id: Uuid,
    pub owner_profile_id: Uuid,
    pub entity_id: Uuid,
    pub entity_kind: ProfileKind,
    pub start_date: NaiveDate,
    #[schema(value_type = String)]
    pub start_time: NaiveTime,
    pub end_date: NaiveDate,
    #[schema(value_type = String)]
    pub end_time: NaiveTime,
    /// Interest whose acceptance created this booking
    pub interest_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<booking::Model> for BookingSummary {
    fn from(model: booking::Model) -> Self {
        Self {
            id: model.id,
            owner_profile_id: model.owner_profile_id,
            entity_id: model.entity_id,
            entity_kind: model.entity_kind,
            start_date: model.start_date,
            start_time: model.start_time,
            end_date: model.end_date,
            end_time: model.end_time,
            interest_id: model.interest_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvailabilityResponse {
    pub entity_id: Uuid,
    pub available: bool,
}

/// Create a booking
#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created", body = ApiResponse<BookingSummary>),
        (status = 400, description = "Invalid window", body = crate::errors::ErrorResponse),
        (status = 409, description = "Time unavailable", body = crate::errors::ErrorResponse)
    ),
    tag = "bookings"
)]
pub async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BookingSummary>>), ServiceError> {
    let window = BookingWindow::new(
        payload.start_date,
        payload.start_time,
        payload.end_date,
        payload.end_time,
    )?;

    let created = state
        .services
        .bookings
        .create_booking(NewBooking {
            owner_profile_id: payload.owner_profile_id,
            entity_id: payload.entity_id,
            entity_kind: payload.entity_kind,
            window,
            interest_id: None,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(BookingSummary::from(created))),
    ))
}

/// Check whether an entity is free for a window without booking it
#[utoipa::path(
    post,
    path = "/api/v1/bookings/validate",
    request_body = ValidateBookingRequest,
    responses(
        (status = 200, description = "Window is free", body = ApiResponse<AvailabilityResponse>),
        (status = 409, description = "Time unavailable", body = crate::errors::ErrorResponse)
    ),
    tag = "bookings"
)]
pub async fn validate_booking(
    State(state): State<AppState>,
    Json(payload): Json<ValidateBookingRequest>,
) -> ApiResult<AvailabilityResponse> {
    let window = BookingWindow::new(
        payload.start_date,
        payload.start_time,
        payload.end_date,
        payload.end_time,
    )?;

    state
        .services
        .bookings
        .validate_booking(payload.entity_id, &window, payload.exclude_booking_id)
        .await?;

    Ok(Json(ApiResponse::success(AvailabilityResponse {
        entity_id: payload.entity_id,
        available: true,
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/:id",
    params(
        ("id" = Uuid, Path, description = "Booking ID")
    ),
    responses(
        (status = 200, description = "Booking fetched", body = ApiResponse<BookingSummary>),
        (status = 404, description = "Booking not found", body = crate::errors::ErrorResponse)
    ),
    tag = "bookings"
)]
pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<BookingSummary> {
    let booking = state.services.bookings.get_booking(id).await?;
    Ok(Json(ApiResponse::success(BookingSummary::from(booking))))
}

/// Move a booking to a new window; the booking itself is ignored by the conflict check
#[utoipa::path(
    put,
    path = "/api/v1/bookings/:id",
    params(
        ("id" = Uuid, Path, description = "Booking ID")
    ),
    request_body = WindowRequest,
    responses(
        (status = 200, description = "Booking rescheduled", body = ApiResponse<BookingSummary>),
        (status = 404, description = "Booking not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Time unavailable", body = crate::errors::ErrorResponse)
    ),
    tag = "bookings"
)]
pub async fn update_booking_window(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<WindowRequest>,
) -> ApiResult<BookingSummary> {
    let window = payload.window()?;
    let updated = state
        .services
        .bookings
        .update_booking_window(id, window)
        .await?;
    Ok(Json(ApiResponse::success(BookingSummary::from(updated))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/bookings/:id",
    params(
        ("id" = Uuid, Path, description = "Booking ID")
    ),
    responses(
        (status = 204, description = "Booking cancelled"),
        (status = 404, description = "Booking not found", body = crate::errors::ErrorResponse)
    ),
    tag = "bookings"
)]
pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.bookings.cancel_booking(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Bookings claiming an artist or space, earliest first
#[utoipa::path(
    get,
    path = "/api/v1/entities/:id/bookings",
    params(
        ("id" = Uuid, Path, description = "Artist or space profile ID")
    ),
    responses(
        (status = 200, description = "Bookings listed", body = ApiResponse<Vec<BookingSummary>>)
    ),
    tag = "bookings"
)]
pub async fn list_entity_bookings(
    State(state): State<AppState>,
    Path(entity_id): Path<Uuid>,
) -> ApiResult<Vec<BookingSummary>> {
    let bookings = state
        .services
        .bookings
        .list_bookings_for_entity(entity_id)
        .await?
        .into_iter()
        .map(BookingSummary::from)
        .collect();
    Ok(Json(ApiResponse::success(bookings)))
}
