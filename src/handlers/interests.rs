use crate::{
    entities::interest,
    errors::ServiceError,
    handlers::bookings::BookingSummary,
    models::InterestStatus,
    services::interests::{CreateInterest, TransitionOutcome},
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "interested_profile_id": "5f0c3c8e-2a4b-4a53-9a0e-0d6c2f1b7a10",
    "target_profile_id": "9b2d1a77-3c5e-4f0a-8e61-7f4b2c9d0e21",
    "proposed_date": "2025-08-02",
    "proposed_start_time": "20:00:00",
    "duration_hours": 3.0,
    "offered_hourly_rate": "150.00",
    "offered_cover_charge": "20.00",
    "message": "Friday night jazz set?"
}))]
pub struct CreateInterestRequest {
    /// Profile making the offer
    pub interested_profile_id: Uuid,
    /// Profile receiving the offer
    pub target_profile_id: Uuid,
    pub proposed_date: NaiveDate,
    #[schema(value_type = String, example = "20:00:00")]
    pub proposed_start_time: NaiveTime,
    pub duration_hours: f64,
    #[serde(default)]
    #[schema(value_type = String, example = "150.00")]
    pub offered_hourly_rate: Decimal,
    #[serde(default)]
    #[schema(value_type = String, example = "20.00")]
    pub offered_cover_charge: Decimal,
    #[validate(length(max = 2000))]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransitionInterestRequest {
    /// Requested status
    pub to: InterestStatus,
    /// Profile performing the transition; when given it must be the party allowed to make it
    pub actor_profile_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InterestSummary {
    pub id: Uuid,
    pub interested_profile_id: Uuid,
    pub target_profile_id: Uuid,
    pub proposed_date: NaiveDate,
    #[schema(value_type = String)]
    pub proposed_start_time: NaiveTime,
    pub duration_hours: f64,
    #[schema(value_type = String)]
    pub offered_hourly_rate: Decimal,
    #[schema(value_type = String)]
    pub offered_cover_charge: Decimal,
    pub message: Option<String>,
    pub status: InterestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<interest::Model> for InterestSummary {
    fn from(model: interest::Model) -> Self {
        Self {
            id: model.id,
            interested_profile_id: model.interested_profile_id,
            target_profile_id: model.target_profile_id,
            proposed_date: model.proposed_date,
            proposed_start_time: model.proposed_start_time,
            duration_hours: model.duration_hours,
            offered_hourly_rate: model.offered_hourly_rate,
            offered_cover_charge: model.offered_cover_charge,
            message: model.message,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransitionResponse {
    pub interest: InterestSummary,
    /// Booking created by the acceptance hook, if any
    pub booking: Option<BookingSummary>,
    /// Why the acceptance hook failed; the transition itself still stands
    pub hook_error: Option<String>,
}

impl From<TransitionOutcome> for TransitionResponse {
    fn from(outcome: TransitionOutcome) -> Self {
        Self {
            interest: outcome.interest.into(),
            booking: outcome.booking.map(BookingSummary::from),
            hook_error: outcome.hook_error,
        }
    }
}

/// Register interest in another profile
#[utoipa::path(
    post,
    path = "/api/v1/interests",
    request_body = CreateInterestRequest,
    responses(
        (status = 201, description = "Interest created", body = ApiResponse<InterestSummary>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Profile not found", body = crate::errors::ErrorResponse)
    ),
    tag = "interests"
)]
pub async fn create_interest(
    State(state): State<AppState>,
    Json(payload): Json<CreateInterestRequest>,
) -> Result<(StatusCode, Json<ApiResponse<InterestSummary>>), ServiceError> {
    payload.validate()?;

    let created = state
        .services
        .interests
        .create_interest(CreateInterest {
            interested_profile_id: payload.interested_profile_id,
            target_profile_id: payload.target_profile_id,
            proposed_date: payload.proposed_date,
            proposed_start_time: payload.proposed_start_time,
            duration_hours: payload.duration_hours,
            offered_hourly_rate: payload.offered_hourly_rate,
            offered_cover_charge: payload.offered_cover_charge,
            message: payload.message,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(InterestSummary::from(created))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/interests/:id",
    params(
        ("id" = Uuid, Path, description = "Interest ID")
    ),
    responses(
        (status = 200, description = "Interest fetched", body = ApiResponse<InterestSummary>),
        (status = 404, description = "Interest not found", body = crate::errors::ErrorResponse)
    ),
    tag = "interests"
)]
pub async fn get_interest(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<InterestSummary> {
    let interest = state.services.interests.get_interest(id).await?;
    Ok(Json(ApiResponse::success(InterestSummary::from(interest))))
}

/// Accept, reject or cancel an interest awaiting confirmation
#[utoipa::path(
    post,
    path = "/api/v1/interests/:id/transition",
    params(
        ("id" = Uuid, Path, description = "Interest ID")
    ),
    request_body = TransitionInterestRequest,
    responses(
        (status = 200, description = "Interest transitioned", body = ApiResponse<TransitionResponse>),
        (status = 403, description = "Actor may not make this transition", body = crate::errors::ErrorResponse),
        (status = 404, description = "Interest not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Invalid state transition", body = crate::errors::ErrorResponse)
    ),
    tag = "interests"
)]
pub async fn transition_interest(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransitionInterestRequest>,
) -> ApiResult<TransitionResponse> {
    let interests = &state.services.interests;
    let outcome = match payload.actor_profile_id {
        Some(actor) => {
            interests
                .transition_interest_as(id, payload.to, actor)
                .await?
        }
        None => interests.transition_interest(id, payload.to).await?,
    };
    Ok(Json(ApiResponse::success(TransitionResponse::from(outcome))))
}
