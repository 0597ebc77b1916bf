//! Interest negotiation: creation, status transitions and the acceptance hook.

use async_trait::async_trait;
use chrono::Utc;
use metrics::counter;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{booking, interest};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{BookingWindow, InterestParty, InterestStatus};
use crate::repositories::{InterestRepository, NewBooking, NewInterest, ProfileRepository};
use crate::services::bookings::BookingService;

/// Downstream reaction to a committed ACCEPTED transition.
#[async_trait]
pub trait AcceptanceHook: Send + Sync {
    /// Runs after the status is stored; an error here never undoes the acceptance.
    async fn on_accepted(
        &self,
        interest: &interest::Model,
    ) -> Result<Option<booking::Model>, ServiceError>;
}

/// Books the target profile over the accepted proposal's window.
#[derive(Clone)]
pub struct BookingOnAcceptance {
    bookings: BookingService,
    profiles: Arc<dyn ProfileRepository>,
}

impl BookingOnAcceptance {
    pub fn new(bookings: BookingService, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { bookings, profiles }
    }
}

#[async_trait]
impl AcceptanceHook for BookingOnAcceptance {
    async fn on_accepted(
        &self,
        interest: &interest::Model,
    ) -> Result<Option<booking::Model>, ServiceError> {
        let target = self
            .profiles
            .find_by_id(interest.target_profile_id)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Profile {} not found", interest.target_profile_id))
            })?;

        let window = BookingWindow::starting_at(
            interest.proposed_date,
            interest.proposed_start_time,
            interest.duration_hours,
        )?;

        let created = self
            .bookings
            .create_booking(NewBooking {
                owner_profile_id: interest.interested_profile_id,
                entity_id: target.id,
                entity_kind: target.kind,
                window,
                interest_id: Some(interest.id),
            })
            .await?;
        Ok(Some(created))
    }
}

/// Result of a committed transition.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransitionOutcome {
    #[schema(value_type = Object)]
    pub interest: interest::Model,
    /// Booking created by the acceptance hook, if one ran and succeeded.
    #[schema(value_type = Option<Object>)]
    pub booking: Option<booking::Model>,
    /// Message of the acceptance hook failure; the transition itself stands.
    pub hook_error: Option<String>,
}

/// Input for a new interest.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateInterest {
    pub interested_profile_id: Uuid,
    pub target_profile_id: Uuid,
    pub proposed_date: chrono::NaiveDate,
    pub proposed_start_time: chrono::NaiveTime,
    pub duration_hours: f64,
    pub offered_hourly_rate: Decimal,
    pub offered_cover_charge: Decimal,
    pub message: Option<String>,
}

#[derive(Clone)]
pub struct InterestService {
    interests: Arc<dyn InterestRepository>,
    profiles: Arc<dyn ProfileRepository>,
    event_sender: EventSender,
    acceptance_hook: Option<Arc<dyn AcceptanceHook>>,
}

impl InterestService {
    pub fn new(
        interests: Arc<dyn InterestRepository>,
        profiles: Arc<dyn ProfileRepository>,
        event_sender: EventSender,
    ) -> Self {
        Self {
            interests,
            profiles,
            event_sender,
            acceptance_hook: None,
        }
    }

    pub fn with_acceptance_hook(mut self, hook: Arc<dyn AcceptanceHook>) -> Self {
        self.acceptance_hook = Some(hook);
        self
    }

    #[instrument(skip(self, request), fields(interested = %request.interested_profile_id, target = %request.target_profile_id))]
    pub async fn create_interest(
        &self,
        request: CreateInterest,
    ) -> Result<interest::Model, ServiceError> {
        if request.interested_profile_id == request.target_profile_id {
            return Err(ServiceError::ValidationError(
                "a profile cannot register interest in itself".to_string(),
            ));
        }
        // Same bounds a booking made from this interest would need
        BookingWindow::starting_at(
            request.proposed_date,
            request.proposed_start_time,
            request.duration_hours,
        )?;
        if request.offered_hourly_rate.is_sign_negative()
            || request.offered_cover_charge.is_sign_negative()
        {
            return Err(ServiceError::ValidationError(
                "offered amounts must not be negative".to_string(),
            ));
        }
        for id in [request.interested_profile_id, request.target_profile_id] {
            if self.profiles.find_by_id(id).await?.is_none() {
                return Err(ServiceError::NotFound(format!("Profile {} not found", id)));
            }
        }

        let created = self
            .interests
            .insert(NewInterest {
                interested_profile_id: request.interested_profile_id,
                target_profile_id: request.target_profile_id,
                proposed_date: request.proposed_date,
                proposed_start_time: request.proposed_start_time,
                duration_hours: request.duration_hours,
                offered_hourly_rate: request.offered_hourly_rate,
                offered_cover_charge: request.offered_cover_charge,
                message: request.message,
            })
            .await?;

        info!(interest_id = %created.id, "interest created");
        self.event_sender
            .send_or_log(Event::InterestCreated {
                interest_id: created.id,
                target_profile_id: created.target_profile_id,
            })
            .await;
        Ok(created)
    }

    pub async fn get_interest(&self, id: Uuid) -> Result<interest::Model, ServiceError> {
        self.interests
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Interest {} not found", id)))
    }

    /// Moves the interest to `to` without checking who asked.
    #[instrument(skip(self))]
    pub async fn transition_interest(
        &self,
        id: Uuid,
        to: InterestStatus,
    ) -> Result<TransitionOutcome, ServiceError> {
        self.transition(id, to, None).await
    }

    /// Moves the interest to `to` on behalf of `actor`, who must be the party the
    /// transition belongs to.
    #[instrument(skip(self))]
    pub async fn transition_interest_as(
        &self,
        id: Uuid,
        to: InterestStatus,
        actor: Uuid,
    ) -> Result<TransitionOutcome, ServiceError> {
        self.transition(id, to, Some(actor)).await
    }

    async fn transition(
        &self,
        id: Uuid,
        to: InterestStatus,
        actor: Option<Uuid>,
    ) -> Result<TransitionOutcome, ServiceError> {
        let current = self.get_interest(id).await?;
        let from = current.status;
        let party = from.validate_transition(to)?;

        if let Some(actor) = actor {
            let allowed = match party {
                InterestParty::Target => current.target_profile_id,
                InterestParty::Interested => current.interested_profile_id,
            };
            if actor != allowed {
                return Err(ServiceError::Forbidden(format!(
                    "only the {} profile may move an interest to {}",
                    party, to
                )));
            }
        }

        let updated = match self.interests.compare_and_set_status(id, from, to).await? {
            Some(updated) => updated,
            None => {
                // Lost a race: report against whatever is stored now
                let actual = self.get_interest(id).await?;
                warn!(interest_id = %id, expected = %from, actual = %actual.status, "interest status changed concurrently");
                return Err(ServiceError::InvalidStateTransition {
                    from: actual.status,
                    to,
                });
            }
        };

        counter!("interest_transitions_total", 1, "to" => to.to_string());
        info!(interest_id = %id, %from, %to, "interest transitioned");
        self.event_sender
            .send_or_log(Event::InterestTransitioned {
                interest_id: id,
                from,
                to,
                at: Utc::now(),
            })
            .await;

        let mut outcome = TransitionOutcome {
            interest: updated,
            booking: None,
            hook_error: None,
        };

        if to == InterestStatus::Accepted {
            self.event_sender
                .send_or_log(Event::InterestAccepted {
                    interest_id: id,
                    interested_profile_id: outcome.interest.interested_profile_id,
                    target_profile_id: outcome.interest.target_profile_id,
                })
                .await;

            if let Some(hook) = &self.acceptance_hook {
                match hook.on_accepted(&outcome.interest).await {
                    Ok(booking) => outcome.booking = booking,
                    Err(e) => {
                        error!(interest_id = %id, error = %e, "acceptance hook failed");
                        outcome.hook_error = Some(e.response_message());
                    }
                }
            }
        }

        Ok(outcome)
    }
}
