//! Booking conflict detection. Stateless; callers serialize check and commit per entity.

use metrics::counter;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::entities::booking;
use crate::errors::ServiceError;
use crate::models::BookingWindow;
use crate::repositories::BookingRepository;

/// Ids of `existing` bookings whose window overlaps `proposed`, in input order.
///
/// Rows whose stored window is invalid are skipped with a warning.
pub fn find_conflicts(proposed: &BookingWindow, existing: &[booking::Model]) -> Vec<Uuid> {
    existing
        .iter()
        .filter(|row| match row.window() {
            Ok(window) => window.overlaps(proposed),
            Err(e) => {
                warn!(booking_id = %row.id, error = %e, "skipping booking with invalid window");
                false
            }
        })
        .map(|row| row.id)
        .collect()
}

#[derive(Clone)]
pub struct BookingConflictDetector {
    bookings: Arc<dyn BookingRepository>,
}

impl BookingConflictDetector {
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self { bookings }
    }

    /// Fails with `BookingConflict` listing every overlapping booking of `entity_id`
    /// other than `exclude`.
    #[instrument(skip(self), fields(window = %proposed))]
    pub async fn check_conflict(
        &self,
        entity_id: Uuid,
        proposed: &BookingWindow,
        exclude: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let existing = self.bookings.list_for_entity(entity_id, exclude).await?;
        let conflicting_ids = find_conflicts(proposed, &existing);

        if conflicting_ids.is_empty() {
            debug!(checked = existing.len(), "no conflicting bookings");
            return Ok(());
        }

        counter!("booking_conflicts_total", 1);
        debug!(conflicts = conflicting_ids.len(), "booking window unavailable");
        Err(ServiceError::BookingConflict { conflicting_ids })
    }
}
