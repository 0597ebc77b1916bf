use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::entities::booking;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::BookingWindow;
use crate::repositories::{BookingRepository, NewBooking};
use crate::services::booking_conflicts::BookingConflictDetector;

/// One async mutex per booked entity, dropped from the map once nobody holds it.
///
/// Serializes conflict check and commit within this process only.
#[derive(Clone, Default)]
struct EntityLocks {
    locks: Arc<AsyncMutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>>,
}

impl EntityLocks {
    async fn acquire(&self, entity_id: Uuid) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(entity_id)
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    async fn release(&self, entity_id: Uuid, lock: Arc<AsyncMutex<()>>) {
        let mut locks = self.locks.lock().await;
        // The map and `lock` itself account for two references
        if Arc::strong_count(&lock) <= 2 {
            if let Some(existing) = locks.get(&entity_id) {
                if Arc::ptr_eq(existing, &lock) {
                    locks.remove(&entity_id);
                }
            }
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }
}

/// Booking lifecycle. Every write path runs the conflict check under the entity's lock.
#[derive(Clone)]
pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
    detector: BookingConflictDetector,
    event_sender: EventSender,
    entity_locks: EntityLocks,
}

impl BookingService {
    pub fn new(bookings: Arc<dyn BookingRepository>, event_sender: EventSender) -> Self {
        Self {
            detector: BookingConflictDetector::new(bookings.clone()),
            bookings,
            event_sender,
            entity_locks: EntityLocks::default(),
        }
    }

    /// Read-only availability check; nothing is locked or written.
    #[instrument(skip(self))]
    pub async fn validate_booking(
        &self,
        entity_id: Uuid,
        window: &BookingWindow,
        exclude: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        self.detector.check_conflict(entity_id, window, exclude).await
    }

    #[instrument(skip(self), fields(entity_id = %booking.entity_id, window = %booking.window))]
    pub async fn create_booking(&self, booking: NewBooking) -> Result<booking::Model, ServiceError> {
        let entity_id = booking.entity_id;
        let lock = self.entity_locks.acquire(entity_id).await;
        let guard = lock.lock().await;

        let result = async {
            self.detector
                .check_conflict(entity_id, &booking.window, None)
                .await?;
            self.bookings.insert(booking).await
        }
        .await;

        drop(guard);
        self.entity_locks.release(entity_id, lock).await;

        let created = result?;
        info!(booking_id = %created.id, "booking created");
        self.event_sender
            .send_or_log(Event::BookingCreated {
                booking_id: created.id,
                entity_id: created.entity_id,
                interest_id: created.interest_id,
            })
            .await;
        Ok(created)
    }

    /// Moves a booking to `window`, checking only against the entity's other bookings.
    #[instrument(skip(self))]
    pub async fn update_booking_window(
        &self,
        id: Uuid,
        window: BookingWindow,
    ) -> Result<booking::Model, ServiceError> {
        let entity_id = self.get_booking(id).await?.entity_id;
        let lock = self.entity_locks.acquire(entity_id).await;
        let guard = lock.lock().await;

        let result = async {
            // Re-read under the lock; the booking may have been cancelled meanwhile
            self.get_booking(id).await?;
            self.detector
                .check_conflict(entity_id, &window, Some(id))
                .await?;
            self.bookings.update_window(id, window).await
        }
        .await;

        drop(guard);
        self.entity_locks.release(entity_id, lock).await;

        let updated = result?;
        info!(booking_id = %id, "booking rescheduled");
        self.event_sender
            .send_or_log(Event::BookingRescheduled {
                booking_id: id,
                entity_id,
            })
            .await;
        Ok(updated)
    }

    /// Cancellation deletes the booking.
    #[instrument(skip(self))]
    pub async fn cancel_booking(&self, id: Uuid) -> Result<(), ServiceError> {
        let entity_id = self.get_booking(id).await?.entity_id;
        let lock = self.entity_locks.acquire(entity_id).await;
        let guard = lock.lock().await;

        let result = self.bookings.delete(id).await;

        drop(guard);
        self.entity_locks.release(entity_id, lock).await;

        if !result? {
            return Err(ServiceError::NotFound(format!("Booking {} not found", id)));
        }
        info!(booking_id = %id, "booking cancelled");
        self.event_sender
            .send_or_log(Event::BookingCancelled {
                booking_id: id,
                entity_id,
            })
            .await;
        Ok(())
    }

    pub async fn get_booking(&self, id: Uuid) -> Result<booking::Model, ServiceError> {
        self.bookings
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Booking {} not found", id)))
    }

    /// All bookings of an entity, earliest start first.
    pub async fn list_bookings_for_entity(
        &self,
        entity_id: Uuid,
    ) -> Result<Vec<booking::Model>, ServiceError> {
        let mut rows = self.bookings.list_for_entity(entity_id, None).await?;
        rows.sort_by_key(|b| (b.start_date, b.start_time, b.id));
        Ok(rows)
    }
}
