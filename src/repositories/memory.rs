//! In-process stores backed by `DashMap`, used by tests and the database-less dev mode.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    BookingRepository, CandidateCriteria, GeoReferenceRepository, InterestRepository, NewBooking,
    NewInterest, PostalCodeRepository, ProfileRepository,
};
use crate::entities::{booking, geo_reference, interest, postal_code, profile};
use crate::errors::ServiceError;
use crate::models::normalize::{normalize_city, normalize_state};
use crate::models::{BookingWindow, Coordinate, InterestStatus, ProfileKind};

#[derive(Debug, Default)]
pub struct MemoryGeoReferences {
    rows: DashMap<Uuid, geo_reference::Model>,
    // Serializes the read-then-write of upserts keyed on (city, state)
    write_lock: Mutex<()>,
}

impl MemoryGeoReferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a row verbatim, bypassing key normalization. Used to simulate legacy data.
    pub fn insert_raw(&self, row: geo_reference::Model) {
        self.rows.insert(row.id, row);
    }
}

#[async_trait]
impl GeoReferenceRepository for MemoryGeoReferences {
    async fn find_by_normalized(
        &self,
        normalized_city: &str,
        state: &str,
    ) -> Result<Vec<geo_reference::Model>, ServiceError> {
        let mut found: Vec<_> = self
            .rows
            .iter()
            .filter(|row| row.normalized_city == normalized_city && row.state == state)
            .map(|row| row.value().clone())
            .collect();
        found.sort_by(|a, b| a.city.cmp(&b.city).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn upsert(
        &self,
        city: &str,
        state: &str,
        coordinate: Coordinate,
    ) -> Result<geo_reference::Model, ServiceError> {
        let _guard = self.write_lock.lock().await;
        let state = normalize_state(state);

        let existing_id = self
            .rows
            .iter()
            .find(|row| row.city == city && row.state == state)
            .map(|row| row.id);

        let model = geo_reference::Model {
            id: existing_id.unwrap_or_else(Uuid::new_v4),
            city: city.to_string(),
            state,
            normalized_city: normalize_city(city),
            latitude: coordinate.latitude(),
            longitude: coordinate.longitude(),
            updated_at: Utc::now(),
        };
        self.rows.insert(model.id, model.clone());
        Ok(model)
    }

    async fn all(&self) -> Result<Vec<geo_reference::Model>, ServiceError> {
        let mut rows: Vec<_> = self.rows.iter().map(|row| row.value().clone()).collect();
        rows.sort_by(|a, b| a.state.cmp(&b.state).then(a.city.cmp(&b.city)));
        Ok(rows)
    }

    async fn set_lookup_keys(
        &self,
        id: Uuid,
        normalized_city: &str,
        state: &str,
    ) -> Result<(), ServiceError> {
        let _guard = self.write_lock.lock().await;
        if let Some(mut row) = self.rows.get_mut(&id) {
            row.normalized_city = normalized_city.to_string();
            row.state = state.to_string();
            row.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryPostalCodes {
    rows: DashMap<String, postal_code::Model>,
}

impl MemoryPostalCodes {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostalCodeRepository for MemoryPostalCodes {
    async fn find(&self, code: &str) -> Result<Option<postal_code::Model>, ServiceError> {
        Ok(self.rows.get(code).map(|row| row.value().clone()))
    }

    async fn upsert(
        &self,
        code: &str,
        city: &str,
        state: &str,
    ) -> Result<postal_code::Model, ServiceError> {
        let model = postal_code::Model {
            code: code.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            updated_at: Utc::now(),
        };
        self.rows.insert(model.code.clone(), model.clone());
        Ok(model)
    }
}

#[derive(Debug, Default)]
pub struct MemoryProfiles {
    rows: DashMap<Uuid, profile::Model>,
}

impl MemoryProfiles {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileRepository for MemoryProfiles {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<profile::Model>, ServiceError> {
        Ok(self.rows.get(&id).map(|row| row.value().clone()))
    }

    async fn find_candidates(
        &self,
        criteria: &CandidateCriteria,
    ) -> Result<Vec<profile::Model>, ServiceError> {
        let mut found: Vec<_> = self
            .rows
            .iter()
            .filter(|row| criteria.matches(row.value()))
            .map(|row| row.value().clone())
            .collect();
        found.sort_by_key(|p| p.id);
        Ok(found)
    }

    async fn max_service_radius_km(
        &self,
        kind: Option<ProfileKind>,
    ) -> Result<Option<f64>, ServiceError> {
        Ok(self
            .rows
            .iter()
            .filter(|row| kind.map_or(true, |k| row.kind == k) && row.coordinate().is_some())
            .filter_map(|row| row.service_radius_km)
            .reduce(f64::max))
    }

    async fn insert(&self, profile: profile::Model) -> Result<profile::Model, ServiceError> {
        if self.rows.contains_key(&profile.id) {
            return Err(ServiceError::ValidationError(format!(
                "profile {} already exists",
                profile.id
            )));
        }
        self.rows.insert(profile.id, profile.clone());
        Ok(profile)
    }
}

#[derive(Debug, Default)]
pub struct MemoryBookings {
    rows: DashMap<Uuid, booking::Model>,
}

impl MemoryBookings {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingRepository for MemoryBookings {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<booking::Model>, ServiceError> {
        Ok(self.rows.get(&id).map(|row| row.value().clone()))
    }

    async fn list_for_entity(
        &self,
        entity_id: Uuid,
        exclude: Option<Uuid>,
    ) -> Result<Vec<booking::Model>, ServiceError> {
        let mut found: Vec<_> = self
            .rows
            .iter()
            .filter(|row| row.entity_id == entity_id && Some(row.id) != exclude)
            .map(|row| row.value().clone())
            .collect();
        found.sort_by_key(|b| (b.start_date, b.start_time, b.id));
        Ok(found)
    }

    async fn insert(&self, booking: NewBooking) -> Result<booking::Model, ServiceError> {
        let start = booking.window.start();
        let end = booking.window.end();
        let now = Utc::now();
        let model = booking::Model {
            id: Uuid::new_v4(),
            owner_profile_id: booking.owner_profile_id,
            entity_id: booking.entity_id,
            entity_kind: booking.entity_kind,
            start_date: start.date(),
            start_time: start.time(),
            end_date: end.date(),
            end_time: end.time(),
            interest_id: booking.interest_id,
            created_at: now,
            updated_at: Some(now),
        };
        self.rows.insert(model.id, model.clone());
        Ok(model)
    }

    async fn update_window(
        &self,
        id: Uuid,
        window: BookingWindow,
    ) -> Result<booking::Model, ServiceError> {
        let mut row = self
            .rows
            .get_mut(&id)
            .ok_or_else(|| ServiceError::NotFound(format!("Booking {} not found", id)))?;
        row.start_date = window.start().date();
        row.start_time = window.start().time();
        row.end_date = window.end().date();
        row.end_time = window.end().time();
        row.updated_at = Some(Utc::now());
        Ok(row.value().clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        Ok(self.rows.remove(&id).is_some())
    }
}

#[derive(Debug, Default)]
pub struct MemoryInterests {
    rows: DashMap<Uuid, interest::Model>,
}

impl MemoryInterests {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InterestRepository for MemoryInterests {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<interest::Model>, ServiceError> {
        Ok(self.rows.get(&id).map(|row| row.value().clone()))
    }

    async fn insert(&self, interest: NewInterest) -> Result<interest::Model, ServiceError> {
        let now = Utc::now();
        let model = interest::Model {
            id: Uuid::new_v4(),
            interested_profile_id: interest.interested_profile_id,
            target_profile_id: interest.target_profile_id,
            proposed_date: interest.proposed_date,
            proposed_start_time: interest.proposed_start_time,
            duration_hours: interest.duration_hours,
            offered_hourly_rate: interest.offered_hourly_rate,
            offered_cover_charge: interest.offered_cover_charge,
            message: interest.message,
            status: InterestStatus::AwaitingConfirmation,
            created_at: now,
            updated_at: Some(now),
        };
        self.rows.insert(model.id, model.clone());
        Ok(model)
    }

    async fn compare_and_set_status(
        &self,
        id: Uuid,
        expected: InterestStatus,
        next: InterestStatus,
    ) -> Result<Option<interest::Model>, ServiceError> {
        // get_mut holds the shard write lock for the whole check-and-set
        let Some(mut row) = self.rows.get_mut(&id) else {
            return Ok(None);
        };
        if row.status != expected {
            return Ok(None);
        }
        row.status = next;
        row.updated_at = Some(Utc::now());
        Ok(Some(row.value().clone()))
    }
}
