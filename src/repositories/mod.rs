//! Store boundaries of the matching core.
//!
//! Each collaborator is a trait so the services run unchanged against the
//! SeaORM-backed stores in production and the `DashMap` stores in [`memory`].

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{booking, geo_reference, interest, postal_code, profile};
use crate::errors::ServiceError;
use crate::models::{BookingWindow, BoundingBox, Coordinate, InterestStatus, ProfileKind};

pub mod booking_repository;
pub mod geo_reference_repository;
pub mod interest_repository;
pub mod memory;
pub mod profile_repository;

pub use booking_repository::{BookingRepositoryImpl, NewBooking};
pub use geo_reference_repository::{GeoReferenceRepositoryImpl, PostalCodeRepositoryImpl};
pub use interest_repository::{InterestRepositoryImpl, NewInterest};
pub use profile_repository::{CandidateCriteria, ProfileRepositoryImpl};

/// Repository trait for common database operations
pub trait Repository {
    fn get_db(&self) -> &DatabaseConnection;
}

#[derive(Debug, Clone)]
pub struct BaseRepository {
    db: Arc<DatabaseConnection>,
}

impl BaseRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl Repository for BaseRepository {
    fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// (city, state) to coordinate table.
#[async_trait]
pub trait GeoReferenceRepository: Send + Sync {
    /// Rows whose normalized key matches, ordered by city.
    async fn find_by_normalized(
        &self,
        normalized_city: &str,
        state: &str,
    ) -> Result<Vec<geo_reference::Model>, ServiceError>;

    /// Inserts or updates the row keyed on exact (city, state), recomputing its normalized key.
    async fn upsert(
        &self,
        city: &str,
        state: &str,
        coordinate: Coordinate,
    ) -> Result<geo_reference::Model, ServiceError>;

    async fn all(&self) -> Result<Vec<geo_reference::Model>, ServiceError>;

    /// Overwrites the derived lookup columns of one row.
    async fn set_lookup_keys(
        &self,
        id: Uuid,
        normalized_city: &str,
        state: &str,
    ) -> Result<(), ServiceError>;
}

#[async_trait]
pub trait PostalCodeRepository: Send + Sync {
    /// `code` must already be normalized.
    async fn find(&self, code: &str) -> Result<Option<postal_code::Model>, ServiceError>;

    async fn upsert(
        &self,
        code: &str,
        city: &str,
        state: &str,
    ) -> Result<postal_code::Model, ServiceError>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<profile::Model>, ServiceError>;

    /// Profiles matching `criteria`; only rows with both coordinate columns are returned.
    async fn find_candidates(
        &self,
        criteria: &CandidateCriteria,
    ) -> Result<Vec<profile::Model>, ServiceError>;

    /// Largest service radius among located profiles of `kind`; `None` when no profile has one.
    async fn max_service_radius_km(
        &self,
        kind: Option<ProfileKind>,
    ) -> Result<Option<f64>, ServiceError>;

    async fn insert(&self, profile: profile::Model) -> Result<profile::Model, ServiceError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<booking::Model>, ServiceError>;

    /// Bookings claiming `entity_id`, minus `exclude` when given.
    async fn list_for_entity(
        &self,
        entity_id: Uuid,
        exclude: Option<Uuid>,
    ) -> Result<Vec<booking::Model>, ServiceError>;

    async fn insert(&self, booking: NewBooking) -> Result<booking::Model, ServiceError>;

    async fn update_window(
        &self,
        id: Uuid,
        window: BookingWindow,
    ) -> Result<booking::Model, ServiceError>;

    /// Returns false when nothing was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError>;
}

#[async_trait]
pub trait InterestRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<interest::Model>, ServiceError>;

    async fn insert(&self, interest: NewInterest) -> Result<interest::Model, ServiceError>;

    /// Atomically moves the stored status from `expected` to `next`.
    ///
    /// Returns `None` when the row is missing or its status is no longer `expected`.
    async fn compare_and_set_status(
        &self,
        id: Uuid,
        expected: InterestStatus,
        next: InterestStatus,
    ) -> Result<Option<interest::Model>, ServiceError>;
}

/// One handle per store, either all SeaORM-backed or all in-memory.
#[derive(Clone)]
pub struct Stores {
    pub geo_references: Arc<dyn GeoReferenceRepository>,
    pub postal_codes: Arc<dyn PostalCodeRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub interests: Arc<dyn InterestRepository>,
}

impl Stores {
    pub fn database(db: Arc<DatabaseConnection>) -> Self {
        Self {
            geo_references: Arc::new(GeoReferenceRepositoryImpl::new(db.clone())),
            postal_codes: Arc::new(PostalCodeRepositoryImpl::new(db.clone())),
            profiles: Arc::new(ProfileRepositoryImpl::new(db.clone())),
            bookings: Arc::new(BookingRepositoryImpl::new(db.clone())),
            interests: Arc::new(InterestRepositoryImpl::new(db)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            geo_references: Arc::new(memory::MemoryGeoReferences::new()),
            postal_codes: Arc::new(memory::MemoryPostalCodes::new()),
            profiles: Arc::new(memory::MemoryProfiles::new()),
            bookings: Arc::new(memory::MemoryBookings::new()),
            interests: Arc::new(memory::MemoryInterests::new()),
        }
    }
}

/// Bounding box filter shared by the store implementations.
pub(crate) fn within_bounds(bounds: Option<&BoundingBox>, coordinate: Option<Coordinate>) -> bool {
    match (bounds, coordinate) {
        (_, None) => false,
        (None, Some(_)) => true,
        (Some(bounds), Some(c)) => bounds.contains(&c),
    }
}
