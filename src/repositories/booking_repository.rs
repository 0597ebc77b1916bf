use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{BaseRepository, BookingRepository, Repository};
use crate::entities::booking::{self, ActiveModel, Column, Entity as Booking};
use crate::errors::ServiceError;
use crate::models::{BookingWindow, ProfileKind};

/// Fields needed to persist a booking; ids and timestamps are assigned on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub owner_profile_id: Uuid,
    pub entity_id: Uuid,
    pub entity_kind: ProfileKind,
    pub window: BookingWindow,
    pub interest_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct BookingRepositoryImpl {
    base: BaseRepository,
}

impl BookingRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

#[async_trait]
impl BookingRepository for BookingRepositoryImpl {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<booking::Model>, ServiceError> {
        Booking::find_by_id(id)
            .one(self.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    async fn list_for_entity(
        &self,
        entity_id: Uuid,
        exclude: Option<Uuid>,
    ) -> Result<Vec<booking::Model>, ServiceError> {
        let mut query = Booking::find().filter(Column::EntityId.eq(entity_id));
        if let Some(excluded) = exclude {
            query = query.filter(Column::Id.ne(excluded));
        }
        query
            .order_by_asc(Column::StartDate)
            .order_by_asc(Column::StartTime)
            .all(self.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    async fn insert(&self, booking: NewBooking) -> Result<booking::Model, ServiceError> {
        let start = booking.window.start();
        let end = booking.window.end();
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_profile_id: Set(booking.owner_profile_id),
            entity_id: Set(booking.entity_id),
            entity_kind: Set(booking.entity_kind),
            start_date: Set(start.date()),
            start_time: Set(start.time()),
            end_date: Set(end.date()),
            end_time: Set(end.time()),
            interest_id: Set(booking.interest_id),
            ..Default::default()
        };
        model
            .insert(self.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    async fn update_window(
        &self,
        id: Uuid,
        window: BookingWindow,
    ) -> Result<booking::Model, ServiceError> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Booking {} not found", id)))?;

        let mut active: ActiveModel = existing.into();
        active.start_date = Set(window.start().date());
        active.start_time = Set(window.start().time());
        active.end_date = Set(window.end().date());
        active.end_time = Set(window.end().time());
        active
            .update(self.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        let result = Booking::delete_by_id(id).exec(self.get_db()).await?;
        Ok(result.rows_affected > 0)
    }
}

impl Repository for BookingRepositoryImpl {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}
