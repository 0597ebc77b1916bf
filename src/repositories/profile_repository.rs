use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, QuerySelect,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{within_bounds, BaseRepository, ProfileRepository, Repository};
use crate::entities::profile::{self, Column, Entity as Profile};
use crate::errors::ServiceError;
use crate::models::{BoundingBox, ProfileKind};

/// Filters applied by the store before exact distance checks.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CandidateCriteria {
    pub kind: Option<ProfileKind>,
    pub bounds: Option<BoundingBox>,
}

impl CandidateCriteria {
    pub fn matches(&self, profile: &profile::Model) -> bool {
        if let Some(kind) = self.kind {
            if profile.kind != kind {
                return false;
            }
        }
        within_bounds(self.bounds.as_ref(), profile.coordinate())
    }
}

#[derive(Debug, Clone)]
pub struct ProfileRepositoryImpl {
    base: BaseRepository,
}

impl ProfileRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

#[async_trait]
impl ProfileRepository for ProfileRepositoryImpl {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<profile::Model>, ServiceError> {
        Profile::find_by_id(id)
            .one(self.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    async fn find_candidates(
        &self,
        criteria: &CandidateCriteria,
    ) -> Result<Vec<profile::Model>, ServiceError> {
        let mut condition = Condition::all()
            .add(Column::Latitude.is_not_null())
            .add(Column::Longitude.is_not_null());

        if let Some(kind) = criteria.kind {
            condition = condition.add(Column::Kind.eq(kind));
        }
        if let Some(bounds) = criteria.bounds {
            condition = condition
                .add(Column::Latitude.between(bounds.min_latitude, bounds.max_latitude))
                .add(Column::Longitude.between(bounds.min_longitude, bounds.max_longitude));
        }

        let rows = Profile::find()
            .filter(condition)
            .order_by_asc(Column::Id)
            .all(self.get_db())
            .await?;

        // Out-of-range stored values are dropped here rather than in SQL
        Ok(rows
            .into_iter()
            .filter(|row| criteria.matches(row))
            .collect())
    }

    async fn max_service_radius_km(
        &self,
        kind: Option<ProfileKind>,
    ) -> Result<Option<f64>, ServiceError> {
        let mut condition = Condition::all()
            .add(Column::Latitude.is_not_null())
            .add(Column::Longitude.is_not_null())
            .add(Column::ServiceRadiusKm.is_not_null());
        if let Some(kind) = kind {
            condition = condition.add(Column::Kind.eq(kind));
        }

        let widest: Option<Option<f64>> = Profile::find()
            .select_only()
            .column_as(Column::ServiceRadiusKm.max(), "max_radius")
            .filter(condition)
            .into_tuple()
            .one(self.get_db())
            .await?;
        Ok(widest.flatten())
    }

    async fn insert(&self, profile: profile::Model) -> Result<profile::Model, ServiceError> {
        profile
            .into_active_model()
            .insert(self.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }
}

impl Repository for ProfileRepositoryImpl {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}
