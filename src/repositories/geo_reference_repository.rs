use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{BaseRepository, GeoReferenceRepository, PostalCodeRepository, Repository};
use crate::entities::geo_reference::{
    self, ActiveModel as GeoActiveModel, Column as GeoColumn, Entity as GeoReference,
};
use crate::entities::postal_code::{
    self, ActiveModel as PostalActiveModel, Entity as PostalCode,
};
use crate::errors::ServiceError;
use crate::models::Coordinate;

/// SeaORM-backed geo-reference table
#[derive(Debug, Clone)]
pub struct GeoReferenceRepositoryImpl {
    base: BaseRepository,
}

impl GeoReferenceRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

#[async_trait]
impl GeoReferenceRepository for GeoReferenceRepositoryImpl {
    async fn find_by_normalized(
        &self,
        normalized_city: &str,
        state: &str,
    ) -> Result<Vec<geo_reference::Model>, ServiceError> {
        GeoReference::find()
            .filter(GeoColumn::NormalizedCity.eq(normalized_city))
            .filter(GeoColumn::State.eq(state))
            .order_by_asc(GeoColumn::City)
            .all(self.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    async fn upsert(
        &self,
        city: &str,
        state: &str,
        coordinate: Coordinate,
    ) -> Result<geo_reference::Model, ServiceError> {
        let existing = GeoReference::find()
            .filter(GeoColumn::City.eq(city))
            .filter(GeoColumn::State.eq(state))
            .one(self.get_db())
            .await?;

        // normalized_city and updated_at are filled in by before_save
        let model = match existing {
            Some(row) => {
                let mut active: GeoActiveModel = row.into();
                active.city = Set(city.to_string());
                active.latitude = Set(coordinate.latitude());
                active.longitude = Set(coordinate.longitude());
                active.update(self.get_db()).await?
            }
            None => {
                GeoActiveModel {
                    id: Set(Uuid::new_v4()),
                    city: Set(city.to_string()),
                    state: Set(state.to_string()),
                    latitude: Set(coordinate.latitude()),
                    longitude: Set(coordinate.longitude()),
                    ..Default::default()
                }
                .insert(self.get_db())
                .await?
            }
        };

        Ok(model)
    }

    async fn all(&self) -> Result<Vec<geo_reference::Model>, ServiceError> {
        GeoReference::find()
            .order_by_asc(GeoColumn::State)
            .order_by_asc(GeoColumn::City)
            .all(self.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    async fn set_lookup_keys(
        &self,
        id: Uuid,
        normalized_city: &str,
        state: &str,
    ) -> Result<(), ServiceError> {
        GeoReference::update_many()
            .col_expr(GeoColumn::NormalizedCity, Expr::value(normalized_city))
            .col_expr(GeoColumn::State, Expr::value(state))
            .col_expr(GeoColumn::UpdatedAt, Expr::value(Utc::now()))
            .filter(GeoColumn::Id.eq(id))
            .exec(self.get_db())
            .await?;
        Ok(())
    }
}

impl Repository for GeoReferenceRepositoryImpl {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}

/// SeaORM-backed postal code table
#[derive(Debug, Clone)]
pub struct PostalCodeRepositoryImpl {
    base: BaseRepository,
}

impl PostalCodeRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

#[async_trait]
impl PostalCodeRepository for PostalCodeRepositoryImpl {
    async fn find(&self, code: &str) -> Result<Option<postal_code::Model>, ServiceError> {
        PostalCode::find_by_id(code.to_string())
            .one(self.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    async fn upsert(
        &self,
        code: &str,
        city: &str,
        state: &str,
    ) -> Result<postal_code::Model, ServiceError> {
        let now = Utc::now();
        let existing = self.find(code).await?;

        let model = match existing {
            Some(row) => {
                let mut active: PostalActiveModel = row.into();
                active.city = Set(city.to_string());
                active.state = Set(state.to_string());
                active.updated_at = Set(now);
                active.update(self.get_db()).await?
            }
            None => {
                PostalActiveModel {
                    code: Set(code.to_string()),
                    city: Set(city.to_string()),
                    state: Set(state.to_string()),
                    updated_at: Set(now),
                }
                .insert(self.get_db())
                .await?
            }
        };

        Ok(model)
    }
}

impl Repository for PostalCodeRepositoryImpl {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}
