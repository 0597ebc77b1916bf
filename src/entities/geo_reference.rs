use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::normalize::{normalize_city, normalize_state};
use crate::models::Coordinate;

/// Representative coordinate for a (city, state) pair.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "geo_references")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub city: String,
    pub state: String,
    /// Derived from `city`; recomputed on every save.
    pub normalized_city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Model {
    pub fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::new(self.latitude, self.longitude).ok()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;

        if insert {
            if let ActiveValue::NotSet = active_model.id {
                active_model.id = Set(Uuid::new_v4());
            }
        }

        // Keep the lookup key in step with city/state whenever either is written
        let normalized = match &active_model.city {
            ActiveValue::Set(city) | ActiveValue::Unchanged(city) => Some(normalize_city(city)),
            ActiveValue::NotSet => None,
        };
        if let Some(normalized) = normalized {
            active_model.normalized_city = Set(normalized);
        }
        let state = match &active_model.state {
            ActiveValue::Set(state) => Some(normalize_state(state)),
            _ => None,
        };
        if let Some(state) = state {
            active_model.state = Set(state);
        }

        active_model.updated_at = Set(Utc::now());

        Ok(active_model)
    }
}
