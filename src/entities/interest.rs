use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::InterestStatus;

/// An offer from one profile to another.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "interests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub interested_profile_id: Uuid,
    pub target_profile_id: Uuid,
    pub proposed_date: NaiveDate,
    pub proposed_start_time: NaiveTime,
    pub duration_hours: f64,
    pub offered_hourly_rate: Decimal,
    pub offered_cover_charge: Decimal,
    #[sea_orm(column_type = "Text", nullable)]
    pub message: Option<String>,
    pub status: InterestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();

        if insert {
            active_model.created_at = Set(now);
            if let ActiveValue::NotSet = active_model.id {
                active_model.id = Set(Uuid::new_v4());
            }
            if let ActiveValue::NotSet = active_model.status {
                active_model.status = Set(InterestStatus::AwaitingConfirmation);
            }
        }

        active_model.updated_at = Set(Some(now));

        Ok(active_model)
    }
}
