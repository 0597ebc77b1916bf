use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::sync::Arc;
use uuid::Uuid;

use super::{BaseRepository, InterestRepository, Repository};
use crate::entities::interest::{self, ActiveModel, Column, Entity as Interest};
use crate::errors::ServiceError;
use crate::models::InterestStatus;

/// Fields of a new offer; it always starts in `AWAITING_CONFIRMATION`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInterest {
    pub interested_profile_id: Uuid,
    pub target_profile_id: Uuid,
    pub proposed_date: NaiveDate,
    pub proposed_start_time: NaiveTime,
    pub duration_hours: f64,
    pub offered_hourly_rate: Decimal,
    pub offered_cover_charge: Decimal,
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct InterestRepositoryImpl {
    base: BaseRepository,
}

impl InterestRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

#[async_trait]
impl InterestRepository for InterestRepositoryImpl {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<interest::Model>, ServiceError> {
        Interest::find_by_id(id)
            .one(self.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    async fn insert(&self, interest: NewInterest) -> Result<interest::Model, ServiceError> {
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            interested_profile_id: Set(interest.interested_profile_id),
            target_profile_id: Set(interest.target_profile_id),
            proposed_date: Set(interest.proposed_date),
            proposed_start_time: Set(interest.proposed_start_time),
            duration_hours: Set(interest.duration_hours),
            offered_hourly_rate: Set(interest.offered_hourly_rate),
            offered_cover_charge: Set(interest.offered_cover_charge),
            message: Set(interest.message),
            status: Set(InterestStatus::AwaitingConfirmation),
            ..Default::default()
        };
        model
            .insert(self.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    async fn compare_and_set_status(
        &self,
        id: Uuid,
        expected: InterestStatus,
        next: InterestStatus,
    ) -> Result<Option<interest::Model>, ServiceError> {
        // Single conditional UPDATE so concurrent transitions serialize on the row
        let result = Interest::update_many()
            .col_expr(Column::Status, Expr::value(next))
            .col_expr(Column::UpdatedAt, Expr::value(Some(Utc::now())))
            .filter(Column::Id.eq(id))
            .filter(Column::Status.eq(expected))
            .exec(self.get_db())
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.find_by_id(id).await
    }
}

impl Repository for InterestRepositoryImpl {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}
