use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Postal code to (city, state) mapping used only for postal-code searches.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "postal_codes")]
pub struct Model {
    /// Normalized code (alphanumerics only, uppercased).
    #[sea_orm(primary_key, auto_increment = false)]
    pub code: String,
    pub city: String,
    pub state: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
