//! Submission entity for the database storage backend.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unit number of the reporting resident (1–9999)
    pub unit_number: i32,
    /// Resident name, trimmed, at most 50 characters
    #[sea_orm(column_type = "String(StringLen::N(50))")]
    pub name: String,
    /// Wall-clock timestamp string `YYYY-MM-DD HH:mm:ss` in the configured offset
    #[sea_orm(column_type = "String(StringLen::N(19))")]
    pub submitted_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
