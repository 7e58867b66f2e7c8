//! Order entity - The header row of a committed checkout.
//!
//! Orders are immutable once written: there is no update or delete path for them.
//! `total_amount` always equals the sum of the order's line subtotals.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier, assigned on commit
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Sum of all line subtotals in minor currency units
    pub total_amount: i64,
    /// Commit timestamp
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One order has many lines
    #[sea_orm(has_many = "super::order_line::Entity")]
    OrderLines,
}

impl Related<super::order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
