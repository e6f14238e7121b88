//! Tour entity (catalog view)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tours")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub title: String,

    /// Decimal text, e.g. "1000.00"
    pub price_per_person: String,

    #[sea_orm(nullable)]
    pub discount_price: Option<String>,

    pub max_group_size: i32,

    /// 0 = unlimited
    pub max_total_slots: i32,

    /// published | draft
    pub status: String,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
