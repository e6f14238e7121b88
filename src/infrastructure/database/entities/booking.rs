//! Booking entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub tour_id: String,
    pub user_id: String,
    pub start_date: Date,
    pub guests_count: i32,
    pub phone_number: String,

    /// Price snapshot at admission, decimal text
    pub total_price: String,

    /// pending | paid | cancelled
    pub status: String,

    pub created_at: DateTimeUtc,

    #[sea_orm(nullable)]
    pub cancelled_by: Option<String>,

    #[sea_orm(nullable)]
    pub cancelled_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
