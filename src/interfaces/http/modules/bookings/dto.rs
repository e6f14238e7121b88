//! Booking DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::BookingRequest;
use crate::domain::Booking;

/// Booking submission body.
///
/// Any price the client sends is ignored; the server prices from the catalog.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateBookingRequest {
    pub tour_id: Option<String>,
    /// `YYYY-MM-DD`
    #[schema(example = "2026-12-01")]
    pub start_date: Option<String>,
    #[schema(value_type = Option<i64>, example = 2)]
    pub guests_count: Option<serde_json::Number>,
    pub phone_number: Option<String>,
}

impl From<CreateBookingRequest> for BookingRequest {
    fn from(r: CreateBookingRequest) -> Self {
        Self {
            tour_id: r.tour_id,
            start_date: r.start_date,
            guests_count: r.guests_count,
            phone_number: r.phone_number,
        }
    }
}

/// What the caller gets back after admission
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedBooking {
    pub id: Uuid,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub total_price: Decimal,
    #[schema(example = "pending")]
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedBookingResponse {
    pub booking: CreatedBooking,
}

impl From<&Booking> for CreatedBookingResponse {
    fn from(b: &Booking) -> Self {
        Self {
            booking: CreatedBooking {
                id: b.id,
                total_price: b.total_price,
                status: b.status.to_string(),
            },
        }
    }
}

/// Full booking record, including the cancellation audit fields
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingDto {
    pub id: Uuid,
    /// Short reference shown to travelers
    pub reference: String,
    pub tour_id: String,
    pub user_id: String,
    pub start_date: NaiveDate,
    pub guests_count: u32,
    pub phone_number: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub total_price: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl From<Booking> for BookingDto {
    fn from(b: Booking) -> Self {
        Self {
            reference: b.reference(),
            id: b.id,
            tour_id: b.tour_id,
            user_id: b.user_id,
            start_date: b.start_date,
            guests_count: b.guests_count,
            phone_number: b.phone_number,
            total_price: b.total_price,
            status: b.status.to_string(),
            created_at: b.created_at,
            cancelled_by: b.cancelled_by,
            cancelled_at: b.cancelled_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingResponse {
    pub booking: BookingDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingListResponse {
    pub bookings: Vec<BookingDto>,
}
