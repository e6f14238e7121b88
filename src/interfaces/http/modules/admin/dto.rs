//! Admin DTOs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::{DashboardStats, SoldOutAlert, TourActivity};
use crate::domain::{Occupancy, Tour, TourStatus};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListBookingsParams {
    /// 1-based page number
    pub page: Option<u64>,
    /// Page size (1 to 200)
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TourActivityDto {
    pub tour_id: String,
    pub tour_title: String,
    pub active_bookings: u64,
}

impl From<TourActivity> for TourActivityDto {
    fn from(t: TourActivity) -> Self {
        Self {
            tour_id: t.tour_id,
            tour_title: t.tour_title,
            active_bookings: t.active_bookings,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    /// Sum of `total_price` over pending and paid bookings
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub total_revenue: Decimal,
    pub active_bookings: u64,
    pub cancelled_bookings: u64,
    pub total_tours: u64,
    pub active_bookings_by_tour: Vec<TourActivityDto>,
}

impl From<DashboardStats> for StatsResponse {
    fn from(s: DashboardStats) -> Self {
        Self {
            total_revenue: s.total_revenue,
            active_bookings: s.active_bookings,
            cancelled_bookings: s.cancelled_bookings,
            total_tours: s.total_tours,
            active_bookings_by_tour: s
                .active_bookings_by_tour
                .into_iter()
                .map(TourActivityDto::from)
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct OccupancyParams {
    pub tour_id: Option<String>,
    /// `YYYY-MM-DD`
    pub date: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OccupancyResponse {
    pub tour_id: String,
    pub start_date: NaiveDate,
    /// Guests on pending and paid bookings
    pub booked: u64,
    /// 0 means unlimited
    pub capacity: u32,
    /// Absent when unlimited
    pub remaining: Option<u64>,
    pub sold_out: bool,
}

impl From<Occupancy> for OccupancyResponse {
    fn from(o: Occupancy) -> Self {
        Self {
            sold_out: o.is_sold_out(),
            remaining: o.remaining(),
            tour_id: o.key.tour_id,
            start_date: o.key.start_date,
            booked: o.booked,
            capacity: o.capacity,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SoldOutParams {
    /// First date, inclusive
    pub from: Option<String>,
    /// Last date, inclusive
    pub to: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SoldOutDto {
    pub tour_id: String,
    pub tour_title: String,
    pub start_date: NaiveDate,
    pub booked: u64,
    pub capacity: u32,
}

impl From<SoldOutAlert> for SoldOutDto {
    fn from(a: SoldOutAlert) -> Self {
        Self {
            tour_id: a.occupancy.key.tour_id,
            tour_title: a.tour_title,
            start_date: a.occupancy.key.start_date,
            booked: a.occupancy.booked,
            capacity: a.occupancy.capacity,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SoldOutResponse {
    pub alerts: Vec<SoldOutDto>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TourStatusDto {
    Published,
    Draft,
}

impl From<TourStatusDto> for TourStatus {
    fn from(s: TourStatusDto) -> Self {
        match s {
            TourStatusDto::Published => TourStatus::Published,
            TourStatusDto::Draft => TourStatus::Draft,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTourStatusRequest {
    pub status: TourStatusDto,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTourCapacityRequest {
    #[validate(range(min = 1, message = "max_total_slots must be at least 1"))]
    pub max_total_slots: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TourDto {
    pub id: String,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub price_per_person: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub discount_price: Option<Decimal>,
    pub max_group_size: u32,
    pub max_total_slots: u32,
    pub status: String,
}

impl From<Tour> for TourDto {
    fn from(t: Tour) -> Self {
        Self {
            id: t.id,
            title: t.title,
            price_per_person: t.price_per_person,
            discount_price: t.discount_price,
            max_group_size: t.max_group_size,
            max_total_slots: t.max_total_slots,
            status: t.status.to_string(),
        }
    }
}
