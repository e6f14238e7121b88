//! Admin API handlers
//!
//! Mounted behind `auth_middleware` and `require_admin`; the application
//! services check the role again.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Extension, Json,
};

use super::dto::*;
use crate::application::{BookingQueries, CapacityAggregator, CatalogAdmin, PaymentRecorder};
use crate::domain::DomainError;
use crate::interfaces::http::common::{ErrorResponse, PaginatedResponse, ValidatedJson};
use crate::interfaces::http::error::ApiError;
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::modules::bookings::{parse_booking_id, BookingDto, BookingResponse};
use crate::shared::validations::{parse_calendar_date, validate_pagination};

#[derive(Clone)]
pub struct AdminState {
    pub queries: Arc<BookingQueries>,
    pub payments: Arc<PaymentRecorder>,
    pub capacity: Arc<CapacityAggregator>,
    pub catalog: Arc<CatalogAdmin>,
}

fn date_param(raw: Option<&str>, name: &str) -> Result<chrono::NaiveDate, ApiError> {
    raw.and_then(parse_calendar_date).ok_or_else(|| {
        ApiError(DomainError::Validation(format!(
            "`{name}` must be a YYYY-MM-DD date"
        )))
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/bookings",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(ListBookingsParams),
    responses(
        (
            status = 200,
            description = "All bookings, newest first",
            body = PaginatedResponse<BookingDto>
        ),
        (status = 403, description = "Admin access required", body = ErrorResponse)
    )
)]
pub async fn list_all_bookings(
    State(state): State<AdminState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(params): Query<ListBookingsParams>,
) -> Result<Json<PaginatedResponse<BookingDto>>, ApiError> {
    let (page, limit) = validate_pagination(params.page, params.limit);
    let result = state.queries.list_all(&user.actor, page, limit).await?;
    Ok(Json(PaginatedResponse::new(
        result.items.into_iter().map(BookingDto::from).collect(),
        result.total,
        result.page,
        result.limit,
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/bookings/{id}/paid",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking marked paid", body = BookingResponse),
        (status = 404, description = "Booking not found", body = ErrorResponse),
        (status = 409, description = "Booking is not pending", body = ErrorResponse)
    )
)]
pub async fn mark_booking_paid(
    State(state): State<AdminState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_booking_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.payments.mark_paid(id, &user.actor).await {
        Ok(booking) => Json(BookingResponse {
            booking: booking.into(),
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/stats",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard figures", body = StatsResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse)
    )
)]
pub async fn get_stats(State(state): State<AdminState>) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.capacity.dashboard().await?;
    Ok(Json(stats.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/occupancy",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(OccupancyParams),
    responses(
        (status = 200, description = "Guests booked against capacity", body = OccupancyResponse),
        (status = 400, description = "Missing or malformed parameters", body = ErrorResponse),
        (status = 404, description = "Tour not found", body = ErrorResponse)
    )
)]
pub async fn get_occupancy(
    State(state): State<AdminState>,
    Query(params): Query<OccupancyParams>,
) -> Result<Json<OccupancyResponse>, ApiError> {
    let tour_id = params
        .tour_id
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError(DomainError::Validation("`tour_id` is required".to_string())))?;
    let date = date_param(params.date.as_deref(), "date")?;

    let occupancy = state.capacity.occupancy(tour_id, date).await?;
    Ok(Json(occupancy.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/sold-out",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(SoldOutParams),
    responses(
        (status = 200, description = "Sold-out tour dates in range", body = SoldOutResponse),
        (status = 400, description = "Missing or malformed range", body = ErrorResponse)
    )
)]
pub async fn list_sold_out(
    State(state): State<AdminState>,
    Query(params): Query<SoldOutParams>,
) -> Result<Json<SoldOutResponse>, ApiError> {
    let from = date_param(params.from.as_deref(), "from")?;
    let to = date_param(params.to.as_deref(), "to")?;

    let alerts = state.capacity.sold_out(from, to).await?;
    Ok(Json(SoldOutResponse {
        alerts: alerts.into_iter().map(SoldOutDto::from).collect(),
    }))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/tours/{id}/status",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Tour ID")),
    request_body = UpdateTourStatusRequest,
    responses(
        (status = 200, description = "Tour updated", body = TourDto),
        (status = 404, description = "Tour not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    )
)]
pub async fn update_tour_status(
    State(state): State<AdminState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateTourStatusRequest>,
) -> Result<Json<TourDto>, ApiError> {
    let tour = state
        .catalog
        .set_status(&user.actor, &id, body.status.into())
        .await?;
    Ok(Json(tour.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/tours/{id}/capacity",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Tour ID")),
    request_body = UpdateTourCapacityRequest,
    responses(
        (status = 200, description = "Tour updated", body = TourDto),
        (status = 404, description = "Tour not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    )
)]
pub async fn update_tour_capacity(
    State(state): State<AdminState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateTourCapacityRequest>,
) -> Result<Json<TourDto>, ApiError> {
    let tour = state
        .catalog
        .set_capacity(&user.actor, &id, body.max_total_slots)
        .await?;
    Ok(Json(tour.into()))
}

