//! Booking API handlers
//!
//! Submission, the caller's own bookings, and cancellation. All routes sit
//! behind `auth_middleware`.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use uuid::Uuid;

use super::dto::{
    BookingDto, BookingListResponse, BookingResponse, CreateBookingRequest,
    CreatedBookingResponse,
};
use crate::application::{AdmissionController, BookingQueries, CancellationHandler};
use crate::interfaces::http::common::{error_response, ErrorResponse};
use crate::interfaces::http::error::ApiError;
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct BookingsState {
    pub admission: Arc<AdmissionController>,
    pub cancellation: Arc<CancellationHandler>,
    pub queries: Arc<BookingQueries>,
}

pub fn parse_booking_id(raw: &str) -> Result<Uuid, Response> {
    Uuid::parse_str(raw)
        .map_err(|_| error_response(StatusCode::BAD_REQUEST, "Invalid booking id"))
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking admitted", body = CreatedBookingResponse),
        (status = 400, description = "Invalid request, date or group size", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Tour not found or not available", body = ErrorResponse),
        (status = 409, description = "Pending booking already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn create_booking(
    State(state): State<BookingsState>,
    user: Option<Extension<AuthenticatedUser>>,
    body: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(body)) = body else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid request body");
    };

    let actor = user.as_ref().map(|Extension(u)| &u.actor);
    match state.admission.submit(actor, body.into()).await {
        Ok(booking) => (
            StatusCode::CREATED,
            Json(CreatedBookingResponse::from(&booking)),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's bookings, newest first", body = BookingListResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn list_my_bookings(
    State(state): State<BookingsState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<BookingListResponse>, ApiError> {
    let bookings = state.queries.list_mine(&user.actor).await?;
    Ok(Json(BookingListResponse {
        bookings: bookings.into_iter().map(BookingDto::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/{id}",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking details", body = BookingResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Booking not found", body = ErrorResponse)
    )
)]
pub async fn get_booking(
    State(state): State<BookingsState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_booking_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.queries.get(id, &user.actor).await {
        Ok(booking) => Json(BookingResponse {
            booking: booking.into(),
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/cancel",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking cancelled", body = BookingResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Booking not found", body = ErrorResponse),
        (status = 409, description = "Booking already cancelled", body = ErrorResponse)
    )
)]
pub async fn cancel_booking(
    State(state): State<BookingsState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_booking_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.cancellation.cancel(id, &user.actor).await {
        Ok(booking) => Json(BookingResponse {
            booking: booking.into(),
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}
