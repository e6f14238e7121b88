//! Application errors → HTTP responses
//!
//! Every failure is rendered as `{ "error": "<message>" }`. Storage failures
//! are logged where they happen and surface only as a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::{AdmissionError, CancellationError};
use crate::domain::DomainError;

use super::common::error_response;

impl IntoResponse for AdmissionError {
    fn into_response(self) -> Response {
        let status = match &self {
            AdmissionError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AdmissionError::InvalidRequest(_)
            | AdmissionError::InvalidDate(_)
            | AdmissionError::GroupTooLarge { .. } => StatusCode::BAD_REQUEST,
            AdmissionError::TourUnavailable => StatusCode::NOT_FOUND,
            AdmissionError::DuplicatePending => StatusCode::CONFLICT,
            AdmissionError::Storage(_) | AdmissionError::InsertFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        error_response(status, self.to_string())
    }
}

impl IntoResponse for CancellationError {
    fn into_response(self) -> Response {
        let status = match &self {
            CancellationError::NotFound => StatusCode::NOT_FOUND,
            CancellationError::InvalidTransition { .. } => StatusCode::CONFLICT,
            CancellationError::Forbidden(_) => StatusCode::FORBIDDEN,
            CancellationError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error_response(status, self.to_string())
    }
}

/// Error for read and catalog endpoints that work on `DomainError` directly
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            DomainError::NotFound { entity, .. } => {
                error_response(StatusCode::NOT_FOUND, format!("{entity} not found"))
            }
            DomainError::Validation(msg) => error_response(StatusCode::BAD_REQUEST, msg),
            DomainError::Forbidden(msg) => error_response(StatusCode::FORBIDDEN, msg),
            e @ (DomainError::Conflict(_)
            | DomainError::DuplicatePending { .. }
            | DomainError::InvalidTransition { .. }) => {
                error_response(StatusCode::CONFLICT, e.to_string())
            }
            e @ (DomainError::Storage(_) | DomainError::Timeout(_)) => {
                tracing::error!(error = %e, "Request failed");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BookingStatus;

    async fn body_of(response: Response) -> (StatusCode, String) {
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, json["error"].as_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn admission_errors_map_to_wire_contract() {
        let cases = [
            (AdmissionError::Unauthenticated, 401, "Not authenticated"),
            (
                AdmissionError::InvalidRequest("Missing required fields".into()),
                400,
                "Missing required fields",
            ),
            (
                AdmissionError::GroupTooLarge { max_group_size: 6 },
                400,
                "Maximum group size is 6",
            ),
            (AdmissionError::TourUnavailable, 404, "Tour not found or not available"),
            (
                AdmissionError::DuplicatePending,
                409,
                "You already have a pending booking for this tour on this date",
            ),
            (
                AdmissionError::Storage(DomainError::Timeout("tours.find_published".into())),
                500,
                "Internal server error",
            ),
            (
                AdmissionError::InsertFailed(DomainError::Storage("disk full".into())),
                500,
                "Failed to create booking",
            ),
        ];

        for (err, code, message) in cases {
            let (status, body) = body_of(err.into_response()).await;
            assert_eq!(status.as_u16(), code);
            assert_eq!(body, message);
        }
    }

    #[tokio::test]
    async fn storage_details_never_leak() {
        let err = ApiError(DomainError::Storage("UNIQUE constraint failed: secret".into()));
        let (status, body) = body_of(err.into_response()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Internal server error");
    }

    #[tokio::test]
    async fn transition_conflicts_are_409() {
        let err = CancellationError::InvalidTransition {
            from: BookingStatus::Cancelled,
            to: BookingStatus::Cancelled,
        };
        let (status, _) = body_of(err.into_response()).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
