use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::booking::BookingStatus;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Pending booking already exists for tour {tour_id}, user {user_id} on {start_date}")]
    DuplicatePending {
        tour_id: String,
        user_id: String,
        start_date: NaiveDate,
    },

    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Storage(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),
}

impl DomainError {
    /// Whether this error is likely transient (e.g. DB connection lost)
    /// and the operation may succeed if retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, DomainError::Storage(_) | DomainError::Timeout(_))
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Storage(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_and_timeout_are_transient() {
        assert!(DomainError::Storage("connection reset".into()).is_transient());
        assert!(DomainError::Timeout("bookings.insert".into()).is_transient());
        assert!(!DomainError::Forbidden("nope".into()).is_transient());
        assert!(!DomainError::InvalidTransition {
            from: BookingStatus::Cancelled,
            to: BookingStatus::Paid,
        }
        .is_transient());
    }

    #[test]
    fn db_err_maps_to_storage() {
        let err: DomainError = sea_orm::DbErr::Custom("boom".into()).into();
        assert!(matches!(err, DomainError::Storage(_)));
    }
}
