//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod booking_repository;
pub mod profile_repository;
pub mod repository_provider;
pub mod tour_repository;

pub use booking_repository::SeaOrmBookingRepository;
pub use profile_repository::SeaOrmContactDirectory;
pub use repository_provider::SeaOrmRepositoryProvider;
pub use tour_repository::SeaOrmTourRepository;

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::domain::DomainError;

pub(crate) fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Storage(e.to_string())
}

/// Stored decimals are plain text so no precision is lost on SQLite.
pub(crate) fn parse_decimal(column: &'static str, raw: &str) -> Result<Decimal, DomainError> {
    Decimal::from_str(raw)
        .map_err(|e| DomainError::Storage(format!("corrupt {column} value {raw:?}: {e}")))
}

pub(crate) fn to_db_count(field: &'static str, value: u32) -> Result<i32, DomainError> {
    i32::try_from(value).map_err(|_| DomainError::Validation(format!("{field} is too large")))
}

pub(crate) fn from_db_count(field: &'static str, value: i32) -> Result<u32, DomainError> {
    u32::try_from(value)
        .map_err(|_| DomainError::Storage(format!("corrupt {field} value {value}")))
}
