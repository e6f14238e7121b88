//! Repository traits for the domain layer
//!
//! Contains:
//! - `RepositoryProvider`: unified access to all per-aggregate repositories
//! - `DomainResult`: standard result type for domain operations

use async_trait::async_trait;

use super::booking::BookingRepository;
use super::identity::ContactDirectory;
use super::tour::TourRepository;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Provides access to all domain repositories.
///
/// Consumers request only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let tour = repos.tours().find_published("tour-1").await?;
///     let mine = repos.bookings().list_by_user("user-1").await?;
/// }
/// ```
#[async_trait]
pub trait RepositoryProvider: Send + Sync {
    /// Tour catalog (read-mostly)
    fn tours(&self) -> &dyn TourRepository;
    /// Booking ledger, the single source of truth for capacity
    fn bookings(&self) -> &dyn BookingRepository;
    /// Contact details owned by the identity collaborator
    fn contacts(&self) -> &dyn ContactDirectory;

    /// Round-trip to the backing store, used by the health check.
    async fn ping(&self) -> DomainResult<()>;
}
