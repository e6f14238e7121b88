//! Booking ledger interface

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::model::Booking;
use crate::domain::DomainResult;

/// Durable record of every admitted booking.
///
/// Rows are only created by admission and only mutated through the two
/// transition methods. Implementations must make both guarantees hold under
/// concurrent callers:
///
/// - at most one `pending` row per (tour_id, user_id, start_date); a second
///   insert fails with `DomainError::DuplicatePending`
/// - a transition is applied atomically against the row's current status;
///   once `cancelled`, no further write is accepted
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Append a new pending booking
    async fn insert(&self, booking: Booking) -> DomainResult<Uuid>;

    /// Find booking by ID
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Booking>>;

    /// Find the caller's pending booking for the same tour and date
    async fn find_pending_duplicate(
        &self,
        tour_id: &str,
        user_id: &str,
        start_date: NaiveDate,
    ) -> DomainResult<Option<Booking>>;

    /// pending|paid → cancelled, recording the actor and time.
    ///
    /// Fails with `NotFound` or `InvalidTransition`.
    async fn transition_to_cancelled(
        &self,
        id: Uuid,
        actor_id: &str,
        at: DateTime<Utc>,
    ) -> DomainResult<Booking>;

    /// pending → paid
    async fn transition_to_paid(&self, id: Uuid) -> DomainResult<Booking>;

    /// Bookings (any status) with `from <= start_date <= to`, optionally for one tour
    async fn list_by_tour_and_date_range(
        &self,
        tour_id: Option<&str>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DomainResult<Vec<Booking>>;

    /// A traveler's bookings, newest first
    async fn list_by_user(&self, user_id: &str) -> DomainResult<Vec<Booking>>;

    /// Every booking, newest first
    async fn list_all(&self) -> DomainResult<Vec<Booking>>;
}
