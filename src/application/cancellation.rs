//! Booking cancellation
//!
//! Owners and administrators may cancel. The ledger applies the transition
//! atomically, so a booking that is already cancelled is never written again.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{Actor, Booking, BookingStatus, DomainError, RepositoryProvider};
use crate::notifications::{BookingEvent, Event, SharedEventBus};
use crate::shared::time::{bounded, SharedClock};

/// Failures of a status transition requested by a caller
#[derive(Debug, Error)]
pub enum CancellationError {
    #[error("Booking not found")]
    NotFound,

    #[error("Booking cannot move from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("{0}")]
    Forbidden(String),

    #[error("Internal server error")]
    Storage(#[source] DomainError),
}

impl CancellationError {
    pub(crate) fn from_domain(e: DomainError) -> Self {
        match e {
            DomainError::NotFound { .. } => Self::NotFound,
            DomainError::InvalidTransition { from, to } => Self::InvalidTransition { from, to },
            DomainError::Forbidden(msg) => Self::Forbidden(msg),
            other => Self::Storage(other),
        }
    }
}

/// Load a booking the actor is allowed to see or mutate.
///
/// Bookings owned by someone else are reported as forbidden only to callers
/// that are not administrators.
pub(crate) async fn load_authorized(
    repos: &dyn RepositoryProvider,
    timeout: Duration,
    booking_id: Uuid,
    actor: &Actor,
) -> Result<Booking, CancellationError> {
    let booking = bounded(timeout, "bookings.find_by_id", repos.bookings().find_by_id(booking_id))
        .await
        .map_err(CancellationError::Storage)?
        .ok_or(CancellationError::NotFound)?;

    if !actor.may_act_for(&booking.user_id) {
        return Err(CancellationError::Forbidden(
            "Not allowed to manage this booking".to_string(),
        ));
    }
    Ok(booking)
}

pub struct CancellationHandler {
    repos: Arc<dyn RepositoryProvider>,
    event_bus: SharedEventBus,
    clock: SharedClock,
    storage_timeout: Duration,
}

impl CancellationHandler {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        event_bus: SharedEventBus,
        clock: SharedClock,
        storage_timeout: Duration,
    ) -> Self {
        Self {
            repos,
            event_bus,
            clock,
            storage_timeout,
        }
    }

    /// Cancel `booking_id` on behalf of `actor`, stamping who and when.
    ///
    /// Publishes `BookingCancelled` after the ledger write; occupancy drops
    /// the booking's guests from then on.
    pub async fn cancel(
        &self,
        booking_id: Uuid,
        actor: &Actor,
    ) -> Result<Booking, CancellationError> {
        let result = self.apply(booking_id, actor).await;

        match &result {
            Ok(booking) => {
                metrics::counter!("bookings_cancelled_total").increment(1);
                info!(
                    booking_id = %booking.id,
                    cancelled_by = %actor.user_id,
                    tour_id = %booking.tour_id,
                    start_date = %booking.start_date,
                    "🚫 Booking cancelled"
                );
            }
            Err(CancellationError::Storage(e)) => {
                error!(booking_id = %booking_id, error = %e, "Cancellation failed");
            }
            Err(e) => {
                warn!(
                    booking_id = %booking_id,
                    actor = %actor.user_id,
                    error = %e,
                    "Cancellation rejected"
                );
            }
        }

        result
    }

    async fn apply(&self, booking_id: Uuid, actor: &Actor) -> Result<Booking, CancellationError> {
        let current =
            load_authorized(self.repos.as_ref(), self.storage_timeout, booking_id, actor).await?;
        if !current.status.can_transition_to(BookingStatus::Cancelled) {
            return Err(CancellationError::InvalidTransition {
                from: current.status,
                to: BookingStatus::Cancelled,
            });
        }

        let now = self.clock.now();
        let cancelled = bounded(
            self.storage_timeout,
            "bookings.transition_to_cancelled",
            self.repos
                .bookings()
                .transition_to_cancelled(booking_id, &actor.user_id, now),
        )
        .await
        .map_err(CancellationError::from_domain)?;

        self.event_bus
            .publish(Event::BookingCancelled(BookingEvent::from_booking(
                &cancelled,
                None,
                actor.user_id.clone(),
                now,
            )));

        Ok(cancelled)
    }
}
