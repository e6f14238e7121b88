//! Payment confirmation hook
//!
//! The payment collaborator settles bookings elsewhere; this records the
//! outcome as the `pending → paid` transition. Administrators only.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use uuid::Uuid;

use crate::application::cancellation::{load_authorized, CancellationError};
use crate::domain::{Actor, Booking, BookingStatus, RepositoryProvider};
use crate::notifications::{BookingEvent, Event, SharedEventBus};
use crate::shared::time::{bounded, SharedClock};

pub struct PaymentRecorder {
    repos: Arc<dyn RepositoryProvider>,
    event_bus: SharedEventBus,
    clock: SharedClock,
    storage_timeout: Duration,
}

impl PaymentRecorder {
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

    pub async fn mark_paid(
        &self,
        booking_id: Uuid,
        actor: &Actor,
    ) -> Result<Booking, CancellationError> {
        if !actor.is_admin() {
            return Err(CancellationError::Forbidden(
                "Admin access required".to_string(),
            ));
        }

        let current =
            load_authorized(self.repos.as_ref(), self.storage_timeout, booking_id, actor).await?;
        if !current.status.can_transition_to(BookingStatus::Paid) {
            return Err(CancellationError::InvalidTransition {
                from: current.status,
                to: BookingStatus::Paid,
            });
        }

        let paid = bounded(
            self.storage_timeout,
            "bookings.transition_to_paid",
            self.repos.bookings().transition_to_paid(booking_id),
        )
        .await
        .map_err(CancellationError::from_domain)?;

        info!(booking_id = %paid.id, recorded_by = %actor.user_id, "💳 Booking marked as paid");
        self.event_bus.publish(Event::BookingPaid(BookingEvent::from_booking(
            &paid,
            None,
            actor.user_id.clone(),
            self.clock.now(),
        )));

        Ok(paid)
    }
}
