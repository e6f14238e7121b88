//! Notification worker
//!
//! Subscribes to the event bus and turns booking confirmations and
//! cancellations into emails for the notification collaborator. Each event
//! is handled on its own task so a slow delivery never holds up the next one.
//! Failures are logged and counted, never propagated.
//!
//! Deliveries still running at shutdown get `drain_timeout` to finish; the
//! rest are aborted and counted in the log.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::application::ports::{BookingEmail, NotificationError, NotificationKind, SharedNotifier};
use crate::application::capacity::UNKNOWN_TOUR_TITLE;
use crate::domain::RepositoryProvider;
use crate::shared::retry::{retry_with_backoff, RetryConfig};
use crate::shared::shutdown::ShutdownSignal;
use crate::shared::time::bounded;

use super::event_bus::{EventSubscriber, SharedEventBus};
use super::events::{BookingEvent, Event};

/// Greeting name when the profile has none
pub const DEFAULT_RECIPIENT_NAME: &str = "Traveler";

const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct NotificationWorker {
    repos: Arc<dyn RepositoryProvider>,
    notifier: SharedNotifier,
    retry: RetryConfig,
    attempt_timeout: Duration,
    storage_timeout: Duration,
    drain_timeout: Duration,
}

impl NotificationWorker {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        notifier: SharedNotifier,
        retry: RetryConfig,
        attempt_timeout: Duration,
        storage_timeout: Duration,
    ) -> Self {
        Self {
            repos,
            notifier,
            retry,
            attempt_timeout,
            storage_timeout,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }

    /// How long in-flight deliveries may keep running after shutdown
    pub fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }

    /// Subscribe immediately, then process events until shutdown.
    ///
    /// Subscribing before spawning means no event published after this call
    /// returns can be missed.
    pub fn start(
        self,
        event_bus: &SharedEventBus,
        shutdown: ShutdownSignal,
    ) -> tokio::task::JoinHandle<()> {
        let subscriber = event_bus.subscribe();
        tokio::spawn(async move {
            info!("📧 Notification worker started");
            self.run(subscriber, shutdown).await;
            info!("📧 Notification worker stopped");
        })
    }

    async fn run(self, mut subscriber: EventSubscriber, shutdown: ShutdownSignal) {
        let mut deliveries = JoinSet::new();
        loop {
            tokio::select! {
                message = subscriber.recv() => {
                    let Some(message) = message else { break };
                    let worker = self.clone();
                    deliveries.spawn(async move {
                        worker.handle(message.event).await;
                    });
                }
                Some(_) = deliveries.join_next(), if !deliveries.is_empty() => {}
                _ = shutdown.notified().wait() => break,
            }
        }

        self.drain(deliveries).await;
    }

    async fn drain(&self, mut deliveries: JoinSet<()>) {
        if deliveries.is_empty() {
            return;
        }
        info!(in_flight = deliveries.len(), "⏳ Waiting for booking emails in flight");

        let drained = tokio::time::timeout(self.drain_timeout, async {
            while deliveries.join_next().await.is_some() {}
        })
        .await;

        if drained.is_err() {
            warn!(
                abandoned = deliveries.len(),
                "Booking emails still in flight at shutdown were abandoned"
            );
            deliveries.abort_all();
        }
    }

    /// Deliver the email for one event, if it warrants one.
    pub async fn handle(&self, event: Event) -> Option<Result<(), NotificationError>> {
        let (kind, booking) = match event {
            Event::BookingConfirmed(b) => (NotificationKind::Confirmation, b),
            Event::BookingCancelled(b) => (NotificationKind::Cancellation, b),
            other => {
                debug!(event_type = other.event_type(), "No email for event");
                return None;
            }
        };

        let booking_id = booking.booking_id;
        let result = self.deliver(kind, booking).await;
        match &result {
            Ok(()) => {
                metrics::counter!("notifications_sent_total").increment(1);
                info!(%booking_id, ?kind, "Booking email delivered");
            }
            Err(e) => {
                metrics::counter!("notifications_failed_total").increment(1);
                warn!(%booking_id, ?kind, error = %e, "Booking email not delivered");
            }
        }
        Some(result)
    }

    async fn deliver(
        &self,
        kind: NotificationKind,
        booking: BookingEvent,
    ) -> Result<(), NotificationError> {
        let email = self.compose(kind, booking).await?;
        let email = &email;
        let notifier = self.notifier.clone();
        let attempt_timeout = self.attempt_timeout;

        retry_with_backoff(
            self.retry.clone(),
            move || {
                let notifier = notifier.clone();
                async move {
                    tokio::time::timeout(attempt_timeout, notifier.deliver(email))
                        .await
                        .map_err(|_| NotificationError::Timeout)?
                }
            },
            NotificationError::is_transient,
            "deliver_booking_email",
        )
        .await
    }

    async fn compose(
        &self,
        kind: NotificationKind,
        booking: BookingEvent,
    ) -> Result<BookingEmail, NotificationError> {
        let contact = bounded(
            self.storage_timeout,
            "contacts.find_contact",
            self.repos.contacts().find_contact(&booking.user_id),
        )
        .await
        .map_err(|e| NotificationError::Transport(e.to_string()))?
        .ok_or_else(|| NotificationError::RecipientUnknown(booking.user_id.clone()))?;

        let tour_title = match booking.tour_title {
            Some(title) => title,
            None => bounded(
                self.storage_timeout,
                "tours.find_by_id",
                self.repos.tours().find_by_id(&booking.tour_id),
            )
            .await
            .ok()
            .flatten()
            .map(|t| t.title)
            .unwrap_or_else(|| UNKNOWN_TOUR_TITLE.to_string()),
        };

        Ok(BookingEmail {
            to_email: contact.email,
            to_name: contact
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_RECIPIENT_NAME.to_string()),
            booking_id: booking.booking_id,
            tour_title,
            start_date: booking.start_date,
            guests_count: booking.guests_count,
            total_price: booking.total_price,
            kind,
        })
    }
}
