//! Background sold-out detection.
//!
//! Admission never blocks on `max_total_slots`. Instead this task listens for
//! confirmed bookings, recomputes occupancy for the affected key, and raises
//! an operational alert when the key is at or over capacity.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::application::capacity::CapacityAggregator;
use crate::notifications::{Event, EventSubscriber, SharedEventBus, SoldOutEvent};
use crate::shared::shutdown::ShutdownSignal;

pub struct CapacityMonitor {
    aggregator: Arc<CapacityAggregator>,
    event_bus: SharedEventBus,
}

impl CapacityMonitor {
    pub fn new(aggregator: Arc<CapacityAggregator>, event_bus: SharedEventBus) -> Self {
        Self {
            aggregator,
            event_bus,
        }
    }

    /// Subscribe now and process events on a spawned task until shutdown.
    pub fn start(self, shutdown: ShutdownSignal) -> tokio::task::JoinHandle<()> {
        let subscriber = self.event_bus.subscribe();
        tokio::spawn(async move {
            info!("📈 Capacity monitor started");
            self.run(subscriber, shutdown).await;
            info!("📈 Capacity monitor stopped");
        })
    }

    async fn run(&self, mut subscriber: EventSubscriber, shutdown: ShutdownSignal) {
        loop {
            tokio::select! {
                message = subscriber.recv() => {
                    let Some(message) = message else { break };
                    if let Event::BookingConfirmed(booking) = message.event {
                        self.check(&booking.tour_id, booking.start_date).await;
                    }
                }
                _ = shutdown.notified().wait() => break,
            }
        }
    }

    /// Returns the alert when the key is sold out.
    pub async fn check(
        &self,
        tour_id: &str,
        start_date: chrono::NaiveDate,
    ) -> Option<SoldOutEvent> {
        let occupancy = match self.aggregator.occupancy(tour_id, start_date).await {
            Ok(occupancy) => occupancy,
            Err(e) => {
                warn!(tour_id, %start_date, error = %e, "Occupancy recomputation failed");
                return None;
            }
        };

        if !occupancy.is_sold_out() {
            debug!(
                tour_id,
                %start_date,
                booked = occupancy.booked,
                capacity = occupancy.capacity,
                "Occupancy below capacity"
            );
            return None;
        }

        let tour_title = self
            .aggregator
            .tour_title(tour_id)
            .await
            .unwrap_or_else(|| crate::application::capacity::UNKNOWN_TOUR_TITLE.to_string());

        warn!(
            tour_id,
            tour_title = %tour_title,
            %start_date,
            booked = occupancy.booked,
            capacity = occupancy.capacity,
            "⚠️ Tour date sold out"
        );
        metrics::counter!("sold_out_alerts_total").increment(1);

        let alert = SoldOutEvent {
            tour_id: tour_id.to_string(),
            tour_title,
            start_date,
            booked: occupancy.booked,
            capacity: occupancy.capacity,
            timestamp: Utc::now(),
        };
        self.event_bus.publish(Event::SoldOut(alert.clone()));
        Some(alert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Booking, RepositoryProvider, Tour, TourStatus};
    use crate::infrastructure::storage::InMemoryRepositoryProvider;
    use crate::notifications::create_event_bus;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::time::Duration;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
    }

    async fn monitor_with(guests: &[u32]) -> (CapacityMonitor, SharedEventBus) {
        let repos = Arc::new(InMemoryRepositoryProvider::with_tours([Tour {
            id: "tour-b".into(),
            title: "Lake Nakuru".into(),
            price_per_person: Decimal::from(50),
            discount_price: None,
            max_group_size: 10,
            max_total_slots: 10,
            status: TourStatus::Published,
        }]));
        for (i, g) in guests.iter().enumerate() {
            let b = Booking::new_pending(
                "tour-b",
                format!("user-{i}"),
                day(),
                *g,
                "0712345678",
                Decimal::from(*g * 50),
                Utc::now(),
            );
            repos.bookings().insert(b).await.unwrap();
        }
        let bus = create_event_bus();
        let aggregator = Arc::new(CapacityAggregator::new(repos, Duration::from_secs(1)));
        (CapacityMonitor::new(aggregator, bus.clone()), bus)
    }

    #[tokio::test]
    async fn raises_alert_when_over_capacity() {
        let (monitor, bus) = monitor_with(&[6, 5]).await;
        let mut subscriber = bus.subscribe();

        let alert = monitor.check("tour-b", day()).await.expect("sold out");
        assert_eq!(alert.booked, 11);
        assert_eq!(alert.tour_title, "Lake Nakuru");

        let message = subscriber.recv().await.unwrap();
        assert_eq!(message.event.event_type(), "sold_out");
    }

    #[tokio::test]
    async fn stays_quiet_below_capacity() {
        let (monitor, _bus) = monitor_with(&[3, 2]).await;
        assert!(monitor.check("tour-b", day()).await.is_none());
    }

    #[tokio::test]
    async fn stops_on_shutdown() {
        let (monitor, _bus) = monitor_with(&[]).await;
        let shutdown = ShutdownSignal::new();
        let handle = monitor.start(shutdown.clone());

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("monitor did not stop")
            .unwrap();
    }
}
