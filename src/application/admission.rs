//! Booking admission
//!
//! Turns a traveler's request into a priced `pending` booking, or rejects it.
//! Checks run in a fixed order and the first violation wins; no ledger row is
//! written on any rejection path.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::domain::pricing;
use crate::domain::{Actor, Booking, DomainError, RepositoryProvider};
use crate::notifications::{BookingEvent, Event, SharedEventBus};
use crate::shared::time::{bounded, SharedClock};
use crate::shared::validations::{is_valid_phone, parse_calendar_date};

/// Absolute guest bound, applied before the tour's own `max_group_size`.
pub const DEFAULT_MAX_GUESTS: i64 = 100;

#[derive(Debug, Clone)]
pub struct AdmissionSettings {
    pub max_guests: i64,
    /// Bound on each catalog and ledger call
    pub storage_timeout: Duration,
}

impl Default for AdmissionSettings {
    fn default() -> Self {
        Self {
            max_guests: DEFAULT_MAX_GUESTS,
            storage_timeout: Duration::from_secs(5),
        }
    }
}

/// Raw booking request as received from the caller.
///
/// Every field is optional so that presence is checked here, in order,
/// rather than by the transport. Price fields are not part of the request.
#[derive(Debug, Clone, Default)]
pub struct BookingRequest {
    pub tour_id: Option<String>,
    pub start_date: Option<String>,
    /// Kept as a JSON number so fractional values are rejected as invalid
    /// counts instead of being truncated
    pub guests_count: Option<serde_json::Number>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Error)]
pub enum AdmissionError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    InvalidDate(String),

    #[error("Tour not found or not available")]
    TourUnavailable,

    #[error("Maximum group size is {max_group_size}")]
    GroupTooLarge { max_group_size: u32 },

    #[error("You already have a pending booking for this tour on this date")]
    DuplicatePending,

    /// Failure while reading the catalog or ledger
    #[error("Internal server error")]
    Storage(#[source] DomainError),

    /// Failure of the ledger write itself; no row was committed
    #[error("Failed to create booking")]
    InsertFailed(#[source] DomainError),
}

impl AdmissionError {
    /// Label for the `bookings_rejected_total` counter
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::InvalidRequest(_) => "invalid_request",
            Self::InvalidDate(_) => "invalid_date",
            Self::TourUnavailable => "tour_unavailable",
            Self::GroupTooLarge { .. } => "group_too_large",
            Self::DuplicatePending => "duplicate_pending",
            Self::Storage(_) => "storage",
            Self::InsertFailed(_) => "insert_failed",
        }
    }
}

/// Validated, typed fields of a request that passed steps 2 to 5.
struct AdmissionInput {
    tour_id: String,
    start_date: chrono::NaiveDate,
    guests_count: u32,
    phone_number: String,
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

pub struct AdmissionController {
    repos: Arc<dyn RepositoryProvider>,
    event_bus: SharedEventBus,
    clock: SharedClock,
    settings: AdmissionSettings,
}

impl AdmissionController {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        event_bus: SharedEventBus,
        clock: SharedClock,
        settings: AdmissionSettings,
    ) -> Self {
        Self {
            repos,
            event_bus,
            clock,
            settings,
        }
    }

    /// Admit or reject a booking request on behalf of `actor`.
    ///
    /// On success exactly one `pending` booking exists for the request and a
    /// `BookingConfirmed` event has been published.
    pub async fn submit(
        &self,
        actor: Option<&Actor>,
        request: BookingRequest,
    ) -> Result<Booking, AdmissionError> {
        let result = self.admit(actor, request).await;

        match &result {
            Ok(booking) => {
                metrics::counter!("bookings_admitted_total").increment(1);
                info!(
                    booking_id = %booking.id,
                    tour_id = %booking.tour_id,
                    user_id = %booking.user_id,
                    start_date = %booking.start_date,
                    guests = booking.guests_count,
                    total_price = %booking.total_price,
                    "✅ Booking admitted"
                );
            }
            Err(e) => {
                metrics::counter!("bookings_rejected_total", "reason" => e.reason()).increment(1);
                match e {
                    AdmissionError::Storage(source) | AdmissionError::InsertFailed(source) => {
                        error!(error = %source, reason = e.reason(), "Booking admission failed");
                    }
                    _ => warn!(reason = e.reason(), error = %e, "Booking rejected"),
                }
            }
        }

        result
    }

    async fn admit(
        &self,
        actor: Option<&Actor>,
        request: BookingRequest,
    ) -> Result<Booking, AdmissionError> {
        let actor = actor.ok_or(AdmissionError::Unauthenticated)?;
        let input = self.validate(&request)?;
        let timeout = self.settings.storage_timeout;

        let tour = bounded(
            timeout,
            "tours.find_published",
            self.repos.tours().find_published(&input.tour_id),
        )
        .await
        .map_err(AdmissionError::Storage)?
        .ok_or(AdmissionError::TourUnavailable)?;

        if input.guests_count > tour.max_group_size {
            return Err(AdmissionError::GroupTooLarge {
                max_group_size: tour.max_group_size,
            });
        }

        let existing = bounded(
            timeout,
            "bookings.find_pending_duplicate",
            self.repos.bookings().find_pending_duplicate(
                &tour.id,
                &actor.user_id,
                input.start_date,
            ),
        )
        .await
        .map_err(AdmissionError::Storage)?;
        if existing.is_some() {
            return Err(AdmissionError::DuplicatePending);
        }

        let quote = pricing::quote(&tour, input.guests_count).map_err(AdmissionError::Storage)?;

        let booking = Booking::new_pending(
            tour.id.clone(),
            actor.user_id.clone(),
            input.start_date,
            input.guests_count,
            input.phone_number,
            quote.total_price,
            self.clock.now(),
        );

        // A timed-out insert may or may not have committed; a retry that finds
        // the committed row is rejected as a duplicate.
        match bounded(
            timeout,
            "bookings.insert",
            self.repos.bookings().insert(booking.clone()),
        )
        .await
        {
            Ok(_) => {}
            Err(DomainError::DuplicatePending { .. }) => {
                return Err(AdmissionError::DuplicatePending)
            }
            Err(e) => return Err(AdmissionError::InsertFailed(e)),
        }

        self.event_bus
            .publish(Event::BookingConfirmed(BookingEvent::from_booking(
                &booking,
                Some(tour.title),
                actor.user_id.clone(),
                booking.created_at,
            )));

        Ok(booking)
    }

    /// Steps 2 to 5: presence, guest bounds, phone shape, date.
    fn validate(&self, request: &BookingRequest) -> Result<AdmissionInput, AdmissionError> {
        let (Some(tour_id), Some(raw_date), Some(guests), Some(phone)) = (
            present(&request.tour_id),
            present(&request.start_date),
            request.guests_count.as_ref(),
            present(&request.phone_number),
        ) else {
            return Err(AdmissionError::InvalidRequest(
                "Missing required fields".to_string(),
            ));
        };

        let guests_count = guests
            .as_i64()
            .filter(|g| (1..=self.settings.max_guests).contains(g))
            .and_then(|g| u32::try_from(g).ok())
            .ok_or_else(|| AdmissionError::InvalidRequest("Invalid guest count".to_string()))?;

        if !is_valid_phone(phone) {
            return Err(AdmissionError::InvalidRequest(
                "Invalid phone number".to_string(),
            ));
        }

        let start_date = parse_calendar_date(raw_date)
            .ok_or_else(|| AdmissionError::InvalidDate("Invalid start date".to_string()))?;
        if start_date < self.clock.today() {
            return Err(AdmissionError::InvalidDate(
                "Start date must be today or in the future".to_string(),
            ));
        }

        Ok(AdmissionInput {
            tour_id: tour_id.to_string(),
            start_date,
            guests_count,
            phone_number: phone.to_string(),
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookingStatus, Tour, TourStatus};
    use crate::infrastructure::storage::InMemoryRepositoryProvider;
    use crate::notifications::create_event_bus;
    use crate::shared::time::FixedClock;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;

    const TODAY: (i32, u32, u32) = (2026, 5, 10);

    fn tour_a() -> Tour {
        Tour {
            id: "tour-a".into(),
            title: "Maasai Mara Safari".into(),
            price_per_person: Decimal::from(1000),
            discount_price: Some(Decimal::from(800)),
            max_group_size: 6,
            max_total_slots: 0,
            status: TourStatus::Published,
        }
    }

    fn draft_tour() -> Tour {
        Tour {
            id: "tour-draft".into(),
            title: "Unreleased".into(),
            status: TourStatus::Draft,
            ..tour_a()
        }
    }

    struct Fixture {
        repos: Arc<InMemoryRepositoryProvider>,
        bus: SharedEventBus,
        controller: AdmissionController,
    }

    fn fixture() -> Fixture {
        let repos = Arc::new(InMemoryRepositoryProvider::with_tours([tour_a(), draft_tour()]));
        let bus = create_event_bus();
        let clock = Arc::new(FixedClock(
            Utc.with_ymd_and_hms(TODAY.0, TODAY.1, TODAY.2, 18, 30, 0).unwrap(),
        ));
        let controller = AdmissionController::new(
            repos.clone(),
            bus.clone(),
            clock,
            AdmissionSettings::default(),
        );
        Fixture {
            repos,
            bus,
            controller,
        }
    }

    fn request(tour_id: &str, date: &str, guests: i64) -> BookingRequest {
        BookingRequest {
            tour_id: Some(tour_id.into()),
            start_date: Some(date.into()),
            guests_count: Some(guests.into()),
            phone_number: Some("+254 712 345 678".into()),
        }
    }

    fn traveler() -> Actor {
        Actor::traveler("user-1")
    }

    async fn expect_rejection(f: &Fixture, req: BookingRequest) -> AdmissionError {
        let err = f.controller.submit(Some(&traveler()), req).await.unwrap_err();
        assert!(f.repos.booking_store().is_empty(), "rejection must not write");
        err
    }

    #[tokio::test]
    async fn admits_with_discounted_total() {
        let f = fixture();
        let booking = f
            .controller
            .submit(Some(&traveler()), request("tour-a", "2026-06-01", 3))
            .await
            .unwrap();

        assert_eq!(booking.total_price, Decimal::from(2400));
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.user_id, "user-1");
        assert_eq!(f.repos.booking_store().len(), 1);
    }

    #[tokio::test]
    async fn missing_identity_is_unauthenticated() {
        let f = fixture();
        let err = f
            .controller
            .submit(None, request("tour-a", "2026-06-01", 3))
            .await
            .unwrap_err();
        assert!(matches!(err, AdmissionError::Unauthenticated));
    }

    #[tokio::test]
    async fn blank_fields_are_missing() {
        let f = fixture();
        let mut req = request("tour-a", "2026-06-01", 3);
        req.phone_number = Some("   ".into());
        let err = expect_rejection(&f, req).await;
        assert_eq!(err.to_string(), "Missing required fields");

        let err = expect_rejection(&f, BookingRequest::default()).await;
        assert!(matches!(err, AdmissionError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn guest_count_outside_bounds_is_invalid() {
        let f = fixture();
        for guests in [0, -2, 101] {
            let err = expect_rejection(&f, request("tour-a", "2026-06-01", guests)).await;
            assert_eq!(err.to_string(), "Invalid guest count");
        }

        let mut fractional = request("tour-a", "2026-06-01", 1);
        fractional.guests_count = serde_json::Number::from_f64(2.5);
        let err = expect_rejection(&f, fractional).await;
        assert_eq!(err.to_string(), "Invalid guest count");
    }

    #[tokio::test]
    async fn malformed_phone_is_invalid() {
        let f = fixture();
        let mut req = request("tour-a", "2026-06-01", 2);
        req.phone_number = Some("call me".into());
        let err = expect_rejection(&f, req).await;
        assert_eq!(err.to_string(), "Invalid phone number");
    }

    #[tokio::test]
    async fn past_or_garbled_dates_are_rejected() {
        let f = fixture();
        let err = expect_rejection(&f, request("tour-a", "2026-05-09", 2)).await;
        assert!(matches!(err, AdmissionError::InvalidDate(_)));
        assert_eq!(err.to_string(), "Start date must be today or in the future");

        let err = expect_rejection(&f, request("tour-a", "2026-02-30", 2)).await;
        assert!(matches!(err, AdmissionError::InvalidDate(_)));
    }

    #[tokio::test]
    async fn today_is_bookable_regardless_of_time_of_day() {
        let f = fixture();
        let booking = f
            .controller
            .submit(Some(&traveler()), request("tour-a", "2026-05-10", 1))
            .await
            .unwrap();
        assert_eq!(
            booking.start_date,
            NaiveDate::from_ymd_opt(TODAY.0, TODAY.1, TODAY.2).unwrap()
        );
    }

    #[tokio::test]
    async fn draft_and_unknown_tours_look_the_same() {
        let f = fixture();
        let draft = expect_rejection(&f, request("tour-draft", "2026-06-01", 2)).await;
        let missing = expect_rejection(&f, request("nope", "2026-06-01", 2)).await;

        assert!(matches!(draft, AdmissionError::TourUnavailable));
        assert_eq!(draft.to_string(), missing.to_string());
    }

    #[tokio::test]
    async fn group_above_tour_limit_reports_the_limit() {
        let f = fixture();
        let err = expect_rejection(&f, request("tour-a", "2026-06-01", 7)).await;
        assert!(matches!(err, AdmissionError::GroupTooLarge { max_group_size: 6 }));
        assert_eq!(err.to_string(), "Maximum group size is 6");
    }

    #[tokio::test]
    async fn second_identical_submission_is_duplicate() {
        let f = fixture();
        f.controller
            .submit(Some(&traveler()), request("tour-a", "2026-06-01", 3))
            .await
            .unwrap();

        let err = f
            .controller
            .submit(Some(&traveler()), request("tour-a", "2026-06-01", 2))
            .await
            .unwrap_err();
        assert!(matches!(err, AdmissionError::DuplicatePending));
        assert_eq!(f.repos.booking_store().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_identical_submissions_admit_one() {
        let f = Arc::new(fixture());
        let attempts = (0..8).map(|_| {
            let f = f.clone();
            async move {
                f.controller
                    .submit(Some(&traveler()), request("tour-a", "2026-06-01", 2))
                    .await
            }
        });

        let results = futures_util::future::join_all(attempts).await;
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, AdmissionError::DuplicatePending)));
        assert_eq!(f.repos.booking_store().len(), 1);
    }

    #[tokio::test]
    async fn admission_publishes_confirmation_with_title() {
        let f = fixture();
        let mut subscriber = f.bus.subscribe();

        let booking = f
            .controller
            .submit(Some(&traveler()), request("tour-a", "2026-06-01", 3))
            .await
            .unwrap();

        let message = subscriber.recv().await.unwrap();
        match message.event {
            Event::BookingConfirmed(e) => {
                assert_eq!(e.booking_id, booking.id);
                assert_eq!(e.tour_title.as_deref(), Some("Maasai Mara Safari"));
                assert_eq!(e.total_price, Decimal::from(2400));
            }
            other => panic!("unexpected event {}", other.event_type()),
        }
    }

    #[tokio::test]
    async fn check_order_puts_fields_before_tour_lookup() {
        let f = fixture();
        // draft tour and bad phone: the phone check fires first
        let mut req = request("tour-draft", "2026-06-01", 2);
        req.phone_number = Some("x".into());
        let err = expect_rejection(&f, req).await;
        assert_eq!(err.to_string(), "Invalid phone number");

        // draft tour and too many guests: unavailability wins over group size
        let err = expect_rejection(&f, request("tour-draft", "2026-06-01", 50)).await;
        assert!(matches!(err, AdmissionError::TourUnavailable));
    }

    #[tokio::test]
    async fn stalled_ledger_insert_fails_within_storage_timeout() {
        use crate::infrastructure::storage::StalledRepositoryProvider;

        let inner = Arc::new(InMemoryRepositoryProvider::with_tours([tour_a()]));
        let repos = Arc::new(StalledRepositoryProvider::new(
            inner.clone(),
            Duration::from_secs(30),
        ));
        let clock = Arc::new(FixedClock(
            Utc.with_ymd_and_hms(TODAY.0, TODAY.1, TODAY.2, 9, 0, 0).unwrap(),
        ));
        let controller = AdmissionController::new(
            repos,
            create_event_bus(),
            clock,
            AdmissionSettings {
                storage_timeout: Duration::from_millis(50),
                ..AdmissionSettings::default()
            },
        );

        let err = tokio::time::timeout(
            Duration::from_secs(2),
            controller.submit(Some(&traveler()), request("tour-a", "2026-06-01", 2)),
        )
        .await
        .expect("submit must not hang on a stalled ledger")
        .unwrap_err();

        assert!(matches!(
            err,
            AdmissionError::InsertFailed(DomainError::Timeout(ref op)) if op == "bookings.insert"
        ));
        assert!(inner.booking_store().is_empty());
    }
}
