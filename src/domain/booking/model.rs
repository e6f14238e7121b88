//! Booking domain entity

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::occupancy::OccupancyKey;
use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

/// Booking lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Reserved, awaiting payment
    Pending,
    /// Payment confirmed by the payment collaborator
    Paid,
    /// Terminal; the slot is released
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Allowed moves: pending → paid, pending → cancelled, paid → cancelled.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Paid)
                | (Self::Pending, Self::Cancelled)
                | (Self::Paid, Self::Cancelled)
        )
    }

    /// States from which `next` can be reached
    pub fn sources_of(next: BookingStatus) -> &'static [BookingStatus] {
        match next {
            Self::Pending => &[],
            Self::Paid => &[Self::Pending],
            Self::Cancelled => &[Self::Pending, Self::Paid],
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Cancelled
    }

    /// Counts towards occupancy
    pub fn holds_slot(self) -> bool {
        self != Self::Cancelled
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A traveler's reservation of a tour on a date
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    /// Server-generated identity
    pub id: Uuid,
    pub tour_id: String,
    pub user_id: String,
    /// Tour date, no time component
    pub start_date: NaiveDate,
    pub guests_count: u32,
    /// Contact channel for the reservation
    pub phone_number: String,
    /// Price snapshot taken at admission; never recomputed
    pub total_price: Decimal,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub cancelled_by: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Booking {
    pub fn new_pending(
        tour_id: impl Into<String>,
        user_id: impl Into<String>,
        start_date: NaiveDate,
        guests_count: u32,
        phone_number: impl Into<String>,
        total_price: Decimal,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tour_id: tour_id.into(),
            user_id: user_id.into(),
            start_date,
            guests_count,
            phone_number: phone_number.into(),
            total_price,
            status: BookingStatus::Pending,
            created_at,
            cancelled_by: None,
            cancelled_at: None,
        }
    }

    pub fn occupancy_key(&self) -> OccupancyKey {
        OccupancyKey::new(self.tour_id.clone(), self.start_date)
    }

    /// Short human-facing reference (first 8 hex digits, upper case)
    pub fn reference(&self) -> String {
        self.id.simple().to_string()[..8].to_uppercase()
    }

    pub fn holds_slot(&self) -> bool {
        self.status.holds_slot()
    }

    /// Move to cancelled, stamping who and when.
    pub fn cancel(&mut self, actor_id: impl Into<String>, at: DateTime<Utc>) -> DomainResult<()> {
        self.transition(BookingStatus::Cancelled)?;
        self.cancelled_by = Some(actor_id.into());
        self.cancelled_at = Some(at);
        Ok(())
    }

    /// Record payment confirmation
    pub fn mark_paid(&mut self) -> DomainResult<()> {
        self.transition(BookingStatus::Paid)
    }

    fn transition(&mut self, next: BookingStatus) -> DomainResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_booking() -> Booking {
        Booking::new_pending(
            "tour-a",
            "user-1",
            NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            3,
            "+254 700 000 000",
            Decimal::new(2400, 0),
            Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap(),
        )
    }

    #[test]
    fn new_booking_is_pending_without_cancellation_audit() {
        let b = sample_booking();
        assert_eq!(b.status, BookingStatus::Pending);
        assert!(b.holds_slot());
        assert!(b.cancelled_by.is_none());
        assert!(b.cancelled_at.is_none());
    }

    #[test]
    fn cancel_stamps_actor_and_time() {
        let mut b = sample_booking();
        let at = Utc.with_ymd_and_hms(2026, 5, 2, 10, 0, 0).unwrap();
        b.cancel("admin-9", at).unwrap();
        assert_eq!(b.status, BookingStatus::Cancelled);
        assert_eq!(b.cancelled_by.as_deref(), Some("admin-9"));
        assert_eq!(b.cancelled_at, Some(at));
        assert!(!b.holds_slot());
    }

    #[test]
    fn paid_booking_can_be_cancelled() {
        let mut b = sample_booking();
        b.mark_paid().unwrap();
        assert_eq!(b.status, BookingStatus::Paid);
        b.cancel("user-1", Utc::now()).unwrap();
        assert_eq!(b.status, BookingStatus::Cancelled);
    }

    #[test]
    fn cancelled_is_terminal() {
        let mut b = sample_booking();
        let at = Utc.with_ymd_and_hms(2026, 5, 2, 10, 0, 0).unwrap();
        b.cancel("user-1", at).unwrap();

        let err = b.mark_paid().unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidTransition {
                from: BookingStatus::Cancelled,
                to: BookingStatus::Paid
            }
        ));

        let err = b.cancel("admin-9", Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));
        // audit fields are never overwritten
        assert_eq!(b.cancelled_by.as_deref(), Some("user-1"));
        assert_eq!(b.cancelled_at, Some(at));
    }

    #[test]
    fn paid_cannot_return_to_pending() {
        assert!(!BookingStatus::Paid.can_transition_to(BookingStatus::Pending));
        assert!(!BookingStatus::Cancelled.can_transition_to(BookingStatus::Pending));
        assert!(BookingStatus::sources_of(BookingStatus::Pending).is_empty());
    }

    #[test]
    fn sources_match_transition_table() {
        let all = [
            BookingStatus::Pending,
            BookingStatus::Paid,
            BookingStatus::Cancelled,
        ];
        for next in all {
            for from in all {
                assert_eq!(
                    BookingStatus::sources_of(next).contains(&from),
                    from.can_transition_to(next),
                    "{from} -> {next}"
                );
            }
        }
    }

    #[test]
    fn reference_is_short_upper_hex() {
        let b = sample_booking();
        let r = b.reference();
        assert_eq!(r.len(), 8);
        assert!(r.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert_eq!(BookingStatus::parse("refunded"), None);
        assert_eq!(BookingStatus::parse("paid"), Some(BookingStatus::Paid));
    }
}
