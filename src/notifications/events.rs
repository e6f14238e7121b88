//! Booking lifecycle events

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Booking;

/// Event types published on the bus
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    /// A booking was admitted in state pending
    BookingConfirmed(BookingEvent),
    /// A booking moved to cancelled
    BookingCancelled(BookingEvent),
    /// Payment was recorded for a booking
    BookingPaid(BookingEvent),
    /// A tour date reached its per-date capacity
    SoldOut(SoldOutEvent),
}

impl Event {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::BookingConfirmed(_) => "booking_confirmed",
            Event::BookingCancelled(_) => "booking_cancelled",
            Event::BookingPaid(_) => "booking_paid",
            Event::SoldOut(_) => "sold_out",
        }
    }

    /// Get the booking ID if applicable
    pub fn booking_id(&self) -> Option<Uuid> {
        match self {
            Event::BookingConfirmed(e) | Event::BookingCancelled(e) | Event::BookingPaid(e) => {
                Some(e.booking_id)
            }
            Event::SoldOut(_) => None,
        }
    }
}

/// Snapshot of a booking at the moment of the event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingEvent {
    pub booking_id: Uuid,
    pub tour_id: String,
    /// Known at admission; resolved from the catalog otherwise
    pub tour_title: Option<String>,
    pub user_id: String,
    pub actor_id: String,
    pub start_date: NaiveDate,
    pub guests_count: u32,
    pub total_price: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl BookingEvent {
    pub fn from_booking(
        booking: &Booking,
        tour_title: Option<String>,
        actor_id: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            booking_id: booking.id,
            tour_id: booking.tour_id.clone(),
            tour_title,
            user_id: booking.user_id.clone(),
            actor_id: actor_id.into(),
            start_date: booking.start_date,
            guests_count: booking.guests_count,
            total_price: booking.total_price,
            timestamp,
        }
    }
}

/// Sold-out alert for a (tour, date)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoldOutEvent {
    pub tour_id: String,
    pub tour_title: String,
    pub start_date: NaiveDate,
    pub booked: u64,
    pub capacity: u32,
    pub timestamp: DateTime<Utc>,
}

/// Event wrapper with delivery metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub id: Uuid,
    pub event: Event,
    pub published_at: DateTime<Utc>,
}

impl EventMessage {
    pub fn new(event: Event) -> Self {
        Self {
            id: Uuid::new_v4(),
            event,
            published_at: Utc::now(),
        }
    }
}
