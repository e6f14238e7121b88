//! Capacity accounting per (tour, date)

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::booking::Booking;

/// Unit of capacity accounting
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OccupancyKey {
    pub tour_id: String,
    pub start_date: NaiveDate,
}

impl OccupancyKey {
    pub fn new(tour_id: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            tour_id: tour_id.into(),
            start_date,
        }
    }
}

/// Guests booked against a key versus the tour's per-date cap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupancy {
    pub key: OccupancyKey,
    pub booked: u64,
    /// `max_total_slots` of the tour; 0 = unlimited
    pub capacity: u32,
}

impl Occupancy {
    pub fn is_sold_out(&self) -> bool {
        self.capacity > 0 && self.booked >= u64::from(self.capacity)
    }

    /// Seats left, `None` when unlimited
    pub fn remaining(&self) -> Option<u64> {
        (self.capacity > 0).then(|| u64::from(self.capacity).saturating_sub(self.booked))
    }
}

/// Sum of guests over bookings that still hold a slot
pub fn booked_guests<'a>(bookings: impl IntoIterator<Item = &'a Booking>) -> u64 {
    bookings
        .into_iter()
        .filter(|b| b.holds_slot())
        .map(|b| u64::from(b.guests_count))
        .sum()
}

/// Booked guests per key, cancelled bookings excluded
pub fn tally<'a>(bookings: impl IntoIterator<Item = &'a Booking>) -> BTreeMap<OccupancyKey, u64> {
    let mut out = BTreeMap::new();
    for booking in bookings.into_iter().filter(|b| b.holds_slot()) {
        *out.entry(booking.occupancy_key()).or_insert(0) += u64::from(booking.guests_count);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn booking(tour: &str, day: u32, guests: u32) -> Booking {
        Booking::new_pending(
            tour,
            "u1",
            NaiveDate::from_ymd_opt(2026, 7, day).unwrap(),
            guests,
            "0712345678",
            Decimal::from(guests * 10),
            Utc::now(),
        )
    }

    #[test]
    fn sold_out_requires_positive_capacity() {
        let key = OccupancyKey::new("t", NaiveDate::from_ymd_opt(2026, 7, 1).unwrap());
        let unlimited = Occupancy {
            key: key.clone(),
            booked: 500,
            capacity: 0,
        };
        assert!(!unlimited.is_sold_out());
        assert_eq!(unlimited.remaining(), None);

        let full = Occupancy {
            key: key.clone(),
            booked: 11,
            capacity: 10,
        };
        assert!(full.is_sold_out());
        assert_eq!(full.remaining(), Some(0));

        let open = Occupancy {
            key,
            booked: 9,
            capacity: 10,
        };
        assert!(!open.is_sold_out());
        assert_eq!(open.remaining(), Some(1));
    }

    #[test]
    fn cancelled_bookings_do_not_count() {
        let mut cancelled = booking("t", 1, 4);
        cancelled.cancel("u1", Utc::now()).unwrap();
        let mut paid = booking("t", 1, 2);
        paid.mark_paid().unwrap();
        let all = vec![booking("t", 1, 3), cancelled, paid];
        assert_eq!(booked_guests(&all), 5);
    }

    #[test]
    fn tally_groups_by_tour_and_date() {
        let all = vec![
            booking("a", 1, 6),
            booking("a", 1, 5),
            booking("a", 2, 1),
            booking("b", 1, 2),
        ];
        let t = tally(&all);
        let d1 = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2026, 7, 2).unwrap();
        assert_eq!(t[&OccupancyKey::new("a", d1)], 11);
        assert_eq!(t[&OccupancyKey::new("a", d2)], 1);
        assert_eq!(t[&OccupancyKey::new("b", d1)], 2);
        assert_eq!(t.len(), 3);
    }
}
