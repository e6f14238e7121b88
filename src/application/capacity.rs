//! Capacity aggregation
//!
//! Read-side projection over the booking ledger. Everything here is
//! recomputed from committed rows on each call; nothing is cached.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::occupancy::{booked_guests, tally};
use crate::domain::{
    BookingStatus, DomainError, DomainResult, Occupancy, OccupancyKey, RepositoryProvider,
};
use crate::shared::time::bounded;

/// Title used when a booking points at a tour the catalog no longer has
pub const UNKNOWN_TOUR_TITLE: &str = "Tour";

/// A (tour, date) at or over its per-date capacity
#[derive(Debug, Clone)]
pub struct SoldOutAlert {
    pub occupancy: Occupancy,
    pub tour_title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TourActivity {
    pub tour_id: String,
    pub tour_title: String,
    pub active_bookings: u64,
}

/// Operator dashboard figures
#[derive(Debug, Clone)]
pub struct DashboardStats {
    /// Sum of `total_price` over bookings that are not cancelled
    pub total_revenue: Decimal,
    /// pending + paid
    pub active_bookings: u64,
    pub cancelled_bookings: u64,
    pub total_tours: u64,
    pub active_bookings_by_tour: Vec<TourActivity>,
}

pub struct CapacityAggregator {
    repos: Arc<dyn RepositoryProvider>,
    storage_timeout: Duration,
}

impl CapacityAggregator {
    pub fn new(repos: Arc<dyn RepositoryProvider>, storage_timeout: Duration) -> Self {
        Self {
            repos,
            storage_timeout,
        }
    }

    /// Guests booked on `start_date` against the tour's `max_total_slots`.
    ///
    /// Draft tours are still accounted for; only a missing tour is an error.
    pub async fn occupancy(&self, tour_id: &str, start_date: NaiveDate) -> DomainResult<Occupancy> {
        let tour = bounded(
            self.storage_timeout,
            "tours.find_by_id",
            self.repos.tours().find_by_id(tour_id),
        )
        .await?
        .ok_or_else(|| DomainError::NotFound {
            entity: "Tour",
            field: "id",
            value: tour_id.to_string(),
        })?;

        let bookings = bounded(
            self.storage_timeout,
            "bookings.list_by_tour_and_date_range",
            self.repos
                .bookings()
                .list_by_tour_and_date_range(Some(tour_id), start_date, start_date),
        )
        .await?;

        Ok(Occupancy {
            key: OccupancyKey::new(tour_id, start_date),
            booked: booked_guests(&bookings),
            capacity: tour.max_total_slots,
        })
    }

    /// Catalog title of a tour, any status. Lookup failures read as absent.
    pub async fn tour_title(&self, tour_id: &str) -> Option<String> {
        bounded(
            self.storage_timeout,
            "tours.find_by_id",
            self.repos.tours().find_by_id(tour_id),
        )
        .await
        .ok()
        .flatten()
        .map(|t| t.title)
    }

    /// Every sold-out (tour, date) with `from <= date <= to`, ordered by date.
    pub async fn sold_out(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DomainResult<Vec<SoldOutAlert>> {
        if from > to {
            return Err(DomainError::Validation(
                "`from` must not be after `to`".to_string(),
            ));
        }

        let tours: HashMap<String, _> = bounded(
            self.storage_timeout,
            "tours.find_all",
            self.repos.tours().find_all(),
        )
        .await?
        .into_iter()
        .map(|t| (t.id.clone(), t))
        .collect();

        let bookings = bounded(
            self.storage_timeout,
            "bookings.list_by_tour_and_date_range",
            self.repos.bookings().list_by_tour_and_date_range(None, from, to),
        )
        .await?;

        let mut alerts: Vec<SoldOutAlert> = tally(&bookings)
            .into_iter()
            .filter_map(|(key, booked)| {
                let tour = tours.get(&key.tour_id)?;
                let occupancy = Occupancy {
                    key,
                    booked,
                    capacity: tour.max_total_slots,
                };
                occupancy.is_sold_out().then(|| SoldOutAlert {
                    occupancy,
                    tour_title: tour.title.clone(),
                })
            })
            .collect();
        alerts.sort_by(|a, b| {
            (a.occupancy.key.start_date, &a.tour_title)
                .cmp(&(b.occupancy.key.start_date, &b.tour_title))
        });
        Ok(alerts)
    }

    pub async fn dashboard(&self) -> DomainResult<DashboardStats> {
        let tours = bounded(
            self.storage_timeout,
            "tours.find_all",
            self.repos.tours().find_all(),
        )
        .await?;
        let bookings = bounded(
            self.storage_timeout,
            "bookings.list_all",
            self.repos.bookings().list_all(),
        )
        .await?;

        let mut total_revenue = Decimal::ZERO;
        let mut active_bookings = 0;
        let mut cancelled_bookings = 0;
        let mut per_tour: BTreeMap<&str, u64> = BTreeMap::new();

        for booking in &bookings {
            if booking.status == BookingStatus::Cancelled {
                cancelled_bookings += 1;
                continue;
            }
            active_bookings += 1;
            total_revenue += booking.total_price;
            *per_tour.entry(booking.tour_id.as_str()).or_insert(0) += 1;
        }

        let titles: HashMap<&str, &str> = tours
            .iter()
            .map(|t| (t.id.as_str(), t.title.as_str()))
            .collect();
        let mut active_bookings_by_tour: Vec<TourActivity> = per_tour
            .into_iter()
            .map(|(tour_id, count)| TourActivity {
                tour_id: tour_id.to_string(),
                tour_title: titles
                    .get(tour_id)
                    .copied()
                    .unwrap_or(UNKNOWN_TOUR_TITLE)
                    .to_string(),
                active_bookings: count,
            })
            .collect();
        active_bookings_by_tour.sort_by(|a, b| b.active_bookings.cmp(&a.active_bookings));

        Ok(DashboardStats {
            total_revenue,
            active_bookings,
            cancelled_bookings,
            total_tours: tours.len() as u64,
            active_bookings_by_tour,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Booking, Tour, TourStatus};
    use crate::infrastructure::storage::InMemoryRepositoryProvider;
    use chrono::Utc;

    fn tour(id: &str, title: &str, slots: u32) -> Tour {
        Tour {
            id: id.into(),
            title: title.into(),
            price_per_person: Decimal::from(100),
            discount_price: None,
            max_group_size: 8,
            max_total_slots: slots,
            status: TourStatus::Published,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, d).unwrap()
    }

    async fn book(
        repos: &InMemoryRepositoryProvider,
        tour_id: &str,
        user: &str,
        d: u32,
        guests: u32,
    ) -> uuid::Uuid {
        let booking = Booking::new_pending(
            tour_id,
            user,
            day(d),
            guests,
            "0712345678",
            Decimal::from(guests * 100),
            Utc::now(),
        );
        repos.bookings().insert(booking).await.unwrap()
    }

    fn aggregator(repos: &Arc<InMemoryRepositoryProvider>) -> CapacityAggregator {
        CapacityAggregator::new(repos.clone(), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn soft_capacity_overbooking_is_detected() {
        let repos = Arc::new(InMemoryRepositoryProvider::with_tours([tour(
            "tour-b",
            "Kilimanjaro",
            10,
        )]));
        book(&repos, "tour-b", "u1", 1, 6).await;
        book(&repos, "tour-b", "u2", 1, 5).await;

        let occ = aggregator(&repos).occupancy("tour-b", day(1)).await.unwrap();
        assert_eq!(occ.booked, 11);
        assert_eq!(occ.capacity, 10);
        assert!(occ.is_sold_out());
    }

    #[tokio::test]
    async fn cancelled_guests_are_excluded() {
        let repos = Arc::new(InMemoryRepositoryProvider::with_tours([tour(
            "tour-b",
            "Kilimanjaro",
            10,
        )]));
        let first = book(&repos, "tour-b", "u1", 1, 6).await;
        book(&repos, "tour-b", "u2", 1, 5).await;

        repos
            .bookings()
            .transition_to_cancelled(first, "u1", Utc::now())
            .await
            .unwrap();

        let occ = aggregator(&repos).occupancy("tour-b", day(1)).await.unwrap();
        assert_eq!(occ.booked, 5);
        assert!(!occ.is_sold_out());
    }

    #[tokio::test]
    async fn unlimited_tours_never_sell_out() {
        let repos =
            Arc::new(InMemoryRepositoryProvider::with_tours([tour("open", "City Walk", 0)]));
        book(&repos, "open", "u1", 2, 8).await;

        let occ = aggregator(&repos).occupancy("open", day(2)).await.unwrap();
        assert_eq!(occ.booked, 8);
        assert!(!occ.is_sold_out());
        assert_eq!(occ.remaining(), None);
    }

    #[tokio::test]
    async fn occupancy_of_unknown_tour_is_not_found() {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let err = aggregator(&repos).occupancy("ghost", day(1)).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn sold_out_lists_only_full_keys_in_range() {
        let repos = Arc::new(InMemoryRepositoryProvider::with_tours([
            tour("tour-b", "Kilimanjaro", 10),
            tour("tour-c", "Serengeti", 4),
        ]));
        book(&repos, "tour-b", "u1", 1, 6).await;
        book(&repos, "tour-b", "u2", 1, 5).await;
        book(&repos, "tour-c", "u1", 3, 4).await;
        book(&repos, "tour-c", "u1", 4, 2).await;
        book(&repos, "tour-c", "u1", 20, 4).await;

        let alerts = aggregator(&repos).sold_out(day(1), day(10)).await.unwrap();
        let keys: Vec<(&str, NaiveDate)> = alerts
            .iter()
            .map(|a| (a.occupancy.key.tour_id.as_str(), a.occupancy.key.start_date))
            .collect();
        assert_eq!(keys, vec![("tour-b", day(1)), ("tour-c", day(3))]);
        assert_eq!(alerts[0].tour_title, "Kilimanjaro");
    }

    #[tokio::test]
    async fn inverted_range_is_rejected() {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let err = aggregator(&repos).sold_out(day(5), day(1)).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn dashboard_counts_revenue_over_active_bookings() {
        let repos = Arc::new(InMemoryRepositoryProvider::with_tours([
            tour("tour-b", "Kilimanjaro", 10),
            tour("tour-c", "Serengeti", 4),
        ]));
        book(&repos, "tour-b", "u1", 1, 2).await;
        let paid = book(&repos, "tour-b", "u2", 1, 3).await;
        let gone = book(&repos, "tour-c", "u1", 3, 4).await;
        book(&repos, "tour-x", "u3", 3, 1).await;

        repos.bookings().transition_to_paid(paid).await.unwrap();
        repos
            .bookings()
            .transition_to_cancelled(gone, "admin", Utc::now())
            .await
            .unwrap();

        let stats = aggregator(&repos).dashboard().await.unwrap();
        assert_eq!(stats.total_revenue, Decimal::from(600));
        assert_eq!(stats.active_bookings, 3);
        assert_eq!(stats.cancelled_bookings, 1);
        assert_eq!(stats.total_tours, 2);
        assert_eq!(stats.active_bookings_by_tour[0].tour_title, "Kilimanjaro");
        assert_eq!(stats.active_bookings_by_tour[0].active_bookings, 2);
        assert!(stats
            .active_bookings_by_tour
            .iter()
            .any(|t| t.tour_id == "tour-x" && t.tour_title == UNKNOWN_TOUR_TITLE));
    }
}
