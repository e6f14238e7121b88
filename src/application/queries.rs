//! Booking reads
//!
//! Travelers see their own bookings; administrators see everything.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::application::cancellation::{load_authorized, CancellationError};
use crate::domain::{Actor, Booking, DomainError, DomainResult, RepositoryProvider};
use crate::shared::time::bounded;

/// One page of the ledger
#[derive(Debug, Clone)]
pub struct BookingPage {
    pub items: Vec<Booking>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

pub struct BookingQueries {
    repos: Arc<dyn RepositoryProvider>,
    storage_timeout: Duration,
}

impl BookingQueries {
    pub fn new(repos: Arc<dyn RepositoryProvider>, storage_timeout: Duration) -> Self {
        Self {
            repos,
            storage_timeout,
        }
    }

    /// Single booking, visible to its owner or an administrator
    pub async fn get(&self, booking_id: Uuid, actor: &Actor) -> Result<Booking, CancellationError> {
        load_authorized(self.repos.as_ref(), self.storage_timeout, booking_id, actor).await
    }

    /// The actor's own bookings, newest first
    pub async fn list_mine(&self, actor: &Actor) -> DomainResult<Vec<Booking>> {
        bounded(
            self.storage_timeout,
            "bookings.list_by_user",
            self.repos.bookings().list_by_user(&actor.user_id),
        )
        .await
    }

    /// Every booking, newest first, paginated. Administrators only.
    pub async fn list_all(
        &self,
        actor: &Actor,
        page: u64,
        limit: u64,
    ) -> DomainResult<BookingPage> {
        if !actor.is_admin() {
            return Err(DomainError::Forbidden("Admin access required".to_string()));
        }

        let all = bounded(
            self.storage_timeout,
            "bookings.list_all",
            self.repos.bookings().list_all(),
        )
        .await?;

        let total = all.len() as u64;
        let offset = page.saturating_sub(1).saturating_mul(limit);
        let items = all
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect();

        Ok(BookingPage {
            items,
            total,
            page,
            limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::InMemoryRepositoryProvider;
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    async fn seed(repos: &InMemoryRepositoryProvider, user: &str, day: u32) -> Uuid {
        let booking = Booking::new_pending(
            "tour-a",
            user,
            NaiveDate::from_ymd_opt(2026, 9, day).unwrap(),
            2,
            "0712345678",
            Decimal::from(200),
            Utc::now(),
        );
        repos.bookings().insert(booking).await.unwrap()
    }

    fn queries(repos: &Arc<InMemoryRepositoryProvider>) -> BookingQueries {
        BookingQueries::new(repos.clone(), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn travelers_only_see_their_own() {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let mine = seed(&repos, "u1", 1).await;
        let theirs = seed(&repos, "u2", 1).await;

        let q = queries(&repos);
        let listed = q.list_mine(&Actor::traveler("u1")).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, mine);

        let err = q.get(theirs, &Actor::traveler("u1")).await.unwrap_err();
        assert!(matches!(err, CancellationError::Forbidden(_)));
        assert!(q.get(theirs, &Actor::admin("staff")).await.is_ok());
    }

    #[tokio::test]
    async fn admin_listing_is_paginated() {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        for day in 1..=5 {
            seed(&repos, "u1", day).await;
        }

        let q = queries(&repos);
        let page = q.list_all(&Actor::admin("staff"), 2, 2).await.unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 2);

        let last = q.list_all(&Actor::admin("staff"), 3, 2).await.unwrap();
        assert_eq!(last.items.len(), 1);

        let err = q.list_all(&Actor::traveler("u1"), 1, 10).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }
}
