//! Storage adapter whose writes never come back in time
//!
//! Wraps the in-memory provider. Ledger writes and contact lookups sleep for
//! `stall` before delegating; every other call is answered immediately.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::memory::InMemoryRepositoryProvider;
use crate::domain::{
    Booking, BookingRepository, Contact, ContactDirectory, DomainResult, RepositoryProvider,
    TourRepository,
};

pub struct StalledRepositoryProvider {
    inner: Arc<InMemoryRepositoryProvider>,
    stall: Duration,
}

impl StalledRepositoryProvider {
    pub fn new(inner: Arc<InMemoryRepositoryProvider>, stall: Duration) -> Self {
        Self { inner, stall }
    }
}

#[async_trait]
impl BookingRepository for StalledRepositoryProvider {
    async fn insert(&self, booking: Booking) -> DomainResult<Uuid> {
        tokio::time::sleep(self.stall).await;
        self.inner.bookings().insert(booking).await
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Booking>> {
        self.inner.bookings().find_by_id(id).await
    }

    async fn find_pending_duplicate(
        &self,
        tour_id: &str,
        user_id: &str,
        start_date: NaiveDate,
    ) -> DomainResult<Option<Booking>> {
        self.inner
            .bookings()
            .find_pending_duplicate(tour_id, user_id, start_date)
            .await
    }

    async fn transition_to_cancelled(
        &self,
        id: Uuid,
        actor_id: &str,
        at: DateTime<Utc>,
    ) -> DomainResult<Booking> {
        tokio::time::sleep(self.stall).await;
        self.inner
            .bookings()
            .transition_to_cancelled(id, actor_id, at)
            .await
    }

    async fn transition_to_paid(&self, id: Uuid) -> DomainResult<Booking> {
        tokio::time::sleep(self.stall).await;
        self.inner.bookings().transition_to_paid(id).await
    }

    async fn list_by_tour_and_date_range(
        &self,
        tour_id: Option<&str>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DomainResult<Vec<Booking>> {
        self.inner
            .bookings()
            .list_by_tour_and_date_range(tour_id, from, to)
            .await
    }

    async fn list_by_user(&self, user_id: &str) -> DomainResult<Vec<Booking>> {
        self.inner.bookings().list_by_user(user_id).await
    }

    async fn list_all(&self) -> DomainResult<Vec<Booking>> {
        self.inner.bookings().list_all().await
    }
}

#[async_trait]
impl ContactDirectory for StalledRepositoryProvider {
    async fn find_contact(&self, user_id: &str) -> DomainResult<Option<Contact>> {
        tokio::time::sleep(self.stall).await;
        self.inner.contacts().find_contact(user_id).await
    }
}

#[async_trait]
impl RepositoryProvider for StalledRepositoryProvider {
    fn tours(&self) -> &dyn TourRepository {
        self.inner.tours()
    }

    fn bookings(&self) -> &dyn BookingRepository {
        self
    }

    fn contacts(&self) -> &dyn ContactDirectory {
        self
    }

    async fn ping(&self) -> DomainResult<()> {
        Ok(())
    }
}
