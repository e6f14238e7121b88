//! In-memory storage implementation
//!
//! Same contracts as the database repositories, including the pending
//! uniqueness rule and atomic status transitions. Used for development and
//! testing.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::{
    Booking, BookingRepository, BookingStatus, Contact, ContactDirectory, DomainError,
    DomainResult, RepositoryProvider, Tour, TourRepository, TourStatus,
};

type PendingKey = (String, String, NaiveDate);

fn pending_key(booking: &Booking) -> PendingKey {
    (
        booking.tour_id.clone(),
        booking.user_id.clone(),
        booking.start_date,
    )
}

fn newest_first(mut bookings: Vec<Booking>) -> Vec<Booking> {
    bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    bookings
}

// ── Tours ──────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryTourRepository {
    tours: DashMap<String, Tour>,
}

impl InMemoryTourRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, tour: Tour) {
        self.tours.insert(tour.id.clone(), tour);
    }

    fn update<F>(&self, id: &str, apply: F) -> DomainResult<Tour>
    where
        F: FnOnce(&mut Tour),
    {
        let mut tour = self.tours.get_mut(id).ok_or_else(|| DomainError::NotFound {
            entity: "Tour",
            field: "id",
            value: id.to_string(),
        })?;
        apply(&mut *tour);
        Ok(tour.clone())
    }
}

#[async_trait]
impl TourRepository for InMemoryTourRepository {
    async fn find_published(&self, id: &str) -> DomainResult<Option<Tour>> {
        Ok(self
            .tours
            .get(id)
            .filter(|t| t.is_published())
            .map(|t| t.clone()))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Tour>> {
        Ok(self.tours.get(id).map(|t| t.clone()))
    }

    async fn find_all(&self) -> DomainResult<Vec<Tour>> {
        let mut tours: Vec<Tour> = self.tours.iter().map(|e| e.value().clone()).collect();
        tours.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(tours)
    }

    async fn set_status(&self, id: &str, status: TourStatus) -> DomainResult<Tour> {
        self.update(id, |t| t.status = status)
    }

    async fn set_max_total_slots(&self, id: &str, max_total_slots: u32) -> DomainResult<Tour> {
        self.update(id, |t| t.max_total_slots = max_total_slots)
    }
}

// ── Bookings ───────────────────────────────────────────────────

/// Ledger backed by two maps.
///
/// `pending_keys` owns the uniqueness rule: a booking is only stored after
/// it has claimed its (tour, user, date) key through an atomic entry insert.
/// A key whose owner is already stored and no longer pending is stale (its
/// release is still on the way) and is taken over by the next insert.
/// Lock order: `pending_keys` before `bookings`; a `bookings` guard is always
/// released before `pending_keys` is touched.
#[derive(Default)]
pub struct InMemoryBookingRepository {
    bookings: DashMap<Uuid, Booking>,
    pending_keys: DashMap<PendingKey, Uuid>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    fn release_pending_key(&self, booking: &Booking) {
        self.pending_keys
            .remove_if(&pending_key(booking), |_, owner| *owner == booking.id);
    }

    fn apply_transition<F>(&self, id: Uuid, apply: F) -> DomainResult<(BookingStatus, Booking)>
    where
        F: FnOnce(&mut Booking) -> DomainResult<()>,
    {
        let mut entry = self.bookings.get_mut(&id).ok_or_else(|| DomainError::NotFound {
            entity: "Booking",
            field: "id",
            value: id.to_string(),
        })?;
        let previous = entry.status;
        apply(&mut *entry)?;
        Ok((previous, entry.clone()))
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn insert(&self, booking: Booking) -> DomainResult<Uuid> {
        if self.bookings.contains_key(&booking.id) {
            return Err(DomainError::Conflict(format!("booking {}", booking.id)));
        }

        let id = booking.id;
        if booking.status == BookingStatus::Pending {
            match self.pending_keys.entry(pending_key(&booking)) {
                Entry::Occupied(mut slot) => {
                    // an owner not stored yet is an insert still in progress
                    let owner_pending = self
                        .bookings
                        .get(slot.get())
                        .map_or(true, |owner| owner.status == BookingStatus::Pending);
                    if owner_pending {
                        return Err(DomainError::DuplicatePending {
                            tour_id: booking.tour_id,
                            user_id: booking.user_id,
                            start_date: booking.start_date,
                        });
                    }
                    slot.insert(id);
                }
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
        }

        self.bookings.insert(id, booking);
        Ok(id)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Booking>> {
        Ok(self.bookings.get(&id).map(|b| b.clone()))
    }

    async fn find_pending_duplicate(
        &self,
        tour_id: &str,
        user_id: &str,
        start_date: NaiveDate,
    ) -> DomainResult<Option<Booking>> {
        let key = (tour_id.to_string(), user_id.to_string(), start_date);
        let Some(id) = self.pending_keys.get(&key).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self
            .bookings
            .get(&id)
            .filter(|b| b.status == BookingStatus::Pending)
            .map(|b| b.clone()))
    }

    async fn transition_to_cancelled(
        &self,
        id: Uuid,
        actor_id: &str,
        at: DateTime<Utc>,
    ) -> DomainResult<Booking> {
        let (previous, booking) = self.apply_transition(id, |b| b.cancel(actor_id, at))?;
        if previous == BookingStatus::Pending {
            self.release_pending_key(&booking);
        }
        Ok(booking)
    }

    async fn transition_to_paid(&self, id: Uuid) -> DomainResult<Booking> {
        let (_, booking) = self.apply_transition(id, |b| b.mark_paid())?;
        self.release_pending_key(&booking);
        Ok(booking)
    }

    async fn list_by_tour_and_date_range(
        &self,
        tour_id: Option<&str>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DomainResult<Vec<Booking>> {
        let mut out: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|e| tour_id.map_or(true, |t| e.tour_id == t))
            .filter(|e| e.start_date >= from && e.start_date <= to)
            .map(|e| e.value().clone())
            .collect();
        out.sort_by(|a, b| {
            (a.start_date, &a.tour_id, a.created_at).cmp(&(b.start_date, &b.tour_id, b.created_at))
        });
        Ok(out)
    }

    async fn list_by_user(&self, user_id: &str) -> DomainResult<Vec<Booking>> {
        Ok(newest_first(
            self.bookings
                .iter()
                .filter(|e| e.user_id == user_id)
                .map(|e| e.value().clone())
                .collect(),
        ))
    }

    async fn list_all(&self) -> DomainResult<Vec<Booking>> {
        Ok(newest_first(
            self.bookings.iter().map(|e| e.value().clone()).collect(),
        ))
    }
}

// ── Contacts ───────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryContactDirectory {
    contacts: DashMap<String, Contact>,
}

impl InMemoryContactDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, user_id: impl Into<String>, contact: Contact) {
        self.contacts.insert(user_id.into(), contact);
    }
}

#[async_trait]
impl ContactDirectory for InMemoryContactDirectory {
    async fn find_contact(&self, user_id: &str) -> DomainResult<Option<Contact>> {
        Ok(self.contacts.get(user_id).map(|c| c.clone()))
    }
}

// ── Provider ───────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryRepositoryProvider {
    tours: InMemoryTourRepository,
    bookings: InMemoryBookingRepository,
    contacts: InMemoryContactDirectory,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tours(tours: impl IntoIterator<Item = Tour>) -> Self {
        let provider = Self::new();
        for tour in tours {
            provider.tours.upsert(tour);
        }
        provider
    }

    pub fn tour_store(&self) -> &InMemoryTourRepository {
        &self.tours
    }

    pub fn booking_store(&self) -> &InMemoryBookingRepository {
        &self.bookings
    }

    pub fn contact_store(&self) -> &InMemoryContactDirectory {
        &self.contacts
    }
}

#[async_trait]
impl RepositoryProvider for InMemoryRepositoryProvider {
    fn tours(&self) -> &dyn TourRepository {
        &self.tours
    }

    fn bookings(&self) -> &dyn BookingRepository {
        &self.bookings
    }

    fn contacts(&self) -> &dyn ContactDirectory {
        &self.contacts
    }

    async fn ping(&self) -> DomainResult<()> {
        Ok(())
    }
}
