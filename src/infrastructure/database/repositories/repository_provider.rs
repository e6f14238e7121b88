//! SeaORM implementation of RepositoryProvider

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::domain::repositories::RepositoryProvider;
use crate::domain::{BookingRepository, ContactDirectory, DomainResult, TourRepository};

use super::booking_repository::SeaOrmBookingRepository;
use super::db_err;
use super::profile_repository::SeaOrmContactDirectory;
use super::tour_repository::SeaOrmTourRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let tour = repos.tours().find_published("tour-1").await?;
/// let mine = repos.bookings().list_by_user("user-1").await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    db: DatabaseConnection,
    tours: SeaOrmTourRepository,
    bookings: SeaOrmBookingRepository,
    contacts: SeaOrmContactDirectory,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            tours: SeaOrmTourRepository::new(db.clone()),
            bookings: SeaOrmBookingRepository::new(db.clone()),
            contacts: SeaOrmContactDirectory::new(db.clone()),
            db,
        }
    }

    /// Concrete catalog repository, for provisioning
    pub fn tour_store(&self) -> &SeaOrmTourRepository {
        &self.tours
    }

    /// Concrete profile directory, for provisioning
    pub fn contact_store(&self) -> &SeaOrmContactDirectory {
        &self.contacts
    }
}

#[async_trait]
impl RepositoryProvider for SeaOrmRepositoryProvider {
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
        self.db.ping().await.map_err(db_err)
    }
}
