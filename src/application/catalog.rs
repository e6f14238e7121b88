//! Catalog administration
//!
//! The two tour writes operators perform: publishing and the per-date cap.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::domain::{Actor, DomainError, DomainResult, RepositoryProvider, Tour, TourStatus};
use crate::shared::time::bounded;

pub struct CatalogAdmin {
    repos: Arc<dyn RepositoryProvider>,
    storage_timeout: Duration,
}

impl CatalogAdmin {
    pub fn new(repos: Arc<dyn RepositoryProvider>, storage_timeout: Duration) -> Self {
        Self {
            repos,
            storage_timeout,
        }
    }

    pub async fn set_status(
        &self,
        actor: &Actor,
        tour_id: &str,
        status: TourStatus,
    ) -> DomainResult<Tour> {
        require_admin(actor)?;
        let tour = bounded(
            self.storage_timeout,
            "tours.set_status",
            self.repos.tours().set_status(tour_id, status),
        )
        .await?;
        info!(tour_id, status = %status, actor = %actor.user_id, "🗂️ Tour status changed");
        Ok(tour)
    }

    /// Existing bookings above a lowered cap stay valid; the key just reads
    /// as sold out from then on.
    pub async fn set_capacity(
        &self,
        actor: &Actor,
        tour_id: &str,
        max_total_slots: u32,
    ) -> DomainResult<Tour> {
        require_admin(actor)?;
        if max_total_slots == 0 {
            return Err(DomainError::Validation(
                "max_total_slots must be at least 1".to_string(),
            ));
        }
        let tour = bounded(
            self.storage_timeout,
            "tours.set_max_total_slots",
            self.repos.tours().set_max_total_slots(tour_id, max_total_slots),
        )
        .await?;
        info!(tour_id, max_total_slots, actor = %actor.user_id, "🗂️ Tour capacity changed");
        Ok(tour)
    }
}

fn require_admin(actor: &Actor) -> DomainResult<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(DomainError::Forbidden("Admin access required".to_string()))
    }
}
