//! Tour catalog interface

use async_trait::async_trait;

use super::model::{Tour, TourStatus};
use crate::domain::DomainResult;

#[async_trait]
pub trait TourRepository: Send + Sync {
    /// Find a tour only if it is published.
    ///
    /// Missing and draft tours are indistinguishable to the caller.
    async fn find_published(&self, id: &str) -> DomainResult<Option<Tour>>;

    /// Find a tour regardless of status
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Tour>>;

    /// All tours, any status
    async fn find_all(&self) -> DomainResult<Vec<Tour>>;

    /// Publish or unpublish a tour
    async fn set_status(&self, id: &str, status: TourStatus) -> DomainResult<Tour>;

    /// Change the per-date capacity cap
    async fn set_max_total_slots(&self, id: &str, max_total_slots: u32) -> DomainResult<Tour>;
}
