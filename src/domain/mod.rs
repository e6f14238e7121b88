//! Domain layer: booking ledger entities, catalog view of tours, pricing and
//! occupancy rules, and the ports the application layer depends on.

pub mod booking;
pub mod identity;
pub mod occupancy;
pub mod pricing;
pub mod repositories;
pub mod tour;

pub use booking::{Booking, BookingRepository, BookingStatus};
pub use identity::{Actor, Contact, ContactDirectory, Role};
pub use occupancy::{Occupancy, OccupancyKey};
pub use pricing::PriceQuote;
pub use repositories::{DomainResult, RepositoryProvider};
pub use tour::{Tour, TourRepository, TourStatus};

// Re-export DomainError from shared for convenience
pub use crate::shared::errors::DomainError;
