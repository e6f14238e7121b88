//! In-process storage adapters

pub mod memory;
#[cfg(test)]
pub mod stalled;

pub use memory::{
    InMemoryBookingRepository, InMemoryContactDirectory, InMemoryRepositoryProvider,
    InMemoryTourRepository,
};
#[cfg(test)]
pub use stalled::StalledRepositoryProvider;
