//! Booking aggregate
//!
//! Contains the Booking entity, its lifecycle rules, and the ledger interface.

pub mod model;
pub mod repository;

pub use model::{Booking, BookingStatus};
pub use repository::BookingRepository;
