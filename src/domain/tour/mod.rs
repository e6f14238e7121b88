//! Tour aggregate (catalog view)
//!
//! Only the fields the booking core needs: prices, limits and publication state.

pub mod model;
pub mod repository;

pub use model::{Tour, TourStatus};
pub use repository::TourRepository;
