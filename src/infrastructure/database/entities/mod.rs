//! Database entities module

pub mod booking;
pub mod profile;
pub mod tour;

pub use booking::Entity as Booking;
pub use profile::Entity as Profile;
pub use tour::Entity as Tour;
