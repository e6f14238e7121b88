//! Application layer: booking use cases and background monitors.
//!
//! Every entry point takes the caller's [`Actor`](crate::domain::Actor)
//! explicitly; nothing here reads ambient session state.

pub mod admission;
pub mod cancellation;
pub mod capacity;
pub mod capacity_monitor;
pub mod catalog;
pub mod payment;
pub mod ports;
pub mod queries;

pub use admission::{AdmissionController, AdmissionError, AdmissionSettings, BookingRequest};
pub use cancellation::{CancellationError, CancellationHandler};
pub use capacity::{CapacityAggregator, DashboardStats, SoldOutAlert, TourActivity};
pub use capacity_monitor::CapacityMonitor;
pub use catalog::CatalogAdmin;
pub use payment::PaymentRecorder;
pub use queries::{BookingPage, BookingQueries};
pub use ports::{BookingEmail, NotificationError, NotificationKind, Notifier, SharedNotifier};
