//! # Tour Booking Service
//!
//! Admission, pricing and capacity tracking for tour bookings.
//!
//! ## Architecture
//!
//! - **domain**: bookings, tours, pricing and occupancy rules, repository ports
//! - **application**: admission, cancellation, payment, capacity aggregation,
//!   catalog administration and the capacity monitor
//! - **infrastructure**: SeaORM database, in-memory adapters, JWT, outbound notifier
//! - **interfaces**: axum REST API with Swagger documentation
//! - **notifications**: event bus and the email notification worker
//! - **shared**: errors, retry, shutdown, time and validation helpers

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod notifications;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::{init_database, run_migrations, DatabaseConfig, SeaOrmRepositoryProvider};

pub use interfaces::http::{create_api_router, ApiContext};

pub use notifications::{create_event_bus, Event, EventBus, SharedEventBus};
