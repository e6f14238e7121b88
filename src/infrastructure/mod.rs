//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;
pub mod notifier;
pub mod storage;

pub use database::{init_database, run_migrations, DatabaseConfig, SeaOrmRepositoryProvider};
pub use notifier::{HttpNotifier, LogNotifier};
pub use storage::InMemoryRepositoryProvider;
