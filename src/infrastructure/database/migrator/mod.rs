//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_tours;
mod m20250101_000002_create_profiles;
mod m20250101_000003_create_bookings;

pub use m20250101_000003_create_bookings::PENDING_UNIQUE_INDEX;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_tours::Migration),
            Box::new(m20250101_000002_create_profiles::Migration),
            Box::new(m20250101_000003_create_bookings::Migration),
        ]
    }
}
