//! database migrations for fmgateway.

pub use sea_orm_migration::prelude::*;

mod m20250601_000001_create_companies;
mod m20250601_000002_create_cafs;
mod m20250601_000003_create_company_commercial_activities;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_companies::Migration),
            Box::new(m20250601_000002_create_cafs::Migration),
            Box::new(m20250601_000003_create_company_commercial_activities::Migration),
        ]
    }
}
