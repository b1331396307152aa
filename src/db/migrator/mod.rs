use sea_orm_migration::prelude::*;

mod m20250110_create_profiles;
mod m20250112_create_search_bar;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250110_create_profiles::Migration),
            Box::new(m20250112_create_search_bar::Migration),
        ]
    }
}
