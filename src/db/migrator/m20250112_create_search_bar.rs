use crate::entities::{prelude::*, search_bar};
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(SearchBar)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // History lookups are per user, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_search_bar_user_created")
                    .table(SearchBar)
                    .col(search_bar::Column::UserId)
                    .col(search_bar::Column::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SearchBar).to_owned())
            .await
    }
}
