use sea_orm_migration::prelude::*;

use crate::m20250501_000001_create_users_table::Users;
use crate::m20250501_000002_create_posts_table::Posts;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SavedBusinesses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SavedBusinesses::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SavedBusinesses::Investor).uuid().not_null())
                    .col(ColumnDef::new(SavedBusinesses::Business).uuid().not_null())
                    // Display fields copied from the post when the row is written
                    .col(ColumnDef::new(SavedBusinesses::BusinessName).string().not_null())
                    .col(ColumnDef::new(SavedBusinesses::Industry).string().not_null())
                    .col(ColumnDef::new(SavedBusinesses::Location).string().not_null())
                    .col(
                        ColumnDef::new(SavedBusinesses::InvestmentNeeded)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SavedBusinesses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_saved_businesses_investor")
                            .from(SavedBusinesses::Table, SavedBusinesses::Investor)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_saved_businesses_business")
                            .from(SavedBusinesses::Table, SavedBusinesses::Business)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_saved_businesses_investor_business")
                    .table(SavedBusinesses::Table)
                    .col(SavedBusinesses::Investor)
                    .col(SavedBusinesses::Business)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SavedBusinesses::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SavedBusinesses {
    Table,
    Id,
    Investor,
    Business,
    BusinessName,
    Industry,
    Location,
    InvestmentNeeded,
    CreatedAt,
}
