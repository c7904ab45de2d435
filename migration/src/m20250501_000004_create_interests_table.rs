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
                    .table(Interests::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Interests::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Interests::Investor).uuid().not_null())
                    .col(ColumnDef::new(Interests::Business).uuid().not_null())
                    .col(ColumnDef::new(Interests::BusinessName).string().not_null())
                    .col(ColumnDef::new(Interests::Industry).string().not_null())
                    .col(ColumnDef::new(Interests::ContactName).string().not_null())
                    .col(ColumnDef::new(Interests::ContactEmail).string().not_null())
                    .col(ColumnDef::new(Interests::Message).text().null())
                    .col(
                        ColumnDef::new(Interests::Status)
                            .string_len(16)
                            .not_null()
                            .default("Pending"),
                    )
                    .col(
                        ColumnDef::new(Interests::DateInterested)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_interests_investor")
                            .from(Interests::Table, Interests::Investor)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_interests_business")
                            .from(Interests::Table, Interests::Business)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_interests_investor_business")
                    .table(Interests::Table)
                    .col(Interests::Investor)
                    .col(Interests::Business)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Interests::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Interests {
    Table,
    Id,
    Investor,
    Business,
    BusinessName,
    Industry,
    ContactName,
    ContactEmail,
    Message,
    Status,
    DateInterested,
}
