//! Create pet table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Pet::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Pet::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Pet::OwnerId).string_len(32).not_null())
                    .col(ColumnDef::new(Pet::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Pet::Species).string_len(64))
                    .col(ColumnDef::new(Pet::Breed).string_len(128))
                    .col(ColumnDef::new(Pet::ProfilePictureUrl).string_len(1024))
                    .col(
                        ColumnDef::new(Pet::FollowersCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Pet::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Pet::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pet_owner")
                            .from(Pet::Table, Pet::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: owner_id (for listing a user's pets)
        manager
            .create_index(
                Index::create()
                    .name("idx_pet_owner_id")
                    .table(Pet::Table)
                    .col(Pet::OwnerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Pet::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Pet {
    Table,
    Id,
    OwnerId,
    Name,
    Species,
    Breed,
    ProfilePictureUrl,
    FollowersCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
