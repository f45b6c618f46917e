//! Create follow edge table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FollowEdge::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FollowEdge::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FollowEdge::FollowerId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FollowEdge::TargetId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FollowEdge::TargetKind)
                            .string_len(8)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FollowEdge::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_follow_edge_follower")
                            .from(FollowEdge::Table, FollowEdge::FollowerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (follower_id, target_id) - prevent duplicate edges
        manager
            .create_index(
                Index::create()
                    .name("idx_follow_edge_follower_target")
                    .table(FollowEdge::Table)
                    .col(FollowEdge::FollowerId)
                    .col(FollowEdge::TargetId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: target_id (for listing followers)
        manager
            .create_index(
                Index::create()
                    .name("idx_follow_edge_target_id")
                    .table(FollowEdge::Table)
                    .col(FollowEdge::TargetId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FollowEdge::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum FollowEdge {
    Table,
    Id,
    FollowerId,
    TargetId,
    TargetKind,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
