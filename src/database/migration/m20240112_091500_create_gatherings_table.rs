use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Gatherings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Gatherings::Gid)
                            .unsigned()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Gatherings::Owner).unsigned().not_null())
                    .col(ColumnDef::new(Gatherings::Host).unsigned().not_null())
                    .col(ColumnDef::new(Gatherings::Attributes).json().not_null())
                    .col(ColumnDef::new(Gatherings::GameMode).unsigned().not_null())
                    .col(
                        ColumnDef::new(Gatherings::ApplicationData)
                            .binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Gatherings::Players).json().not_null())
                    .col(ColumnDef::new(Gatherings::ExtraSeats).unsigned().not_null())
                    .col(
                        ColumnDef::new(Gatherings::MinParticipants)
                            .unsigned()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Gatherings::MaxParticipants)
                            .unsigned()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Gatherings::ParticipationPolicy)
                            .unsigned()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Gatherings::OpenParticipation)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Gatherings::SessionKey).binary().not_null())
                    .col(
                        ColumnDef::new(Gatherings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Gatherings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Gatherings {
    Table,
    Gid,
    Owner,
    Host,
    Attributes,
    GameMode,
    ApplicationData,
    Players,
    ExtraSeats,
    MinParticipants,
    MaxParticipants,
    ParticipationPolicy,
    OpenParticipation,
    SessionKey,
    CreatedAt,
}
