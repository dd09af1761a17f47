use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tournaments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tournaments::Id)
                            .unsigned()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tournaments::Owner).unsigned().not_null())
                    .col(
                        ColumnDef::new(Tournaments::CommunityId)
                            .unsigned()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tournaments::CommunityCode)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Tournaments::Attributes).json().not_null())
                    .col(ColumnDef::new(Tournaments::Metadata).binary().not_null())
                    .col(ColumnDef::new(Tournaments::Name).string().not_null())
                    .col(ColumnDef::new(Tournaments::Description).string().not_null())
                    .col(ColumnDef::new(Tournaments::RedTeam).string().not_null())
                    .col(ColumnDef::new(Tournaments::BlueTeam).string().not_null())
                    .col(ColumnDef::new(Tournaments::RepeatType).unsigned().not_null())
                    .col(ColumnDef::new(Tournaments::GamesetNum).unsigned().not_null())
                    .col(ColumnDef::new(Tournaments::IconType).unsigned().not_null())
                    .col(ColumnDef::new(Tournaments::BattleTime).unsigned().not_null())
                    .col(ColumnDef::new(Tournaments::UpdateDate).unsigned().not_null())
                    .col(
                        ColumnDef::new(Tournaments::StartDaytime)
                            .unsigned()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Tournaments::EndDaytime).unsigned().not_null())
                    .col(ColumnDef::new(Tournaments::StartTime).unsigned().not_null())
                    .col(ColumnDef::new(Tournaments::EndTime).unsigned().not_null())
                    .col(
                        ColumnDef::new(Tournaments::StartDatetime)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tournaments::EndDatetime)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Tournaments::SeasonId).unsigned().not_null())
                    .col(
                        ColumnDef::new(Tournaments::TotalParticipants)
                            .unsigned()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .unique()
                    .name("idx-tournament-community-code")
                    .table(Tournaments::Table)
                    .col(Tournaments::CommunityCode)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TournamentScores::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TournamentScores::Id)
                            .unsigned()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TournamentScores::TournamentId)
                            .unsigned()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TournamentScores::SeasonId)
                            .unsigned()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TournamentScores::Pid).unsigned().not_null())
                    .col(ColumnDef::new(TournamentScores::Score).unsigned().not_null())
                    .col(
                        ColumnDef::new(TournamentScores::TeamId)
                            .unsigned()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TournamentScores::TeamScore)
                            .unsigned()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TournamentScores::Metadata)
                            .binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TournamentScores::LastUpdate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .unique()
                    .name("idx-tournament-score-key")
                    .table(TournamentScores::Table)
                    .col(TournamentScores::TournamentId)
                    .col(TournamentScores::SeasonId)
                    .col(TournamentScores::Pid)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tournaments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TournamentScores::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Tournaments {
    Table,
    Id,
    Owner,
    CommunityId,
    CommunityCode,
    Attributes,
    Metadata,
    Name,
    Description,
    RedTeam,
    BlueTeam,
    RepeatType,
    GamesetNum,
    IconType,
    BattleTime,
    UpdateDate,
    StartDaytime,
    EndDaytime,
    StartTime,
    EndTime,
    StartDatetime,
    EndDatetime,
    SeasonId,
    TotalParticipants,
}

#[derive(Iden)]
enum TournamentScores {
    Table,
    Id,
    TournamentId,
    SeasonId,
    Pid,
    Score,
    TeamId,
    TeamScore,
    Metadata,
    LastUpdate,
}
