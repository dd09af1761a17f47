use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RankingScores::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RankingScores::Id)
                            .unsigned()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RankingScores::Category)
                            .unsigned()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RankingScores::Pid).unsigned().not_null())
                    .col(ColumnDef::new(RankingScores::Score).unsigned().not_null())
                    .col(ColumnDef::new(RankingScores::Groups).binary().not_null())
                    .col(ColumnDef::new(RankingScores::Param).big_integer().not_null())
                    .col(
                        ColumnDef::new(RankingScores::LastUpdate)
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
                    .name("idx-ranking-category-pid")
                    .table(RankingScores::Table)
                    .col(RankingScores::Category)
                    .col(RankingScores::Pid)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CommonData::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CommonData::Pid)
                            .unsigned()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CommonData::Data).binary().not_null())
                    .col(ColumnDef::new(CommonData::Size).unsigned().not_null())
                    .col(ColumnDef::new(CommonData::UniqueId).big_integer().not_null())
                    .col(ColumnDef::new(CommonData::MiiName).string())
                    .col(ColumnDef::new(CommonData::VrRate).float().not_null())
                    .col(ColumnDef::new(CommonData::BrRate).float().not_null())
                    .col(ColumnDef::new(CommonData::GpUnlocks).json().not_null())
                    .col(ColumnDef::new(CommonData::EngineUnlocks).json().not_null())
                    .col(ColumnDef::new(CommonData::DriverUnlocks).json().not_null())
                    .col(ColumnDef::new(CommonData::BodyUnlocks).json().not_null())
                    .col(ColumnDef::new(CommonData::TireUnlocks).json().not_null())
                    .col(ColumnDef::new(CommonData::WingUnlocks).json().not_null())
                    .col(ColumnDef::new(CommonData::StampUnlocks).json().not_null())
                    .col(ColumnDef::new(CommonData::DlcUnlocks).json().not_null())
                    .col(
                        ColumnDef::new(CommonData::LastUpdate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RankingScores::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CommonData::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum RankingScores {
    Table,
    Id,
    Category,
    Pid,
    Score,
    Groups,
    Param,
    LastUpdate,
}

#[derive(Iden)]
enum CommonData {
    Table,
    Pid,
    Data,
    Size,
    UniqueId,
    MiiName,
    VrRate,
    BrRate,
    GpUnlocks,
    EngineUnlocks,
    DriverUnlocks,
    BodyUnlocks,
    TireUnlocks,
    WingUnlocks,
    StampUnlocks,
    DlcUnlocks,
    LastUpdate,
}
