use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServerStatus::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ServerStatus::Id)
                            .unsigned()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ServerStatus::IsOnline).boolean().not_null())
                    .col(
                        ColumnDef::new(ServerStatus::IsMaintenance)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServerStatus::IsWhitelist)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServerStatus::StartMaintenanceTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServerStatus::EndMaintenanceTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ServerStatus::Whitelist).json().not_null())
                    .col(
                        ColumnDef::new(ServerStatus::NumClients)
                            .unsigned()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Sessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sessions::Pid)
                            .unsigned()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Sessions::StationUrls).json().not_null())
                    .col(
                        ColumnDef::new(Sessions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Counters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Counters::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Counters::Seq).unsigned().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ServerStatus::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Counters::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ServerStatus {
    Table,
    Id,
    IsOnline,
    IsMaintenance,
    IsWhitelist,
    StartMaintenanceTime,
    EndMaintenanceTime,
    Whitelist,
    NumClients,
}

#[derive(Iden)]
enum Sessions {
    Table,
    Pid,
    StationUrls,
    CreatedAt,
}

#[derive(Iden)]
enum Counters {
    Table,
    Id,
    Seq,
}
