use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DatastoreObjects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DatastoreObjects::DataId)
                            .unsigned()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DatastoreObjects::Owner).unsigned().not_null())
                    .col(ColumnDef::new(DatastoreObjects::Name).string().not_null())
                    .col(
                        ColumnDef::new(DatastoreObjects::Permission)
                            .unsigned()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DatastoreObjects::PermissionRecipients)
                            .json()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DatastoreObjects::DeletePermission)
                            .unsigned()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DatastoreObjects::DeletePermissionRecipients)
                            .json()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DatastoreObjects::Period)
                            .unsigned()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DatastoreObjects::MetaBinary)
                            .binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DatastoreObjects::Tags).json().not_null())
                    .col(
                        ColumnDef::new(DatastoreObjects::UpdatePassword)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DatastoreObjects::ReferredCount)
                            .unsigned()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DatastoreObjects::DataType)
                            .unsigned()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DatastoreObjects::Status)
                            .unsigned()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DatastoreObjects::Flag).unsigned().not_null())
                    .col(
                        ColumnDef::new(DatastoreObjects::PersistenceId)
                            .unsigned()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DatastoreObjects::Size).unsigned().not_null())
                    .col(
                        ColumnDef::new(DatastoreObjects::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DatastoreObjects::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DatastoreObjects::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum DatastoreObjects {
    Table,
    DataId,
    Owner,
    Name,
    Permission,
    PermissionRecipients,
    DeletePermission,
    DeletePermissionRecipients,
    Period,
    MetaBinary,
    Tags,
    UpdatePassword,
    ReferredCount,
    DataType,
    Status,
    Flag,
    PersistenceId,
    Size,
    CreatedAt,
    UpdatedAt,
}
