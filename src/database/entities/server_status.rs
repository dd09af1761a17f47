//! Persisted server status singleton. The live state is owned by the
//! admission controller; this row is the copy written every few
//! seconds and reloaded at boot.

use super::U32List;
use crate::database::DbResult;
use sea_orm::sea_query::OnConflict;
use sea_orm::{entity::prelude::*, ActiveValue::Set, DatabaseConnection};
use serde::Serialize;

#[derive(Serialize, Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "server_status")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(skip)]
    pub id: u32,
    pub is_online: bool,
    pub is_maintenance: bool,
    pub is_whitelist: bool,
    pub start_maintenance_time: DateTimeUtc,
    pub end_maintenance_time: DateTimeUtc,
    pub whitelist: U32List,
    /// Connected-client count at the time of the last write. Only
    /// meaningful as a shutdown artefact; live reads come from the
    /// connection registry.
    pub num_clients: u32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// The singleton row id
const STATUS_ROW: u32 = 1;

impl Model {
    pub async fn load(db: &DatabaseConnection) -> DbResult<Option<Model>> {
        Entity::find_by_id(STATUS_ROW).one(db).await
    }

    /// Writes the provided status snapshot over the singleton row
    pub async fn save(db: &DatabaseConnection, status: Model) -> DbResult<()> {
        Entity::insert(ActiveModel {
            id: Set(STATUS_ROW),
            is_online: Set(status.is_online),
            is_maintenance: Set(status.is_maintenance),
            is_whitelist: Set(status.is_whitelist),
            start_maintenance_time: Set(status.start_maintenance_time),
            end_maintenance_time: Set(status.end_maintenance_time),
            whitelist: Set(status.whitelist),
            num_clients: Set(status.num_clients),
        })
        .on_conflict(
            OnConflict::column(Column::Id)
                .update_columns([
                    Column::IsOnline,
                    Column::IsMaintenance,
                    Column::IsWhitelist,
                    Column::StartMaintenanceTime,
                    Column::EndMaintenanceTime,
                    Column::Whitelist,
                    Column::NumClients,
                ])
                .to_owned(),
        )
        .exec(db)
        .await?;
        Ok(())
    }
}
