//! Rows tracking registered secure sessions. Cleared at boot since no
//! connection survives a restart.

use super::StringList;
use crate::database::DbResult;
use crate::utils::types::PlayerID;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{entity::prelude::*, ActiveValue::Set, DatabaseConnection};
use serde::Serialize;

#[derive(Serialize, Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub pid: PlayerID,
    pub station_urls: StringList,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Removes every session row, returning how many were present
    pub async fn clear_all(db: &DatabaseConnection) -> DbResult<u64> {
        let result = Entity::delete_many().exec(db).await?;
        Ok(result.rows_affected)
    }

    pub async fn set(
        db: &DatabaseConnection,
        pid: PlayerID,
        station_urls: Vec<String>,
    ) -> DbResult<()> {
        Entity::insert(ActiveModel {
            pid: Set(pid),
            station_urls: Set(StringList(station_urls)),
            created_at: Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::column(Column::Pid)
                .update_columns([Column::StationUrls, Column::CreatedAt])
                .to_owned(),
        )
        .exec(db)
        .await?;
        Ok(())
    }

    pub async fn delete_by_pid(db: &DatabaseConnection, pid: PlayerID) -> DbResult<()> {
        Entity::delete_many()
            .filter(Column::Pid.eq(pid))
            .exec(db)
            .await?;
        Ok(())
    }
}
