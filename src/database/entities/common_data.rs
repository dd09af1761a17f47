//! Per-player common data: the raw uploaded blob plus the fields
//! parsed out of it for the admin surface

use super::U8List;
use crate::database::DbResult;
use crate::utils::parsing::common_data::CommonData as ParsedCommonData;
use crate::utils::types::PlayerID;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{entity::prelude::*, ActiveValue::Set, ConnectionTrait};
use serde::Serialize;

#[derive(Serialize, Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "common_data")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub pid: PlayerID,
    pub data: Vec<u8>,
    pub size: u32,
    pub unique_id: i64,
    pub mii_name: Option<String>,
    pub vr_rate: f32,
    pub br_rate: f32,
    pub gp_unlocks: U8List,
    pub engine_unlocks: U8List,
    pub driver_unlocks: U8List,
    pub body_unlocks: U8List,
    pub tire_unlocks: U8List,
    pub wing_unlocks: U8List,
    pub stamp_unlocks: U8List,
    pub dlc_unlocks: U8List,
    pub last_update: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn by_pid<C: ConnectionTrait>(db: &C, pid: PlayerID) -> DbResult<Option<Model>> {
        Entity::find_by_id(pid).one(db).await
    }

    /// Inserts or replaces the row for a player from a freshly parsed
    /// upload
    pub async fn upsert<C: ConnectionTrait>(
        db: &C,
        pid: PlayerID,
        data: Vec<u8>,
        unique_id: i64,
        parsed: ParsedCommonData,
    ) -> DbResult<()> {
        let size = data.len() as u32;
        Entity::insert(ActiveModel {
            pid: Set(pid),
            data: Set(data),
            size: Set(size),
            unique_id: Set(unique_id),
            mii_name: Set(parsed.mii_name),
            vr_rate: Set(parsed.vr_rate),
            br_rate: Set(parsed.br_rate),
            gp_unlocks: Set(U8List(parsed.gp_unlocks)),
            engine_unlocks: Set(U8List(parsed.engine_unlocks)),
            driver_unlocks: Set(U8List(parsed.driver_unlocks)),
            body_unlocks: Set(U8List(parsed.body_unlocks)),
            tire_unlocks: Set(U8List(parsed.tire_unlocks)),
            wing_unlocks: Set(U8List(parsed.wing_unlocks)),
            stamp_unlocks: Set(U8List(parsed.stamp_unlocks)),
            dlc_unlocks: Set(U8List(parsed.dlc_unlocks)),
            last_update: Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::column(Column::Pid)
                .update_columns([
                    Column::Data,
                    Column::Size,
                    Column::UniqueId,
                    Column::MiiName,
                    Column::VrRate,
                    Column::BrRate,
                    Column::GpUnlocks,
                    Column::EngineUnlocks,
                    Column::DriverUnlocks,
                    Column::BodyUnlocks,
                    Column::TireUnlocks,
                    Column::WingUnlocks,
                    Column::StampUnlocks,
                    Column::DlcUnlocks,
                    Column::LastUpdate,
                ])
                .to_owned(),
        )
        .exec(db)
        .await?;
        Ok(())
    }

    /// Loads the rows for the provided players, used to join mii
    /// names onto gathering participant lists
    pub async fn for_pids<C: ConnectionTrait>(
        db: &C,
        pids: Vec<PlayerID>,
    ) -> DbResult<Vec<Model>> {
        Entity::find()
            .filter(Column::Pid.is_in(pids))
            .all(db)
            .await
    }
}
