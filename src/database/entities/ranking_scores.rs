//! Per-category leaderboard rows. Every category in this title orders
//! ascending (lower score is a better rank) with earlier uploads
//! winning ties.

use crate::database::DbResult;
use crate::utils::types::PlayerID;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{entity::prelude::*, ActiveValue::NotSet, ActiveValue::Set, ConnectionTrait};
use sea_orm::{Condition, QueryOrder, QuerySelect};
use serde::Serialize;

#[derive(Serialize, Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ranking_scores")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(skip)]
    pub id: u32,
    pub category: u32,
    pub pid: PlayerID,
    pub score: u32,
    pub groups: Vec<u8>,
    pub param: i64,
    pub last_update: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn upsert<C: ConnectionTrait>(
        db: &C,
        category: u32,
        pid: PlayerID,
        score: u32,
        groups: Vec<u8>,
        param: i64,
    ) -> DbResult<()> {
        Entity::insert(ActiveModel {
            id: NotSet,
            category: Set(category),
            pid: Set(pid),
            score: Set(score),
            groups: Set(groups),
            param: Set(param),
            last_update: Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::columns([Column::Category, Column::Pid])
                .update_columns([
                    Column::Score,
                    Column::Groups,
                    Column::Param,
                    Column::LastUpdate,
                ])
                .to_owned(),
        )
        .exec(db)
        .await?;
        Ok(())
    }

    pub async fn get_entry<C: ConnectionTrait>(
        db: &C,
        category: u32,
        pid: PlayerID,
    ) -> DbResult<Option<Model>> {
        Entity::find()
            .filter(Column::Category.eq(category))
            .filter(Column::Pid.eq(pid))
            .one(db)
            .await
    }

    /// Ranked slice of one category leaderboard
    pub async fn get_range<C: ConnectionTrait>(
        db: &C,
        category: u32,
        offset: u64,
        limit: u64,
    ) -> DbResult<Vec<Model>> {
        Entity::find()
            .filter(Column::Category.eq(category))
            .order_by_asc(Column::Score)
            .order_by_asc(Column::LastUpdate)
            .offset(offset)
            .limit(limit)
            .all(db)
            .await
    }

    /// Entries for the provided players only, in rank order
    pub async fn get_for_pids<C: ConnectionTrait>(
        db: &C,
        category: u32,
        pids: Vec<PlayerID>,
    ) -> DbResult<Vec<Model>> {
        Entity::find()
            .filter(Column::Category.eq(category))
            .filter(Column::Pid.is_in(pids))
            .order_by_asc(Column::Score)
            .order_by_asc(Column::LastUpdate)
            .all(db)
            .await
    }

    /// One-based rank of an entry within its category
    pub async fn rank_of<C: ConnectionTrait>(db: &C, entry: &Model) -> DbResult<u64> {
        // Rows ranking above this one: a better score, or the same
        // score uploaded earlier
        let better = Entity::find()
            .filter(Column::Category.eq(entry.category))
            .filter(
                Condition::any()
                    .add(Column::Score.lt(entry.score))
                    .add(
                        Condition::all()
                            .add(Column::Score.eq(entry.score))
                            .add(Column::LastUpdate.lt(entry.last_update)),
                    ),
            )
            .count(db)
            .await?;
        Ok(better + 1)
    }
}
