//! Competition score rows, one per (tournament, season, player).
//! These are the authoritative records behind the counter-store
//! aggregates.

use crate::database::DbResult;
use crate::utils::types::{PlayerID, TournamentID};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{entity::prelude::*, ActiveValue::NotSet, ActiveValue::Set, ConnectionTrait};
use sea_orm::{QueryOrder, QuerySelect};
use serde::Serialize;

/// Season leaderboards expose at most this many entries
const SEASON_TOP: u64 = 20;

#[derive(Serialize, Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tournament_scores")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(skip)]
    pub id: u32,
    pub tournament_id: TournamentID,
    pub season_id: u32,
    pub pid: PlayerID,
    pub score: u32,
    pub team_id: u32,
    pub team_score: u32,
    pub metadata: Vec<u8>,
    pub last_update: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn find_by_key<C: ConnectionTrait>(
        db: &C,
        tournament_id: TournamentID,
        season_id: u32,
        pid: PlayerID,
    ) -> DbResult<Option<Model>> {
        Entity::find()
            .filter(Column::TournamentId.eq(tournament_id))
            .filter(Column::SeasonId.eq(season_id))
            .filter(Column::Pid.eq(pid))
            .one(db)
            .await
    }

    /// Inserts or replaces the score row for its key
    pub async fn upsert<C: ConnectionTrait>(
        db: &C,
        tournament_id: TournamentID,
        season_id: u32,
        pid: PlayerID,
        score: u32,
        team_id: u32,
        team_score: u32,
        metadata: Vec<u8>,
    ) -> DbResult<()> {
        Entity::insert(ActiveModel {
            id: NotSet,
            tournament_id: Set(tournament_id),
            season_id: Set(season_id),
            pid: Set(pid),
            score: Set(score),
            team_id: Set(team_id),
            team_score: Set(team_score),
            metadata: Set(metadata),
            last_update: Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::columns([Column::TournamentId, Column::SeasonId, Column::Pid])
                .update_columns([
                    Column::Score,
                    Column::TeamId,
                    Column::TeamScore,
                    Column::Metadata,
                    Column::LastUpdate,
                ])
                .to_owned(),
        )
        .exec(db)
        .await?;
        Ok(())
    }

    /// Top entries for one season, best score first with earlier
    /// uploads winning ties
    pub async fn top_for_season<C: ConnectionTrait>(
        db: &C,
        tournament_id: TournamentID,
        season_id: u32,
    ) -> DbResult<Vec<Model>> {
        Entity::find()
            .filter(Column::TournamentId.eq(tournament_id))
            .filter(Column::SeasonId.eq(season_id))
            .order_by_desc(Column::Score)
            .order_by_asc(Column::LastUpdate)
            .limit(SEASON_TOP)
            .all(db)
            .await
    }
}
