//! Tournament (simple search object) rows. The raw metadata buffer is
//! kept verbatim for clients while the parsed fields back the admin
//! listing and team-tournament checks.

use super::U32List;
use crate::database::DbResult;
use crate::session::models::tournaments::SimpleSearchDateTimeAttribute;
use crate::utils::parsing::tournament_meta::TournamentMetadata;
use crate::utils::types::{PlayerID, TournamentID};
use sea_orm::sea_query::Expr;
use sea_orm::{entity::prelude::*, ActiveValue::Set, ConnectionTrait, QueryOrder};
use serde::Serialize;

/// Attribute slot marking a tournament as public when 1
pub const ATTR_VISIBILITY: usize = 0;
/// Attribute slot selecting team play when 2
pub const ATTR_TEAMS: usize = 4;

#[derive(Serialize, Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tournaments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: TournamentID,
    pub owner: PlayerID,
    pub community_id: u32,
    #[sea_orm(unique)]
    pub community_code: String,
    pub attributes: U32List,
    pub metadata: Vec<u8>,
    pub name: String,
    pub description: String,
    pub red_team: String,
    pub blue_team: String,
    pub repeat_type: u32,
    pub gameset_num: u32,
    pub icon_type: u32,
    pub battle_time: u32,
    pub update_date: u32,
    pub start_daytime: u32,
    pub end_daytime: u32,
    pub start_time: u32,
    pub end_time: u32,
    pub start_datetime: i64,
    pub end_datetime: i64,
    pub season_id: u32,
    pub total_participants: u32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Attribute slot accessor defaulting missing slots to zero
    pub fn attribute(&self, slot: usize) -> u32 {
        self.attributes.0.get(slot).copied().unwrap_or_default()
    }

    /// Wire representation returned by searches
    pub fn into_object(self) -> crate::session::models::tournaments::SimpleSearchObject {
        crate::session::models::tournaments::SimpleSearchObject {
            id: self.id,
            owner: self.owner,
            attributes: self.attributes.0,
            metadata: self.metadata,
            community_id: self.community_id,
            community_code: self.community_code,
            datetime: SimpleSearchDateTimeAttribute {
                start_daytime: self.start_daytime,
                end_daytime: self.end_daytime,
                start_time: self.start_time,
                end_time: self.end_time,
                start_datetime: self.start_datetime as u64,
                end_datetime: self.end_datetime as u64,
            },
        }
    }

    /// Whether scores are partitioned into two teams
    pub fn is_team_tournament(&self) -> bool {
        self.attribute(ATTR_TEAMS) == 2
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        id: TournamentID,
        owner: PlayerID,
        community_id: u32,
        community_code: String,
        attributes: Vec<u32>,
        metadata: Vec<u8>,
        parsed: &TournamentMetadata,
        datetime: SimpleSearchDateTimeAttribute,
    ) -> DbResult<Model> {
        ActiveModel {
            id: Set(id),
            owner: Set(owner),
            community_id: Set(community_id),
            community_code: Set(community_code),
            attributes: Set(U32List(attributes)),
            metadata: Set(metadata),
            name: Set(parsed.name.clone()),
            description: Set(parsed.description.clone()),
            red_team: Set(parsed.red_team.clone()),
            blue_team: Set(parsed.blue_team.clone()),
            repeat_type: Set(parsed.repeat_type),
            gameset_num: Set(parsed.gameset_num),
            icon_type: Set(parsed.icon_type as u32),
            battle_time: Set(parsed.battle_time),
            update_date: Set(parsed.update_date),
            start_daytime: Set(datetime.start_daytime),
            end_daytime: Set(datetime.end_daytime),
            start_time: Set(datetime.start_time),
            end_time: Set(datetime.end_time),
            start_datetime: Set(datetime.start_datetime as i64),
            end_datetime: Set(datetime.end_datetime as i64),
            season_id: Set(1),
            total_participants: Set(0),
        }
        .insert(db)
        .await
    }

    /// Rewrites the client-editable fields, leaving the season and
    /// participation counters untouched
    pub async fn update_object<C: ConnectionTrait>(
        db: &C,
        id: TournamentID,
        attributes: Vec<u32>,
        metadata: Vec<u8>,
        parsed: &TournamentMetadata,
        datetime: SimpleSearchDateTimeAttribute,
    ) -> DbResult<()> {
        Entity::update_many()
            .col_expr(Column::Attributes, Expr::value(U32List(attributes)))
            .col_expr(Column::Metadata, Expr::value(metadata))
            .col_expr(Column::Name, Expr::value(parsed.name.clone()))
            .col_expr(Column::Description, Expr::value(parsed.description.clone()))
            .col_expr(Column::RedTeam, Expr::value(parsed.red_team.clone()))
            .col_expr(Column::BlueTeam, Expr::value(parsed.blue_team.clone()))
            .col_expr(Column::RepeatType, Expr::value(parsed.repeat_type))
            .col_expr(Column::GamesetNum, Expr::value(parsed.gameset_num))
            .col_expr(Column::IconType, Expr::value(parsed.icon_type as u32))
            .col_expr(Column::BattleTime, Expr::value(parsed.battle_time))
            .col_expr(Column::UpdateDate, Expr::value(parsed.update_date))
            .col_expr(Column::StartDaytime, Expr::value(datetime.start_daytime))
            .col_expr(Column::EndDaytime, Expr::value(datetime.end_daytime))
            .col_expr(Column::StartTime, Expr::value(datetime.start_time))
            .col_expr(Column::EndTime, Expr::value(datetime.end_time))
            .col_expr(
                Column::StartDatetime,
                Expr::value(datetime.start_datetime as i64),
            )
            .col_expr(
                Column::EndDatetime,
                Expr::value(datetime.end_datetime as i64),
            )
            .filter(Column::Id.eq(id))
            .exec(db)
            .await?;
        Ok(())
    }

    pub async fn by_id<C: ConnectionTrait>(db: &C, id: TournamentID) -> DbResult<Option<Model>> {
        Entity::find_by_id(id).one(db).await
    }

    pub async fn by_community_code<C: ConnectionTrait>(
        db: &C,
        community_code: &str,
    ) -> DbResult<Option<Model>> {
        Entity::find()
            .filter(Column::CommunityCode.eq(community_code))
            .one(db)
            .await
    }

    pub async fn by_ids<C: ConnectionTrait>(
        db: &C,
        ids: Vec<TournamentID>,
    ) -> DbResult<Vec<Model>> {
        Entity::find()
            .filter(Column::Id.is_in(ids))
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }

    pub async fn delete_by_id<C: ConnectionTrait>(db: &C, id: TournamentID) -> DbResult<()> {
        Entity::delete_many()
            .filter(Column::Id.eq(id))
            .exec(db)
            .await?;
        Ok(())
    }

    /// All tournaments in insertion order; attribute filters are
    /// applied by the tournament engine
    pub async fn all<C: ConnectionTrait>(db: &C) -> DbResult<Vec<Model>> {
        Entity::find().order_by_asc(Column::Id).all(db).await
    }

    /// Tournaments ordered by popularity for the competition listing
    pub async fn by_popularity<C: ConnectionTrait>(db: &C) -> DbResult<Vec<Model>> {
        Entity::find()
            .order_by_desc(Column::TotalParticipants)
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }

    /// Page of public tournaments for the admin listing. The
    /// visibility filter applies before pagination.
    pub async fn public_page<C: ConnectionTrait>(
        db: &C,
        offset: usize,
        limit: Option<usize>,
    ) -> DbResult<Vec<Model>> {
        let rows = Self::all(db).await?;
        Ok(rows
            .into_iter()
            .filter(|row| row.attribute(ATTR_VISIBILITY) == 1)
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .collect())
    }

    pub async fn increment_participants<C: ConnectionTrait>(
        db: &C,
        id: TournamentID,
    ) -> DbResult<()> {
        Entity::update_many()
            .col_expr(
                Column::TotalParticipants,
                Expr::col(Column::TotalParticipants).add(1),
            )
            .filter(Column::Id.eq(id))
            .exec(db)
            .await?;
        Ok(())
    }

    /// Advances the current season, never moving backwards
    pub async fn advance_season<C: ConnectionTrait>(
        db: &C,
        id: TournamentID,
        season_id: u32,
    ) -> DbResult<()> {
        Entity::update_many()
            .col_expr(Column::SeasonId, Expr::value(season_id))
            .filter(Column::Id.eq(id))
            .filter(Column::SeasonId.lt(season_id))
            .exec(db)
            .await?;
        Ok(())
    }
}
