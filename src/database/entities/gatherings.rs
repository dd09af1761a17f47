//! Gathering rows backing the matchmake state machine

use super::U32List;
use crate::database::DbResult;
use crate::utils::types::{GatheringID, PlayerID};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{entity::prelude::*, ActiveValue::Set, ConnectionTrait, QueryOrder, QuerySelect};
use serde::Serialize;

#[derive(Serialize, Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "gatherings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub gid: GatheringID,
    pub owner: PlayerID,
    pub host: PlayerID,
    /// Slot 0 is the tournament id, slot 3 the region, slot 4 the DLC
    /// flag; the remaining slots are opaque to the server
    pub attributes: U32List,
    pub game_mode: u32,
    pub application_data: Vec<u8>,
    /// Ordered participant list; the head is the oldest player and
    /// becomes host when the current host leaves
    pub players: U32List,
    /// Anonymous seats reserved by join-with-extra-participants
    pub extra_seats: u32,
    pub min_participants: u32,
    pub max_participants: u32,
    pub participation_policy: u32,
    pub open_participation: bool,
    pub session_key: Vec<u8>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Values used to create a new gathering row
pub struct CreateGathering {
    pub gid: GatheringID,
    pub owner: PlayerID,
    pub attributes: Vec<u32>,
    pub game_mode: u32,
    pub application_data: Vec<u8>,
    pub min_participants: u32,
    pub max_participants: u32,
    pub participation_policy: u32,
    pub open_participation: bool,
    pub session_key: Vec<u8>,
}

impl Model {
    /// Total occupied seats including anonymous ones
    pub fn occupancy(&self) -> usize {
        self.players.0.len() + self.extra_seats as usize
    }

    /// Wire representation for searches and lookups
    pub fn into_details(self) -> crate::session::models::matchmaking::GatheringDetails {
        crate::session::models::matchmaking::GatheringDetails {
            gid: self.gid,
            owner: self.owner,
            host: self.host,
            min_participants: self.min_participants,
            max_participants: self.max_participants,
            participation_policy: self.participation_policy,
            game_mode: self.game_mode,
            attributes: self.attributes.0,
            open_participation: self.open_participation,
            application_data: self.application_data,
            participation_count: (self.players.0.len() + self.extra_seats as usize) as u32,
            players: self.players.0,
        }
    }

    pub fn is_participant(&self, pid: PlayerID) -> bool {
        self.players.0.contains(&pid)
    }

    /// Creates the gathering with its creator as the only participant
    pub async fn create<C: ConnectionTrait>(db: &C, create: CreateGathering) -> DbResult<Model> {
        ActiveModel {
            gid: Set(create.gid),
            owner: Set(create.owner),
            host: Set(create.owner),
            attributes: Set(U32List(create.attributes)),
            game_mode: Set(create.game_mode),
            application_data: Set(create.application_data),
            players: Set(U32List(vec![create.owner])),
            extra_seats: Set(0),
            min_participants: Set(create.min_participants),
            max_participants: Set(create.max_participants),
            participation_policy: Set(create.participation_policy),
            open_participation: Set(create.open_participation),
            session_key: Set(create.session_key),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await
    }

    pub async fn by_gid<C: ConnectionTrait>(db: &C, gid: GatheringID) -> DbResult<Option<Model>> {
        Entity::find_by_id(gid).one(db).await
    }

    pub async fn delete_by_gid<C: ConnectionTrait>(db: &C, gid: GatheringID) -> DbResult<()> {
        Entity::delete_many()
            .filter(Column::Gid.eq(gid))
            .exec(db)
            .await?;
        Ok(())
    }

    /// Replaces the participant list and anonymous seat count
    pub async fn set_players<C: ConnectionTrait>(
        db: &C,
        gid: GatheringID,
        players: Vec<PlayerID>,
        extra_seats: u32,
    ) -> DbResult<()> {
        Entity::update_many()
            .col_expr(Column::Players, Expr::value(U32List(players)))
            .col_expr(Column::ExtraSeats, Expr::value(extra_seats))
            .filter(Column::Gid.eq(gid))
            .exec(db)
            .await?;
        Ok(())
    }

    pub async fn set_host<C: ConnectionTrait>(
        db: &C,
        gid: GatheringID,
        host: PlayerID,
    ) -> DbResult<()> {
        Entity::update_many()
            .col_expr(Column::Host, Expr::value(host))
            .filter(Column::Gid.eq(gid))
            .exec(db)
            .await?;
        Ok(())
    }

    pub async fn set_owner<C: ConnectionTrait>(
        db: &C,
        gid: GatheringID,
        owner: PlayerID,
    ) -> DbResult<()> {
        Entity::update_many()
            .col_expr(Column::Owner, Expr::value(owner))
            .filter(Column::Gid.eq(gid))
            .exec(db)
            .await?;
        Ok(())
    }

    pub async fn set_open_participation<C: ConnectionTrait>(
        db: &C,
        gid: GatheringID,
        open: bool,
    ) -> DbResult<()> {
        Entity::update_many()
            .col_expr(Column::OpenParticipation, Expr::value(open))
            .filter(Column::Gid.eq(gid))
            .exec(db)
            .await?;
        Ok(())
    }

    /// All gatherings in insertion order. Search filters are applied
    /// by the gathering engine after the lazy liveness sweep.
    pub async fn all<C: ConnectionTrait>(db: &C) -> DbResult<Vec<Model>> {
        Entity::find().order_by_asc(Column::Gid).all(db).await
    }

    /// Page of gatherings in insertion order for the admin listing
    pub async fn collect<C: ConnectionTrait>(
        db: &C,
        offset: u64,
        limit: Option<u64>,
    ) -> DbResult<Vec<Model>> {
        let mut query = Entity::find().order_by_asc(Column::Gid).offset(offset);
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        query.all(db).await
    }
}
