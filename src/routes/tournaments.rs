//! Admin listing of public tournaments

use super::{ApiTimestamp, PageQuery};
use crate::database::entities::Tournament;
use crate::middleware::auth::ApiKey;
use crate::services::App;
use crate::session::models::from_wire_datetime;
use crate::utils::parsing::compe_time::{CompeDate, CompeTime, CompeWeekTime};
use crate::utils::types::{PlayerID, TournamentID};
use axum::{extract::Query, http::StatusCode, Extension, Json};
use log::error;
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
pub struct TournamentEntry {
    pub id: TournamentID,
    pub owner: PlayerID,
    pub attributes: Vec<u32>,
    pub community_code: String,
    pub app_data: Vec<u8>,
    pub total_participants: u32,
    pub season_id: u32,
    pub name: String,
    pub description: String,
    pub red_team: String,
    pub blue_team: String,
    pub repeat_type: u32,
    pub gameset_num: u32,
    pub icon_type: u32,
    pub battle_time: u32,
    pub update_date: u32,
    pub start_day_time: u32,
    pub end_day_time: u32,
    pub start_time: u32,
    pub end_time: u32,
    /// Human readable weekly schedule derived from the packed fields
    pub schedule: String,
    /// Human readable form of the packed update date
    pub updated: String,
    pub start_date_time: ApiTimestamp,
    pub end_date_time: ApiTimestamp,
}

#[derive(Serialize)]
pub struct TournamentsResponse {
    pub tournaments: Vec<TournamentEntry>,
}

/// GET /api/tournaments
///
/// Lists public tournaments only
pub async fn get_all_tournaments(
    _: ApiKey,
    Extension(app): Extension<Arc<App>>,
    Query(page): Query<PageQuery>,
) -> Result<Json<TournamentsResponse>, StatusCode> {
    let rows = Tournament::public_page(
        &app.db,
        page.offset as usize,
        page.limit.map(|limit| limit as usize),
    )
    .await
    .map_err(|err| {
        error!("Failed to list tournaments: {err:?}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let tournaments = rows
        .into_iter()
        .map(|row| TournamentEntry {
            id: row.id,
            owner: row.owner,
            attributes: row.attributes.0.clone(),
            community_code: row.community_code.clone(),
            app_data: row.metadata.clone(),
            total_participants: row.total_participants,
            season_id: row.season_id,
            name: row.name.clone(),
            description: row.description.clone(),
            red_team: row.red_team.clone(),
            blue_team: row.blue_team.clone(),
            repeat_type: row.repeat_type,
            gameset_num: row.gameset_num,
            icon_type: row.icon_type,
            battle_time: row.battle_time,
            update_date: row.update_date,
            start_day_time: row.start_daytime,
            end_day_time: row.end_daytime,
            start_time: row.start_time,
            end_time: row.end_time,
            schedule: format!(
                "{} - {} ({} - {})",
                CompeWeekTime::from_packed(row.start_daytime),
                CompeWeekTime::from_packed(row.end_daytime),
                CompeTime::from_packed(row.start_time),
                CompeTime::from_packed(row.end_time),
            ),
            updated: CompeDate::from_packed(row.update_date).to_string(),
            start_date_time: from_wire_datetime(row.start_datetime as u64).into(),
            end_date_time: from_wire_datetime(row.end_datetime as u64).into(),
        })
        .collect();

    Ok(Json(TournamentsResponse { tournaments }))
}
