//! Admin listing of live gatherings with participant mii names

use super::PageQuery;
use crate::database::entities::{CommonData, Gathering};
use crate::middleware::auth::ApiKey;
use crate::services::App;
use crate::utils::types::{GatheringID, PlayerID};
use axum::{extract::Query, http::StatusCode, Extension, Json};
use log::error;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Name shown for participants without stored common data
const FALLBACK_MII_NAME: &str = "<Restart game>";

#[derive(Serialize)]
pub struct GatheringParticipant {
    pub pid: PlayerID,
    pub mii_name: String,
}

#[derive(Serialize)]
pub struct GatheringEntry {
    pub gid: GatheringID,
    pub host: PlayerID,
    pub owner: PlayerID,
    pub attributes: Vec<u32>,
    pub game_mode: u32,
    pub app_data: Vec<u8>,
    pub players: Vec<GatheringParticipant>,
    pub min_participants: u32,
    pub max_participants: u32,
}

#[derive(Serialize)]
pub struct GatheringsResponse {
    pub gatherings: Vec<GatheringEntry>,
}

/// GET /api/gatherings
pub async fn get_all_gatherings(
    _: ApiKey,
    Extension(app): Extension<Arc<App>>,
    Query(page): Query<PageQuery>,
) -> Result<Json<GatheringsResponse>, StatusCode> {
    let rows = Gathering::collect(&app.db, page.offset, page.limit)
        .await
        .map_err(|err| {
            error!("Failed to list gatherings: {err:?}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    // Join the participant lists against common data for mii names
    let all_pids: Vec<PlayerID> = rows
        .iter()
        .flat_map(|row| row.players.0.iter().copied())
        .collect();
    let mii_names: HashMap<PlayerID, Option<String>> = CommonData::for_pids(&app.db, all_pids)
        .await
        .map_err(|err| {
            error!("Failed to load common data for gatherings: {err:?}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .into_iter()
        .map(|data| (data.pid, data.mii_name))
        .collect();

    let gatherings = rows
        .into_iter()
        .map(|row| GatheringEntry {
            gid: row.gid,
            host: row.host,
            owner: row.owner,
            attributes: row.attributes.0,
            game_mode: row.game_mode,
            app_data: row.application_data,
            players: row
                .players
                .0
                .iter()
                .map(|pid| GatheringParticipant {
                    pid: *pid,
                    mii_name: mii_names
                        .get(pid)
                        .cloned()
                        .flatten()
                        .unwrap_or_else(|| FALLBACK_MII_NAME.to_string()),
                })
                .collect(),
            min_participants: row.min_participants,
            max_participants: row.max_participants,
        })
        .collect();

    Ok(Json(GatheringsResponse { gatherings }))
}
