//! Admin routes for connected users and their unlock data

use super::ApiTimestamp;
use crate::database::entities::CommonData;
use crate::middleware::auth::ApiKey;
use crate::services::App;
use crate::utils::types::PlayerID;
use axum::{extract::Path, http::StatusCode, Extension, Json};
use chrono::Utc;
use log::error;
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
pub struct UsersResponse {
    pub pids: Vec<PlayerID>,
}

/// GET /api/users
pub async fn get_all_users(_: ApiKey, Extension(app): Extension<Arc<App>>) -> Json<UsersResponse> {
    Json(UsersResponse {
        pids: app.sessions.snapshot_pids(),
    })
}

#[derive(Serialize)]
pub struct KickUserResponse {
    pub was_connected: bool,
}

/// DELETE /api/users/:pid
pub async fn kick_user(
    _: ApiKey,
    Extension(app): Extension<Arc<App>>,
    Path(pid): Path<PlayerID>,
) -> Json<KickUserResponse> {
    Json(KickUserResponse {
        was_connected: app.sessions.kick(pid),
    })
}

#[derive(Serialize)]
pub struct KickAllResponse {
    pub num_kicked: usize,
}

/// DELETE /api/users
pub async fn kick_all_users(
    _: ApiKey,
    Extension(app): Extension<Arc<App>>,
) -> Json<KickAllResponse> {
    Json(KickAllResponse {
        num_kicked: app.sessions.kick_all(),
    })
}

#[derive(Serialize)]
pub struct UnlocksResponse {
    pub has_data: bool,
    pub vr_rate: f32,
    pub br_rate: f32,
    pub last_update: ApiTimestamp,
    pub gp_unlocks: Vec<u8>,
    pub engine_unlocks: Vec<u8>,
    pub driver_unlocks: Vec<u8>,
    pub body_unlocks: Vec<u8>,
    pub tire_unlocks: Vec<u8>,
    pub wing_unlocks: Vec<u8>,
    pub stamp_unlocks: Vec<u8>,
    pub dlc_unlocks: Vec<u8>,
}

/// GET /api/users/:pid/unlocks
pub async fn get_unlocks(
    _: ApiKey,
    Extension(app): Extension<Arc<App>>,
    Path(pid): Path<PlayerID>,
) -> Result<Json<UnlocksResponse>, StatusCode> {
    let data = CommonData::by_pid(&app.db, pid).await.map_err(|err| {
        error!("Failed to load common data (PID: {pid}): {err:?}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let response = match data {
        Some(data) => UnlocksResponse {
            has_data: true,
            vr_rate: data.vr_rate,
            br_rate: data.br_rate,
            last_update: data.last_update.into(),
            gp_unlocks: data.gp_unlocks.0,
            engine_unlocks: data.engine_unlocks.0,
            driver_unlocks: data.driver_unlocks.0,
            body_unlocks: data.body_unlocks.0,
            tire_unlocks: data.tire_unlocks.0,
            wing_unlocks: data.wing_unlocks.0,
            stamp_unlocks: data.stamp_unlocks.0,
            dlc_unlocks: data.dlc_unlocks.0,
        },
        None => UnlocksResponse {
            has_data: false,
            vr_rate: 0.0,
            br_rate: 0.0,
            last_update: Utc::now().into(),
            gp_unlocks: Vec::new(),
            engine_unlocks: Vec::new(),
            driver_unlocks: Vec::new(),
            body_unlocks: Vec::new(),
            tire_unlocks: Vec::new(),
            wing_unlocks: Vec::new(),
            stamp_unlocks: Vec::new(),
            dlc_unlocks: Vec::new(),
        },
    };

    Ok(Json(response))
}
