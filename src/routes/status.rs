//! Admin routes for server status, maintenance and the whitelist

use super::ApiTimestamp;
use crate::middleware::auth::ApiKey;
use crate::services::App;
use crate::utils::types::PlayerID;
use axum::{extract::Path, Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Serialize)]
pub struct ServerStatusResponse {
    pub is_online: bool,
    pub is_maintenance: bool,
    pub is_whitelist: bool,
    /// Live connection count from the registry
    pub num_clients: u32,
    pub start_maintenance_time: ApiTimestamp,
    pub end_maintenance_time: ApiTimestamp,
}

/// GET /api/status
pub async fn get_status(
    _: ApiKey,
    Extension(app): Extension<Arc<App>>,
) -> Json<ServerStatusResponse> {
    let state = app.status.snapshot();
    Json(ServerStatusResponse {
        is_online: state.is_online,
        is_maintenance: state.is_maintenance,
        is_whitelist: state.is_whitelist,
        num_clients: app.sessions.count() as u32,
        start_maintenance_time: state.start_maintenance_time.into(),
        end_maintenance_time: state.end_maintenance_time.into(),
    })
}

#[derive(Deserialize)]
pub struct StartMaintenanceRequest {
    pub utc_start_maintenance_time: ApiTimestamp,
    pub utc_end_maintenance_time: ApiTimestamp,
}

/// POST /api/maintenance/start
///
/// Schedules the maintenance window; the switch happens on the
/// periodic task once the start time passes
pub async fn start_maintenance(
    _: ApiKey,
    Extension(app): Extension<Arc<App>>,
    Json(request): Json<StartMaintenanceRequest>,
) {
    app.status.start_maintenance(
        request.utc_start_maintenance_time.into(),
        request.utc_end_maintenance_time.into(),
    );
}

/// POST /api/maintenance/end
pub async fn end_maintenance(_: ApiKey, Extension(app): Extension<Arc<App>>) {
    app.status.end_maintenance();
}

#[derive(Serialize)]
pub struct ToggleWhitelistResponse {
    pub is_whitelist: bool,
}

/// POST /api/whitelist/toggle
pub async fn toggle_whitelist(
    _: ApiKey,
    Extension(app): Extension<Arc<App>>,
) -> Json<ToggleWhitelistResponse> {
    Json(ToggleWhitelistResponse {
        is_whitelist: app.status.toggle_whitelist(),
    })
}

#[derive(Serialize)]
pub struct WhitelistResponse {
    pub pids: Vec<PlayerID>,
}

/// GET /api/whitelist
pub async fn get_whitelist(
    _: ApiKey,
    Extension(app): Extension<Arc<App>>,
) -> Json<WhitelistResponse> {
    Json(WhitelistResponse {
        pids: app.status.whitelist(),
    })
}

/// PUT /api/whitelist/:pid
pub async fn add_whitelist_user(
    _: ApiKey,
    Extension(app): Extension<Arc<App>>,
    Path(pid): Path<PlayerID>,
) {
    app.status.add_whitelist(pid);
}

/// DELETE /api/whitelist/:pid
pub async fn del_whitelist_user(
    _: ApiKey,
    Extension(app): Extension<Arc<App>>,
    Path(pid): Path<PlayerID>,
) {
    app.status.del_whitelist(pid);
}
