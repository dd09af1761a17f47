use crate::services::App;
use axum::{
    routing::{delete, get, post, put},
    Extension, Router,
};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

mod gatherings;
mod status;
mod tournaments;
mod users;

/// Function for configuring the admin API routes
pub fn router(app: Arc<App>) -> Router {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .route("/status", get(status::get_status))
                .route("/maintenance/start", post(status::start_maintenance))
                .route("/maintenance/end", post(status::end_maintenance))
                .route("/whitelist", get(status::get_whitelist))
                .route("/whitelist/toggle", post(status::toggle_whitelist))
                .route(
                    "/whitelist/{pid}",
                    put(status::add_whitelist_user).delete(status::del_whitelist_user),
                )
                .route(
                    "/users",
                    get(users::get_all_users).delete(users::kick_all_users),
                )
                .route("/users/{pid}", delete(users::kick_user))
                .route("/users/{pid}/unlocks", get(users::get_unlocks))
                .route("/gatherings", get(gatherings::get_all_gatherings))
                .route("/tournaments", get(tournaments::get_all_tournaments)),
        )
        .layer(Extension(app))
}

/// Timestamps cross the admin surface as epoch seconds + nanoseconds
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ApiTimestamp {
    pub seconds: i64,
    pub nanos: u32,
}

impl From<DateTime<Utc>> for ApiTimestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self {
            seconds: value.timestamp(),
            nanos: value.timestamp_subsec_nanos(),
        }
    }
}

impl From<ApiTimestamp> for DateTime<Utc> {
    fn from(value: ApiTimestamp) -> Self {
        Utc.timestamp_opt(value.seconds, value.nanos)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

/// Pagination query shared by the listing endpoints
#[derive(Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub offset: u64,
    pub limit: Option<u64>,
}
