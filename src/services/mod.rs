use crate::config::Config;
use crate::services::accounts::AccountsClient;
use crate::services::counters::CounterStore;
use crate::services::object_store::ObjectStore;
use crate::services::sessions::Sessions;
use crate::services::status::StatusService;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub mod accounts;
pub mod counters;
pub mod gatherings;
pub mod object_store;
pub mod sessions;
pub mod status;
pub mod tournaments;

/// Shared handles passed into every component that needs them. One of
/// these is owned by each session and by the admin router.
pub struct App {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    pub sessions: Arc<Sessions>,
    pub status: Arc<StatusService>,
    pub counters: CounterStore,
    pub accounts: AccountsClient,
    pub object_store: ObjectStore,
}

/// Builds an [App] over an in-memory database and counter store
#[cfg(test)]
pub async fn test_app() -> Arc<App> {
    let config = Arc::new(Config::default());
    let db = crate::database::connect_memory().await;
    let status = StatusService::load(db.clone())
        .await
        .expect("Failed to load status service");

    Arc::new(App {
        db,
        sessions: Arc::new(Sessions::default()),
        status,
        counters: CounterStore::memory(),
        accounts: AccountsClient::new(&config.accounts),
        object_store: ObjectStore::new(&config.object_store),
        config,
    })
}
