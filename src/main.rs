#![warn(unused_crate_dependencies)]

use crate::config::{load_config, Config, VERSION};
use crate::services::accounts::AccountsClient;
use crate::services::counters::CounterStore;
use crate::services::object_store::ObjectStore;
use crate::services::sessions::Sessions;
use crate::services::status::StatusService;
use crate::services::App;
use crate::session::Session;
use crate::utils::logging;
use axum::Router as HttpRouter;
use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

mod config;
mod database;
mod middleware;
mod routes;
mod services;
mod session;
mod utils;

#[tokio::main]
async fn main() {
    // Load configuration; a malformed config is the one fatal startup
    // error
    let config = match load_config() {
        Ok(value) => value,
        Err(err) => {
            eprintln!("Failed to load configuration: {err}");
            std::process::exit(1);
        }
    };

    // Initialize logging
    logging::setup(config.logging);

    if config.secure_password == Config::default().secure_password {
        warn!("Using the default secure endpoint password, set a real one before going public");
    }

    let config = Arc::new(config);

    let db = match database::connect(&config.database_file).await {
        Ok(value) => value,
        Err(err) => {
            error!("Failed to connect to database: {err:?}");
            return;
        }
    };

    let counters = match CounterStore::connect(&config.counter_store_url).await {
        Ok(value) => value,
        Err(err) => {
            error!("Failed to connect to counter store: {err:?}");
            return;
        }
    };

    let status = match StatusService::load(db.clone()).await {
        Ok(value) => value,
        Err(err) => {
            error!("Failed to restore server status: {err:?}");
            return;
        }
    };

    let sessions = Arc::new(Sessions::default());
    let app = Arc::new(App {
        db,
        config: config.clone(),
        sessions: sessions.clone(),
        status: status.clone(),
        counters,
        accounts: AccountsClient::new(&config.accounts),
        object_store: ObjectStore::new(&config.object_store),
    });

    // This step may take longer than expected so its spawned instead of joined
    tokio::spawn(logging::log_connection_urls(config.api_port));

    // Background status persistence and maintenance switching
    tokio::spawn(status.clone().run(sessions.clone()));

    // Rendezvous endpoints
    let auth_addr = SocketAddr::new(config.host, config.auth_port);
    let secure_addr = SocketAddr::new(config.host, config.secure_port);

    let auth_listener = match TcpListener::bind(auth_addr).await {
        Ok(value) => value,
        Err(err) => {
            error!("Failed to bind auth endpoint on {auth_addr}: {err:?}");
            return;
        }
    };
    let secure_listener = match TcpListener::bind(secure_addr).await {
        Ok(value) => value,
        Err(err) => {
            error!("Failed to bind secure endpoint on {secure_addr}: {err:?}");
            return;
        }
    };

    tokio::spawn(Session::serve(
        auth_listener,
        app.clone(),
        Arc::new(session::routes::auth_router()),
    ));
    tokio::spawn(Session::serve(
        secure_listener,
        app.clone(),
        Arc::new(session::routes::secure_router()),
    ));

    // Admin HTTP API
    let api_addr = SocketAddr::new(config.host, config.api_port);
    let router: HttpRouter = routes::router(app.clone());

    let api_listener = match TcpListener::bind(api_addr).await {
        Ok(value) => value,
        Err(err) => {
            error!("Failed to bind admin API on {api_addr}: {err:?}");
            return;
        }
    };

    info!(
        "Starting server on {} / {} / {} (v{})",
        auth_addr, secure_addr, api_addr, VERSION
    );

    if let Err(err) = axum::serve(api_listener, router)
        .with_graceful_shutdown(async move {
            _ = signal::ctrl_c().await;
        })
        .await
    {
        error!("Error within admin API server: {err:?}");
    }

    // Drain clients and persist the final status
    status.shutdown(&sessions).await;
}
