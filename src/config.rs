use crate::utils::types::Port;
use log::LevelFilter;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::{env, fs::read_to_string, path::Path};
use thiserror::Error;

/// The server version extracted from the Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable key to load the config from
const CONFIG_ENV_KEY: &str = "CR_CONFIG_JSON";

/// Errors while loading configuration. These are the only startup
/// errors that abort the process.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Loads the config from the environment or `config.json`, falling
/// back to defaults when neither is present. A present but malformed
/// config is an error.
pub fn load_config() -> Result<Config, ConfigError> {
    // Attempt to load the config from the env
    if let Ok(env) = env::var(CONFIG_ENV_KEY) {
        return Ok(serde_json::from_str(&env)?);
    }

    // Attempt to load the config from disk
    let file = Path::new("config.json");
    if !file.exists() {
        return Ok(Config::default());
    }

    let data = read_to_string(file)?;
    Ok(serde_json::from_str(&data)?)
}

#[derive(Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the listeners bind on
    pub host: IpAddr,
    /// Port of the authentication endpoint
    pub auth_port: Port,
    /// Port of the secure endpoint
    pub secure_port: Port,
    /// Port of the admin HTTP API
    pub api_port: Port,
    /// Address handed to clients for reaching the secure endpoint
    pub external_host: String,
    pub logging: LevelFilter,
    /// Shared secret for the secure endpoint handshake
    pub secure_password: String,
    /// Shared key required on admin API calls
    pub api_key: String,
    pub database_file: String,
    pub counter_store_url: String,
    pub accounts: AccountsConfig,
    pub object_store: ObjectStoreConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            auth_port: 1223,
            secure_port: 1224,
            api_port: 8080,
            external_host: "127.0.0.1".to_string(),
            logging: LevelFilter::Info,
            secure_password: "insecure-dev-password".to_string(),
            api_key: "insecure-dev-key".to_string(),
            database_file: "data/app.db".to_string(),
            counter_store_url: "redis://127.0.0.1:6379".to_string(),
            accounts: Default::default(),
            object_store: Default::default(),
        }
    }
}

impl Config {
    /// Station URL of the secure endpoint returned by ticket logins
    pub fn secure_station_url(&self) -> String {
        format!(
            "prudps:/address={};port={};sid=1;type=2",
            self.external_host, self.secure_port
        )
    }
}

#[derive(Deserialize)]
#[serde(default)]
pub struct AccountsConfig {
    pub base_url: String,
    pub api_key: String,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:9000".to_string(),
            api_key: "insecure-dev-key".to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
pub struct ObjectStoreConfig {
    pub bucket: String,
    pub cdn_domain: String,
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            bucket: "replays".to_string(),
            cdn_domain: "cdn.example.com".to_string(),
        }
    }
}
