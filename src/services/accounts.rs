//! Client for the external account and friends services. Both are
//! fixed request/response calls authenticated by a shared API key.

use crate::config::AccountsConfig;
use crate::utils::types::PlayerID;
use serde::{Deserialize, Serialize};

/// Header carrying the shared key on outbound calls
const API_KEY_HEADER: &str = "x-api-key";

#[derive(Clone)]
pub struct AccountsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct ValidateRequest<'a> {
    pid: PlayerID,
    password: &'a str,
}

#[derive(Deserialize)]
struct ValidateResponse {
    valid: bool,
}

#[derive(Deserialize)]
struct FriendsResponse {
    pids: Vec<PlayerID>,
}

impl AccountsClient {
    pub fn new(config: &AccountsConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// Checks the ticket credentials for a principal
    pub async fn validate_login(
        &self,
        pid: PlayerID,
        password: &str,
    ) -> Result<bool, reqwest::Error> {
        let response: ValidateResponse = self
            .http
            .post(format!("{}/accounts/validate", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&ValidateRequest { pid, password })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response.valid)
    }

    /// The friend pids of a principal
    pub async fn friend_pids(&self, pid: PlayerID) -> Result<Vec<PlayerID>, reqwest::Error> {
        let response: FriendsResponse = self
            .http
            .get(format!("{}/friends/{}", self.base_url, pid))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response.pids)
    }
}
