//! Counter store adapter for the hot tournament aggregates. Wraps a
//! redis connection with plain INCRBY/GET semantics; a missing key
//! reads as zero.

use redis::{aio::ConnectionManager, AsyncCommands, RedisError};

#[derive(Clone)]
pub struct CounterStore {
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    Redis(ConnectionManager),
    /// In-process map standing in for the counter store in tests
    #[cfg(test)]
    Memory(std::sync::Arc<parking_lot::Mutex<std::collections::HashMap<String, i64>>>),
}

impl CounterStore {
    pub async fn connect(url: &str) -> Result<CounterStore, RedisError> {
        let client = redis::Client::open(url)?;
        let con = client.get_connection_manager().await?;
        Ok(Self {
            backend: Backend::Redis(con),
        })
    }

    #[cfg(test)]
    pub fn memory() -> CounterStore {
        Self {
            backend: Backend::Memory(Default::default()),
        }
    }

    /// Increments the counter by the provided delta, which may be
    /// negative for score corrections
    pub async fn incr(&self, key: &str, delta: i64) -> Result<(), RedisError> {
        match &self.backend {
            Backend::Redis(con) => {
                let mut con = con.clone();
                let _: i64 = con.incr(key, delta).await?;
            }
            #[cfg(test)]
            Backend::Memory(map) => {
                *map.lock().entry(key.to_string()).or_default() += delta;
            }
        }
        Ok(())
    }

    pub async fn get(&self, key: &str) -> Result<i64, RedisError> {
        match &self.backend {
            Backend::Redis(con) => {
                let mut con = con.clone();
                let value: Option<i64> = con.get(key).await?;
                Ok(value.unwrap_or_default())
            }
            #[cfg(test)]
            Backend::Memory(map) => Ok(map.lock().get(key).copied().unwrap_or_default()),
        }
    }

    /// Reads a counter as u32, clamping negative values to zero
    pub async fn get_u32(&self, key: &str) -> Result<u32, RedisError> {
        Ok(self.get(key).await?.max(0) as u32)
    }
}

/// Key layout for the tournament aggregates
pub mod keys {
    use crate::utils::types::TournamentID;

    pub fn participation_total(id: TournamentID) -> String {
        format!("tournaments:participation:{id}_total")
    }

    pub fn participation_season_total(id: TournamentID, season_id: u32) -> String {
        format!("tournaments:participation:{id}_{season_id}_total")
    }

    pub fn participation_team(id: TournamentID, team_id: u32) -> String {
        format!("tournaments:participation:{id}_team{team_id}")
    }

    pub fn participation_season_team(id: TournamentID, season_id: u32, team_id: u32) -> String {
        format!("tournaments:participation:{id}_{season_id}_team{team_id}")
    }

    pub fn scores_team(id: TournamentID, team_id: u32) -> String {
        format!("tournaments:scores:{id}_team{team_id}")
    }

    pub fn scores_season_team(id: TournamentID, season_id: u32, team_id: u32) -> String {
        format!("tournaments:scores:{id}_{season_id}_team{team_id}")
    }

    #[cfg(test)]
    mod test {
        use super::*;

        #[test]
        fn test_key_layout() {
            assert_eq!(participation_total(20001), "tournaments:participation:20001_total");
            assert_eq!(
                participation_season_total(20001, 3),
                "tournaments:participation:20001_3_total"
            );
            assert_eq!(
                participation_team(20001, 0),
                "tournaments:participation:20001_team0"
            );
            assert_eq!(
                participation_season_team(20001, 3, 1),
                "tournaments:participation:20001_3_team1"
            );
            assert_eq!(scores_team(20001, 1), "tournaments:scores:20001_team1");
            assert_eq!(
                scores_season_team(20001, 3, 0),
                "tournaments:scores:20001_3_team0"
            );
        }
    }
}
