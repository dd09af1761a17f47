//! Admission controller: the in-memory server status, the admission
//! check applied at authentication, and the periodic task that
//! persists status and performs scheduled maintenance switches.

use crate::database::entities::{ServerStatus, U32List};
use crate::database::{DbResult, DbErr};
use crate::services::sessions::Sessions;
use crate::session::models::errors::RendezvousError;
use crate::utils::types::PlayerID;
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use parking_lot::RwLock;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

/// Interval of the background tick
const TICK_INTERVAL: Duration = Duration::from_millis(100);
/// Ticks accumulated between persistence writes
const PERSIST_TICKS: u32 = 50;

/// Live server status state
#[derive(Clone)]
pub struct ServerState {
    pub is_online: bool,
    pub is_maintenance: bool,
    pub is_whitelist: bool,
    pub start_maintenance_time: DateTime<Utc>,
    pub end_maintenance_time: DateTime<Utc>,
    pub whitelist: Vec<PlayerID>,
    pub should_switch_to_maintenance: bool,
}

impl Default for ServerState {
    fn default() -> Self {
        Self {
            is_online: true,
            is_maintenance: false,
            is_whitelist: false,
            start_maintenance_time: DateTime::<Utc>::UNIX_EPOCH,
            end_maintenance_time: DateTime::<Utc>::UNIX_EPOCH,
            whitelist: Vec::new(),
            should_switch_to_maintenance: false,
        }
    }
}

pub struct StatusService {
    state: RwLock<ServerState>,
    db: DatabaseConnection,
}

impl StatusService {
    /// Restores the persisted status from the database, marking the
    /// server online
    pub async fn load(db: DatabaseConnection) -> DbResult<Arc<StatusService>> {
        let mut state = match ServerStatus::load(&db).await? {
            Some(stored) => ServerState {
                is_online: true,
                is_maintenance: stored.is_maintenance,
                is_whitelist: stored.is_whitelist,
                start_maintenance_time: stored.start_maintenance_time,
                end_maintenance_time: stored.end_maintenance_time,
                whitelist: stored.whitelist.0,
                should_switch_to_maintenance: false,
            },
            None => ServerState::default(),
        };
        state.is_online = true;

        let service = Arc::new(Self {
            state: RwLock::new(state),
            db,
        });
        service.persist(0).await?;
        Ok(service)
    }

    /// Admission check applied when a client authenticates
    pub fn admit(&self, pid: PlayerID) -> Result<(), RendezvousError> {
        let state = self.state.read();
        if state.is_maintenance {
            return Err(RendezvousError::UnderMaintenance);
        }
        if state.is_whitelist && !state.whitelist.contains(&pid) {
            return Err(RendezvousError::PermissionDenied);
        }
        Ok(())
    }

    pub fn snapshot(&self) -> ServerState {
        self.state.read().clone()
    }

    /// Schedules a maintenance window. The switch itself happens on
    /// the periodic task once the start time is reached.
    pub fn start_maintenance(&self, start: DateTime<Utc>, end: DateTime<Utc>) {
        let state = &mut *self.state.write();
        state.should_switch_to_maintenance = true;
        state.start_maintenance_time = start;
        state.end_maintenance_time = end;
        info!("Maintenance scheduled ({start} - {end})");
    }

    pub fn end_maintenance(&self) {
        let state = &mut *self.state.write();
        state.start_maintenance_time = DateTime::<Utc>::UNIX_EPOCH;
        state.is_maintenance = false;
        info!("Maintenance ended");
    }

    pub fn toggle_whitelist(&self) -> bool {
        let state = &mut *self.state.write();
        state.is_whitelist = !state.is_whitelist;
        info!("Whitelist mode: {}", state.is_whitelist);
        state.is_whitelist
    }

    pub fn whitelist(&self) -> Vec<PlayerID> {
        self.state.read().whitelist.clone()
    }

    pub fn add_whitelist(&self, pid: PlayerID) {
        let state = &mut *self.state.write();
        if !state.whitelist.contains(&pid) {
            state.whitelist.push(pid);
        }
    }

    pub fn del_whitelist(&self, pid: PlayerID) {
        let state = &mut *self.state.write();
        state.whitelist.retain(|value| *value != pid);
    }

    /// Writes the current status over the persisted row
    pub async fn persist(&self, num_clients: u32) -> Result<(), DbErr> {
        let state = self.snapshot();
        ServerStatus::save(
            &self.db,
            ServerStatus {
                id: 0,
                is_online: state.is_online,
                is_maintenance: state.is_maintenance,
                is_whitelist: state.is_whitelist,
                start_maintenance_time: state.start_maintenance_time,
                end_maintenance_time: state.end_maintenance_time,
                whitelist: U32List(state.whitelist),
                num_clients,
            },
        )
        .await
    }

    /// Performs a scheduled maintenance switch when due. Returns
    /// whether the switch happened.
    fn try_switch_maintenance(&self) -> bool {
        let state = &mut *self.state.write();
        if !state.should_switch_to_maintenance
            || state.is_maintenance
            || Utc::now() < state.start_maintenance_time
        {
            return false;
        }
        state.is_maintenance = true;
        state.should_switch_to_maintenance = false;
        true
    }

    /// Background task persisting status every few seconds and
    /// performing scheduled maintenance switches. Persistence errors
    /// are logged and retried on the next tick.
    pub async fn run(self: Arc<StatusService>, sessions: Arc<Sessions>) {
        let mut ticker = interval(TICK_INTERVAL);
        let mut elapsed_ticks: u32 = 0;

        loop {
            ticker.tick().await;
            elapsed_ticks += 1;
            if elapsed_ticks < PERSIST_TICKS {
                continue;
            }
            elapsed_ticks = 0;

            if self.try_switch_maintenance() {
                let kicked = sessions.kick_all();
                warn!("Switched to maintenance mode, kicked {kicked} clients");
            }

            if let Err(err) = self.persist(sessions.count() as u32).await {
                error!("Failed to persist server status: {err:?}");
            }
        }
    }

    /// Shutdown: drain connected clients and zero the persisted count
    pub async fn shutdown(&self, sessions: &Sessions) {
        let kicked = sessions.kick_all();
        info!("Shutting down, kicked {kicked} clients");

        {
            let state = &mut *self.state.write();
            state.is_online = false;
        }

        if let Err(err) = self.persist(0).await {
            error!("Failed to persist final server status: {err:?}");
        }
    }
}

#[cfg(test)]
mod test {
    use super::StatusService;
    use crate::database::connect_memory;
    use crate::session::models::errors::RendezvousError;
    use chrono::Utc;

    #[tokio::test]
    async fn test_whitelist_gate() {
        let db = connect_memory().await;
        let status = StatusService::load(db).await.unwrap();

        // Whitelist disabled: anyone may authenticate
        assert!(status.admit(42).is_ok());

        status.toggle_whitelist();
        assert_eq!(
            status.admit(42),
            Err(RendezvousError::PermissionDenied)
        );

        status.add_whitelist(42);
        assert!(status.admit(42).is_ok());

        status.del_whitelist(42);
        assert_eq!(
            status.admit(42),
            Err(RendezvousError::PermissionDenied)
        );
    }

    #[tokio::test]
    async fn test_maintenance_gate_and_switch() {
        let db = connect_memory().await;
        let status = StatusService::load(db).await.unwrap();

        // Scheduled but not yet switched: clients still admitted
        status.start_maintenance(Utc::now(), Utc::now());
        assert!(status.admit(1).is_ok());

        assert!(status.try_switch_maintenance());
        assert_eq!(status.admit(1), Err(RendezvousError::UnderMaintenance));

        // A second switch attempt does nothing
        assert!(!status.try_switch_maintenance());

        status.end_maintenance();
        assert!(status.admit(1).is_ok());
    }

    #[tokio::test]
    async fn test_status_survives_reload() {
        let db = connect_memory().await;
        let status = StatusService::load(db.clone()).await.unwrap();
        status.toggle_whitelist();
        status.add_whitelist(7);
        status.persist(3).await.unwrap();

        let restored = StatusService::load(db).await.unwrap();
        let state = restored.snapshot();
        assert!(state.is_whitelist);
        assert_eq!(state.whitelist, vec![7]);
        // The server always comes back online
        assert!(state.is_online);
    }
}
