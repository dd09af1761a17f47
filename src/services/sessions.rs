//! Registry of connected principals. The authoritative map between
//! player ids and their live session handles.

use crate::session::{SessionLink, WeakSessionLink};
use crate::utils::hashing::IntHashMap;
use crate::utils::types::PlayerID;
use std::sync::{Mutex, MutexGuard};

type SessionMap = IntHashMap<PlayerID, WeakSessionLink>;

/// Service for storing links to registered sessions
///
/// This uses a blocking mutex as there is little to no overhead
/// since all operations are just map reads and writes which don't
/// warrant the need for the async variant. The lock is never held
/// across transport calls: disconnects always happen on handles
/// copied out of the map first.
#[derive(Default)]
pub struct Sessions {
    /// Lookup mapping between player IDs and their session links
    sessions: Mutex<SessionMap>,
}

impl Sessions {
    fn sessions(&self) -> MutexGuard<'_, SessionMap> {
        self.sessions
            .lock()
            .expect("Session registry mutex was poisoned")
    }

    /// Attaches a session handle to a player id. When the id already
    /// had a handle the old one is evicted and disconnected.
    pub fn attach(&self, pid: PlayerID, link: WeakSessionLink) {
        let evicted = { self.sessions().insert(pid, link) };

        // Disconnect outside the lock
        if let Some(evicted) = evicted.and_then(|value| value.upgrade()) {
            evicted.disconnect();
        }
    }

    /// Removes the mapping for a player id, but only when it still
    /// points at the provided session. A session that was evicted by a
    /// newer attach must not remove its replacement on shutdown.
    pub fn detach(&self, pid: PlayerID, link: &WeakSessionLink) {
        let sessions = &mut *self.sessions();
        if let Some(existing) = sessions.get(&pid) {
            if existing.ptr_eq(link) {
                sessions.remove(&pid);
            }
        }
    }

    pub fn lookup(&self, pid: PlayerID) -> Option<SessionLink> {
        let sessions = &mut *self.sessions();
        let session = sessions.get(&pid)?;
        match session.upgrade() {
            Some(value) => Some(value),
            // Session has stopped, remove it from the map
            None => {
                sessions.remove(&pid);
                None
            }
        }
    }

    pub fn is_connected(&self, pid: PlayerID) -> bool {
        self.lookup(pid).is_some()
    }

    /// Disconnects the session for a player id. Returns whether the
    /// player was connected. The disconnect itself is best-effort and
    /// happens after the registry lock is released.
    pub fn kick(&self, pid: PlayerID) -> bool {
        let session = {
            self.sessions()
                .remove(&pid)
                .and_then(|value| value.upgrade())
        };

        match session {
            Some(session) => {
                session.disconnect();
                true
            }
            None => false,
        }
    }

    /// Disconnects every connected session, returning how many were
    /// connected. Handles are copied out under the lock, disconnects
    /// happen without it.
    pub fn kick_all(&self) -> usize {
        let sessions: Vec<SessionLink> = {
            let map = &mut *self.sessions();
            let links = map.values().filter_map(|value| value.upgrade()).collect();
            map.clear();
            links
        };

        let count = sessions.len();
        for session in sessions {
            session.disconnect();
        }
        count
    }

    /// The currently connected player ids
    pub fn snapshot_pids(&self) -> Vec<PlayerID> {
        let sessions = &*self.sessions();
        sessions
            .iter()
            .filter(|(_, link)| link.strong_count() > 0)
            .map(|(pid, _)| *pid)
            .collect()
    }

    /// Number of live connections
    pub fn count(&self) -> usize {
        let sessions = &*self.sessions();
        sessions
            .values()
            .filter(|link| link.strong_count() > 0)
            .count()
    }
}

#[cfg(test)]
mod test {
    use super::Sessions;
    use crate::services::test_app;
    use crate::session::Session;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_kick_semantics() {
        let app = test_app().await;
        let sessions = Sessions::default();

        let link = Session::test(app.clone());
        sessions.attach(42, Arc::downgrade(&link));

        assert!(sessions.is_connected(42));
        assert!(sessions.kick(42));
        assert!(!sessions.is_connected(42));

        // Kicking an unknown pid reports not connected
        assert!(!sessions.kick(42));
        assert!(!sessions.kick(7));
    }

    #[tokio::test]
    async fn test_attach_evicts_prior_handle() {
        let app = test_app().await;
        let sessions = Sessions::default();

        let first = Session::test(app.clone());
        let second = Session::test(app.clone());
        sessions.attach(42, Arc::downgrade(&first));
        sessions.attach(42, Arc::downgrade(&second));

        let current = sessions.lookup(42).expect("session missing");
        assert!(Arc::ptr_eq(&current, &second));
        assert_eq!(sessions.count(), 1);
    }

    #[tokio::test]
    async fn test_detach_ignores_replaced_sessions() {
        let app = test_app().await;
        let sessions = Sessions::default();

        let first = Session::test(app.clone());
        let second = Session::test(app.clone());
        sessions.attach(42, Arc::downgrade(&first));
        sessions.attach(42, Arc::downgrade(&second));

        // The evicted session cleaning itself up must not remove the
        // replacement mapping
        sessions.detach(42, &Arc::downgrade(&first));
        assert!(sessions.is_connected(42));

        sessions.detach(42, &Arc::downgrade(&second));
        assert!(!sessions.is_connected(42));
    }

    #[tokio::test]
    async fn test_kick_all_and_snapshot() {
        let app = test_app().await;
        let sessions = Sessions::default();

        let links: Vec<_> = (1..=3)
            .map(|pid| {
                let link = Session::test(app.clone());
                sessions.attach(pid, Arc::downgrade(&link));
                link
            })
            .collect();

        let mut pids = sessions.snapshot_pids();
        pids.sort_unstable();
        assert_eq!(pids, vec![1, 2, 3]);

        assert_eq!(sessions.kick_all(), 3);
        assert_eq!(sessions.count(), 0);
        drop(links);
    }
}
