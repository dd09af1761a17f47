//! The gathering engine: matchmake session lifecycle, capacity
//! accounting, host migration and filter-based discovery. Gathering
//! state is durable; this module owns the rules applied on top of the
//! stored rows.

use crate::database::entities::{counters, gatherings::CreateGathering, Counter, Gathering};
use crate::services::App;
use crate::session::models::errors::{RendezvousError, ServerResult};
use crate::session::models::matchmaking::{
    MatchmakeSession, NotificationEvent, GATHERING_TYPE_MATCHMAKE_SESSION, POLICY_FRIENDS_ONLY,
};
use crate::utils::components::notifications;
use crate::utils::random::random_bytes;
use crate::utils::types::{GatheringID, PlayerID};
use log::debug;
use sea_orm::TransactionTrait;

/// Hard cap on gathering capacity
const MAX_PARTICIPANTS: u32 = 12;
/// Templates must carry at least this many attribute slots
const MIN_ATTRIBUTES: usize = 5;
/// Upper bound on search page sizes
const MAX_SEARCH_SIZE: u32 = 100;
/// Length of generated session keys
const SESSION_KEY_LENGTH: usize = 16;

/// Attribute slots matched exactly by filter-based search
const FILTER_SLOTS: [usize; 3] = [0, 3, 4];

pub fn verify_template(template: &MatchmakeSession) -> ServerResult<()> {
    if template.gathering_type != GATHERING_TYPE_MATCHMAKE_SESSION {
        return Err(RendezvousError::InvalidArgument);
    }
    if template.max_participants > MAX_PARTICIPANTS {
        return Err(RendezvousError::InvalidArgument);
    }
    if template.min_participants > template.max_participants {
        return Err(RendezvousError::InvalidArgument);
    }
    if template.attributes.len() < MIN_ATTRIBUTES {
        return Err(RendezvousError::InvalidArgument);
    }
    Ok(())
}

/// Creates a gathering from a validated template with the creator as
/// owner, host and first participant
pub async fn create(
    app: &App,
    owner: PlayerID,
    template: &MatchmakeSession,
) -> ServerResult<Gathering> {
    verify_template(template)?;

    let gid = Counter::next(&app.db, counters::GATHERING_ID).await?;
    let session_key = random_bytes::<SESSION_KEY_LENGTH>().to_vec();

    let gathering = Gathering::create(
        &app.db,
        CreateGathering {
            gid,
            owner,
            attributes: template.attributes.clone(),
            game_mode: template.game_mode,
            application_data: template.application_data.clone(),
            min_participants: template.min_participants,
            max_participants: template.max_participants,
            participation_policy: template.participation_policy,
            open_participation: template.open_participation,
            session_key,
        },
    )
    .await?;

    debug!("Created gathering (GID: {gid}, owner: {owner})");
    Ok(gathering)
}

/// Fetches a gathering, lazily closing it when its host is no longer
/// connected. Returns None for unknown and just-closed gatherings.
pub async fn fetch_live(app: &App, gid: GatheringID) -> ServerResult<Option<Gathering>> {
    let gathering = match Gathering::by_gid(&app.db, gid).await? {
        Some(value) => value,
        None => return Ok(None),
    };

    if !app.sessions.is_connected(gathering.host) {
        debug!("Closing gathering with disconnected host (GID: {gid})");
        Gathering::delete_by_gid(&app.db, gid).await?;
        return Ok(None);
    }

    Ok(Some(gathering))
}

/// Joins a player into a gathering, reserving `extra_seats` anonymous
/// seats alongside them. The friends-only policy is checked against
/// the owner's friend list before the capacity-checked update.
pub async fn join(
    app: &App,
    pid: PlayerID,
    gid: GatheringID,
    join_message: &str,
    extra_seats: u32,
) -> ServerResult<Vec<u8>> {
    let gathering = fetch_live(app, gid)
        .await?
        .ok_or(RendezvousError::SessionVoid)?;

    if gathering.participation_policy == POLICY_FRIENDS_ONLY && pid != gathering.owner {
        let friends = app.accounts.friend_pids(gathering.owner).await?;
        if !friends.contains(&pid) {
            return Err(RendezvousError::NotFriend);
        }
    }

    // Capacity check and seat update are one transaction
    let txn = app.db.begin().await?;
    let gathering = Gathering::by_gid(&txn, gid)
        .await?
        .ok_or(RendezvousError::SessionVoid)?;

    if !gathering.open_participation {
        return Err(RendezvousError::SessionClosed);
    }
    if gathering.is_participant(pid) {
        return Err(RendezvousError::AlreadyParticipant);
    }
    let seats_needed = 1 + extra_seats as usize;
    if gathering.occupancy() + seats_needed > gathering.max_participants as usize {
        return Err(RendezvousError::SessionFull);
    }

    let mut players = gathering.players.0.clone();
    players.push(pid);
    Gathering::set_players(&txn, gid, players, gathering.extra_seats + extra_seats).await?;
    txn.commit().await?;

    debug!("Player {pid} joined gathering (GID: {gid}, message: {join_message:?})");
    Ok(gathering.session_key)
}

/// Removes a player from a gathering. The gathering is destroyed when
/// the last player leaves; when the host leaves the oldest remaining
/// participant inherits the host seat and the survivors are notified.
pub async fn leave(app: &App, pid: PlayerID, gid: GatheringID) -> ServerResult<()> {
    let txn = app.db.begin().await?;
    let gathering = Gathering::by_gid(&txn, gid)
        .await?
        .ok_or(RendezvousError::SessionVoid)?;

    if !gathering.is_participant(pid) {
        return Err(RendezvousError::NotParticipant);
    }

    let mut players = gathering.players.0.clone();
    players.retain(|value| *value != pid);

    if players.is_empty() {
        Gathering::delete_by_gid(&txn, gid).await?;
        txn.commit().await?;
        debug!("Destroyed empty gathering (GID: {gid})");
        return Ok(());
    }

    // Oldest remaining player inherits the host seat
    let new_host = if gathering.host == pid {
        Some(players[0])
    } else {
        None
    };

    Gathering::set_players(&txn, gid, players.clone(), gathering.extra_seats).await?;
    if let Some(new_host) = new_host {
        Gathering::set_host(&txn, gid, new_host).await?;
    }
    txn.commit().await?;

    if let Some(new_host) = new_host {
        debug!("Migrated host of gathering (GID: {gid}, host: {new_host})");
        notify_players(
            app,
            &players,
            NotificationEvent {
                source_pid: pid,
                event_type: notifications::HOST_CHANGED,
                param1: gid,
                param2: new_host,
                message: String::new(),
            },
        );
    }

    Ok(())
}

/// Explicitly destroys a gathering; only the owner may do this
pub async fn unregister(app: &App, pid: PlayerID, gid: GatheringID) -> ServerResult<()> {
    let gathering = Gathering::by_gid(&app.db, gid)
        .await?
        .ok_or(RendezvousError::SessionVoid)?;
    if gathering.owner != pid {
        return Err(RendezvousError::AccessDenied);
    }
    Gathering::delete_by_gid(&app.db, gid).await?;
    debug!("Unregistered gathering (GID: {gid})");
    Ok(())
}

/// Reassigns the host seat; requester must be owner or current host
/// and the new host must be present
pub async fn update_host(
    app: &App,
    requester: PlayerID,
    gid: GatheringID,
    new_host: PlayerID,
) -> ServerResult<()> {
    let gathering = Gathering::by_gid(&app.db, gid)
        .await?
        .ok_or(RendezvousError::SessionVoid)?;
    if requester != gathering.owner && requester != gathering.host {
        return Err(RendezvousError::AccessDenied);
    }
    if !gathering.is_participant(new_host) {
        return Err(RendezvousError::NotParticipant);
    }
    Gathering::set_host(&app.db, gid, new_host).await?;

    notify_players(
        app,
        &gathering.players.0,
        NotificationEvent {
            source_pid: requester,
            event_type: notifications::HOST_CHANGED,
            param1: gid,
            param2: new_host,
            message: String::new(),
        },
    );
    Ok(())
}

/// Reassigns ownership; requester must be owner or host and the new
/// owner must be present
pub async fn migrate_ownership(
    app: &App,
    requester: PlayerID,
    gid: GatheringID,
    new_owner: PlayerID,
) -> ServerResult<()> {
    let gathering = Gathering::by_gid(&app.db, gid)
        .await?
        .ok_or(RendezvousError::SessionVoid)?;
    if requester != gathering.owner && requester != gathering.host {
        return Err(RendezvousError::AccessDenied);
    }
    if !gathering.is_participant(new_owner) {
        return Err(RendezvousError::NotParticipant);
    }
    Gathering::set_owner(&app.db, gid, new_owner).await?;

    notify_players(
        app,
        &gathering.players.0,
        NotificationEvent {
            source_pid: requester,
            event_type: notifications::OWNERSHIP_CHANGED,
            param1: gid,
            param2: new_owner,
            message: String::new(),
        },
    );
    Ok(())
}

/// Owner toggle for whether new players may join
pub async fn set_participation(
    app: &App,
    pid: PlayerID,
    gid: GatheringID,
    open: bool,
) -> ServerResult<()> {
    let gathering = Gathering::by_gid(&app.db, gid)
        .await?
        .ok_or(RendezvousError::SessionVoid)?;
    if gathering.owner != pid && gathering.host != pid {
        return Err(RendezvousError::AccessDenied);
    }
    Gathering::set_open_participation(&app.db, gid, open).await?;
    Ok(())
}

/// Whether a gathering matches the standard filter template: exact
/// equality on the tournament, region and DLC slots
fn matches_filter(gathering: &Gathering, filter: &MatchmakeSession) -> bool {
    if filter.gathering_type != GATHERING_TYPE_MATCHMAKE_SESSION {
        return true;
    }
    FILTER_SLOTS.iter().all(|slot| {
        let wanted = filter.attributes.get(*slot).copied().unwrap_or_default();
        let actual = gathering.attributes.0.get(*slot).copied().unwrap_or_default();
        wanted == actual
    })
}

/// Filter-based search over all gatherings. Insertion order is
/// preserved; gatherings with disconnected hosts are closed as the
/// sweep passes over them.
pub async fn search(
    app: &App,
    filter: &MatchmakeSession,
    offset: u32,
    size: u32,
) -> ServerResult<Vec<Gathering>> {
    if size > MAX_SEARCH_SIZE {
        return Err(RendezvousError::InvalidArgument);
    }

    let mut results = Vec::new();
    for gathering in Gathering::all(&app.db).await? {
        if !app.sessions.is_connected(gathering.host) {
            debug!(
                "Closing gathering with disconnected host (GID: {})",
                gathering.gid
            );
            Gathering::delete_by_gid(&app.db, gathering.gid).await?;
            continue;
        }
        if matches_filter(&gathering, filter) {
            results.push(gathering);
        }
    }

    Ok(results
        .into_iter()
        .skip(offset as usize)
        .take(size as usize)
        .collect())
}

/// Finds a joinable gathering for the template, or creates one when
/// nothing matches
pub async fn auto_matchmake(
    app: &App,
    pid: PlayerID,
    template: &MatchmakeSession,
    join_message: &str,
) -> ServerResult<Gathering> {
    verify_template(template)?;

    let candidates = search(app, template, 0, MAX_SEARCH_SIZE).await?;
    for candidate in candidates {
        if !candidate.open_participation
            || candidate.is_participant(pid)
            || candidate.occupancy() >= candidate.max_participants as usize
        {
            continue;
        }
        match join(app, pid, candidate.gid, join_message, 0).await {
            Ok(_) => {
                // Re-read for the updated player list
                if let Some(joined) = Gathering::by_gid(&app.db, candidate.gid).await? {
                    return Ok(joined);
                }
            }
            // Lost the race for the last seat, try the next candidate
            Err(RendezvousError::SessionFull | RendezvousError::SessionClosed) => continue,
            Err(err) => return Err(err),
        }
    }

    create(app, pid, template).await
}

/// Delivers a notification event to every listed player that is
/// currently connected
fn notify_players(app: &App, players: &[PlayerID], event: NotificationEvent) {
    for pid in players {
        if let Some(session) = app.sessions.lookup(*pid) {
            session.notify_event(&event);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::services::{test_app, App};
    use crate::session::{Session, SessionLink};
    use std::sync::Arc;

    /// Connects a test session for the provided principal
    fn connect(app: &Arc<App>, pid: PlayerID) -> SessionLink {
        let session = Session::test(app.clone());
        session.set_auth(pid);
        app.sessions.attach(pid, Arc::downgrade(&session));
        session
    }

    fn template(max_participants: u32) -> MatchmakeSession {
        MatchmakeSession {
            gathering_type: GATHERING_TYPE_MATCHMAKE_SESSION.to_string(),
            min_participants: 1,
            max_participants,
            participation_policy: 0,
            game_mode: 3,
            attributes: vec![0, 0, 0, 1, 2, 0],
            open_participation: true,
            application_data: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_create_seats_creator() {
        let app = test_app().await;
        let _host = connect(&app, 10);

        let gathering = create(&app, 10, &template(4)).await.unwrap();
        assert!(gathering.gid >= 1000);
        assert_eq!(gathering.owner, 10);
        assert_eq!(gathering.host, 10);
        assert_eq!(gathering.players.0, vec![10]);
        assert_eq!(gathering.session_key.len(), 16);
    }

    #[tokio::test]
    async fn test_template_validation() {
        let app = test_app().await;

        let mut bad = template(13);
        assert_eq!(
            create(&app, 1, &bad).await.unwrap_err(),
            RendezvousError::InvalidArgument
        );

        bad = template(4);
        bad.gathering_type = "PersistentGathering".to_string();
        assert_eq!(
            create(&app, 1, &bad).await.unwrap_err(),
            RendezvousError::InvalidArgument
        );

        bad = template(4);
        bad.attributes = vec![0; 4];
        assert_eq!(
            create(&app, 1, &bad).await.unwrap_err(),
            RendezvousError::InvalidArgument
        );
    }

    #[tokio::test]
    async fn test_join_capacity() {
        let app = test_app().await;
        let _host = connect(&app, 1);

        let gathering = create(&app, 1, &template(4)).await.unwrap();
        let gid = gathering.gid;

        for pid in 2..=4 {
            let key = join(&app, pid, gid, "", 0).await.unwrap();
            assert_eq!(key, gathering.session_key);
        }

        // Four seats taken: the next join is rejected
        assert_eq!(
            join(&app, 5, gid, "", 0).await.unwrap_err(),
            RendezvousError::SessionFull
        );

        // Unknown gatherings report a void session
        assert_eq!(
            join(&app, 5, gid + 1, "", 0).await.unwrap_err(),
            RendezvousError::SessionVoid
        );
    }

    #[tokio::test]
    async fn test_join_rejects_duplicates_and_counts_extra_seats() {
        let app = test_app().await;
        let _host = connect(&app, 1);

        let gathering = create(&app, 1, &template(4)).await.unwrap();

        assert_eq!(
            join(&app, 1, gathering.gid, "", 0).await.unwrap_err(),
            RendezvousError::AlreadyParticipant
        );

        // One player plus two anonymous seats fills the session
        join(&app, 2, gathering.gid, "", 2).await.unwrap();
        assert_eq!(
            join(&app, 3, gathering.gid, "", 0).await.unwrap_err(),
            RendezvousError::SessionFull
        );
    }

    #[tokio::test]
    async fn test_closed_participation_rejects_joins() {
        let app = test_app().await;
        let _host = connect(&app, 1);

        let gathering = create(&app, 1, &template(4)).await.unwrap();
        set_participation(&app, 1, gathering.gid, false).await.unwrap();

        assert_eq!(
            join(&app, 2, gathering.gid, "", 0).await.unwrap_err(),
            RendezvousError::SessionClosed
        );

        set_participation(&app, 1, gathering.gid, true).await.unwrap();
        join(&app, 2, gathering.gid, "", 0).await.unwrap();
    }

    #[tokio::test]
    async fn test_host_leaves_oldest_player_inherits() {
        let app = test_app().await;
        let _host = connect(&app, 1);

        let gathering = create(&app, 1, &template(4)).await.unwrap();
        join(&app, 2, gathering.gid, "", 0).await.unwrap();
        join(&app, 3, gathering.gid, "", 0).await.unwrap();

        leave(&app, 1, gathering.gid).await.unwrap();

        let updated = Gathering::by_gid(&app.db, gathering.gid)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.host, 2);
        assert_eq!(updated.players.0, vec![2, 3]);
        // Ownership is unchanged by host migration
        assert_eq!(updated.owner, 1);
    }

    #[tokio::test]
    async fn test_last_leave_destroys_gathering() {
        let app = test_app().await;
        let _host = connect(&app, 1);

        let gathering = create(&app, 1, &template(4)).await.unwrap();
        leave(&app, 1, gathering.gid).await.unwrap();

        assert!(Gathering::by_gid(&app.db, gathering.gid)
            .await
            .unwrap()
            .is_none());

        assert_eq!(
            leave(&app, 1, gathering.gid).await.unwrap_err(),
            RendezvousError::SessionVoid
        );
    }

    #[tokio::test]
    async fn test_non_participant_cannot_leave() {
        let app = test_app().await;
        let _host = connect(&app, 1);

        let gathering = create(&app, 1, &template(4)).await.unwrap();
        assert_eq!(
            leave(&app, 9, gathering.gid).await.unwrap_err(),
            RendezvousError::NotParticipant
        );
    }

    #[tokio::test]
    async fn test_sweep_closes_hostless_gatherings() {
        let app = test_app().await;
        let host = connect(&app, 1);

        let gathering = create(&app, 1, &template(4)).await.unwrap();

        // Drop the host connection; the next touch closes the gathering
        app.sessions.kick(1);
        drop(host);

        assert!(fetch_live(&app, gathering.gid).await.unwrap().is_none());
        assert!(Gathering::by_gid(&app.db, gathering.gid)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_search_matches_filter_slots() {
        let app = test_app().await;
        let _host = connect(&app, 1);

        let mut region_one = template(4);
        region_one.attributes = vec![0, 0, 0, 1, 2, 0];
        let mut region_two = template(4);
        region_two.attributes = vec![0, 0, 0, 2, 2, 0];

        let first = create(&app, 1, &region_one).await.unwrap();
        create(&app, 1, &region_two).await.unwrap();

        let results = search(&app, &region_one, 0, 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].gid, first.gid);

        // Oversized pages are rejected
        assert_eq!(
            search(&app, &region_one, 0, 101).await.unwrap_err(),
            RendezvousError::InvalidArgument
        );
    }

    #[tokio::test]
    async fn test_auto_matchmake_joins_then_creates() {
        let app = test_app().await;
        let _host = connect(&app, 1);
        let _other = connect(&app, 2);

        let existing = create(&app, 1, &template(2)).await.unwrap();

        // A matching template joins the existing gathering
        let joined = auto_matchmake(&app, 2, &template(2), "hi").await.unwrap();
        assert_eq!(joined.gid, existing.gid);
        assert_eq!(joined.players.0, vec![1, 2]);

        // The gathering is now full so a third player gets a new one
        let created = auto_matchmake(&app, 3, &template(2), "").await.unwrap();
        assert_ne!(created.gid, existing.gid);
        assert_eq!(created.owner, 3);
    }

    #[tokio::test]
    async fn test_host_and_ownership_transfer() {
        let app = test_app().await;
        let _host = connect(&app, 1);

        let gathering = create(&app, 1, &template(4)).await.unwrap();
        join(&app, 2, gathering.gid, "", 0).await.unwrap();

        // Only present players can be made host
        assert_eq!(
            update_host(&app, 1, gathering.gid, 9).await.unwrap_err(),
            RendezvousError::NotParticipant
        );
        // Only the owner or host may reassign
        assert_eq!(
            update_host(&app, 2, gathering.gid, 2).await.unwrap_err(),
            RendezvousError::AccessDenied
        );

        update_host(&app, 1, gathering.gid, 2).await.unwrap();
        migrate_ownership(&app, 1, gathering.gid, 2).await.unwrap();

        let updated = Gathering::by_gid(&app.db, gathering.gid)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.host, 2);
        assert_eq!(updated.owner, 2);
    }
}
