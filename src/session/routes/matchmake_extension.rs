//! Matchmake-extension calls: session create/join/browse plus the
//! tournament simple-search-object operations

use crate::database::entities::{counters, Counter, Tournament};
use crate::services::{gatherings, tournaments};
use crate::session::models::errors::{RendezvousError, ServerResult};
use crate::session::models::matchmaking::{
    AutoMatchmakeRequest, BrowseSessionsRequest, CreateSessionRequest, CreateSessionResponse,
    GatheringDetails, GatheringIdRequest, JoinSessionRequest, JoinSessionResponse,
    JoinWithExtraParticipantsRequest,
};
use crate::session::models::tournaments::{
    ObjectIdRequest, SearchByIdsRequest, SimpleSearchObject, SimpleSearchParam,
    UpdateObjectRequest,
};
use crate::session::packet::Rmc;
use crate::session::SessionLink;
use log::debug;

/// Upper bound on id-list searches
const MAX_ID_SEARCH: usize = 100;

pub async fn handle_create_session(
    session: SessionLink,
    CreateSessionRequest { session: template }: CreateSessionRequest,
) -> ServerResult<Rmc<CreateSessionResponse>> {
    let pid = session.require_pid()?;
    let gathering = gatherings::create(&session.app, pid, &template).await?;
    Ok(Rmc(CreateSessionResponse {
        gid: gathering.gid,
        session_key: gathering.session_key,
    }))
}

pub async fn handle_join_session(
    session: SessionLink,
    JoinSessionRequest { gid, join_message }: JoinSessionRequest,
) -> ServerResult<Rmc<JoinSessionResponse>> {
    let pid = session.require_pid()?;
    let session_key = gatherings::join(&session.app, pid, gid, &join_message, 0).await?;
    Ok(Rmc(JoinSessionResponse { session_key }))
}

pub async fn handle_join_with_extra_participants(
    session: SessionLink,
    request: JoinWithExtraParticipantsRequest,
) -> ServerResult<Rmc<JoinSessionResponse>> {
    let pid = session.require_pid()?;
    debug!(
        "Join with extra participants (GID: {}, count: {}, ignore_blacklist: {})",
        request.gid, request.participation_count, request.ignore_blacklist
    );
    let session_key = gatherings::join(
        &session.app,
        pid,
        request.gid,
        &request.join_message,
        request.extra_participants,
    )
    .await?;
    Ok(Rmc(JoinSessionResponse { session_key }))
}

pub async fn handle_browse_sessions(
    session: SessionLink,
    BrowseSessionsRequest { filter, range }: BrowseSessionsRequest,
) -> ServerResult<Rmc<Vec<GatheringDetails>>> {
    session.require_pid()?;
    let results = gatherings::search(&session.app, &filter, range.offset, range.size).await?;
    Ok(Rmc(results
        .into_iter()
        .map(|gathering| gathering.into_details())
        .collect()))
}

pub async fn handle_auto_matchmake(
    session: SessionLink,
    AutoMatchmakeRequest {
        template,
        join_message,
    }: AutoMatchmakeRequest,
) -> ServerResult<Rmc<GatheringDetails>> {
    let pid = session.require_pid()?;
    let gathering =
        gatherings::auto_matchmake(&session.app, pid, &template, &join_message).await?;
    Ok(Rmc(gathering.into_details()))
}

pub async fn handle_open_participation(
    session: SessionLink,
    GatheringIdRequest { gid }: GatheringIdRequest,
) -> ServerResult<Rmc<bool>> {
    let pid = session.require_pid()?;
    gatherings::set_participation(&session.app, pid, gid, true).await?;
    Ok(Rmc(true))
}

pub async fn handle_close_participation(
    session: SessionLink,
    GatheringIdRequest { gid }: GatheringIdRequest,
) -> ServerResult<Rmc<bool>> {
    let pid = session.require_pid()?;
    gatherings::set_participation(&session.app, pid, gid, false).await?;
    Ok(Rmc(true))
}

pub async fn handle_create_simple_search_object(
    session: SessionLink,
    object: SimpleSearchObject,
) -> ServerResult<Rmc<u32>> {
    let pid = session.require_pid()?;
    let app = &session.app;

    let parsed = tournaments::verify_object(&object)?;
    tournaments::verify_community_code(&object.community_code)?;
    if object.community_id == 0 {
        return Err(RendezvousError::InvalidArgument);
    }

    // Community codes are claimable only once across live tournaments
    if Tournament::by_community_code(&app.db, &object.community_code)
        .await?
        .is_some()
    {
        return Err(RendezvousError::InvalidArgument);
    }

    let id = Counter::next(&app.db, counters::TOURNAMENT_ID).await?;
    Tournament::create(
        &app.db,
        id,
        pid,
        object.community_id,
        object.community_code,
        object.attributes,
        object.metadata,
        &parsed,
        object.datetime,
    )
    .await?;

    debug!("Created tournament (ID: {id}, owner: {pid})");
    Ok(Rmc(id))
}

pub async fn handle_update_simple_search_object(
    session: SessionLink,
    UpdateObjectRequest { id, object }: UpdateObjectRequest,
) -> ServerResult<()> {
    let pid = session.require_pid()?;
    let app = &session.app;

    let parsed = tournaments::verify_object(&object)?;

    let existing = Tournament::by_id(&app.db, id)
        .await?
        .ok_or(RendezvousError::InvalidIndex)?;
    if existing.owner != pid {
        return Err(RendezvousError::AccessDenied);
    }

    Tournament::update_object(
        &app.db,
        id,
        object.attributes,
        object.metadata,
        &parsed,
        object.datetime,
    )
    .await?;
    Ok(())
}

pub async fn handle_delete_simple_search_object(
    session: SessionLink,
    request: ObjectIdRequest,
) -> ServerResult<()> {
    let pid = session.require_pid()?;
    let app = &session.app;

    let existing = Tournament::by_id(&app.db, request.id)
        .await?
        .ok_or(RendezvousError::InvalidIndex)?;
    if existing.owner != pid {
        return Err(RendezvousError::AccessDenied);
    }

    // Scores and aggregate counters stay behind for audit
    Tournament::delete_by_id(&app.db, request.id).await?;
    debug!("Deleted tournament (ID: {})", request.id);
    Ok(())
}

pub async fn handle_search_simple_search_object(
    session: SessionLink,
    param: SimpleSearchParam,
) -> ServerResult<Rmc<Vec<SimpleSearchObject>>> {
    session.require_pid()?;
    let app = &session.app;

    tournaments::verify_search_param(&param)?;
    let filters = tournaments::compile_conditions(&param.conditions)?;

    let results: Vec<SimpleSearchObject> = Tournament::all(&app.db)
        .await?
        .into_iter()
        .filter(|row| param.id == 0 || row.id == param.id)
        .filter(|row| param.owner == 0 || row.owner == param.owner)
        .filter(|row| param.community_code.is_empty() || row.community_code == param.community_code)
        .filter(|row| tournaments::matches_filters(&row.attributes.0, &filters))
        .skip(param.range.offset as usize)
        .take(param.range.size as usize)
        .map(|row| row.into_object())
        .collect();

    Ok(Rmc(results))
}

pub async fn handle_search_by_object_ids(
    session: SessionLink,
    SearchByIdsRequest { ids }: SearchByIdsRequest,
) -> ServerResult<Rmc<Vec<SimpleSearchObject>>> {
    session.require_pid()?;
    if ids.len() > MAX_ID_SEARCH {
        return Err(RendezvousError::InvalidArgument);
    }

    // Unknown ids are silently dropped
    let results = Tournament::by_ids(&session.app.db, ids).await?;
    Ok(Rmc(results
        .into_iter()
        .map(|row| row.into_object())
        .collect()))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::services::{test_app, tournaments::valid_attributes, App};
    use crate::session::models::tournaments::{SimpleSearchCondition, SimpleSearchDateTimeAttribute};
    use crate::session::models::ResultRange;
    use crate::session::packet::Rmc;
    use crate::session::{Session, SessionLink};
    use crate::utils::parsing::tournament_meta::sample_metadata;
    use std::sync::Arc;

    fn player(app: &Arc<App>, pid: u32) -> SessionLink {
        let session = Session::test(app.clone());
        session.set_auth(pid);
        session
    }

    fn object(community_code: &str) -> SimpleSearchObject {
        SimpleSearchObject {
            id: 0,
            owner: 0,
            attributes: valid_attributes(),
            metadata: sample_metadata(),
            community_id: 55,
            community_code: community_code.to_string(),
            datetime: SimpleSearchDateTimeAttribute::default(),
        }
    }

    fn empty_search() -> SimpleSearchParam {
        SimpleSearchParam {
            id: 0,
            owner: 0,
            conditions: Vec::new(),
            community_code: String::new(),
            range: ResultRange {
                offset: 0,
                size: 100,
            },
        }
    }

    #[tokio::test]
    async fn test_create_assigns_counter_ids() {
        let app = test_app().await;
        let owner = player(&app, 1);

        let Rmc(first) = handle_create_simple_search_object(owner.clone(), object("111111111111"))
            .await
            .unwrap();
        let Rmc(second) = handle_create_simple_search_object(owner.clone(), object("222222222222"))
            .await
            .unwrap();

        assert_eq!(first, 20000);
        assert_eq!(second, 20001);

        let stored = Tournament::by_id(&app.db, first).await.unwrap().unwrap();
        assert_eq!(stored.owner, 1);
        assert_eq!(stored.season_id, 1);
        assert_eq!(stored.total_participants, 0);
        assert_eq!(stored.name, "Friday Cup");
    }

    #[tokio::test]
    async fn test_community_code_uniqueness() {
        let app = test_app().await;
        let owner = player(&app, 1);

        handle_create_simple_search_object(owner.clone(), object("123456789012"))
            .await
            .unwrap();

        // Same code again, even from another principal
        let other = player(&app, 2);
        assert_eq!(
            handle_create_simple_search_object(other.clone(), object("123456789012"))
                .await
                .unwrap_err(),
            RendezvousError::InvalidArgument
        );

        // Wrong shapes
        for code in ["12345678901", "1234567890123", "12345678901x"] {
            assert_eq!(
                handle_create_simple_search_object(owner.clone(), object(code))
                    .await
                    .unwrap_err(),
                RendezvousError::InvalidArgument
            );
        }

        // Zero community id
        let mut bad = object("999999999999");
        bad.community_id = 0;
        assert_eq!(
            handle_create_simple_search_object(owner.clone(), bad)
                .await
                .unwrap_err(),
            RendezvousError::InvalidArgument
        );
    }

    #[tokio::test]
    async fn test_update_requires_ownership() {
        let app = test_app().await;
        let owner = player(&app, 1);
        let other = player(&app, 2);

        let Rmc(id) = handle_create_simple_search_object(owner.clone(), object("123456789012"))
            .await
            .unwrap();

        assert_eq!(
            handle_update_simple_search_object(
                other.clone(),
                UpdateObjectRequest {
                    id,
                    object: object("123456789012"),
                },
            )
            .await
            .unwrap_err(),
            RendezvousError::AccessDenied
        );

        // Owner updates attributes without touching the season
        let mut updated = object("123456789012");
        updated.attributes[2] = 5;
        handle_update_simple_search_object(owner.clone(), UpdateObjectRequest { id, object: updated })
            .await
            .unwrap();

        let stored = Tournament::by_id(&app.db, id).await.unwrap().unwrap();
        assert_eq!(stored.attribute(2), 5);
        assert_eq!(stored.season_id, 1);

        // Unknown ids report an invalid index
        assert_eq!(
            handle_update_simple_search_object(
                owner.clone(),
                UpdateObjectRequest {
                    id: 404,
                    object: object("123456789012"),
                },
            )
            .await
            .unwrap_err(),
            RendezvousError::InvalidIndex
        );
    }

    #[tokio::test]
    async fn test_delete_requires_ownership() {
        let app = test_app().await;
        let owner = player(&app, 1);
        let other = player(&app, 2);

        let Rmc(id) = handle_create_simple_search_object(owner.clone(), object("123456789012"))
            .await
            .unwrap();

        assert_eq!(
            handle_delete_simple_search_object(other.clone(), ObjectIdRequest { id })
                .await
                .unwrap_err(),
            RendezvousError::AccessDenied
        );

        handle_delete_simple_search_object(owner.clone(), ObjectIdRequest { id })
            .await
            .unwrap();
        assert!(Tournament::by_id(&app.db, id).await.unwrap().is_none());

        // The code is claimable again once the tournament is gone
        handle_create_simple_search_object(owner.clone(), object("123456789012"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_search_filters() {
        let app = test_app().await;
        let owner = player(&app, 1);

        let mut first = object("111111111111");
        first.attributes[2] = 1;
        let mut second = object("222222222222");
        second.attributes[2] = 4;

        let Rmc(first_id) = handle_create_simple_search_object(owner.clone(), first)
            .await
            .unwrap();
        let Rmc(second_id) = handle_create_simple_search_object(owner.clone(), second)
            .await
            .unwrap();

        // Condition on slot 2: greater-or-equal 2
        let mut param = empty_search();
        param.conditions = vec![
            SimpleSearchCondition { value: 0, operator: 0 },
            SimpleSearchCondition { value: 0, operator: 0 },
            SimpleSearchCondition { value: 2, operator: 4 },
        ];
        let Rmc(results) = handle_search_simple_search_object(owner.clone(), param)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, second_id);

        // Exact community code lookup
        let mut param = empty_search();
        param.community_code = "111111111111".to_string();
        let Rmc(results) = handle_search_simple_search_object(owner.clone(), param)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, first_id);

        // Unknown operator
        let mut param = empty_search();
        param.conditions = vec![SimpleSearchCondition { value: 1, operator: 9 }];
        assert_eq!(
            handle_search_simple_search_object(owner.clone(), param)
                .await
                .unwrap_err(),
            RendezvousError::InvalidArgument
        );

        // Oversized page
        let mut param = empty_search();
        param.range.size = 101;
        assert_eq!(
            handle_search_simple_search_object(owner.clone(), param)
                .await
                .unwrap_err(),
            RendezvousError::InvalidArgument
        );
    }

    #[tokio::test]
    async fn test_search_by_ids_drops_unknown() {
        let app = test_app().await;
        let owner = player(&app, 1);

        let Rmc(id) = handle_create_simple_search_object(owner.clone(), object("111111111111"))
            .await
            .unwrap();

        let Rmc(results) = handle_search_by_object_ids(
            owner.clone(),
            SearchByIdsRequest {
                ids: vec![id, 404, 405],
            },
        )
        .await
        .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, id);

        assert_eq!(
            handle_search_by_object_ids(
                owner.clone(),
                SearchByIdsRequest {
                    ids: vec![0; 101],
                },
            )
            .await
            .unwrap_err(),
            RendezvousError::InvalidArgument
        );
    }

    #[tokio::test]
    async fn test_requests_require_registration() {
        let app = test_app().await;
        let anonymous = Session::test(app.clone());

        assert_eq!(
            handle_create_simple_search_object(anonymous.clone(), object("123456789012"))
                .await
                .unwrap_err(),
            RendezvousError::AccessDenied
        );
    }
}
