use super::router::Router;
use crate::utils::components as c;

mod auth;
mod datastore;
mod matchmake_extension;
mod matchmaking;
mod ranking;
mod secure;

/// Router for the authentication endpoint
#[rustfmt::skip]
pub fn auth_router() -> Router {
    let mut router = Router::new();

    {
        use auth::*;
        use c::authentication as a;

        router.route(a::PROTOCOL, a::LOGIN, handle_login);
        router.route(a::PROTOCOL, a::REQUEST_TICKET, handle_request_ticket);
    }

    router
}

/// Router for the secure endpoint carrying the feature protocols
#[rustfmt::skip]
pub fn secure_router() -> Router {
    let mut router = Router::new();

    {
        use c::secure_connection as s;
        use secure::*;

        router.route(s::PROTOCOL, s::REGISTER, handle_register);
    }

    {
        use c::matchmaking as m;
        use matchmaking::*;

        router.route(m::PROTOCOL, m::UNREGISTER_GATHERING, handle_unregister_gathering);
        router.route(m::PROTOCOL, m::UPDATE_SESSION_HOST, handle_update_session_host);
        router.route(m::PROTOCOL, m::MIGRATE_GATHERING_OWNERSHIP, handle_migrate_ownership);
        router.route(m::PROTOCOL, m::END_PARTICIPATION, handle_end_participation);
        router.route(m::PROTOCOL, m::FIND_BY_SINGLE_ID, handle_find_by_single_id);
    }

    {
        use c::matchmake_extension as m;
        use matchmake_extension::*;

        router.route(m::PROTOCOL, m::CLOSE_PARTICIPATION, handle_close_participation);
        router.route(m::PROTOCOL, m::OPEN_PARTICIPATION, handle_open_participation);
        router.route(m::PROTOCOL, m::AUTO_MATCHMAKE_POSTPONE, handle_auto_matchmake);
        router.route(m::PROTOCOL, m::BROWSE_MATCHMAKE_SESSION, handle_browse_sessions);
        router.route(m::PROTOCOL, m::CREATE_MATCHMAKE_SESSION, handle_create_session);
        router.route(m::PROTOCOL, m::JOIN_MATCHMAKE_SESSION, handle_join_session);
        router.route(m::PROTOCOL, m::CREATE_SIMPLE_SEARCH_OBJECT, handle_create_simple_search_object);
        router.route(m::PROTOCOL, m::UPDATE_SIMPLE_SEARCH_OBJECT, handle_update_simple_search_object);
        router.route(m::PROTOCOL, m::DELETE_SIMPLE_SEARCH_OBJECT, handle_delete_simple_search_object);
        router.route(m::PROTOCOL, m::SEARCH_SIMPLE_SEARCH_OBJECT, handle_search_simple_search_object);
        router.route(m::PROTOCOL, m::JOIN_MATCHMAKE_SESSION_WITH_EXTRA_PARTICIPANTS, handle_join_with_extra_participants);
        router.route(m::PROTOCOL, m::SEARCH_SIMPLE_SEARCH_OBJECT_BY_OBJECT_IDS, handle_search_by_object_ids);
    }

    {
        use c::ranking as r;
        use ranking::*;

        router.route(r::PROTOCOL, r::UPLOAD_SCORE, handle_upload_score);
        router.route(r::PROTOCOL, r::GET_COMMON_DATA, handle_get_common_data);
        router.route(r::PROTOCOL, r::UPLOAD_COMMON_DATA, handle_upload_common_data);
        router.route(r::PROTOCOL, r::GET_RANKING, handle_get_ranking);
        router.route(r::PROTOCOL, r::GET_COMPETITION_RANKING_SCORE, handle_get_competition_ranking_score);
        router.route(r::PROTOCOL, r::UPLOAD_COMPETITION_RANKING_SCORE, handle_upload_competition_ranking_score);
        router.route(r::PROTOCOL, r::GET_COMPETITION_INFO, handle_get_competition_info);
    }

    {
        use c::datastore as d;
        use datastore::*;

        router.route(d::PROTOCOL, d::GET_META, handle_get_meta);
        router.route(d::PROTOCOL, d::DELETE_OBJECT, handle_delete_object);
        router.route(d::PROTOCOL, d::PREPARE_POST_OBJECT, handle_prepare_post_object);
        router.route(d::PROTOCOL, d::CHANGE_META, handle_change_meta);
        router.route(d::PROTOCOL, d::SEARCH_OBJECT, handle_search_object);
        router.route(d::PROTOCOL, d::GET_OBJECT_INFOS, handle_get_object_infos);
    }

    router
}
