//! Protocol and method numbers for the rendezvous dispatch layer.
//!
//! The numbers under `matchmake_extension` 36..=41, `ranking` 14..=16 and
//! `datastore` 43 are wire compatibility and must not change.

pub mod authentication {
    pub const PROTOCOL: u8 = 10;

    pub const LOGIN: u32 = 1;
    pub const REQUEST_TICKET: u32 = 4;
}

pub mod secure_connection {
    pub const PROTOCOL: u8 = 11;

    pub const REGISTER: u32 = 1;
}

pub mod matchmaking {
    pub const PROTOCOL: u8 = 21;

    pub const UNREGISTER_GATHERING: u32 = 2;
    pub const UPDATE_SESSION_HOST: u32 = 8;
    pub const MIGRATE_GATHERING_OWNERSHIP: u32 = 9;
    pub const END_PARTICIPATION: u32 = 16;
    pub const FIND_BY_SINGLE_ID: u32 = 21;
}

pub mod matchmake_extension {
    pub const PROTOCOL: u8 = 109;

    pub const CLOSE_PARTICIPATION: u32 = 1;
    pub const OPEN_PARTICIPATION: u32 = 2;
    pub const AUTO_MATCHMAKE_POSTPONE: u32 = 3;
    pub const BROWSE_MATCHMAKE_SESSION: u32 = 4;
    pub const CREATE_MATCHMAKE_SESSION: u32 = 6;
    pub const JOIN_MATCHMAKE_SESSION: u32 = 7;
    pub const CREATE_SIMPLE_SEARCH_OBJECT: u32 = 36;
    pub const UPDATE_SIMPLE_SEARCH_OBJECT: u32 = 37;
    pub const DELETE_SIMPLE_SEARCH_OBJECT: u32 = 38;
    pub const SEARCH_SIMPLE_SEARCH_OBJECT: u32 = 39;
    pub const JOIN_MATCHMAKE_SESSION_WITH_EXTRA_PARTICIPANTS: u32 = 40;
    pub const SEARCH_SIMPLE_SEARCH_OBJECT_BY_OBJECT_IDS: u32 = 41;
}

pub mod ranking {
    pub const PROTOCOL: u8 = 112;

    pub const UPLOAD_SCORE: u32 = 1;
    pub const GET_COMMON_DATA: u32 = 7;
    pub const UPLOAD_COMMON_DATA: u32 = 8;
    pub const GET_RANKING: u32 = 11;
    pub const GET_COMPETITION_RANKING_SCORE: u32 = 14;
    pub const UPLOAD_COMPETITION_RANKING_SCORE: u32 = 15;
    pub const GET_COMPETITION_INFO: u32 = 16;
}

pub mod datastore {
    pub const PROTOCOL: u8 = 115;

    pub const GET_META: u32 = 4;
    pub const DELETE_OBJECT: u32 = 6;
    pub const PREPARE_POST_OBJECT: u32 = 10;
    pub const CHANGE_META: u32 = 15;
    pub const SEARCH_OBJECT: u32 = 16;
    pub const GET_OBJECT_INFOS: u32 = 43;
}

pub mod notifications {
    pub const PROTOCOL: u8 = 14;

    pub const PROCESS_NOTIFICATION_EVENT: u32 = 1;

    /// Gathering ownership was reassigned
    pub const OWNERSHIP_CHANGED: u32 = 4000;
    /// Gathering host migrated to another participant
    pub const HOST_CHANGED: u32 = 110000;
}

/// Looks up a debug name for the provided protocol number
pub fn protocol_name(protocol: u8) -> Option<&'static str> {
    Some(match protocol {
        authentication::PROTOCOL => "Authentication",
        secure_connection::PROTOCOL => "SecureConnection",
        matchmaking::PROTOCOL => "MatchMaking",
        matchmake_extension::PROTOCOL => "MatchmakeExtension",
        ranking::PROTOCOL => "Ranking",
        datastore::PROTOCOL => "DataStore",
        notifications::PROTOCOL => "Notifications",
        _ => return None,
    })
}

/// Looks up a debug name for a method within the provided protocol
pub fn method_name(protocol: u8, method: u32) -> Option<&'static str> {
    let name = match (protocol, method) {
        (authentication::PROTOCOL, authentication::LOGIN) => "Login",
        (authentication::PROTOCOL, authentication::REQUEST_TICKET) => "RequestTicket",
        (secure_connection::PROTOCOL, secure_connection::REGISTER) => "Register",
        (matchmaking::PROTOCOL, matchmaking::UNREGISTER_GATHERING) => "UnregisterGathering",
        (matchmaking::PROTOCOL, matchmaking::UPDATE_SESSION_HOST) => "UpdateSessionHost",
        (matchmaking::PROTOCOL, matchmaking::MIGRATE_GATHERING_OWNERSHIP) => {
            "MigrateGatheringOwnership"
        }
        (matchmaking::PROTOCOL, matchmaking::END_PARTICIPATION) => "EndParticipation",
        (matchmaking::PROTOCOL, matchmaking::FIND_BY_SINGLE_ID) => "FindBySingleID",
        (matchmake_extension::PROTOCOL, matchmake_extension::CLOSE_PARTICIPATION) => {
            "CloseParticipation"
        }
        (matchmake_extension::PROTOCOL, matchmake_extension::OPEN_PARTICIPATION) => {
            "OpenParticipation"
        }
        (matchmake_extension::PROTOCOL, matchmake_extension::AUTO_MATCHMAKE_POSTPONE) => {
            "AutoMatchmakePostpone"
        }
        (matchmake_extension::PROTOCOL, matchmake_extension::BROWSE_MATCHMAKE_SESSION) => {
            "BrowseMatchmakeSession"
        }
        (matchmake_extension::PROTOCOL, matchmake_extension::CREATE_MATCHMAKE_SESSION) => {
            "CreateMatchmakeSession"
        }
        (matchmake_extension::PROTOCOL, matchmake_extension::JOIN_MATCHMAKE_SESSION) => {
            "JoinMatchmakeSession"
        }
        (matchmake_extension::PROTOCOL, matchmake_extension::CREATE_SIMPLE_SEARCH_OBJECT) => {
            "CreateSimpleSearchObject"
        }
        (matchmake_extension::PROTOCOL, matchmake_extension::UPDATE_SIMPLE_SEARCH_OBJECT) => {
            "UpdateSimpleSearchObject"
        }
        (matchmake_extension::PROTOCOL, matchmake_extension::DELETE_SIMPLE_SEARCH_OBJECT) => {
            "DeleteSimpleSearchObject"
        }
        (matchmake_extension::PROTOCOL, matchmake_extension::SEARCH_SIMPLE_SEARCH_OBJECT) => {
            "SearchSimpleSearchObject"
        }
        (
            matchmake_extension::PROTOCOL,
            matchmake_extension::JOIN_MATCHMAKE_SESSION_WITH_EXTRA_PARTICIPANTS,
        ) => "JoinMatchmakeSessionWithExtraParticipants",
        (
            matchmake_extension::PROTOCOL,
            matchmake_extension::SEARCH_SIMPLE_SEARCH_OBJECT_BY_OBJECT_IDS,
        ) => "SearchSimpleSearchObjectByObjectIDs",
        (ranking::PROTOCOL, ranking::UPLOAD_SCORE) => "UploadScore",
        (ranking::PROTOCOL, ranking::GET_COMMON_DATA) => "GetCommonData",
        (ranking::PROTOCOL, ranking::UPLOAD_COMMON_DATA) => "UploadCommonData",
        (ranking::PROTOCOL, ranking::GET_RANKING) => "GetRanking",
        (ranking::PROTOCOL, ranking::GET_COMPETITION_RANKING_SCORE) => {
            "GetCompetitionRankingScore"
        }
        (ranking::PROTOCOL, ranking::UPLOAD_COMPETITION_RANKING_SCORE) => {
            "UploadCompetitionRankingScore"
        }
        (ranking::PROTOCOL, ranking::GET_COMPETITION_INFO) => "GetCompetitionInfo",
        (datastore::PROTOCOL, datastore::GET_META) => "GetMeta",
        (datastore::PROTOCOL, datastore::DELETE_OBJECT) => "DeleteObject",
        (datastore::PROTOCOL, datastore::PREPARE_POST_OBJECT) => "PreparePostObject",
        (datastore::PROTOCOL, datastore::CHANGE_META) => "ChangeMeta",
        (datastore::PROTOCOL, datastore::SEARCH_OBJECT) => "SearchObject",
        (datastore::PROTOCOL, datastore::GET_OBJECT_INFOS) => "GetObjectInfos",
        (notifications::PROTOCOL, notifications::PROCESS_NOTIFICATION_EVENT) => {
            "ProcessNotificationEvent"
        }
        _ => return None,
    };
    Some(name)
}
