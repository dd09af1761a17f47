//! Models for the matchmaking and matchmake-extension protocols

use super::ResultRange;
use crate::utils::{
    stream::{DecodeResult, FromStream, StreamReader, StreamWriter, ToStream},
    types::{GatheringID, PlayerID},
};

/// Gathering subtype accepted by this title
pub const GATHERING_TYPE_MATCHMAKE_SESSION: &str = "MatchmakeSession";

/// Participation policy marking a gathering as joinable by the
/// owner's friends only
pub const POLICY_FRIENDS_ONLY: u32 = 98;

/// Matchmake session template sent by the client when creating,
/// browsing or auto-matchmaking
pub struct MatchmakeSession {
    /// Gathering subtype name, must be [GATHERING_TYPE_MATCHMAKE_SESSION]
    pub gathering_type: String,
    pub min_participants: u32,
    pub max_participants: u32,
    pub participation_policy: u32,
    pub game_mode: u32,
    pub attributes: Vec<u32>,
    pub open_participation: bool,
    pub application_data: Vec<u8>,
}

impl FromStream for MatchmakeSession {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            gathering_type: r.read_string()?,
            min_participants: r.read_u32()?,
            max_participants: r.read_u32()?,
            participation_policy: r.read_u32()?,
            game_mode: r.read_u32()?,
            attributes: r.read_list()?,
            open_participation: r.read_bool()?,
            application_data: r.read_buffer()?,
        })
    }
}

pub struct CreateSessionRequest {
    pub session: MatchmakeSession,
}

impl FromStream for CreateSessionRequest {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            session: MatchmakeSession::from_stream(r)?,
        })
    }
}

pub struct CreateSessionResponse {
    pub gid: GatheringID,
    pub session_key: Vec<u8>,
}

impl ToStream for CreateSessionResponse {
    fn to_stream(&self, w: &mut StreamWriter) {
        w.write_u32(self.gid);
        w.write_buffer(&self.session_key);
    }
}

pub struct JoinSessionRequest {
    pub gid: GatheringID,
    pub join_message: String,
}

impl FromStream for JoinSessionRequest {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            gid: r.read_u32()?,
            join_message: r.read_string()?,
        })
    }
}

pub struct JoinSessionResponse {
    pub session_key: Vec<u8>,
}

impl ToStream for JoinSessionResponse {
    fn to_stream(&self, w: &mut StreamWriter) {
        w.write_buffer(&self.session_key);
    }
}

/// Join variant reserving additional anonymous seats alongside the
/// joining player
pub struct JoinWithExtraParticipantsRequest {
    pub gid: GatheringID,
    pub join_message: String,
    pub ignore_blacklist: bool,
    pub participation_count: u16,
    pub extra_participants: u32,
}

impl FromStream for JoinWithExtraParticipantsRequest {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            gid: r.read_u32()?,
            join_message: r.read_string()?,
            ignore_blacklist: r.read_bool()?,
            participation_count: r.read_u16()?,
            extra_participants: r.read_u32()?,
        })
    }
}

/// Requests that only carry a gathering id
pub struct GatheringIdRequest {
    pub gid: GatheringID,
}

impl FromStream for GatheringIdRequest {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            gid: r.read_u32()?,
        })
    }
}

pub struct UpdateSessionHostRequest {
    pub gid: GatheringID,
    pub new_host: PlayerID,
}

impl FromStream for UpdateSessionHostRequest {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            gid: r.read_u32()?,
            new_host: r.read_u32()?,
        })
    }
}

pub struct MigrateOwnershipRequest {
    pub gid: GatheringID,
    pub new_owner: PlayerID,
}

impl FromStream for MigrateOwnershipRequest {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            gid: r.read_u32()?,
            new_owner: r.read_u32()?,
        })
    }
}

pub struct BrowseSessionsRequest {
    pub filter: MatchmakeSession,
    pub range: ResultRange,
}

impl FromStream for BrowseSessionsRequest {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            filter: MatchmakeSession::from_stream(r)?,
            range: ResultRange::from_stream(r)?,
        })
    }
}

pub struct AutoMatchmakeRequest {
    pub template: MatchmakeSession,
    pub join_message: String,
}

impl FromStream for AutoMatchmakeRequest {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            template: MatchmakeSession::from_stream(r)?,
            join_message: r.read_string()?,
        })
    }
}

/// Gathering state returned by searches and lookups
pub struct GatheringDetails {
    pub gid: GatheringID,
    pub owner: PlayerID,
    pub host: PlayerID,
    pub min_participants: u32,
    pub max_participants: u32,
    pub participation_policy: u32,
    pub game_mode: u32,
    pub attributes: Vec<u32>,
    pub open_participation: bool,
    pub application_data: Vec<u8>,
    pub players: Vec<PlayerID>,
    pub participation_count: u32,
}

impl ToStream for GatheringDetails {
    fn to_stream(&self, w: &mut StreamWriter) {
        w.write_string(GATHERING_TYPE_MATCHMAKE_SESSION);
        w.write_u32(self.gid);
        w.write_u32(self.owner);
        w.write_u32(self.host);
        w.write_u32(self.min_participants);
        w.write_u32(self.max_participants);
        w.write_u32(self.participation_policy);
        w.write_u32(self.game_mode);
        w.write_list(&self.attributes);
        w.write_bool(self.open_participation);
        w.write_buffer(&self.application_data);
        w.write_list(&self.players);
        w.write_u32(self.participation_count);
    }
}

/// Event payload delivered through the notification protocol
pub struct NotificationEvent {
    pub source_pid: PlayerID,
    pub event_type: u32,
    pub param1: u32,
    pub param2: u32,
    pub message: String,
}

impl ToStream for NotificationEvent {
    fn to_stream(&self, w: &mut StreamWriter) {
        w.write_u32(self.source_pid);
        w.write_u32(self.event_type);
        w.write_u32(self.param1);
        w.write_u32(self.param2);
        w.write_string(&self.message);
    }
}
