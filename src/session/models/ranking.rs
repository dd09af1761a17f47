//! Models for the ranking protocol: per-category leaderboards and
//! tournament competition scoring

use super::ResultRange;
use crate::utils::{
    stream::{DecodeResult, FromStream, StreamReader, StreamWriter, ToStream},
    types::{PlayerID, TournamentID},
};

/// Retrieval modes for [GetRankingRequest]
pub mod ranking_mode {
    /// Global ranking over an offset range
    pub const RANGE: u8 = 0;
    /// Ranking centered on the requested principal
    pub const SELF: u8 = 1;
    /// Ranking restricted to the principal's friends
    pub const FRIENDS: u8 = 4;
}

pub struct UploadScoreRequest {
    pub category: u32,
    pub score: u32,
    pub groups: Vec<u8>,
    pub param: u64,
}

impl FromStream for UploadScoreRequest {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            category: r.read_u32()?,
            score: r.read_u32()?,
            groups: r.read_buffer()?,
            param: r.read_u64()?,
        })
    }
}

pub struct UploadCommonDataRequest {
    pub data: Vec<u8>,
    pub unique_id: u64,
}

impl FromStream for UploadCommonDataRequest {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            data: r.read_buffer()?,
            unique_id: r.read_u64()?,
        })
    }
}

pub struct GetCommonDataRequest {
    pub pid: PlayerID,
}

impl FromStream for GetCommonDataRequest {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            pid: r.read_u32()?,
        })
    }
}

pub struct CommonDataResponse {
    pub data: Vec<u8>,
}

impl ToStream for CommonDataResponse {
    fn to_stream(&self, w: &mut StreamWriter) {
        w.write_buffer(&self.data);
    }
}

pub struct GetRankingRequest {
    pub category: u32,
    pub mode: u8,
    pub range: ResultRange,
    pub pid: PlayerID,
}

impl FromStream for GetRankingRequest {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            category: r.read_u32()?,
            mode: r.read_u8()?,
            range: ResultRange::from_stream(r)?,
            pid: r.read_u32()?,
        })
    }
}

pub struct RankingScoreData {
    pub rank: u32,
    pub pid: PlayerID,
    pub category: u32,
    pub score: u32,
    pub groups: Vec<u8>,
    pub param: u64,
    pub last_update: u64,
}

impl ToStream for RankingScoreData {
    fn to_stream(&self, w: &mut StreamWriter) {
        w.write_u32(self.rank);
        w.write_u32(self.pid);
        w.write_u32(self.category);
        w.write_u32(self.score);
        w.write_buffer(&self.groups);
        w.write_u64(self.param);
        w.write_u64(self.last_update);
    }
}

pub struct CompetitionGetScoreRequest {
    pub id: TournamentID,
    pub range: ResultRange,
}

impl FromStream for CompetitionGetScoreRequest {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            id: r.read_u32()?,
            range: ResultRange::from_stream(r)?,
        })
    }
}

pub struct CompetitionUploadScoreRequest {
    pub id: TournamentID,
    pub season_id: u32,
    pub score: u32,
    pub team_id: u32,
    pub team_score: u32,
    pub metadata: Vec<u8>,
}

impl FromStream for CompetitionUploadScoreRequest {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            id: r.read_u32()?,
            season_id: r.read_u32()?,
            score: r.read_u32()?,
            team_id: r.read_u32()?,
            team_score: r.read_u32()?,
            metadata: r.read_qbuffer()?,
        })
    }
}

pub struct CompetitionInfoRequest {
    pub range: ResultRange,
}

impl FromStream for CompetitionInfoRequest {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            range: ResultRange::from_stream(r)?,
        })
    }
}

/// One ranked entry within a competition season
pub struct CompetitionScoreData {
    pub rank: u32,
    pub pid: PlayerID,
    pub score: u32,
    pub team_id: u32,
    pub metadata: Vec<u8>,
    pub last_update: u64,
}

impl ToStream for CompetitionScoreData {
    fn to_stream(&self, w: &mut StreamWriter) {
        w.write_u32(self.rank);
        w.write_u32(self.pid);
        w.write_u32(self.score);
        w.write_u32(self.team_id);
        w.write_qbuffer(&self.metadata);
        w.write_u64(self.last_update);
    }
}

/// Per-season ranking block. `team_scores` is the 4-tuple
/// `[team0_score, team1_score, team0_participants, team1_participants]`
/// and is all zeroes for non-team tournaments.
pub struct CompetitionScoreInfo {
    pub season_id: u32,
    pub num_participants: u32,
    pub team_scores: [u32; 4],
    pub scores: Vec<CompetitionScoreData>,
}

impl ToStream for CompetitionScoreInfo {
    fn to_stream(&self, w: &mut StreamWriter) {
        w.write_u32(self.season_id);
        w.write_u32(self.num_participants);
        w.write_list(&self.team_scores);
        w.write_list(&self.scores);
    }
}

pub struct CompetitionInfo {
    pub id: TournamentID,
    pub num_participants: u32,
    pub team_scores: [u32; 4],
}

impl ToStream for CompetitionInfo {
    fn to_stream(&self, w: &mut StreamWriter) {
        w.write_u32(self.id);
        w.write_u32(self.num_participants);
        w.write_list(&self.team_scores);
    }
}
