//! Models for the tournament simple-search-object operations

use super::ResultRange;
use crate::utils::{
    stream::{DecodeResult, FromStream, StreamReader, StreamWriter, ToStream},
    types::{PlayerID, TournamentID},
};

/// Tournament schedule block
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleSearchDateTimeAttribute {
    pub start_daytime: u32,
    pub end_daytime: u32,
    pub start_time: u32,
    pub end_time: u32,
    pub start_datetime: u64,
    pub end_datetime: u64,
}

impl FromStream for SimpleSearchDateTimeAttribute {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            start_daytime: r.read_u32()?,
            end_daytime: r.read_u32()?,
            start_time: r.read_u32()?,
            end_time: r.read_u32()?,
            start_datetime: r.read_u64()?,
            end_datetime: r.read_u64()?,
        })
    }
}

impl ToStream for SimpleSearchDateTimeAttribute {
    fn to_stream(&self, w: &mut StreamWriter) {
        w.write_u32(self.start_daytime);
        w.write_u32(self.end_daytime);
        w.write_u32(self.start_time);
        w.write_u32(self.end_time);
        w.write_u64(self.start_datetime);
        w.write_u64(self.end_datetime);
    }
}

/// Tournament record with its fixed-width attribute array used as a
/// search key
pub struct SimpleSearchObject {
    pub id: TournamentID,
    pub owner: PlayerID,
    pub attributes: Vec<u32>,
    pub metadata: Vec<u8>,
    pub community_id: u32,
    pub community_code: String,
    pub datetime: SimpleSearchDateTimeAttribute,
}

impl FromStream for SimpleSearchObject {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            id: r.read_u32()?,
            owner: r.read_u32()?,
            attributes: r.read_list()?,
            metadata: r.read_buffer()?,
            community_id: r.read_u32()?,
            community_code: r.read_string()?,
            datetime: SimpleSearchDateTimeAttribute::from_stream(r)?,
        })
    }
}

impl ToStream for SimpleSearchObject {
    fn to_stream(&self, w: &mut StreamWriter) {
        w.write_u32(self.id);
        w.write_u32(self.owner);
        w.write_list(&self.attributes);
        w.write_buffer(&self.metadata);
        w.write_u32(self.community_id);
        w.write_string(&self.community_code);
        self.datetime.to_stream(w);
    }
}

pub struct UpdateObjectRequest {
    pub id: TournamentID,
    pub object: SimpleSearchObject,
}

impl FromStream for UpdateObjectRequest {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            id: r.read_u32()?,
            object: SimpleSearchObject::from_stream(r)?,
        })
    }
}

pub struct ObjectIdRequest {
    pub id: TournamentID,
}

impl FromStream for ObjectIdRequest {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            id: r.read_u32()?,
        })
    }
}

/// One attribute-slot condition within a search. The operator indexes
/// the comparison table (0 ignore, 1 eq, 2 gt, 3 lt, 4 ge, 5 le).
#[derive(Debug, Clone, Copy)]
pub struct SimpleSearchCondition {
    pub value: u32,
    pub operator: u32,
}

impl FromStream for SimpleSearchCondition {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            value: r.read_u32()?,
            operator: r.read_u32()?,
        })
    }
}

pub struct SimpleSearchParam {
    pub id: TournamentID,
    pub owner: PlayerID,
    pub conditions: Vec<SimpleSearchCondition>,
    pub community_code: String,
    pub range: ResultRange,
}

impl FromStream for SimpleSearchParam {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            id: r.read_u32()?,
            owner: r.read_u32()?,
            conditions: r.read_list()?,
            community_code: r.read_string()?,
            range: ResultRange::from_stream(r)?,
        })
    }
}

pub struct SearchByIdsRequest {
    pub ids: Vec<TournamentID>,
}

impl FromStream for SearchByIdsRequest {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            ids: r.read_list()?,
        })
    }
}
