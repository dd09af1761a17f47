//! Module for type aliases that help to better identify field types

pub type PlayerID = u32;
pub type SessionID = u32;
pub type GatheringID = u32;
pub type TournamentID = u32;
pub type DataID = u32;
pub type Port = u16;
