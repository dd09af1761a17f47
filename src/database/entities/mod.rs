//! Entity modules, one per persisted collection

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

pub mod common_data;
pub mod counters;
pub mod datastore_objects;
pub mod gatherings;
pub mod ranking_scores;
pub mod server_status;
pub mod sessions;
pub mod tournament_scores;
pub mod tournaments;

pub use common_data::Model as CommonData;
pub use counters::Model as Counter;
pub use datastore_objects::Model as DataStoreObject;
pub use gatherings::Model as Gathering;
pub use ranking_scores::Model as RankingScore;
pub use server_status::Model as ServerStatus;
pub use sessions::Model as SessionRecord;
pub use tournament_scores::Model as TournamentScore;
pub use tournaments::Model as Tournament;

/// List of u32 values stored as a JSON column (attribute arrays,
/// player lists, whitelists)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct U32List(pub Vec<u32>);

/// List of 0/1 flags stored as a JSON column (unlock vectors)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct U8List(pub Vec<u8>);

/// List of strings stored as a JSON column (tags, station URLs)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct StringList(pub Vec<String>);
