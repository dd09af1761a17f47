//! Domain error type surfaced to clients as rendezvous error packets

use crate::session::packet::{IntoResponse, Packet};
use log::error;
use sea_orm::DbErr;
use thiserror::Error;

pub type ServerResult<T> = Result<T, RendezvousError>;

/// Errors a method handler can surface to the client. Each variant
/// carries a stable wire code following the platform's facility
/// numbering (core, authentication, rendezvous, ranking).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RendezvousError {
    #[error("invalid argument")]
    InvalidArgument,
    #[error("invalid index")]
    InvalidIndex,
    #[error("access denied")]
    AccessDenied,
    #[error("internal error")]
    Internal,
    #[error("under maintenance")]
    UnderMaintenance,
    #[error("invalid credentials")]
    InvalidUsername,
    #[error("session does not exist")]
    SessionVoid,
    #[error("session is full")]
    SessionFull,
    #[error("session is closed to new participants")]
    SessionClosed,
    #[error("not a friend of the session owner")]
    NotFriend,
    #[error("not a participant of the session")]
    NotParticipant,
    #[error("already a participant of the session")]
    AlreadyParticipant,
    #[error("permission denied")]
    PermissionDenied,
    #[error("invalid data size")]
    InvalidDataSize,
}

impl RendezvousError {
    /// The wire code written into error response packets
    pub const fn code(&self) -> u32 {
        match self {
            Self::Internal => 0x0001_0001,
            Self::InvalidArgument => 0x0001_000A,
            Self::InvalidIndex => 0x0001_000B,
            Self::AccessDenied => 0x0001_000C,
            Self::InvalidUsername => 0x0002_0002,
            Self::UnderMaintenance => 0x0002_000C,
            Self::SessionVoid => 0x0003_0002,
            Self::SessionFull => 0x0003_0003,
            Self::SessionClosed => 0x0003_0004,
            Self::NotFriend => 0x0003_0005,
            Self::NotParticipant => 0x0003_0006,
            Self::AlreadyParticipant => 0x0003_0007,
            Self::PermissionDenied => 0x0003_0010,
            Self::InvalidDataSize => 0x0007_0001,
        }
    }
}

impl IntoResponse for RendezvousError {
    fn into_response(self, req: &Packet) -> Packet {
        Packet::error(req, self.code())
    }
}

/// Persistence failures after validation surface as internal errors
impl From<DbErr> for RendezvousError {
    fn from(err: DbErr) -> Self {
        error!("Database error: {err:?}");
        Self::Internal
    }
}

/// Counter store failures surface as internal errors
impl From<redis::RedisError> for RendezvousError {
    fn from(err: redis::RedisError) -> Self {
        error!("Counter store error: {err:?}");
        Self::Internal
    }
}

/// Outbound service call failures surface as internal errors
impl From<reqwest::Error> for RendezvousError {
    fn from(err: reqwest::Error) -> Self {
        error!("External service error: {err:?}");
        Self::Internal
    }
}
