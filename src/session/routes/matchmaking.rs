//! Gathering lifecycle calls on the base matchmaking protocol

use crate::services::gatherings;
use crate::session::models::errors::{RendezvousError, ServerResult};
use crate::session::models::matchmaking::{
    GatheringDetails, GatheringIdRequest, MigrateOwnershipRequest, UpdateSessionHostRequest,
};
use crate::session::packet::Rmc;
use crate::session::SessionLink;

pub async fn handle_unregister_gathering(
    session: SessionLink,
    GatheringIdRequest { gid }: GatheringIdRequest,
) -> ServerResult<Rmc<bool>> {
    let pid = session.require_pid()?;
    gatherings::unregister(&session.app, pid, gid).await?;
    Ok(Rmc(true))
}

pub async fn handle_end_participation(
    session: SessionLink,
    GatheringIdRequest { gid }: GatheringIdRequest,
) -> ServerResult<Rmc<bool>> {
    let pid = session.require_pid()?;
    gatherings::leave(&session.app, pid, gid).await?;
    Ok(Rmc(true))
}

pub async fn handle_update_session_host(
    session: SessionLink,
    UpdateSessionHostRequest { gid, new_host }: UpdateSessionHostRequest,
) -> ServerResult<()> {
    let pid = session.require_pid()?;
    gatherings::update_host(&session.app, pid, gid, new_host).await
}

pub async fn handle_migrate_ownership(
    session: SessionLink,
    MigrateOwnershipRequest { gid, new_owner }: MigrateOwnershipRequest,
) -> ServerResult<()> {
    let pid = session.require_pid()?;
    gatherings::migrate_ownership(&session.app, pid, gid, new_owner).await
}

pub async fn handle_find_by_single_id(
    session: SessionLink,
    GatheringIdRequest { gid }: GatheringIdRequest,
) -> ServerResult<Rmc<GatheringDetails>> {
    session.require_pid()?;
    let gathering = gatherings::fetch_live(&session.app, gid)
        .await?
        .ok_or(RendezvousError::SessionVoid)?;
    Ok(Rmc(gathering.into_details()))
}
