//! Session registration on the secure endpoint. A registered session
//! is attached to the connection registry and recorded in the session
//! table until it disconnects.

use crate::database::entities::SessionRecord;
use crate::session::models::auth::{RegisterRequest, RegisterResponse};
use crate::session::models::errors::{RendezvousError, ServerResult};
use crate::session::packet::Rmc;
use crate::session::SessionLink;
use log::debug;
use std::sync::Arc;

pub async fn handle_register(
    session: SessionLink,
    register: RegisterRequest,
) -> ServerResult<Rmc<RegisterResponse>> {
    let app = &session.app;

    // The transport layer has already consumed the ticket key
    // material; an empty ticket can only come from a broken client
    if register.ticket.is_empty() {
        return Err(RendezvousError::AccessDenied);
    }

    app.status.admit(register.pid)?;

    session.set_auth(register.pid);
    app.sessions.attach(register.pid, Arc::downgrade(&session));
    SessionRecord::set(&app.db, register.pid, register.station_urls).await?;

    debug!(
        "Registered client (PID: {}, SID: {})",
        register.pid,
        session.id()
    );

    Ok(Rmc(RegisterResponse {
        connection_id: session.id(),
    }))
}
