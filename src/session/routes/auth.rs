//! Ticket login on the authentication endpoint. Admission (the
//! maintenance window and the whitelist) is applied here before
//! credentials are checked against the account service.

use crate::session::models::auth::{LoginRequest, LoginResponse};
use crate::session::models::errors::{RendezvousError, ServerResult};
use crate::session::packet::Rmc;
use crate::session::SessionLink;
use crate::utils::random::random_bytes;
use log::debug;

/// Length of generated login tickets
const TICKET_LENGTH: usize = 64;

pub async fn handle_login(
    session: SessionLink,
    LoginRequest { username, password }: LoginRequest,
) -> ServerResult<Rmc<LoginResponse>> {
    let pid = parse_pid(&username)?;
    let app = &session.app;

    app.status.admit(pid)?;

    if !app.accounts.validate_login(pid, &password).await? {
        return Err(RendezvousError::InvalidUsername);
    }

    debug!("Authenticated principal (PID: {pid})");

    Ok(Rmc(LoginResponse {
        pid,
        ticket: random_bytes::<TICKET_LENGTH>().to_vec(),
        secure_station: app.config.secure_station_url(),
    }))
}

/// Re-issues a ticket for an already validated principal
pub async fn handle_request_ticket(
    session: SessionLink,
    LoginRequest { username, password }: LoginRequest,
) -> ServerResult<Rmc<LoginResponse>> {
    handle_login(session, LoginRequest { username, password }).await
}

fn parse_pid(username: &str) -> ServerResult<u32> {
    username
        .parse()
        .map_err(|_| RendezvousError::InvalidUsername)
}
