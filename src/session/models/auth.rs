//! Models for the authentication and secure-connection protocols

use crate::utils::{
    stream::{DecodeResult, FromStream, StreamReader, StreamWriter, ToStream},
    types::PlayerID,
};

/// Ticket login request. The username is the principal id in decimal
/// as issued by the account service.
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl FromStream for LoginRequest {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            username: r.read_string()?,
            password: r.read_string()?,
        })
    }
}

pub struct LoginResponse {
    pub pid: PlayerID,
    /// Opaque ticket consumed by the secure endpoint handshake
    pub ticket: Vec<u8>,
    /// Address of the secure endpoint the client should move to
    pub secure_station: String,
}

impl ToStream for LoginResponse {
    fn to_stream(&self, w: &mut StreamWriter) {
        w.write_u32(self.pid);
        w.write_buffer(&self.ticket);
        w.write_string(&self.secure_station);
    }
}

/// Secure endpoint registration. Station URLs describe how other
/// participants can reach this client.
pub struct RegisterRequest {
    pub pid: PlayerID,
    pub ticket: Vec<u8>,
    pub station_urls: Vec<String>,
}

impl FromStream for RegisterRequest {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            pid: r.read_u32()?,
            ticket: r.read_buffer()?,
            station_urls: r.read_list()?,
        })
    }
}

pub struct RegisterResponse {
    pub connection_id: u32,
}

impl ToStream for RegisterResponse {
    fn to_stream(&self, w: &mut StreamWriter) {
        w.write_u32(self.connection_id);
    }
}
