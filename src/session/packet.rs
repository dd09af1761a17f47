//! Method-call packets exchanged with clients over the rendezvous
//! session transport. The reliable-delivery layer is external; this
//! module only frames the call layer: a length prefix followed by the
//! protocol number, call bookkeeping and the parameter payload.

use crate::utils::{
    components::{method_name, protocol_name},
    stream::{DecodeResult, FromStream, StreamReader, StreamWriter, ToStream},
};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fmt::Debug;
use std::io;
use tokio_util::codec::{Decoder, Encoder};

/// Bit set on the protocol byte of request packets
const REQUEST_FLAG: u8 = 0x80;
/// Bit set on the method number of successful responses
const RESPONSE_METHOD_FLAG: u32 = 0x8000;

/// The different shapes a packet can have
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PacketKind {
    /// Client initiated method call (also used for server notifications)
    Request,
    /// Successful method response
    Response,
    /// Failed method response carrying an error code
    Error,
}

/// Header describing a call packet
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PacketHeader {
    /// The protocol number the call belongs to
    pub protocol: u8,
    /// Caller chosen id used to pair responses with requests
    pub call_id: u32,
    /// The method number within the protocol
    pub method: u32,
    /// The shape of this packet
    pub kind: PacketKind,
    /// Error code carried by error packets (zero otherwise)
    pub error: u32,
}

/// A complete call packet. Cloning is cheap because the payload is
/// reference counted.
#[derive(Debug, Clone)]
pub struct Packet {
    pub header: PacketHeader,
    pub payload: Bytes,
}

impl Packet {
    pub fn request(protocol: u8, call_id: u32, method: u32, payload: Bytes) -> Packet {
        Self {
            header: PacketHeader {
                protocol,
                call_id,
                method,
                kind: PacketKind::Request,
                error: 0,
            },
            payload,
        }
    }

    /// Creates a successful response to the provided request
    pub fn response(packet: &Packet, payload: Bytes) -> Self {
        Self {
            header: PacketHeader {
                kind: PacketKind::Response,
                error: 0,
                ..packet.header
            },
            payload,
        }
    }

    #[inline]
    pub fn response_empty(packet: &Packet) -> Self {
        Self::response(packet, Bytes::new())
    }

    /// Creates an error response to the provided request
    pub fn error(packet: &Packet, error: u32) -> Self {
        Self {
            header: PacketHeader {
                kind: PacketKind::Error,
                error,
                ..packet.header
            },
            payload: Bytes::new(),
        }
    }

    /// Creates a server initiated notification packet
    pub fn notify<V>(protocol: u8, call_id: u32, method: u32, value: V) -> Packet
    where
        V: ToStream,
    {
        let mut writer = StreamWriter::new();
        value.to_stream(&mut writer);
        Self::request(protocol, call_id, method, writer.into_bytes())
    }

    /// Attempts to read a whole packet from the front of `src`,
    /// returning None when more bytes are needed
    pub fn read(src: &mut BytesMut) -> io::Result<Option<Self>> {
        if src.len() < 4 {
            return Ok(None);
        }

        let length = u32::from_le_bytes([src[0], src[1], src[2], src[3]]) as usize;
        if src.len() < 4 + length {
            return Ok(None);
        }

        src.advance(4);
        let mut body = src.split_to(length);

        let malformed = || io::Error::new(io::ErrorKind::InvalidData, "malformed packet");

        if body.is_empty() {
            return Err(malformed());
        }
        let protocol_byte = body.get_u8();
        let protocol = protocol_byte & !REQUEST_FLAG;

        if protocol_byte & REQUEST_FLAG != 0 {
            // Request: call id, method, payload
            if body.len() < 8 {
                return Err(malformed());
            }
            let call_id = body.get_u32_le();
            let method = body.get_u32_le();
            return Ok(Some(Packet {
                header: PacketHeader {
                    protocol,
                    call_id,
                    method,
                    kind: PacketKind::Request,
                    error: 0,
                },
                payload: body.freeze(),
            }));
        }

        // Response: success flag then either the result or an error code
        if body.is_empty() {
            return Err(malformed());
        }
        let success = body.get_u8() != 0;
        if success {
            if body.len() < 8 {
                return Err(malformed());
            }
            let call_id = body.get_u32_le();
            let method = body.get_u32_le() & !RESPONSE_METHOD_FLAG;
            Ok(Some(Packet {
                header: PacketHeader {
                    protocol,
                    call_id,
                    method,
                    kind: PacketKind::Response,
                    error: 0,
                },
                payload: body.freeze(),
            }))
        } else {
            if body.len() < 8 {
                return Err(malformed());
            }
            let error = body.get_u32_le();
            let call_id = body.get_u32_le();
            Ok(Some(Packet {
                header: PacketHeader {
                    protocol,
                    call_id,
                    method: 0,
                    kind: PacketKind::Error,
                    error,
                },
                payload: body.freeze(),
            }))
        }
    }

    /// Writes this packet onto the end of `dst`
    pub fn write(&self, dst: &mut BytesMut) {
        let header = &self.header;
        let body_length = match header.kind {
            PacketKind::Request => 1 + 4 + 4 + self.payload.len(),
            PacketKind::Response => 1 + 1 + 4 + 4 + self.payload.len(),
            PacketKind::Error => 1 + 1 + 4 + 4,
        };
        dst.put_u32_le(body_length as u32);

        match header.kind {
            PacketKind::Request => {
                dst.put_u8(header.protocol | REQUEST_FLAG);
                dst.put_u32_le(header.call_id);
                dst.put_u32_le(header.method);
                dst.extend_from_slice(&self.payload);
            }
            PacketKind::Response => {
                dst.put_u8(header.protocol);
                dst.put_u8(1);
                dst.put_u32_le(header.call_id);
                dst.put_u32_le(header.method | RESPONSE_METHOD_FLAG);
                dst.extend_from_slice(&self.payload);
            }
            PacketKind::Error => {
                dst.put_u8(header.protocol);
                dst.put_u8(0);
                dst.put_u32_le(header.error);
                dst.put_u32_le(header.call_id);
            }
        }
    }
}

/// Tokio codec for encoding and decoding packets
pub struct PacketCodec;

impl Decoder for PacketCodec {
    type Error = io::Error;
    type Item = Packet;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        Packet::read(src)
    }
}

impl Encoder<Packet> for PacketCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<(), Self::Error> {
        item.write(dst);
        Ok(())
    }
}

/// Trait for request types that can be decoded from a packet payload
pub trait FromRequest: Sized {
    fn from_request(req: &Packet) -> DecodeResult<Self>;
}

impl<T: FromStream> FromRequest for T {
    fn from_request(req: &Packet) -> DecodeResult<Self> {
        let mut reader = StreamReader::new(&req.payload);
        T::from_stream(&mut reader)
    }
}

/// Trait for handler return types that can be turned into the
/// response packet for a request
pub trait IntoResponse: 'static {
    fn into_response(self, req: &Packet) -> Packet;
}

/// Wrapper over a streamable value turning it into a successful
/// method response
pub struct Rmc<T>(pub T);

impl<T> Debug for Rmc<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Rmc(..)")
    }
}

impl<T: ToStream + 'static> IntoResponse for Rmc<T> {
    fn into_response(self, req: &Packet) -> Packet {
        let mut writer = StreamWriter::new();
        self.0.to_stream(&mut writer);
        Packet::response(req, writer.into_bytes())
    }
}

/// Empty response for handlers with no response payload
impl IntoResponse for () {
    fn into_response(self, req: &Packet) -> Packet {
        Packet::response_empty(req)
    }
}

impl<T, E> IntoResponse for Result<T, E>
where
    T: IntoResponse,
    E: IntoResponse,
{
    fn into_response(self, req: &Packet) -> Packet {
        match self {
            Ok(value) => value.into_response(req),
            Err(error) => error.into_response(req),
        }
    }
}

/// Wrapper over a packet structure to provide debug logging with
/// names resolved for the protocol and method
pub struct PacketDebug<'a> {
    pub packet: &'a Packet,
}

impl Debug for PacketDebug<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header = &self.packet.header;

        match (
            protocol_name(header.protocol),
            method_name(header.protocol, header.method),
        ) {
            (Some(protocol), Some(method)) => {
                writeln!(f, "Protocol: {}({})", protocol, method)?;
            }
            (Some(protocol), None) => {
                writeln!(f, "Protocol: {}({:#06x})", protocol, header.method)?;
            }
            _ => {
                writeln!(
                    f,
                    "Protocol: {:#04x}({:#06x})",
                    header.protocol, header.method
                )?;
            }
        }

        writeln!(f, "Kind: {:?}", header.kind)?;
        writeln!(f, "Call ID: {}", header.call_id)?;

        if let PacketKind::Error = header.kind {
            writeln!(f, "Error: {:#010x}", header.error)?;
        }

        write!(f, "Payload: {} bytes", self.packet.payload.len())
    }
}

#[cfg(test)]
mod test {
    use super::{Packet, PacketKind};
    use bytes::{Bytes, BytesMut};

    #[test]
    fn test_request_round_trip() {
        let packet = Packet::request(109, 5, 36, Bytes::from_static(&[1, 2, 3]));

        let mut buffer = BytesMut::new();
        packet.write(&mut buffer);

        let decoded = Packet::read(&mut buffer).unwrap().unwrap();
        assert_eq!(decoded.header, packet.header);
        assert_eq!(decoded.payload, packet.payload);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_response_round_trip() {
        let request = Packet::request(112, 9, 15, Bytes::new());
        let response = Packet::response(&request, Bytes::from_static(&[9]));

        let mut buffer = BytesMut::new();
        response.write(&mut buffer);

        let decoded = Packet::read(&mut buffer).unwrap().unwrap();
        assert_eq!(decoded.header.kind, PacketKind::Response);
        assert_eq!(decoded.header.call_id, 9);
        assert_eq!(decoded.header.method, 15);
        assert_eq!(decoded.payload, response.payload);
    }

    #[test]
    fn test_error_round_trip() {
        let request = Packet::request(112, 2, 14, Bytes::new());
        let error = Packet::error(&request, 0x0001000A);

        let mut buffer = BytesMut::new();
        error.write(&mut buffer);

        let decoded = Packet::read(&mut buffer).unwrap().unwrap();
        assert_eq!(decoded.header.kind, PacketKind::Error);
        assert_eq!(decoded.header.error, 0x0001000A);
        assert_eq!(decoded.header.call_id, 2);
    }

    #[test]
    fn test_partial_packets_wait_for_more() {
        let packet = Packet::request(21, 1, 2, Bytes::from_static(&[7; 16]));

        let mut buffer = BytesMut::new();
        packet.write(&mut buffer);

        // Feed the buffer one byte short of complete
        let full = buffer.clone();
        let mut partial = BytesMut::from(&full[..full.len() - 1]);
        assert!(Packet::read(&mut partial).unwrap().is_none());
    }
}
