//! Parsers for the binary payloads uploaded by the game client

pub mod common_data;
pub mod compe_time;
pub mod tournament_meta;

/// Decodes a UTF-16BE byte region into a string, stripping a single
/// trailing NUL terminator when present
pub(crate) fn decode_utf16be(bytes: &[u8]) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }

    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();

    let mut value = String::from_utf16(&units).ok()?;
    if value.ends_with('\0') {
        value.pop();
    }
    Some(value)
}
