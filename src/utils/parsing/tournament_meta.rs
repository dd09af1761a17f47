//! Parser for the chunked binary metadata attached to tournaments.
//!
//! Layout (big-endian):
//!
//! ```text
//! u16 magic = 0x5A5A
//! repeat: u8 chunk_id (0xFF terminates, ids above 12 are rejected)
//!         u16 size
//!         bytes[size] payload
//! ```
//!
//! Chunks are keyed by id; when an id repeats the later chunk wins.

use super::decode_utf16be;
use std::collections::BTreeMap;
use thiserror::Error;

/// Magic bytes expected at the front of the metadata
const CHUNK_MAGIC: u16 = 0x5A5A;
/// Chunk id marking the end of the stream
const CHUNK_TERMINATOR: u8 = 0xFF;
/// Largest chunk id the game writes
const MAX_CHUNK_ID: u8 = 12;

/// Errors raised while parsing chunked metadata. All of these surface
/// to the client as an invalid argument.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("wrong metadata magic")]
    WrongMagic,
    #[error("metadata ended unexpectedly")]
    Truncated,
    #[error("invalid chunk id {0}")]
    InvalidChunkId(u8),
    #[error("missing chunk {0}")]
    MissingChunk(u8),
    #[error("chunk {0} has an invalid size")]
    InvalidChunkSize(u8),
}

/// Raw chunk map decoded from a metadata buffer
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChunkData {
    chunks: BTreeMap<u8, Vec<u8>>,
}

impl ChunkData {
    pub fn parse(data: &[u8]) -> Result<Self, MetadataError> {
        let mut reader = ChunkReader { data, cursor: 0 };

        let magic = reader.read_u16()?;
        if magic != CHUNK_MAGIC {
            return Err(MetadataError::WrongMagic);
        }

        let mut chunks = BTreeMap::new();
        loop {
            let id = reader.read_u8()?;
            if id == CHUNK_TERMINATOR {
                break;
            }

            if id > MAX_CHUNK_ID {
                return Err(MetadataError::InvalidChunkId(id));
            }

            let size = reader.read_u16()? as usize;
            let payload = reader.read_bytes(size)?;
            chunks.insert(id, payload.to_vec());
        }

        Ok(Self { chunks })
    }

    pub fn get(&self, id: u8) -> Option<&[u8]> {
        self.chunks.get(&id).map(|value| value.as_slice())
    }

    pub fn insert(&mut self, id: u8, payload: Vec<u8>) {
        self.chunks.insert(id, payload);
    }

    /// Serialises the chunk map back into the wire layout
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut output = Vec::new();
        output.extend_from_slice(&CHUNK_MAGIC.to_be_bytes());
        for (id, payload) in &self.chunks {
            output.push(*id);
            output.extend_from_slice(&(payload.len() as u16).to_be_bytes());
            output.extend_from_slice(payload);
        }
        output.push(CHUNK_TERMINATOR);
        output
    }
}

/// Cursor over the raw metadata bytes
struct ChunkReader<'a> {
    data: &'a [u8],
    cursor: usize,
}

impl<'a> ChunkReader<'a> {
    fn read_bytes(&mut self, length: usize) -> Result<&'a [u8], MetadataError> {
        let end = self
            .cursor
            .checked_add(length)
            .ok_or(MetadataError::Truncated)?;
        if end > self.data.len() {
            return Err(MetadataError::Truncated);
        }
        let value = &self.data[self.cursor..end];
        self.cursor = end;
        Ok(value)
    }

    fn read_u8(&mut self) -> Result<u8, MetadataError> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_u16(&mut self) -> Result<u16, MetadataError> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }
}

/// Structured fields decoded from the tournament metadata chunks
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TournamentMetadata {
    pub revision: u8,
    pub version: u32,
    pub name: String,
    pub icon_type: u8,
    pub description: String,
    pub repeat_type: u32,
    pub gameset_num: u32,
    pub red_team: String,
    pub blue_team: String,
    pub battle_time: u32,
    pub update_date: u32,
}

impl TournamentMetadata {
    pub fn parse(data: &[u8]) -> Result<Self, MetadataError> {
        let chunks = ChunkData::parse(data)?;

        let mut meta = TournamentMetadata::default();
        meta.revision = read_u8_chunk(&chunks, 0)?.unwrap_or_default();
        meta.version = read_u32_chunk(&chunks, 1)?.unwrap_or_default();
        meta.name = read_string_chunk(&chunks, 2)?.unwrap_or_default();
        meta.icon_type = read_u8_chunk(&chunks, 3)?.unwrap_or_default();
        meta.description = read_string_chunk(&chunks, 4)?.unwrap_or_default();
        meta.repeat_type = read_u32_chunk(&chunks, 5)?.unwrap_or_default();
        meta.gameset_num = read_u32_chunk(&chunks, 6)?.unwrap_or_default();
        meta.red_team = read_string_chunk(&chunks, 7)?.unwrap_or_default();
        meta.blue_team = read_string_chunk(&chunks, 8)?.unwrap_or_default();
        meta.battle_time = read_u32_chunk(&chunks, 9)?.unwrap_or_default();
        meta.update_date = read_u32_chunk(&chunks, 11)?.unwrap_or_default();
        Ok(meta)
    }
}

/// Requires the chunk to be present; empty chunks decode as None so the
/// field keeps its default value
fn require_chunk<'c>(chunks: &'c ChunkData, id: u8) -> Result<Option<&'c [u8]>, MetadataError> {
    let chunk = chunks.get(id).ok_or(MetadataError::MissingChunk(id))?;
    Ok(if chunk.is_empty() { None } else { Some(chunk) })
}

fn read_u8_chunk(chunks: &ChunkData, id: u8) -> Result<Option<u8>, MetadataError> {
    require_chunk(chunks, id)?
        .map(|chunk| match chunk {
            [value] => Ok(*value),
            _ => Err(MetadataError::InvalidChunkSize(id)),
        })
        .transpose()
}

fn read_u32_chunk(chunks: &ChunkData, id: u8) -> Result<Option<u32>, MetadataError> {
    require_chunk(chunks, id)?
        .map(|chunk| match chunk {
            [a, b, c, d] => Ok(u32::from_be_bytes([*a, *b, *c, *d])),
            _ => Err(MetadataError::InvalidChunkSize(id)),
        })
        .transpose()
}

fn read_string_chunk(chunks: &ChunkData, id: u8) -> Result<Option<String>, MetadataError> {
    require_chunk(chunks, id)?
        .map(|chunk| decode_utf16be(chunk).ok_or(MetadataError::InvalidChunkSize(id)))
        .transpose()
}

/// Builds a metadata buffer with every chunk the parser reads, for use
/// in tests across the crate
#[cfg(test)]
pub(crate) fn sample_metadata() -> Vec<u8> {
    fn utf16be(value: &str) -> Vec<u8> {
        value
            .encode_utf16()
            .chain(std::iter::once(0))
            .flat_map(|unit| unit.to_be_bytes())
            .collect()
    }

    let mut chunks = ChunkData::default();
    chunks.insert(0, vec![2]);
    chunks.insert(1, 40u32.to_be_bytes().to_vec());
    chunks.insert(2, utf16be("Friday Cup"));
    chunks.insert(3, vec![5]);
    chunks.insert(4, utf16be("150cc, no items"));
    chunks.insert(5, 1u32.to_be_bytes().to_vec());
    chunks.insert(6, 4u32.to_be_bytes().to_vec());
    chunks.insert(7, utf16be("Red"));
    chunks.insert(8, utf16be("Blue"));
    chunks.insert(9, 300u32.to_be_bytes().to_vec());
    chunks.insert(11, 20240517u32.to_be_bytes().to_vec());
    chunks.to_bytes()
}

#[cfg(test)]
mod test {
    use super::{sample_metadata, ChunkData, MetadataError, TournamentMetadata};

    #[test]
    fn test_parse_fields() {
        let meta = TournamentMetadata::parse(&sample_metadata()).unwrap();
        assert_eq!(meta.revision, 2);
        assert_eq!(meta.version, 40);
        assert_eq!(meta.name, "Friday Cup");
        assert_eq!(meta.icon_type, 5);
        assert_eq!(meta.description, "150cc, no items");
        assert_eq!(meta.repeat_type, 1);
        assert_eq!(meta.gameset_num, 4);
        assert_eq!(meta.red_team, "Red");
        assert_eq!(meta.blue_team, "Blue");
        assert_eq!(meta.battle_time, 300);
        assert_eq!(meta.update_date, 20240517);
    }

    #[test]
    fn test_chunk_round_trip() {
        let bytes = sample_metadata();
        let chunks = ChunkData::parse(&bytes).unwrap();
        assert_eq!(chunks.to_bytes(), bytes);
    }

    #[test]
    fn test_wrong_magic() {
        let mut bytes = sample_metadata();
        bytes[1] = 0x00;
        assert!(matches!(
            ChunkData::parse(&bytes),
            Err(MetadataError::WrongMagic)
        ));
    }

    #[test]
    fn test_unknown_chunk_id() {
        // magic, then a chunk with id 13 which is out of range
        let bytes = [0x5A, 0x5A, 13, 0x00, 0x01, 0xAB, 0xFF];
        assert!(matches!(
            ChunkData::parse(&bytes),
            Err(MetadataError::InvalidChunkId(13))
        ));
    }

    #[test]
    fn test_truncated_chunk() {
        // size claims 4 bytes but only 1 follows
        let bytes = [0x5A, 0x5A, 0, 0x00, 0x04, 0xAB];
        assert!(matches!(
            ChunkData::parse(&bytes),
            Err(MetadataError::Truncated)
        ));

        // missing terminator
        let bytes = [0x5A, 0x5A, 0, 0x00, 0x01, 0xAB];
        assert!(matches!(
            ChunkData::parse(&bytes),
            Err(MetadataError::Truncated)
        ));
    }

    #[test]
    fn test_repeated_chunk_later_wins() {
        let mut bytes = vec![0x5A, 0x5A];
        bytes.extend_from_slice(&[0, 0x00, 0x01, 1]);
        bytes.extend_from_slice(&[0, 0x00, 0x01, 9]);
        bytes.push(0xFF);

        let chunks = ChunkData::parse(&bytes).unwrap();
        assert_eq!(chunks.get(0), Some(&[9u8][..]));
    }

    #[test]
    fn test_missing_required_chunk() {
        let mut chunks = ChunkData::default();
        chunks.insert(0, vec![1]);
        assert!(matches!(
            TournamentMetadata::parse(&chunks.to_bytes()),
            Err(MetadataError::MissingChunk(1))
        ));
    }

    #[test]
    fn test_empty_chunk_keeps_default() {
        let bytes = sample_metadata();
        let mut chunks = ChunkData::parse(&bytes).unwrap();
        chunks.insert(9, Vec::new());
        let meta = TournamentMetadata::parse(&chunks.to_bytes()).unwrap();
        assert_eq!(meta.battle_time, 0);
    }
}
