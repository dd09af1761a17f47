//! Typed request and response models for the rendezvous protocols

use crate::utils::stream::{DecodeResult, FromStream, StreamReader, StreamWriter, ToStream};
use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};

pub mod auth;
pub mod datastore;
pub mod errors;
pub mod matchmaking;
pub mod ranking;
pub mod tournaments;

/// Offset/size pair bounding paginated results
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultRange {
    pub offset: u32,
    pub size: u32,
}

impl FromStream for ResultRange {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            offset: r.read_u32()?,
            size: r.read_u32()?,
        })
    }
}

impl ToStream for ResultRange {
    fn to_stream(&self, w: &mut StreamWriter) {
        w.write_u32(self.offset);
        w.write_u32(self.size);
    }
}

/// Packs a timestamp into the wire datetime layout:
/// `second | minute << 6 | hour << 12 | day << 17 | month << 22 | year << 26`
pub fn to_wire_datetime(value: DateTime<Utc>) -> u64 {
    (value.second() as u64)
        | (value.minute() as u64) << 6
        | (value.hour() as u64) << 12
        | (value.day() as u64) << 17
        | (value.month() as u64) << 22
        | (value.year() as u64) << 26
}

/// Unpacks a wire datetime, clamping invalid component values to the
/// epoch rather than failing
pub fn from_wire_datetime(value: u64) -> DateTime<Utc> {
    let second = (value & 0x3F) as u32;
    let minute = ((value >> 6) & 0x3F) as u32;
    let hour = ((value >> 12) & 0x1F) as u32;
    let day = ((value >> 17) & 0x1F) as u32;
    let month = ((value >> 22) & 0x0F) as u32;
    let year = (value >> 26) as i32;

    Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
        .unwrap_or_else(|| DateTime::<Utc>::UNIX_EPOCH)
}

#[cfg(test)]
mod test {
    use super::{from_wire_datetime, to_wire_datetime};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_wire_datetime_round_trip() {
        let value = Utc.with_ymd_and_hms(2024, 5, 17, 21, 30, 15).unwrap();
        assert_eq!(from_wire_datetime(to_wire_datetime(value)), value);
    }
}
