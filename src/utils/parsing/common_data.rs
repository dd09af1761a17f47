//! Decoder for the fixed 212-byte player blob uploaded alongside
//! ranking scores. The blob carries the player's rates and the unlock
//! bitfield that the game mirrors into its save data.

use super::decode_utf16be;
use thiserror::Error;

/// Exact size the blob must have
pub const COMMON_DATA_SIZE: usize = 0xD4;

/// Offset of the vr/br rate pair
const RATES_OFFSET: usize = 0x0C;
/// Region holding account-related data, beginning with the mii name
const ACCOUNT_OFFSET: usize = 0x14;
/// Length of the UTF-16BE mii name at the front of the account region
const MII_NAME_LEN: usize = 0x16;
/// Offset of the unlock bitfield
const FLAGS_OFFSET: usize = 0x84;
/// Length of the unlock bitfield
const FLAGS_LEN: usize = 0x3F;

#[derive(Debug, Error)]
#[error("common data must be exactly {COMMON_DATA_SIZE} bytes")]
pub struct InvalidDataSize;

/// Parsed form of the player blob
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CommonData {
    pub vr_rate: f32,
    pub br_rate: f32,
    pub mii_name: Option<String>,
    pub gp_unlocks: Vec<u8>,
    pub engine_unlocks: Vec<u8>,
    pub driver_unlocks: Vec<u8>,
    pub body_unlocks: Vec<u8>,
    pub tire_unlocks: Vec<u8>,
    pub wing_unlocks: Vec<u8>,
    pub stamp_unlocks: Vec<u8>,
    pub dlc_unlocks: Vec<u8>,
}

impl CommonData {
    pub fn parse(data: &[u8]) -> Result<Self, InvalidDataSize> {
        if data.len() != COMMON_DATA_SIZE {
            return Err(InvalidDataSize);
        }

        let vr_rate = read_f32(data, RATES_OFFSET);
        let br_rate = read_f32(data, RATES_OFFSET + 4);

        let mii_name = decode_utf16be(&data[ACCOUNT_OFFSET..ACCOUNT_OFFSET + MII_NAME_LEN])
            .map(|name| name.trim_end_matches('\0').to_string())
            .filter(|name| !name.is_empty());

        // Unlock bits are packed LSB-first within each byte
        let flags = &data[FLAGS_OFFSET..FLAGS_OFFSET + FLAGS_LEN];
        let bit = |index: usize| -> u8 { (flags[index / 8] >> (index % 8)) & 1 };
        let unlocks = |byte_offset: usize, count: usize| -> Vec<u8> {
            (0..count).map(|i| bit(byte_offset * 8 + i)).collect()
        };

        Ok(Self {
            vr_rate,
            br_rate,
            mii_name,
            gp_unlocks: unlocks(0, 20),
            engine_unlocks: unlocks(4, 5),
            driver_unlocks: unlocks(5, 37),
            body_unlocks: unlocks(13, 39),
            tire_unlocks: unlocks(21, 21),
            wing_unlocks: unlocks(29, 14),
            stamp_unlocks: unlocks(45, 100),
            dlc_unlocks: unlocks(61, 5),
        })
    }
}

fn read_f32(data: &[u8], offset: usize) -> f32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&data[offset..offset + 4]);
    f32::from_be_bytes(bytes)
}

#[cfg(test)]
mod test {
    use super::{CommonData, COMMON_DATA_SIZE, FLAGS_OFFSET, RATES_OFFSET};

    /// Blank blob with the provided rates
    fn sample_blob(vr_rate: f32, br_rate: f32) -> Vec<u8> {
        let mut data = vec![0u8; COMMON_DATA_SIZE];
        data[RATES_OFFSET..RATES_OFFSET + 4].copy_from_slice(&vr_rate.to_be_bytes());
        data[RATES_OFFSET + 4..RATES_OFFSET + 8].copy_from_slice(&br_rate.to_be_bytes());
        data
    }

    #[test]
    fn test_rates_and_first_unlock_bit() {
        let mut data = sample_blob(1.5, 2.25);
        data[FLAGS_OFFSET] = 0b0000_0001;

        let parsed = CommonData::parse(&data).unwrap();
        assert_eq!(parsed.vr_rate, 1.5);
        assert_eq!(parsed.br_rate, 2.25);
        assert_eq!(parsed.gp_unlocks[0], 1);

        // Every other unlock bit must be zero
        assert!(parsed.gp_unlocks[1..].iter().all(|bit| *bit == 0));
        for vector in [
            &parsed.engine_unlocks,
            &parsed.driver_unlocks,
            &parsed.body_unlocks,
            &parsed.tire_unlocks,
            &parsed.wing_unlocks,
            &parsed.stamp_unlocks,
            &parsed.dlc_unlocks,
        ] {
            assert!(vector.iter().all(|bit| *bit == 0));
        }
    }

    #[test]
    fn test_vector_widths() {
        let parsed = CommonData::parse(&sample_blob(0.0, 0.0)).unwrap();
        assert_eq!(parsed.gp_unlocks.len(), 20);
        assert_eq!(parsed.engine_unlocks.len(), 5);
        assert_eq!(parsed.driver_unlocks.len(), 37);
        assert_eq!(parsed.body_unlocks.len(), 39);
        assert_eq!(parsed.tire_unlocks.len(), 21);
        assert_eq!(parsed.wing_unlocks.len(), 14);
        assert_eq!(parsed.stamp_unlocks.len(), 100);
        assert_eq!(parsed.dlc_unlocks.len(), 5);
    }

    #[test]
    fn test_bit_order_is_lsb_first() {
        let mut data = sample_blob(0.0, 0.0);
        // Bit 1 of the driver byte (offset 5) is driver_unlocks[1]
        data[FLAGS_OFFSET + 5] = 0b0000_0010;

        let parsed = CommonData::parse(&data).unwrap();
        assert_eq!(parsed.driver_unlocks[0], 0);
        assert_eq!(parsed.driver_unlocks[1], 1);
    }

    #[test]
    fn test_mii_name_decoding() {
        let mut data = sample_blob(0.0, 0.0);
        for (i, unit) in "Luigi".encode_utf16().enumerate() {
            let offset = super::ACCOUNT_OFFSET + i * 2;
            data[offset..offset + 2].copy_from_slice(&unit.to_be_bytes());
        }

        let parsed = CommonData::parse(&data).unwrap();
        assert_eq!(parsed.mii_name.as_deref(), Some("Luigi"));
    }

    #[test]
    fn test_wrong_sizes_rejected() {
        assert!(CommonData::parse(&vec![0u8; COMMON_DATA_SIZE - 1]).is_err());
        assert!(CommonData::parse(&vec![0u8; COMMON_DATA_SIZE + 1]).is_err());
    }
}
