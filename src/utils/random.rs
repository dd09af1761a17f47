use rand::{rngs::OsRng, RngCore};

/// Fills a fixed-length array with cryptographically random bytes.
/// Used for gathering session keys and login tickets.
pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut output = [0u8; N];
    OsRng.fill_bytes(&mut output);
    output
}
