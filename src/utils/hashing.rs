//! Hashing utilities for maps keyed by integer IDs that are already
//! uniformly distributed (player IDs, gathering IDs)

use std::collections::HashMap;
use std::hash::{BuildHasherDefault, Hasher};

/// Hash map type using the integer identity hasher
pub type IntHashMap<K, V> = HashMap<K, V, BuildHasherDefault<IntHasher>>;

/// Hasher that passes integer keys through unchanged rather than
/// running them through a full hash function
#[derive(Default)]
pub struct IntHasher(u64);

impl Hasher for IntHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, _bytes: &[u8]) {
        unimplemented!("IntHasher only supports integer keys")
    }

    #[inline]
    fn write_u32(&mut self, value: u32) {
        self.0 = value as u64;
    }

    #[inline]
    fn write_u64(&mut self, value: u64) {
        self.0 = value;
    }
}
