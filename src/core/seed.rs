/// Deterministic seeds derived from string keys.
///
/// The same key always yields the same seed, across runs and processes, so
/// a semantic root such as a character's name always coins the same word.

use serde::{Deserialize, Serialize};

/// Sum of the key's bytes. Anagrams collide, as do many short keys.
pub fn naive_seed(key: &str) -> u64 {
    key.bytes().map(u64::from).sum()
}

/// First eight bytes of the key's BLAKE3 digest, little endian.
pub fn hash_seed(key: &str) -> u64 {
    let digest = blake3::hash(key.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_le_bytes(head)
}

/// Which key-to-seed derivation a word maker uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeedAlgorithm {
    Naive,
    #[default]
    Hash,
}

impl SeedAlgorithm {
    pub fn seed(self, key: &str) -> u64 {
        match self {
            SeedAlgorithm::Naive => naive_seed(key),
            SeedAlgorithm::Hash => hash_seed(key),
        }
    }

    /// Accepts the short and long names used on the command line.
    pub fn from_name(name: &str) -> Option<SeedAlgorithm> {
        match name {
            "n" | "naive" => Some(SeedAlgorithm::Naive),
            "h" | "hash" => Some(SeedAlgorithm::Hash),
            _ => None,
        }
    }
}
