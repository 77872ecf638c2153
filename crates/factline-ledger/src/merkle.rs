//! Merkle accumulation over hex digests

use sha2::{Digest, Sha256};

/// SHA-256 of a byte string, as lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Binary Merkle root over a list of hex leaf hashes.
///
/// Pairs combine as `sha256(left || right)` over the hex strings. A level
/// with an odd count pairs its last element with itself. The empty list
/// yields the hash of the empty byte string, a defined value rather than an
/// error.
pub fn merkle_root(hashes: &[String]) -> String {
    if hashes.is_empty() {
        return sha256_hex(b"");
    }
    let mut level = hashes.to_vec();
    while level.len() > 1 {
        let mut next_level = Vec::with_capacity(level.len().div_ceil(2));
        for pair in level.chunks(2) {
            let left = &pair[0];
            let right = pair.get(1).unwrap_or(left);
            next_level.push(sha256_hex(format!("{left}{right}").as_bytes()));
        }
        level = next_level;
    }
    level.remove(0)
}
