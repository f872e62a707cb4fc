//! Hashing utilities.
//!
//! BLAKE3 everywhere. It's fast on every platform that matters, it's a
//! proper cryptographic hash, and having exactly one hash function in the
//! codebase means nobody ever has to ask "which digest is this?".

use crate::config::HASH_OUTPUT_LENGTH;

/// Compute the BLAKE3 hash of the input data.
///
/// Returns a 32-byte digest as a fixed-size array. Used for deriving asset
/// type identifiers from their canonical descriptors.
pub fn blake3_hash(data: &[u8]) -> [u8; HASH_OUTPUT_LENGTH] {
    *blake3::hash(data).as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blake3_is_deterministic() {
        assert_eq!(blake3_hash(b"vox"), blake3_hash(b"vox"));
        assert_ne!(blake3_hash(b"vox"), blake3_hash(b"xov"));
    }

    #[test]
    fn blake3_output_is_32_bytes() {
        assert_eq!(blake3_hash(b"").len(), 32);
    }
}
