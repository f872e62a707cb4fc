//! # Cryptographic Primitives
//!
//! Ed25519 keys and signatures plus BLAKE3 hashing. This is the entire
//! cryptographic surface of the core: identities are public keys, the
//! attestation service signs with Ed25519, and asset type tags are BLAKE3
//! digests. Nothing here is novel, which is exactly how crypto code
//! should feel.

pub mod hash;
pub mod keys;

pub use hash::blake3_hash;
pub use keys::{KeyError, VoxKeypair, VoxPublicKey, VoxSignature};
