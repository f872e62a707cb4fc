//! # Key Management
//!
//! Ed25519 keypairs for external identities and the attestation service.
//!
//! An external identity in the ledger *is* a public key: the registry binds
//! public keys to accounts, the direct settlement path compares the caller's
//! key against the account's linked signer, and the attestation verifier
//! holds the service's public key. This module wraps `ed25519-dalek` so the
//! rest of the codebase has one consistent set of types and never touches
//! raw curve points.
//!
//! ## Security considerations
//!
//! - Private keys are zeroized on drop (thanks, ed25519-dalek).
//! - Key generation uses the OS CSPRNG (`OsRng`).
//! - Key bytes are never logged. If you add logging to this module,
//!   you will be asked to leave.

use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

use crate::config::{SIGNATURE_LENGTH, SIGNING_KEY_LENGTH, VERIFYING_KEY_LENGTH};

/// Errors that can occur during key operations.
///
/// Intentionally vague about *why* something failed; leaking details about
/// key material through error messages is a classic footgun.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes: wrong length or not a valid scalar")]
    InvalidSecretKey,

    #[error("invalid public key bytes: not a valid Ed25519 point")]
    InvalidPublicKey,
}

/// An Ed25519 keypair.
///
/// In production the core never holds one of these: the attestation service
/// signs remotely, and clients sign on their own devices. The type exists so
/// that tests and tooling can mint identities and produce attestations
/// without reaching for `ed25519-dalek` directly.
///
/// Intentionally does NOT implement `Serialize`/`Deserialize`. Serializing
/// private keys should be a deliberate act, not something that happens
/// because someone shoved a keypair into a JSON response.
pub struct VoxKeypair {
    signing_key: SigningKey,
}

/// The public half of an identity, safe to share with the world.
///
/// This is what the registry stores, what `linked_signer` holds, and what
/// the attestation verifier is configured with.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoxPublicKey {
    bytes: [u8; 32],
}

/// An Ed25519 signature over a message. Always 64 bytes when valid.
///
/// Stored as `Vec<u8>` for serde compatibility. A signature of any other
/// length simply fails verification; no panics, no undefined behavior.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoxSignature {
    bytes: Vec<u8>,
}

impl VoxKeypair {
    /// Generate a fresh keypair using the OS cryptographic RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Construct a keypair deterministically from a 32-byte seed.
    ///
    /// In Ed25519 the 32-byte secret key *is* the seed. A weak seed makes
    /// a weak key; use a proper CSPRNG or KDF to produce the bytes.
    pub fn from_seed(seed: &[u8; SIGNING_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Returns the public key associated with this keypair.
    pub fn public_key(&self) -> VoxPublicKey {
        VoxPublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    /// Raw public key bytes (32 bytes). Safe to share, log, tattoo on
    /// your arm, etc.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Sign a message.
    ///
    /// Ed25519 signatures are deterministic: the same (key, message) pair
    /// always produces the same signature. No nonce management, no k-value
    /// disasters.
    pub fn sign(&self, message: &[u8]) -> VoxSignature {
        VoxSignature {
            bytes: self.signing_key.sign(message).to_bytes().to_vec(),
        }
    }

    /// Verify a signature against this keypair's public key.
    pub fn verify(&self, message: &[u8], signature: &VoxSignature) -> bool {
        self.public_key().verify(message, signature)
    }
}

impl fmt::Debug for VoxKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret key material in debug output. Not even partially.
        write!(f, "VoxKeypair(pub={})", self.public_key().to_hex())
    }
}

// ---------------------------------------------------------------------------
// VoxPublicKey
// ---------------------------------------------------------------------------

impl VoxPublicKey {
    /// Create a public key from raw bytes without curve validation.
    ///
    /// Use [`try_from_slice`](Self::try_from_slice) when the bytes come from
    /// an untrusted source.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Create a public key from an untrusted byte slice.
    ///
    /// Validates the length and that the bytes are a valid Ed25519 point.
    /// This catches low-order points and other degenerate cases.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        if slice.len() != VERIFYING_KEY_LENGTH {
            return Err(KeyError::InvalidPublicKey);
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(slice);
        VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self { bytes })
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Verify a signature against this public key.
    ///
    /// Boolean rather than `Result` because the vast majority of callers
    /// just want a yes/no answer and must not leak the failure mode anyway.
    pub fn verify(&self, message: &[u8], signature: &VoxSignature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let sig_bytes: [u8; SIGNATURE_LENGTH] = match signature.bytes.as_slice().try_into() {
            Ok(b) => b,
            Err(_) => return false,
        };
        verifying_key
            .verify(message, &DalekSignature::from_bytes(&sig_bytes))
            .is_ok()
    }

    /// Hex-encoded representation. 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Parse a hex-encoded public key.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != VERIFYING_KEY_LENGTH {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self { bytes: arr })
    }

    /// Base58-encoded representation. More compact than hex; what users
    /// see as their address.
    pub fn to_base58(&self) -> String {
        bs58::encode(self.bytes).into_string()
    }
}

impl Hash for VoxPublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl fmt::Display for VoxPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for VoxPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VoxPublicKey({})", &self.to_hex()[..16])
    }
}

// ---------------------------------------------------------------------------
// VoxSignature
// ---------------------------------------------------------------------------

impl VoxSignature {
    /// Create a signature from its raw 64-byte representation.
    pub fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    /// Raw signature bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Hex-encoded signature. 128 characters for a valid one.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Parse a hex-encoded signature.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        Ok(Self { bytes })
    }
}

impl fmt::Display for VoxSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for VoxSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = self.to_hex();
        if hex_str.len() >= 128 {
            write!(f, "VoxSignature({}...{})", &hex_str[..8], &hex_str[120..])
        } else {
            write!(f, "VoxSignature({})", hex_str)
        }
    }
}
