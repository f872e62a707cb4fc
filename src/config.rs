//! # Protocol Constants
//!
//! Every magic number in the ledger core lives here. If you're hardcoding a
//! constant somewhere else, you're doing it wrong and you owe the team coffee.
//!
//! Several of these values are covered by attestation signatures that were
//! issued against the current wire format. Changing them invalidates every
//! signature in flight, so treat this file as consensus-critical.

// ---------------------------------------------------------------------------
// Duress Lock
// ---------------------------------------------------------------------------

/// How long a duress verdict locks an account, in milliseconds.
///
/// 24 hours. The duration is a flat constant on purpose: it is not derived
/// from verdict severity, stress level, or anything else an attacker could
/// probe. One verdict, one fixed lock window.
pub const DURESS_LOCK_DURATION_MS: u64 = 86_400_000;

/// Sentinel meaning "never locked". An account whose `lock_until_ms` is zero
/// has either never seen a duress verdict or its lock has fully elapsed.
pub const NEVER_LOCKED: u64 = 0;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Ed25519 secret key length in bytes.
pub const SIGNING_KEY_LENGTH: usize = 32;

/// Ed25519 public (verifying) key length in bytes. Also the length of an
/// external identity, since identities *are* public keys.
pub const VERIFYING_KEY_LENGTH: usize = 32;

/// Ed25519 signature length. Always 64 bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// BLAKE3 digest length. Asset type tags are 32-byte BLAKE3 digests of
/// their canonical descriptors.
pub const HASH_OUTPUT_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Operational Limits
// ---------------------------------------------------------------------------

/// Maximum account handle length in bytes. Handles are display labels, not
/// security identifiers, but unbounded labels are a storage footgun.
pub const MAX_HANDLE_LENGTH: usize = 64;

/// Maximum attestation transcript length in bytes. The transcript is what
/// the classifier heard; it rides along in the attest-result payload for
/// downstream indexing and should stay short.
pub const MAX_TRANSCRIPT_LENGTH: usize = 1_024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duress_lock_is_twenty_four_hours() {
        assert_eq!(DURESS_LOCK_DURATION_MS, 24 * 60 * 60 * 1_000);
    }

    #[test]
    fn never_locked_is_zero() {
        // The lock state machine treats 0 as "in the past" for every clock
        // reading, so this sentinel must stay zero.
        assert_eq!(NEVER_LOCKED, 0);
    }

    #[test]
    fn crypto_parameters_match_the_implementations() {
        assert_eq!(SIGNING_KEY_LENGTH, ed25519_dalek::SECRET_KEY_LENGTH);
        assert_eq!(VERIFYING_KEY_LENGTH, ed25519_dalek::PUBLIC_KEY_LENGTH);
        assert_eq!(SIGNATURE_LENGTH, ed25519_dalek::SIGNATURE_LENGTH);
        assert_eq!(HASH_OUTPUT_LENGTH, blake3::OUT_LEN);
    }

    #[test]
    fn limits_are_sane() {
        assert!(MAX_HANDLE_LENGTH > 0);
        assert!(MAX_TRANSCRIPT_LENGTH >= MAX_HANDLE_LENGTH);
    }
}
