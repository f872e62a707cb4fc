//! Error types for the ledger core.
//!
//! Every fallible operation returns a [`CoreError`]. The enum is exhaustive
//! over the failure modes of the account registry, the attestation layer,
//! the balance ledger, and the settlement protocol. Every variant is fatal
//! to the enclosing operation: the core never partially applies a mutation
//! and never retries on its own.

use thiserror::Error;

use crate::ledger::asset::AssetId;

/// Errors that can occur during ledger core operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// The identity is already bound to an account. Registration is
    /// append-only and one-to-one, so a second registration is always a bug
    /// or an attack.
    #[error("identity {identity} is already bound to an account")]
    AddressAlreadyExists {
        /// Hex-encoded identity public key.
        identity: String,
    },

    /// The caller's identity does not match the account's linked signer.
    /// Intentionally carries no detail about *which* identity is linked.
    #[error("caller is not the linked signer for this account")]
    NotOwner,

    /// The attestation signature failed verification against the registered
    /// key, intent, timestamp, and payload. We don't say which part was
    /// wrong; giving attackers a detailed error oracle is a bad idea.
    #[error("attestation signature verification failed")]
    InvalidSignature,

    /// The attested timestamp is not strictly greater than the account's
    /// last accepted timestamp. One timestamp is consumed at a time, so an
    /// out-of-order pair of otherwise valid attestations rejects the older.
    #[error("replay attempt: timestamp {got} is not greater than last accepted {last}")]
    ReplayAttempt {
        /// The timestamp that was submitted.
        got: u64,
        /// The account's last accepted timestamp.
        last: u64,
    },

    /// Attempted to debit more than the available balance for an asset.
    /// A missing balance entry counts as an available balance of zero.
    #[error("insufficient balance: available {available}, requested {requested} (asset {asset})")]
    InsufficientBalance {
        /// The asset that was being debited.
        asset: AssetId,
        /// The current balance.
        available: u64,
        /// The amount that was requested.
        requested: u64,
    },

    /// A mutating operation was attempted while the account's lock has not
    /// yet elapsed. This is the only signal a duress verdict ever produces
    /// on the settlement path, and it is indistinguishable in cause from
    /// any other lock.
    #[error("wallet is locked until {lock_until_ms} (now {now_ms})")]
    WalletLocked {
        /// Absolute unlock time in milliseconds.
        lock_until_ms: u64,
        /// The clock reading that hit the lock.
        now_ms: u64,
    },

    /// A direct-path operation was attempted before any signer was linked.
    #[error("no signer has been linked to this account")]
    WalletNotLinked,

    /// Registry lookup for an identity or account that does not exist.
    #[error("no account found for {address}")]
    AddressNotFound {
        /// Hex-encoded identity or account id that failed to resolve.
        address: String,
    },

    /// The asset type covered by the attestation payload does not match the
    /// asset of the actual balance operation. A signature over one coin type
    /// must never move another.
    #[error("asset type mismatch: attestation covers {signed}, operation moves {requested}")]
    AssetTypeMismatch {
        /// The asset named in the signed payload.
        signed: AssetId,
        /// The asset the caller tried to move.
        requested: AssetId,
    },

    /// Arithmetic overflow during a credit operation. If you're hitting
    /// this, someone is trying to credit more than 18.4 quintillion units.
    #[error("balance overflow: current {current}, credit {credit} (asset {asset})")]
    BalanceOverflow {
        /// The asset that was being credited.
        asset: AssetId,
        /// The balance before the failed credit.
        current: u64,
        /// The amount that caused the overflow.
        credit: u64,
    },

    /// The requested amount is zero, which is a no-op and likely indicates
    /// a bug in the caller. A zero-value attested operation would also burn
    /// a replay slot for nothing.
    #[error("zero-amount operations are not permitted")]
    ZeroAmount,

    /// The account handle exceeds [`crate::config::MAX_HANDLE_LENGTH`].
    /// Handles are display labels; unbounded labels are a storage footgun.
    #[error("handle is {length} bytes, limit is {max}")]
    HandleTooLong {
        /// Byte length of the submitted handle.
        length: usize,
        /// The configured limit.
        max: usize,
    },

    /// The attestation transcript exceeds
    /// [`crate::config::MAX_TRANSCRIPT_LENGTH`].
    #[error("transcript is {length} bytes, limit is {max}")]
    TranscriptTooLong {
        /// Byte length of the submitted transcript.
        length: usize,
        /// The configured limit.
        max: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = CoreError::ReplayAttempt { got: 5, last: 9 };
        let msg = err.to_string();
        assert!(msg.contains('5'));
        assert!(msg.contains('9'));
    }

    #[test]
    fn invalid_signature_message_is_vague() {
        // The verification failure message must not name the key, the
        // intent, or the timestamp.
        let msg = CoreError::InvalidSignature.to_string();
        assert_eq!(msg, "attestation signature verification failed");
    }

    #[test]
    fn not_owner_does_not_leak_linked_identity() {
        let msg = CoreError::NotOwner.to_string();
        assert!(!msg.contains("0x"));
        assert!(!msg.contains("identity"));
    }
}
