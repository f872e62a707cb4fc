//! Attestation payloads and the canonical signing message.
//!
//! A payload variant exists per intent and carries exactly the fields the
//! signature covers. The core never verifies caller-supplied payload bytes:
//! every operation rebuilds the payload from its own validated arguments and
//! recomputes the canonical encoding, so a signature can only authorize the
//! operation it was actually issued for.
//!
//! ## Canonical encoding
//!
//! Hand-rolled and deliberately boring:
//!
//! - integers are fixed-width little-endian,
//! - byte strings are length-prefixed with a `u32`,
//! - fields are concatenated in declaration order,
//! - the full signing message is `intent code || timestamp_ms || body`.
//!
//! Length prefixes make the encoding injective (no `("ab","c")` vs
//! `("a","bc")` ambiguity), and fixed-width integers make it deterministic
//! across platforms. The same logical request always signs identically.

use serde::{Deserialize, Serialize};

use super::intent::{Intent, Verdict};
use crate::ledger::asset::AssetId;

/// The fields covered by an attestation signature, keyed by intent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttestationPayload {
    /// Provision a new account for `handle`.
    CreateAccount { handle: String },

    /// Bind `address` as the direct signer of the account named `handle`.
    LinkSigner { handle: String, address: [u8; 32] },

    /// Move `amount` of `asset` from `from_handle` to `to_handle`.
    Transfer {
        from_handle: String,
        to_handle: String,
        amount: u64,
        asset: AssetId,
    },

    /// A voice-verification verdict for the account named `handle`.
    /// `transcript` is what the classifier heard, carried for downstream
    /// indexing only.
    AttestResult {
        handle: String,
        amount: u64,
        verdict: Verdict,
        transcript: String,
    },

    /// Move `amount` of `asset` out of the account named `handle`.
    Withdraw {
        handle: String,
        amount: u64,
        asset: AssetId,
    },
}

impl AttestationPayload {
    /// The intent this payload is bound to.
    pub fn intent(&self) -> Intent {
        match self {
            AttestationPayload::CreateAccount { .. } => Intent::CreateAccount,
            AttestationPayload::LinkSigner { .. } => Intent::LinkSigner,
            AttestationPayload::Transfer { .. } => Intent::Transfer,
            AttestationPayload::AttestResult { .. } => Intent::AttestResult,
            AttestationPayload::Withdraw { .. } => Intent::Withdraw,
        }
    }

    /// Canonical byte encoding of the payload body.
    fn canonical_body(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(64);
        match self {
            AttestationPayload::CreateAccount { handle } => {
                put_bytes(&mut out, handle.as_bytes());
            }
            AttestationPayload::LinkSigner { handle, address } => {
                put_bytes(&mut out, handle.as_bytes());
                put_bytes(&mut out, address);
            }
            AttestationPayload::Transfer {
                from_handle,
                to_handle,
                amount,
                asset,
            } => {
                put_bytes(&mut out, from_handle.as_bytes());
                put_bytes(&mut out, to_handle.as_bytes());
                put_u64(&mut out, *amount);
                put_bytes(&mut out, asset.as_bytes());
            }
            AttestationPayload::AttestResult {
                handle,
                amount,
                verdict,
                transcript,
            } => {
                put_bytes(&mut out, handle.as_bytes());
                put_u64(&mut out, *amount);
                out.push(verdict.code());
                put_bytes(&mut out, transcript.as_bytes());
            }
            AttestationPayload::Withdraw {
                handle,
                amount,
                asset,
            } => {
                put_bytes(&mut out, handle.as_bytes());
                put_u64(&mut out, *amount);
                put_bytes(&mut out, asset.as_bytes());
            }
        }
        out
    }

    /// The full message the attestation service signs:
    /// `intent code || timestamp_ms (LE) || canonical body`.
    ///
    /// Binding the intent and timestamp into the preimage is what stops a
    /// signature from being replayed under a different intent or time.
    pub fn signing_message(&self, timestamp_ms: u64) -> Vec<u8> {
        let body = self.canonical_body();
        let mut msg = Vec::with_capacity(9 + body.len());
        msg.push(self.intent().code());
        put_u64(&mut msg, timestamp_ms);
        msg.extend_from_slice(&body);
        msg
    }
}

fn put_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(bytes);
}

fn put_u64(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&value.to_le_bytes());
}
