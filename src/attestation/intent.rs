//! Intent discriminants and attestation verdicts.
//!
//! Every signed payload is bound to exactly one intent. The single-byte
//! codes are part of the signing preimage and must never change once
//! signatures exist against them; a signature over a transfer must never
//! verify as a withdrawal.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The class of operation a signed payload authorizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    /// Provision a new account for a handle.
    CreateAccount,
    /// Bind an external identity as an account's direct signer.
    LinkSigner,
    /// Move funds between two accounts.
    Transfer,
    /// Apply a voice-verification verdict to an account.
    AttestResult,
    /// Move funds out of the ledger entirely.
    Withdraw,
}

impl Intent {
    /// Single-byte wire code. These values are covered by every signature
    /// the attestation service has ever issued; append new codes, never
    /// renumber.
    pub fn code(&self) -> u8 {
        match self {
            Intent::CreateAccount => 0,
            Intent::LinkSigner => 1,
            Intent::Transfer => 2,
            Intent::AttestResult => 3,
            Intent::Withdraw => 4,
        }
    }

    /// Parses a wire code. Returns `None` for unknown codes; we don't guess.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Intent::CreateAccount),
            1 => Some(Intent::LinkSigner),
            2 => Some(Intent::Transfer),
            3 => Some(Intent::AttestResult),
            4 => Some(Intent::Withdraw),
            _ => None,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Intent::CreateAccount => "create_account",
            Intent::LinkSigner => "link_signer",
            Intent::Transfer => "transfer",
            Intent::AttestResult => "attest_result",
            Intent::Withdraw => "withdraw",
        };
        write!(f, "{}", name)
    }
}

/// The verdict an attest-result payload carries.
///
/// The core treats all three uniformly on the apply step; only the duress
/// variant has the additional lock side effect. A client watching its own
/// direct responses cannot tell which one arrived.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Voice verified, spoken amount matches, no stress detected.
    Ok,
    /// The spoken amount does not match the requested amount.
    AmountMismatch,
    /// Stress or coercion detected. Locks the account.
    Duress,
}

impl Verdict {
    /// Single-byte wire code, part of the signing preimage.
    pub fn code(&self) -> u8 {
        match self {
            Verdict::Ok => 0,
            Verdict::AmountMismatch => 1,
            Verdict::Duress => 2,
        }
    }

    /// Parses a wire code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Verdict::Ok),
            1 => Some(Verdict::AmountMismatch),
            2 => Some(Verdict::Duress),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Ok => "ok",
            Verdict::AmountMismatch => "amount_mismatch",
            Verdict::Duress => "duress",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
