//! # Attestation Layer
//!
//! The core never generates attestations; it only verifies them. A trusted
//! off-box service listens to a spoken confirmation, classifies it, and
//! returns a signed `(intent, timestamp, payload)` tuple. This module
//! defines the intent discriminants, the payload variants the signature
//! covers, the canonical byte encoding both sides must agree on, and the
//! verifier that checks the tuple against the registered service key.
//!
//! ```text
//! intent.rs    — Intent discriminants and verdict codes
//! payload.rs   — AttestationPayload variants + canonical signing message
//! verifier.rs  — AttestationVerifier: the registered verification key
//! ```
//!
//! Replay protection lives with [`crate::account`]; the monotonic counter
//! is per-account state, not verifier state.

pub mod intent;
pub mod payload;
pub mod verifier;

pub use intent::{Intent, Verdict};
pub use payload::AttestationPayload;
pub use verifier::{Attestation, AttestationVerifier};
