//! Signature verification against the registered attestation key.
//!
//! The verifier is configured once at bootstrap with the attestation
//! service's public key and is read-only thereafter. Key distribution and
//! rotation are the surrounding system's problem; the core just checks
//! signatures.

use serde::{Deserialize, Serialize};

use super::payload::AttestationPayload;
use crate::crypto::keys::{VoxPublicKey, VoxSignature};
use crate::error::CoreError;

/// The signed artifacts a client relays from the attestation service
/// alongside an operation: the timestamp the service signed over and the
/// signature itself. The payload is never relayed; the core reconstructs it
/// from the operation's own arguments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    /// The timestamp (epoch milliseconds) bound into the signature. Also
    /// the value consumed by the per-account replay counter.
    pub timestamp_ms: u64,
    /// Ed25519 signature over the canonical signing message.
    pub signature: VoxSignature,
}

/// Verifies `(intent, timestamp, payload)` tuples against the registered
/// attestation service key.
#[derive(Clone, Debug)]
pub struct AttestationVerifier {
    key: VoxPublicKey,
}

impl AttestationVerifier {
    /// Creates a verifier for the given service key.
    pub fn new(key: VoxPublicKey) -> Self {
        Self { key }
    }

    /// The registered verification key.
    pub fn key(&self) -> &VoxPublicKey {
        &self.key
    }

    /// Verifies a signature over the canonical signing message for
    /// `payload` at `timestamp_ms`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidSignature`] on any failure. The error
    /// carries no detail about which part of the tuple was wrong.
    pub fn verify(
        &self,
        payload: &AttestationPayload,
        timestamp_ms: u64,
        signature: &VoxSignature,
    ) -> Result<(), CoreError> {
        let message = payload.signing_message(timestamp_ms);
        if self.key.verify(&message, signature) {
            Ok(())
        } else {
            Err(CoreError::InvalidSignature)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attestation::intent::Verdict;
    use crate::crypto::keys::VoxKeypair;
    use crate::ledger::asset::native_asset;

    fn sign(kp: &VoxKeypair, payload: &AttestationPayload, ts: u64) -> VoxSignature {
        kp.sign(&payload.signing_message(ts))
    }

    fn withdraw_payload() -> AttestationPayload {
        AttestationPayload::Withdraw {
            handle: "alice".to_string(),
            amount: 500,
            asset: native_asset(),
        }
    }

    #[test]
    fn valid_signature_verifies() {
        let kp = VoxKeypair::generate();
        let verifier = AttestationVerifier::new(kp.public_key());
        let payload = withdraw_payload();
        let sig = sign(&kp, &payload, 1_000);
        assert!(verifier.verify(&payload, 1_000, &sig).is_ok());
    }

    #[test]
    fn wrong_key_rejected() {
        let service = VoxKeypair::generate();
        let imposter = VoxKeypair::generate();
        let verifier = AttestationVerifier::new(service.public_key());
        let payload = withdraw_payload();
        let sig = sign(&imposter, &payload, 1_000);
        assert!(matches!(
            verifier.verify(&payload, 1_000, &sig),
            Err(CoreError::InvalidSignature)
        ));
    }

    #[test]
    fn tampered_timestamp_rejected() {
        let kp = VoxKeypair::generate();
        let verifier = AttestationVerifier::new(kp.public_key());
        let payload = withdraw_payload();
        let sig = sign(&kp, &payload, 1_000);
        assert!(verifier.verify(&payload, 1_001, &sig).is_err());
    }

    #[test]
    fn tampered_payload_rejected() {
        let kp = VoxKeypair::generate();
        let verifier = AttestationVerifier::new(kp.public_key());
        let sig = sign(&kp, &withdraw_payload(), 1_000);

        let inflated = AttestationPayload::Withdraw {
            handle: "alice".to_string(),
            amount: 5_000,
            asset: native_asset(),
        };
        assert!(verifier.verify(&inflated, 1_000, &sig).is_err());
    }

    #[test]
    fn signature_cannot_cross_intents() {
        // A signed attest-result must not verify as a withdrawal even when
        // the overlapping fields line up.
        let kp = VoxKeypair::generate();
        let verifier = AttestationVerifier::new(kp.public_key());

        let attest = AttestationPayload::AttestResult {
            handle: "alice".to_string(),
            amount: 500,
            verdict: Verdict::Ok,
            transcript: String::new(),
        };
        let sig = sign(&kp, &attest, 1_000);
        assert!(verifier.verify(&withdraw_payload(), 1_000, &sig).is_err());
    }
}
