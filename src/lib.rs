// Copyright (c) 2026 Vox Ledger Team. MIT License.
// See LICENSE for details.

//! # Vox Ledger — Authorization Core
//!
//! The deterministic heart of a custodial value-transfer ledger whose
//! settlements are gated by remote voice attestations. A separate service
//! listens to a caller, decides whether they sound like themselves and
//! whether they sound *coerced*, and signs a verdict. This crate is the
//! part that takes those signatures and turns them into balance movements
//! without ever leaking the verdict to the person who might be standing
//! next to the victim.
//!
//! ## Architecture
//!
//! The crate is split into modules that mirror the actual concerns of a
//! custodial ledger:
//!
//! - **crypto** — Ed25519 key and signature wrappers plus blake3 hashing.
//! - **attestation** — Intents, verdicts, canonical signing payloads, and
//!   the verifier for the attestation service's signatures.
//! - **ledger** — Asset tags and the multi-asset balance sheet.
//! - **account** — The account entity: balances, linked signer, the
//!   extend-only duress lock, and the monotonic replay counter.
//! - **registry** — Append-only identity-to-account binding.
//! - **core** — The context object tying it all together; every operation
//!   of the external interface lives on [`core::VoxCore`].
//! - **events** — Domain events for the downstream indexer, the one channel
//!   a verdict is allowed to surface through.
//! - **clock** — Injectable time source, because lock expiry under test
//!   should not require a calendar.
//! - **config** — Protocol constants. One day of duress lock lives here.
//!
//! ## Design Philosophy
//!
//! 1. Every operation is atomic: validate everything, then mutate, or
//!    touch nothing at all.
//! 2. Duress handling is blind. The calm path and the duress path return
//!    the same thing, log the same line, and take the same time to fail
//!    later.
//! 3. No waiting inside the core. Sequencing the two settlement phases is
//!    the caller's job; the core just refuses out-of-order state.
//! 4. If it touches money, it has tests. Plural.

pub mod account;
pub mod attestation;
pub mod clock;
pub mod config;
pub mod core;
pub mod crypto;
pub mod error;
pub mod events;
pub mod ledger;
pub mod registry;
