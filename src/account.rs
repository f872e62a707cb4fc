//! # Accounts
//!
//! An [`Account`] is the core entity: a human-readable handle, a multi-asset
//! [`BalanceSheet`], an optional linked signer, and the two pieces of
//! adversarial state that make the whole design work:
//!
//! - `last_accepted_ms`, the per-account monotonic replay counter. Every
//!   accepted attested operation must carry a strictly greater timestamp
//!   than the one before it, and acceptance always advances the counter --
//!   regardless of verdict, regardless of lock state. That unconditional
//!   advance is what keeps the apply-attestation step observationally
//!   identical across verdicts.
//!
//! - `lock_until_ms`, the duress lock. Extend-only: a new lock request can
//!   push the unlock time further out but never pull it in, so an attacker
//!   who can trigger successive signed requests cannot shorten a lock a
//!   legitimate duress detection already imposed. There is no unlock
//!   operation; unlocking is purely the passage of time.
//!
//! Accounts are created once and never destroyed. Handles are display
//! labels and are *not* required to be unique; only the identity-to-account
//! binding in the registry is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::config::NEVER_LOCKED;
use crate::crypto::keys::VoxPublicKey;
use crate::error::CoreError;
use crate::ledger::balance::BalanceSheet;

/// Opaque account identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.0)
    }
}

/// A custodial ledger account.
///
/// Plain owned data; the core mutates accounts inside its atomic sections
/// and concurrency is coordinated there, not here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    /// Display label. Uniqueness is not enforced.
    handle: String,
    /// Multi-asset balances.
    balances: BalanceSheet,
    /// External identity authorized for the direct settlement path.
    linked_signer: Option<VoxPublicKey>,
    /// Absolute unlock time in epoch milliseconds. Zero means never locked.
    lock_until_ms: u64,
    /// Timestamp of the most recently accepted attested operation.
    last_accepted_ms: u64,
    /// When this account was created.
    created_at: DateTime<Utc>,
}

impl Account {
    /// Creates a new account with the given handle, empty balances, no
    /// linked signer, and no lock.
    pub fn new(handle: &str) -> Self {
        Self {
            id: AccountId::new(),
            handle: handle.to_string(),
            balances: BalanceSheet::new(),
            linked_signer: None,
            lock_until_ms: NEVER_LOCKED,
            last_accepted_ms: 0,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn balances(&self) -> &BalanceSheet {
        &self.balances
    }

    /// Mutable access to the balance sheet. Crate-internal: balance
    /// mutations must only happen inside the core's atomic sections.
    pub(crate) fn balances_mut(&mut self) -> &mut BalanceSheet {
        &mut self.balances
    }

    pub fn linked_signer(&self) -> Option<&VoxPublicKey> {
        self.linked_signer.as_ref()
    }

    pub(crate) fn set_linked_signer(&mut self, identity: VoxPublicKey) {
        self.linked_signer = Some(identity);
    }

    pub fn lock_until_ms(&self) -> u64 {
        self.lock_until_ms
    }

    pub fn last_accepted_ms(&self) -> u64 {
        self.last_accepted_ms
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // -----------------------------------------------------------------------
    // Duress lock state machine
    // -----------------------------------------------------------------------

    /// Returns `true` while the lock has not yet elapsed.
    pub fn is_locked(&self, now_ms: u64) -> bool {
        now_ms < self.lock_until_ms
    }

    /// Extends the lock to `now_ms + duration_ms` if that is later than the
    /// current unlock time. Never shortens an existing lock.
    ///
    /// Returns the (possibly unchanged) unlock time.
    pub(crate) fn lock_for(&mut self, now_ms: u64, duration_ms: u64) -> u64 {
        let candidate = now_ms.saturating_add(duration_ms);
        self.lock_until_ms = self.lock_until_ms.max(candidate);
        self.lock_until_ms
    }

    /// Precondition guard for mutating operations.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::WalletLocked`] while `now_ms < lock_until_ms`.
    pub fn assert_unlocked(&self, now_ms: u64) -> Result<(), CoreError> {
        if self.is_locked(now_ms) {
            return Err(CoreError::WalletLocked {
                lock_until_ms: self.lock_until_ms,
                now_ms,
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Replay protection
    // -----------------------------------------------------------------------

    /// Validates that `timestamp_ms` would be accepted by the replay
    /// counter, without consuming it.
    ///
    /// Operations validate everything first and mutate last, so the check
    /// and the consume are separate steps.
    pub fn check_replay(&self, timestamp_ms: u64) -> Result<(), CoreError> {
        if timestamp_ms <= self.last_accepted_ms {
            return Err(CoreError::ReplayAttempt {
                got: timestamp_ms,
                last: self.last_accepted_ms,
            });
        }
        Ok(())
    }

    /// Consumes `timestamp_ms`, advancing the replay counter.
    ///
    /// This is a strict monotonic counter, not a nonce set: one timestamp
    /// is consumed at a time, so out-of-order delivery of two valid
    /// attestations rejects the older one.
    pub(crate) fn consume_timestamp(&mut self, timestamp_ms: u64) -> Result<(), CoreError> {
        self.check_replay(timestamp_ms)?;
        self.last_accepted_ms = timestamp_ms;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Serializes the account to a bincode blob, suitable for storage as a
    /// single key-value pair.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Deserializes an account from a bincode blob.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::asset::native_asset;

    #[test]
    fn new_account_is_unlocked_and_empty() {
        let acct = Account::new("alice");
        assert_eq!(acct.handle(), "alice");
        assert!(!acct.is_locked(0));
        assert!(!acct.is_locked(u64::MAX));
        assert_eq!(acct.last_accepted_ms(), 0);
        assert!(acct.linked_signer().is_none());
        assert!(acct.balances().is_empty());
    }

    #[test]
    fn account_ids_are_unique() {
        assert_ne!(Account::new("a").id(), Account::new("a").id());
    }

    #[test]
    fn handles_need_not_be_unique() {
        let a = Account::new("alice");
        let b = Account::new("alice");
        assert_eq!(a.handle(), b.handle());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn lock_for_sets_unlock_time() {
        let mut acct = Account::new("alice");
        let until = acct.lock_for(1_000, 500);
        assert_eq!(until, 1_500);
        assert!(acct.is_locked(1_499));
        assert!(!acct.is_locked(1_500));
    }

    #[test]
    fn lock_is_extend_only() {
        let mut acct = Account::new("alice");
        acct.lock_for(1_000, 10_000); // until 11_000

        // A shorter lock request leaves the unlock time untouched.
        let until = acct.lock_for(1_100, 100);
        assert_eq!(until, 11_000);

        // A longer one pushes it out.
        let until = acct.lock_for(2_000, 20_000);
        assert_eq!(until, 22_000);
    }

    #[test]
    fn lock_duration_saturates() {
        let mut acct = Account::new("alice");
        let until = acct.lock_for(u64::MAX - 10, 100);
        assert_eq!(until, u64::MAX);
    }

    #[test]
    fn assert_unlocked_reports_lock_window() {
        let mut acct = Account::new("alice");
        acct.lock_for(1_000, 500);
        let err = acct.assert_unlocked(1_200).unwrap_err();
        assert!(matches!(
            err,
            CoreError::WalletLocked {
                lock_until_ms: 1_500,
                now_ms: 1_200,
            }
        ));
        assert!(acct.assert_unlocked(1_500).is_ok());
    }

    #[test]
    fn replay_counter_is_strictly_monotonic() {
        let mut acct = Account::new("alice");
        acct.consume_timestamp(100).unwrap();
        acct.consume_timestamp(101).unwrap();

        // Equal timestamp rejected.
        assert!(matches!(
            acct.consume_timestamp(101),
            Err(CoreError::ReplayAttempt { got: 101, last: 101 })
        ));
        // Older timestamp rejected.
        assert!(acct.consume_timestamp(50).is_err());
        // Counter unchanged by the failures.
        assert_eq!(acct.last_accepted_ms(), 101);
    }

    #[test]
    fn check_replay_does_not_consume() {
        let acct = Account::new("alice");
        acct.check_replay(5).unwrap();
        assert_eq!(acct.last_accepted_ms(), 0);
    }

    #[test]
    fn zero_timestamp_is_never_accepted() {
        // last_accepted starts at 0 and the check is strict, so an
        // attestation stamped 0 can never pass.
        let mut acct = Account::new("alice");
        assert!(acct.consume_timestamp(0).is_err());
    }

    #[test]
    fn bincode_roundtrip() {
        let mut acct = Account::new("alice");
        acct.balances_mut().credit(native_asset(), 777).unwrap();
        acct.consume_timestamp(42).unwrap();
        acct.lock_for(100, 900);

        let bytes = acct.to_bytes().expect("serialize");
        let recovered = Account::from_bytes(&bytes).expect("deserialize");

        assert_eq!(recovered.id(), acct.id());
        assert_eq!(recovered.handle(), "alice");
        assert_eq!(recovered.balances().amount(native_asset()), 777);
        assert_eq!(recovered.last_accepted_ms(), 42);
        assert_eq!(recovered.lock_until_ms(), 1_000);
    }
}
