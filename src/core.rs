//! # Settlement Core
//!
//! [`VoxCore`] is the context object that composes the registry, the
//! attestation verifier, the clock, and the event sink into the operations
//! of §external-interface fame: account creation, signer linking, deposits,
//! the two-phase attested settlement protocol, and the direct-signer path.
//!
//! ## Atomicity
//!
//! Every mutating operation is a single precondition-check-then-mutate
//! sequence executed under one write section over the account table. An
//! operation either applies entirely or leaves every account untouched; no
//! intermediate state is ever observable. Nothing here blocks, sleeps, or
//! suspends; waiting on the attestation service and sequencing the two
//! settlement calls is the caller's job.
//!
//! ## The blind two-phase protocol
//!
//! An attested transfer is two separate calls, both idempotent-safe against
//! partial completion:
//!
//! 1. [`apply_attestation`](VoxCore::apply_attestation) verifies and
//!    consumes the attest-result signature. It succeeds uniformly for every
//!    verdict; a duress verdict additionally extends the account lock as a
//!    side effect visible only through the event stream.
//! 2. [`attested_transfer`](VoxCore::attested_transfer) (or
//!    [`attested_withdraw`](VoxCore::attested_withdraw)) verifies the
//!    settlement signature, asserts the account is unlocked, and moves the
//!    balance. After a duress lock this fails `WalletLocked`, which on the
//!    public ledger is indistinguishable in cause from any other lock.
//!
//! Step 1 succeeding while step 2 fails locked is a *terminal state by
//! design* (replay counter advanced, account locked, balances unchanged),
//! not a partial failure to repair.

use dashmap::DashSet;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::account::{Account, AccountId};
use crate::attestation::intent::Verdict;
use crate::attestation::payload::AttestationPayload;
use crate::attestation::verifier::{Attestation, AttestationVerifier};
use crate::clock::{Clock, SystemClock};
use crate::config::{DURESS_LOCK_DURATION_MS, MAX_HANDLE_LENGTH, MAX_TRANSCRIPT_LENGTH};
use crate::crypto::keys::VoxPublicKey;
use crate::error::CoreError;
use crate::events::{DomainEvent, EventSink, TracingSink};
use crate::ledger::asset::AssetId;
use crate::registry::AccountRegistry;

/// The ledger authorization core.
///
/// Created once at bootstrap and shared by reference; all mutating
/// operations take `&self` and coordinate internally.
pub struct VoxCore {
    registry: AccountRegistry,
    accounts: RwLock<HashMap<AccountId, Account>>,
    verifier: AttestationVerifier,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn EventSink>,
    /// Timestamps consumed by attested account creation. The per-account
    /// replay counter cannot cover creation (the account does not exist
    /// yet), so consumed creation stamps live in this process-wide set.
    creation_stamps: DashSet<u64>,
}

impl VoxCore {
    /// Creates a core with explicit collaborators.
    pub fn new(
        verifier: AttestationVerifier,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            registry: AccountRegistry::new(),
            accounts: RwLock::new(HashMap::new()),
            verifier,
            clock,
            sink,
            creation_stamps: DashSet::new(),
        }
    }

    /// Creates a core with the wall clock and a log-only event sink.
    pub fn with_system_defaults(service_key: VoxPublicKey) -> Self {
        Self::new(
            AttestationVerifier::new(service_key),
            Arc::new(SystemClock),
            Arc::new(TracingSink),
        )
    }

    /// The registered attestation service key.
    pub fn service_key(&self) -> &VoxPublicKey {
        self.verifier.key()
    }

    // -----------------------------------------------------------------------
    // Account creation & identity binding
    // -----------------------------------------------------------------------

    /// Creates an account bound to `identity`, auto-linking that identity
    /// as the direct signer.
    ///
    /// Covers both creation modes: self-registration (the caller registers
    /// their own identity) and third-party provisioning (anyone may create
    /// an account *for* a not-yet-registered identity, e.g. a transfer
    /// recipient who has no account yet). The core cannot tell the two
    /// apart and doesn't need to.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::AddressAlreadyExists`] if the identity already
    /// owns an account.
    pub fn create_account(
        &self,
        identity: &VoxPublicKey,
        handle: &str,
    ) -> Result<AccountId, CoreError> {
        check_handle(handle)?;
        let mut account = Account::new(handle);
        account.set_linked_signer(identity.clone());
        let id = account.id();

        {
            let mut accounts = self.accounts.write();
            self.registry.register(identity, id)?;
            accounts.insert(id, account);
        }

        info!(account = %id, handle, "account created");
        self.sink.emit(DomainEvent::AccountCreated {
            account: id,
            handle: handle.to_string(),
        });
        self.sink.emit(DomainEvent::SignerLinked {
            account: id,
            identity: identity.clone(),
        });
        Ok(id)
    }

    /// Creates an account from a create-account attestation, with no
    /// identity binding and no linked signer. A signer is linked later via
    /// [`link_signer`](Self::link_signer).
    ///
    /// The target account cannot carry the replay state for its own
    /// creation, so consumed creation timestamps go into a process-wide
    /// seen-set: replaying a creation attestation fails
    /// [`CoreError::ReplayAttempt`] instead of minting a duplicate. The
    /// attested timestamp also seeds the new account's replay counter.
    pub fn create_account_attested(
        &self,
        handle: &str,
        att: &Attestation,
    ) -> Result<AccountId, CoreError> {
        check_handle(handle)?;
        let payload = AttestationPayload::CreateAccount {
            handle: handle.to_string(),
        };
        self.verifier
            .verify(&payload, att.timestamp_ms, &att.signature)?;

        let mut account = Account::new(handle);
        account.check_replay(att.timestamp_ms)?;
        // insert returns false when the stamp was already consumed.
        if !self.creation_stamps.insert(att.timestamp_ms) {
            return Err(CoreError::ReplayAttempt {
                got: att.timestamp_ms,
                last: att.timestamp_ms,
            });
        }
        account.consume_timestamp(att.timestamp_ms)?;
        let id = account.id();
        self.accounts.write().insert(id, account);

        info!(account = %id, handle, "account created (attested)");
        self.sink.emit(DomainEvent::AccountCreated {
            account: id,
            handle: handle.to_string(),
        });
        Ok(id)
    }

    /// Binds `identity` as the account's direct signer, authorized by a
    /// link-signer attestation over the account's handle and the identity.
    ///
    /// A later valid link overwrites the signer (last valid link wins); the
    /// registry binding itself stays append-only, so the identity must not
    /// already own a *different* account.
    pub fn link_signer(
        &self,
        account: AccountId,
        identity: &VoxPublicKey,
        att: &Attestation,
    ) -> Result<(), CoreError> {
        {
            let mut accounts = self.accounts.write();
            let acct = accounts.get_mut(&account).ok_or_else(|| unknown(account))?;

            let payload = AttestationPayload::LinkSigner {
                handle: acct.handle().to_string(),
                address: *identity.as_bytes(),
            };
            self.verifier
                .verify(&payload, att.timestamp_ms, &att.signature)?;
            acct.check_replay(att.timestamp_ms)?;
            self.registry.register(identity, account)?;

            acct.consume_timestamp(att.timestamp_ms)?;
            acct.set_linked_signer(identity.clone());
        }

        info!(account = %account, "signer linked");
        self.sink.emit(DomainEvent::SignerLinked {
            account,
            identity: identity.clone(),
        });
        Ok(())
    }

    /// Pure registry lookup.
    pub fn resolve(&self, identity: &VoxPublicKey) -> Option<AccountId> {
        self.registry.resolve(identity)
    }

    /// Registry lookup that demands existence.
    pub fn resolve_required(&self, identity: &VoxPublicKey) -> Result<AccountId, CoreError> {
        self.registry.resolve_required(identity)
    }

    /// Finds an account by handle. Handles are not unique; when several
    /// accounts share one, which is returned is unspecified. Use identity
    /// resolution for anything security-relevant.
    pub fn resolve_handle(&self, handle: &str) -> Option<AccountId> {
        self.accounts
            .read()
            .values()
            .find(|acct| acct.handle() == handle)
            .map(|acct| acct.id())
    }

    // -----------------------------------------------------------------------
    // Funding
    // -----------------------------------------------------------------------

    /// Credits `amount` of `asset` to the account. Anyone may fund an
    /// account; no authorization is required, but the account must be
    /// unlocked.
    ///
    /// Returns the new balance.
    pub fn deposit(
        &self,
        account: AccountId,
        asset: AssetId,
        amount: u64,
    ) -> Result<u64, CoreError> {
        if amount == 0 {
            return Err(CoreError::ZeroAmount);
        }
        let now_ms = self.clock.now_ms();

        let new_balance = {
            let mut accounts = self.accounts.write();
            let acct = accounts.get_mut(&account).ok_or_else(|| unknown(account))?;
            acct.assert_unlocked(now_ms)?;
            acct.balances_mut().credit(asset, amount)?
        };

        debug!(account = %account, amount, "deposit");
        self.sink.emit(DomainEvent::Deposited {
            account,
            asset,
            amount,
        });
        Ok(new_balance)
    }

    // -----------------------------------------------------------------------
    // Two-phase attested settlement: step 1
    // -----------------------------------------------------------------------

    /// Applies a voice-verification verdict to the account.
    ///
    /// This step always executes, in any lock state, and its result is
    /// observable identically for every verdict: verify the attest-result
    /// signature, advance the replay counter, done. A duress verdict
    /// additionally extends the account lock by
    /// [`DURESS_LOCK_DURATION_MS`], based at the attested timestamp; that
    /// side effect surfaces only through the event stream the external
    /// indexer consumes, never through this call's return value.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidSignature`] or [`CoreError::ReplayAttempt`]
    /// abort the step with no side effect at all.
    pub fn apply_attestation(
        &self,
        account: AccountId,
        verdict: Verdict,
        amount: u64,
        transcript: &str,
        att: &Attestation,
    ) -> Result<(), CoreError> {
        check_transcript(transcript)?;
        let mut events = Vec::with_capacity(2);

        {
            let mut accounts = self.accounts.write();
            let acct = accounts.get_mut(&account).ok_or_else(|| unknown(account))?;

            let payload = AttestationPayload::AttestResult {
                handle: acct.handle().to_string(),
                amount,
                verdict,
                transcript: transcript.to_string(),
            };
            self.verifier
                .verify(&payload, att.timestamp_ms, &att.signature)?;
            acct.check_replay(att.timestamp_ms)?;

            acct.consume_timestamp(att.timestamp_ms)?;
            events.push(DomainEvent::AttestationApplied {
                account,
                verdict,
                amount,
                transcript: transcript.to_string(),
                timestamp_ms: att.timestamp_ms,
            });

            if verdict == Verdict::Duress {
                let lock_until_ms = acct.lock_for(att.timestamp_ms, DURESS_LOCK_DURATION_MS);
                events.push(DomainEvent::WalletLocked {
                    account,
                    lock_until_ms,
                });
            }
        }

        // The log line is verdict-free on purpose: this path must read the
        // same whether the verdict was calm or duressed.
        debug!(account = %account, timestamp_ms = att.timestamp_ms, "attestation applied");
        for event in events {
            self.sink.emit(event);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Two-phase attested settlement: step 2
    // -----------------------------------------------------------------------

    /// Executes an attested transfer of `amount` of `asset` between two
    /// accounts.
    ///
    /// `signed_asset` is the asset tag the attestation service signed over;
    /// it must equal `asset` or the operation fails
    /// [`CoreError::AssetTypeMismatch`]. The caller does not need to be the
    /// linked signer; the signature is the authorization.
    ///
    /// Check order: signature, replay, lock, asset match, funds. Any
    /// failure leaves both accounts entirely unchanged, including the
    /// sender's replay counter.
    pub fn attested_transfer(
        &self,
        from: AccountId,
        to: AccountId,
        asset: AssetId,
        amount: u64,
        signed_asset: AssetId,
        att: &Attestation,
    ) -> Result<(), CoreError> {
        if amount == 0 {
            return Err(CoreError::ZeroAmount);
        }
        let now_ms = self.clock.now_ms();

        {
            let mut accounts = self.accounts.write();

            // Validation phase: immutable reads only.
            {
                let sender = accounts.get(&from).ok_or_else(|| unknown(from))?;
                let recipient = accounts.get(&to).ok_or_else(|| unknown(to))?;

                let payload = AttestationPayload::Transfer {
                    from_handle: sender.handle().to_string(),
                    to_handle: recipient.handle().to_string(),
                    amount,
                    asset: signed_asset,
                };
                self.verifier
                    .verify(&payload, att.timestamp_ms, &att.signature)?;
                sender.check_replay(att.timestamp_ms)?;
                sender.assert_unlocked(now_ms)?;

                if signed_asset != asset {
                    return Err(CoreError::AssetTypeMismatch {
                        signed: signed_asset,
                        requested: asset,
                    });
                }

                let available = sender.balances().amount(asset);
                if available < amount {
                    return Err(CoreError::InsufficientBalance {
                        asset,
                        available,
                        requested: amount,
                    });
                }
                if from != to && !recipient.balances().can_credit(asset, amount) {
                    return Err(CoreError::BalanceOverflow {
                        asset,
                        current: recipient.balances().amount(asset),
                        credit: amount,
                    });
                }
            }

            // Mutation phase: everything below is pre-validated.
            let sender = accounts.get_mut(&from).ok_or_else(|| unknown(from))?;
            sender.consume_timestamp(att.timestamp_ms)?;
            sender.balances_mut().debit(asset, amount)?;
            let recipient = accounts.get_mut(&to).ok_or_else(|| unknown(to))?;
            recipient.balances_mut().credit(asset, amount)?;
        }

        debug!(from = %from, to = %to, amount, "attested transfer settled");
        self.sink.emit(DomainEvent::Transferred {
            from,
            to,
            asset,
            amount,
        });
        Ok(())
    }

    /// Executes an attested withdrawal: `amount` of `asset` leaves the
    /// ledger entirely.
    ///
    /// Same authorization and check order as
    /// [`attested_transfer`](Self::attested_transfer).
    pub fn attested_withdraw(
        &self,
        account: AccountId,
        asset: AssetId,
        amount: u64,
        signed_asset: AssetId,
        att: &Attestation,
    ) -> Result<u64, CoreError> {
        if amount == 0 {
            return Err(CoreError::ZeroAmount);
        }
        let now_ms = self.clock.now_ms();

        let remaining = {
            let mut accounts = self.accounts.write();
            let acct = accounts.get_mut(&account).ok_or_else(|| unknown(account))?;

            let payload = AttestationPayload::Withdraw {
                handle: acct.handle().to_string(),
                amount,
                asset: signed_asset,
            };
            self.verifier
                .verify(&payload, att.timestamp_ms, &att.signature)?;
            acct.check_replay(att.timestamp_ms)?;
            acct.assert_unlocked(now_ms)?;

            if signed_asset != asset {
                return Err(CoreError::AssetTypeMismatch {
                    signed: signed_asset,
                    requested: asset,
                });
            }
            let available = acct.balances().amount(asset);
            if available < amount {
                return Err(CoreError::InsufficientBalance {
                    asset,
                    available,
                    requested: amount,
                });
            }

            acct.consume_timestamp(att.timestamp_ms)?;
            acct.balances_mut().debit(asset, amount)?
        };

        debug!(account = %account, amount, "attested withdrawal settled");
        self.sink.emit(DomainEvent::Withdrawn {
            account,
            asset,
            amount,
        });
        Ok(remaining)
    }

    // -----------------------------------------------------------------------
    // Direct-signer path
    // -----------------------------------------------------------------------

    /// Transfers funds on the authority of the linked signer alone: the
    /// caller's identity must equal the sending account's `linked_signer`.
    /// No attestation, no replay counter; the lock still applies.
    pub fn direct_transfer(
        &self,
        caller: &VoxPublicKey,
        from: AccountId,
        to: AccountId,
        asset: AssetId,
        amount: u64,
    ) -> Result<(), CoreError> {
        if amount == 0 {
            return Err(CoreError::ZeroAmount);
        }
        let now_ms = self.clock.now_ms();

        {
            let mut accounts = self.accounts.write();

            {
                let sender = accounts.get(&from).ok_or_else(|| unknown(from))?;
                let recipient = accounts.get(&to).ok_or_else(|| unknown(to))?;

                authorize_direct(sender, caller)?;
                sender.assert_unlocked(now_ms)?;

                let available = sender.balances().amount(asset);
                if available < amount {
                    return Err(CoreError::InsufficientBalance {
                        asset,
                        available,
                        requested: amount,
                    });
                }
                if from != to && !recipient.balances().can_credit(asset, amount) {
                    return Err(CoreError::BalanceOverflow {
                        asset,
                        current: recipient.balances().amount(asset),
                        credit: amount,
                    });
                }
            }

            let sender = accounts.get_mut(&from).ok_or_else(|| unknown(from))?;
            sender.balances_mut().debit(asset, amount)?;
            let recipient = accounts.get_mut(&to).ok_or_else(|| unknown(to))?;
            recipient.balances_mut().credit(asset, amount)?;
        }

        debug!(from = %from, to = %to, amount, "direct transfer settled");
        self.sink.emit(DomainEvent::Transferred {
            from,
            to,
            asset,
            amount,
        });
        Ok(())
    }

    /// Withdraws funds on the authority of the linked signer alone.
    ///
    /// Returns the remaining balance.
    pub fn direct_withdraw(
        &self,
        caller: &VoxPublicKey,
        account: AccountId,
        asset: AssetId,
        amount: u64,
    ) -> Result<u64, CoreError> {
        if amount == 0 {
            return Err(CoreError::ZeroAmount);
        }
        let now_ms = self.clock.now_ms();

        let remaining = {
            let mut accounts = self.accounts.write();
            let acct = accounts.get_mut(&account).ok_or_else(|| unknown(account))?;

            authorize_direct(acct, caller)?;
            acct.assert_unlocked(now_ms)?;
            acct.balances_mut().debit(asset, amount)?
        };

        debug!(account = %account, amount, "direct withdrawal settled");
        self.sink.emit(DomainEvent::Withdrawn {
            account,
            asset,
            amount,
        });
        Ok(remaining)
    }

    /// Voluntary self-lock by the linked signer, a safety opt-out.
    ///
    /// Subject to the same extend-only rule as the duress lock: the call
    /// can push the unlock time out, never pull it in. Works in any lock
    /// state.
    ///
    /// Returns the (possibly unchanged) unlock time.
    pub fn self_lock(
        &self,
        caller: &VoxPublicKey,
        account: AccountId,
        duration_ms: u64,
    ) -> Result<u64, CoreError> {
        let now_ms = self.clock.now_ms();

        let lock_until_ms = {
            let mut accounts = self.accounts.write();
            let acct = accounts.get_mut(&account).ok_or_else(|| unknown(account))?;
            authorize_direct(acct, caller)?;
            acct.lock_for(now_ms, duration_ms)
        };

        info!(account = %account, lock_until_ms, "self-lock");
        self.sink.emit(DomainEvent::WalletLocked {
            account,
            lock_until_ms,
        });
        Ok(lock_until_ms)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Balance for one asset, treating a missing entry as zero.
    pub fn balance(&self, account: AccountId, asset: AssetId) -> Result<u64, CoreError> {
        self.read_account(account, |acct| acct.balances().amount(asset))
    }

    /// All non-zero balances of an account.
    pub fn balances(&self, account: AccountId) -> Result<Vec<(AssetId, u64)>, CoreError> {
        self.read_account(account, |acct| acct.balances().all())
    }

    /// The account's unlock time (zero if never locked).
    pub fn lock_until_ms(&self, account: AccountId) -> Result<u64, CoreError> {
        self.read_account(account, |acct| acct.lock_until_ms())
    }

    /// Whether the account is locked right now.
    pub fn is_locked(&self, account: AccountId) -> Result<bool, CoreError> {
        let now_ms = self.clock.now_ms();
        self.read_account(account, |acct| acct.is_locked(now_ms))
    }

    /// The account's linked signer, if any.
    pub fn linked_signer(&self, account: AccountId) -> Result<Option<VoxPublicKey>, CoreError> {
        self.read_account(account, |acct| acct.linked_signer().cloned())
    }

    /// The account's replay counter.
    pub fn last_accepted_ms(&self, account: AccountId) -> Result<u64, CoreError> {
        self.read_account(account, |acct| acct.last_accepted_ms())
    }

    /// The account's handle.
    pub fn handle(&self, account: AccountId) -> Result<String, CoreError> {
        self.read_account(account, |acct| acct.handle().to_string())
    }

    /// Number of accounts in the ledger.
    pub fn account_count(&self) -> usize {
        self.accounts.read().len()
    }

    fn read_account<R>(
        &self,
        account: AccountId,
        f: impl FnOnce(&Account) -> R,
    ) -> Result<R, CoreError> {
        let accounts = self.accounts.read();
        let acct = accounts.get(&account).ok_or_else(|| unknown(account))?;
        Ok(f(acct))
    }
}

/// Direct-path authorization: the caller must be the linked signer.
fn authorize_direct(account: &Account, caller: &VoxPublicKey) -> Result<(), CoreError> {
    let linked = account.linked_signer().ok_or(CoreError::WalletNotLinked)?;
    if linked != caller {
        return Err(CoreError::NotOwner);
    }
    Ok(())
}

fn unknown(account: AccountId) -> CoreError {
    CoreError::AddressNotFound {
        address: account.to_string(),
    }
}

fn check_handle(handle: &str) -> Result<(), CoreError> {
    if handle.len() > MAX_HANDLE_LENGTH {
        return Err(CoreError::HandleTooLong {
            length: handle.len(),
            max: MAX_HANDLE_LENGTH,
        });
    }
    Ok(())
}

fn check_transcript(transcript: &str) -> Result<(), CoreError> {
    if transcript.len() > MAX_TRANSCRIPT_LENGTH {
        return Err(CoreError::TranscriptTooLong {
            length: transcript.len(),
            max: MAX_TRANSCRIPT_LENGTH,
        });
    }
    Ok(())
}
