//! Per-account balance tracking.
//!
//! A [`BalanceSheet`] is the complete set of asset balances for a single
//! account: a map from [`AssetId`] to a non-negative `u64` amount. It
//! enforces the two invariants the whole ledger rests on: you can never
//! spend more than you have, and a credit can never silently wrap.
//!
//! Thread safety is handled above this layer; a `BalanceSheet` is plain
//! owned data mutated inside the core's atomic sections.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::asset::AssetId;
use crate::error::CoreError;

/// The complete set of asset balances for a single account.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BalanceSheet {
    /// Balances indexed by asset type tag.
    #[serde(with = "crate::ledger::asset::asset_id_map")]
    balances: HashMap<AssetId, u64>,
}

impl BalanceSheet {
    /// Creates an empty balance sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits (adds) funds to an asset balance.
    ///
    /// If no entry exists for the asset, one is created at zero first; this
    /// is how new asset types enter the ledger.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::BalanceOverflow`] if the credit would exceed
    /// `u64::MAX`. Returns the new balance on success.
    pub fn credit(&mut self, asset: AssetId, amount: u64) -> Result<u64, CoreError> {
        let balance = self.balances.entry(asset).or_insert(0);
        let new_amount = balance
            .checked_add(amount)
            .ok_or(CoreError::BalanceOverflow {
                asset,
                current: *balance,
                credit: amount,
            })?;
        *balance = new_amount;
        Ok(new_amount)
    }

    /// Debits (subtracts) funds from an asset balance.
    ///
    /// A missing entry counts as an available balance of zero.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InsufficientBalance`] if the debit exceeds the
    /// available balance. Returns the remaining balance on success.
    pub fn debit(&mut self, asset: AssetId, amount: u64) -> Result<u64, CoreError> {
        let available = self.amount(asset);
        if available < amount {
            return Err(CoreError::InsufficientBalance {
                asset,
                available,
                requested: amount,
            });
        }
        let balance = self.balances.entry(asset).or_insert(0);
        *balance -= amount;
        Ok(*balance)
    }

    /// Returns `true` if crediting `amount` of `asset` would not overflow.
    ///
    /// Used by the transfer path to validate both sides before mutating
    /// either, so a failed credit can never leave a dangling debit.
    pub fn can_credit(&self, asset: AssetId, amount: u64) -> bool {
        self.amount(asset).checked_add(amount).is_some()
    }

    /// The balance for an asset, or `None` if the asset has never been
    /// credited to this account.
    pub fn get(&self, asset: &AssetId) -> Option<u64> {
        self.balances.get(asset).copied()
    }

    /// The balance for an asset, treating a missing entry as zero.
    pub fn amount(&self, asset: AssetId) -> u64 {
        self.balances.get(&asset).copied().unwrap_or(0)
    }

    /// All non-zero balances as `(AssetId, amount)` pairs.
    pub fn all(&self) -> Vec<(AssetId, u64)> {
        self.balances
            .iter()
            .filter(|(_, amount)| **amount > 0)
            .map(|(id, amount)| (*id, *amount))
            .collect()
    }

    /// Number of distinct assets held (including zero balances).
    pub fn asset_count(&self) -> usize {
        self.balances.len()
    }

    /// Returns `true` if this balance sheet has no entries at all.
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}
