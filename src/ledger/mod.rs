//! # Multi-Asset Balance Ledger
//!
//! Where the money is counted. A [`BalanceSheet`] maps opaque asset type
//! tags to non-negative integer amounts; credits and debits are checked,
//! atomic, and never interpret what an asset *is*.
//!
//! ## Design Principles
//!
//! 1. **All amounts are `u64` in smallest-unit denomination.** No floating
//!    point, no decimals in arithmetic, no implicit conversion between
//!    assets.
//!
//! 2. **Asset tags are opaque.** An [`AssetId`] is a content-addressed
//!    digest of a free-form type descriptor. New asset kinds appear the
//!    first time somebody credits one; the ledger needs no schema change.
//!
//! 3. **Serializable state.** Every struct derives `Serialize` and
//!    `Deserialize` so account state can be snapshotted or shipped to an
//!    external store as a single blob.

pub mod asset;
pub mod balance;

pub use asset::{native_asset, AssetId};
pub use balance::BalanceSheet;
