//! # Identity Registry
//!
//! Process-wide, append-only mapping from an external identity (a public
//! key) to exactly one account. Registration is the only mutation; there is
//! no removal, no rebinding to a *different* account, no iteration order
//! anybody should depend on.
//!
//! Backed by a `DashMap` so registrations and lookups on different
//! identities never contend.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::account::AccountId;
use crate::crypto::keys::VoxPublicKey;
use crate::error::CoreError;

/// Append-only identity-to-account binding.
#[derive(Debug, Default)]
pub struct AccountRegistry {
    bindings: DashMap<[u8; 32], AccountId>,
}

impl AccountRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `identity` to `account`.
    ///
    /// Re-binding an identity to the account it already points at is
    /// accepted (idempotent re-link); binding it to any other account fails.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::AddressAlreadyExists`] if the identity is bound
    /// to a different account.
    pub fn register(&self, identity: &VoxPublicKey, account: AccountId) -> Result<(), CoreError> {
        match self.bindings.entry(*identity.as_bytes()) {
            Entry::Occupied(existing) => {
                if *existing.get() == account {
                    Ok(())
                } else {
                    Err(CoreError::AddressAlreadyExists {
                        identity: identity.to_hex(),
                    })
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(account);
                Ok(())
            }
        }
    }

    /// Pure lookup. No side effect, no error.
    pub fn resolve(&self, identity: &VoxPublicKey) -> Option<AccountId> {
        self.bindings.get(identity.as_bytes()).map(|entry| *entry)
    }

    /// Lookup that demands existence.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::AddressNotFound`] for an unregistered identity.
    pub fn resolve_required(&self, identity: &VoxPublicKey) -> Result<AccountId, CoreError> {
        self.resolve(identity).ok_or(CoreError::AddressNotFound {
            address: identity.to_hex(),
        })
    }

    /// Number of registered identities.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::VoxKeypair;

    #[test]
    fn register_and_resolve() {
        let registry = AccountRegistry::new();
        let identity = VoxKeypair::generate().public_key();
        let id = AccountId::new();

        registry.register(&identity, id).unwrap();
        assert_eq!(registry.resolve(&identity), Some(id));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn second_registration_rejected() {
        let registry = AccountRegistry::new();
        let identity = VoxKeypair::generate().public_key();

        registry.register(&identity, AccountId::new()).unwrap();
        let result = registry.register(&identity, AccountId::new());
        assert!(matches!(
            result,
            Err(CoreError::AddressAlreadyExists { .. })
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn rebinding_same_account_is_idempotent() {
        let registry = AccountRegistry::new();
        let identity = VoxKeypair::generate().public_key();
        let id = AccountId::new();

        registry.register(&identity, id).unwrap();
        assert!(registry.register(&identity, id).is_ok());
    }

    #[test]
    fn different_identities_are_independent() {
        let registry = AccountRegistry::new();
        let a = VoxKeypair::generate().public_key();
        let b = VoxKeypair::generate().public_key();

        registry.register(&a, AccountId::new()).unwrap();
        registry.register(&b, AccountId::new()).unwrap();
        assert_eq!(registry.len(), 2);
        assert_ne!(registry.resolve(&a), registry.resolve(&b));
    }

    #[test]
    fn resolve_required_reports_missing() {
        let registry = AccountRegistry::new();
        let identity = VoxKeypair::generate().public_key();
        assert!(matches!(
            registry.resolve_required(&identity),
            Err(CoreError::AddressNotFound { .. })
        ));
        assert_eq!(registry.resolve(&identity), None);
    }
}
