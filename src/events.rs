//! # Domain Events
//!
//! Every successful mutation emits a structured event for the external
//! indexer. This is the only channel through which an attestation verdict
//! ever becomes visible: the requesting client's direct response carries no
//! verdict, but the indexer (and therefore the public ledger history) sees
//! `AttestationApplied` and `WalletLocked` after the fact.
//!
//! The core pushes events through an [`EventSink`] trait object. Event
//! consumption, ordering guarantees beyond per-account serialization, and
//! persistence are all the sink's problem.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::account::AccountId;
use crate::attestation::intent::Verdict;
use crate::crypto::keys::VoxPublicKey;
use crate::ledger::asset::AssetId;
use parking_lot::Mutex;

/// A structured record of a successful state mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainEvent {
    AccountCreated {
        account: AccountId,
        handle: String,
    },
    SignerLinked {
        account: AccountId,
        identity: VoxPublicKey,
    },
    Deposited {
        account: AccountId,
        asset: AssetId,
        amount: u64,
    },
    Withdrawn {
        account: AccountId,
        asset: AssetId,
        amount: u64,
    },
    Transferred {
        from: AccountId,
        to: AccountId,
        asset: AssetId,
        amount: u64,
    },
    WalletLocked {
        account: AccountId,
        lock_until_ms: u64,
    },
    AttestationApplied {
        account: AccountId,
        verdict: Verdict,
        amount: u64,
        transcript: String,
        timestamp_ms: u64,
    },
}

impl DomainEvent {
    /// Stable event name, matching what the downstream indexer keys on.
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::AccountCreated { .. } => "AccountCreated",
            DomainEvent::SignerLinked { .. } => "SignerLinked",
            DomainEvent::Deposited { .. } => "Deposited",
            DomainEvent::Withdrawn { .. } => "Withdrawn",
            DomainEvent::Transferred { .. } => "Transferred",
            DomainEvent::WalletLocked { .. } => "WalletLocked",
            DomainEvent::AttestationApplied { .. } => "AttestationApplied",
        }
    }
}

/// Receives events emitted by the core.
///
/// Implementations must not call back into the core; the core emits after
/// releasing its locks, but re-entrancy is still a design smell.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: DomainEvent);
}

/// A sink that discards nothing and stores everything, in order.
/// The default for tests and for embedders that poll.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<DomainEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of all events emitted so far.
    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().clone()
    }

    /// Drains and returns all events emitted so far.
    pub fn take(&self) -> Vec<DomainEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: DomainEvent) {
        self.events.lock().push(event);
    }
}

/// A sink that logs each event at debug level and drops it.
///
/// Useful as a default when no indexer is wired up. Verdicts land in the
/// process log, which is trusted territory; they still never reach the
/// requesting client's response.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: DomainEvent) {
        debug!(event = event.name(), detail = ?event, "ledger event");
    }
}

/// Convenience: fan an event out to multiple sinks.
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn EventSink>>) -> Self {
        Self { sinks }
    }
}

impl EventSink for FanoutSink {
    fn emit(&self, event: DomainEvent) {
        for sink in &self.sinks {
            sink.emit(event.clone());
        }
    }
}
