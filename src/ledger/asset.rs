//! Asset type tags.
//!
//! An [`AssetId`] is a unique, content-addressed identifier for an asset
//! type: the BLAKE3 digest of the asset's canonical type descriptor string
//! (e.g. `"0x2::sui::SUI"` or `"vox::native"`). Two descriptors that spell
//! the same type always produce the same ID, so no registry and no
//! coordination are needed to agree on what an asset is called.
//!
//! The ledger never looks inside an `AssetId`. It is a map key, full stop.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::hash::blake3_hash;

/// A unique, content-addressed identifier for an asset type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetId([u8; 32]);

impl AssetId {
    /// Creates an `AssetId` from a raw 32-byte digest.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw 32-byte identifier.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Derives an `AssetId` from the asset's canonical type descriptor.
    ///
    /// The descriptor is a free-form string; the surrounding system decides
    /// what canonical means (fully-qualified coin type, ticker, whatever).
    /// The ledger only cares that equal descriptors hash equally.
    pub fn from_descriptor(descriptor: &str) -> Self {
        Self(blake3_hash(descriptor.as_bytes()))
    }

    /// Hex-encoded asset ID.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a hex-encoded asset ID.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({}...)", &self.to_hex()[..12])
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::str::FromStr for AssetId {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// The native asset of the surrounding ledger. A convenience for tests and
/// demos; the core itself grants it no special treatment.
pub fn native_asset() -> AssetId {
    AssetId::from_descriptor("vox::native")
}

// ---------------------------------------------------------------------------
// Serde helper: serialize HashMap<AssetId, V> with hex-string keys
// ---------------------------------------------------------------------------

/// Serde helper module for `HashMap<AssetId, V>` maps.
///
/// JSON requires map keys to be strings, but `AssetId` wraps `[u8; 32]`
/// which serde would serialize as an array. This module converts keys
/// to/from their hex representation so the map serializes correctly.
pub mod asset_id_map {
    use super::AssetId;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::HashMap;

    pub fn serialize<V, S>(map: &HashMap<AssetId, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        V: Serialize,
        S: Serializer,
    {
        use serde::ser::SerializeMap;
        let mut ser_map = serializer.serialize_map(Some(map.len()))?;
        for (key, value) in map {
            ser_map.serialize_entry(&key.to_hex(), value)?;
        }
        ser_map.end()
    }

    pub fn deserialize<'de, V, D>(deserializer: D) -> Result<HashMap<AssetId, V>, D::Error>
    where
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let string_map: HashMap<String, V> = HashMap::deserialize(deserializer)?;
        string_map
            .into_iter()
            .map(|(key, value)| {
                AssetId::from_hex(&key)
                    .map(|id| (id, value))
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    }
}
