//! Identifier types for custody participants and assets
//!
//! Account IDs use UUID v7 so that they sort chronologically, which keeps
//! `BTreeMap`-keyed state (and therefore snapshots) deterministic.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::errors::TypeError;

/// Unique identifier for a depositor or the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
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

/// Identifier of an externally-issued fungible asset
///
/// Usually the issuing contract's address or a ticker such as "USDT".
/// Must be non-empty and free of surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    /// Create a new AssetId
    ///
    /// # Panics
    /// Panics if the identifier is empty or padded with whitespace
    pub fn new(id: impl Into<String>) -> Self {
        match Self::try_new(id) {
            Ok(asset) => asset,
            Err(e) => panic!("{e}"),
        }
    }

    /// Try to create an AssetId, rejecting empty or padded identifiers
    pub fn try_new(id: impl Into<String>) -> Result<Self, TypeError> {
        let s = id.into();
        if s.is_empty() || s.trim() != s {
            return Err(TypeError::InvalidAssetId { id: s });
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AssetId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_creation() {
        let id1 = AccountId::new();
        let id2 = AccountId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_account_id_serialization() {
        let id = AccountId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_asset_id_creation() {
        let asset = AssetId::new("USDT");
        assert_eq!(asset.as_str(), "USDT");
        assert_eq!(asset.to_string(), "USDT");
    }

    #[test]
    fn test_asset_id_try_new() {
        assert!(AssetId::try_new("0x5FbDB2315678afecb367f032d93F642f64180aa3").is_ok());
        assert_eq!(
            AssetId::try_new(""),
            Err(TypeError::InvalidAssetId { id: String::new() })
        );
        assert!(AssetId::try_new(" USDT").is_err());
    }

    #[test]
    #[should_panic(expected = "Invalid asset identifier")]
    fn test_asset_id_invalid_format() {
        AssetId::new("");
    }

    #[test]
    fn test_asset_id_serialization() {
        let asset = AssetId::new("DAI");
        let json = serde_json::to_string(&asset).unwrap();
        assert_eq!(json, "\"DAI\"");
    }
}
