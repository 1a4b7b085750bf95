//! State snapshots with integrity hashing
//!
//! A snapshot captures everything needed to resume the engine: operator,
//! lock registry, fee accruals (including the fixed rate) and custody
//! totals. All maps are `BTreeMap`s so the JSON encoding, and therefore
//! the SHA-256 integrity hash, is deterministic.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::custody::CustodyLedger;
use crate::errors::SnapshotError;
use crate::fees::FeeAccounting;
use crate::registry::LockRegistry;
use crate::security::AccessControl;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Full engine state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineState {
    pub access_control: AccessControl,
    pub allow_empty_locks: bool,
    pub registry: LockRegistry,
    pub fees: FeeAccounting,
    pub custody: CustodyLedger,
}

impl EngineState {
    /// Deterministic SHA-256 hex digest of the state.
    pub fn compute_hash(&self) -> Result<String, SnapshotError> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Reject lock slots the engine could never have written.
    pub fn verify_records(&self) -> Result<(), SnapshotError> {
        match self.registry.find_malformed() {
            Some((account, index, reason)) => Err(SnapshotError::MalformedLock {
                account,
                index,
                reason,
            }),
            None => Ok(()),
        }
    }

    /// Check the custody conservation identity of the captured state.
    pub fn verify_custody(&self) -> Result<(), SnapshotError> {
        self.custody.verify(&self.registry, &self.fees)?;
        Ok(())
    }
}

/// Versioned, hash-protected state snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub state: EngineState,
    pub integrity_hash: String,
}

impl Snapshot {
    pub fn new(state: EngineState) -> Result<Self, SnapshotError> {
        let integrity_hash = state.compute_hash()?;
        Ok(Self {
            version: SNAPSHOT_VERSION,
            state,
            integrity_hash,
        })
    }

    /// Check version, hash, lock slots and custody invariant.
    pub fn verify(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.version));
        }
        let actual = self.state.compute_hash()?;
        if actual != self.integrity_hash {
            return Err(SnapshotError::IntegrityFailure {
                expected: self.integrity_hash.clone(),
                actual,
            });
        }
        self.state.verify_records()?;
        self.state.verify_custody()
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}
