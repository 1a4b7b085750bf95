//! Contract events
//!
//! Events are immutable records appended by successful operations. Failed
//! operations never emit.

use serde::{Deserialize, Serialize};
use types::ids::{AccountId, AssetId};
use types::numeric::{Amount, Duration, Timestamp};

/// A new lock was recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockCreated {
    pub account_id: AccountId,
    pub asset_id: AssetId,
    pub fungible_amount: Amount,
    pub native_amount: Amount,
    pub duration: Duration,
    pub matures_at: Timestamp,
    pub index: usize,
}

/// A matured lock was paid out and its slot emptied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockReleased {
    pub account_id: AccountId,
    pub index: usize,
    pub asset_id: AssetId,
    pub native_to_depositor: Amount,
    pub fungible_to_depositor: Amount,
    pub native_fee: Amount,
    pub fungible_fee: Amount,
}

/// The operator swept accrued fees
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeesWithdrawn {
    pub operator: AccountId,
    pub asset_id: AssetId,
    pub native_amount: Amount,
    pub fungible_amount: Amount,
}

/// Enum wrapper for all contract events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    LockCreated(LockCreated),
    LockReleased(LockReleased),
    FeesWithdrawn(FeesWithdrawn),
}
