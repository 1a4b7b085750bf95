//! Lock record types
//!
//! A lock record is one slot in a depositor's append-only lock sequence.
//! Releasing a lock overwrites the slot with `LockRecord::default()` (the
//! Empty form) so the index stays addressable but can never be reused.

use serde::{Deserialize, Serialize};

use crate::ids::AssetId;
use crate::numeric::{Amount, Duration, Timestamp};

/// Lifecycle state of a lock slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LockState {
    /// Never used or already released
    #[default]
    Empty,
    /// Holding custody until release
    Active,
}

/// One time-locked deposit
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LockRecord {
    pub native_amount: Amount,
    pub fungible_amount: Amount,
    /// Stored verbatim even when `fungible_amount` is zero; `None` only in the Empty form
    pub asset_id: Option<AssetId>,
    pub created_at: Timestamp,
    pub matures_at: Timestamp,
    pub state: LockState,
}

impl LockRecord {
    /// Build an Active record. Returns `None` if `created_at + duration` overflows.
    pub fn active(
        native_amount: Amount,
        fungible_amount: Amount,
        asset_id: AssetId,
        created_at: Timestamp,
        duration: Duration,
    ) -> Option<Self> {
        let matures_at = created_at.checked_add(duration)?;
        Some(Self {
            native_amount,
            fungible_amount,
            asset_id: Some(asset_id),
            created_at,
            matures_at,
            state: LockState::Active,
        })
    }

    pub fn is_active(&self) -> bool {
        self.state == LockState::Active
    }

    /// Release is allowed from `matures_at` onwards, inclusive
    pub fn is_matured(&self, now: Timestamp) -> bool {
        now >= self.matures_at
    }

    /// Both amounts are zero. The two amounts live in separate assets and
    /// are never summed.
    pub fn holds_nothing(&self) -> bool {
        self.native_amount == 0 && self.fungible_amount == 0
    }

    /// Duration the record was locked for
    pub fn duration(&self) -> Duration {
        self.matures_at.saturating_sub(self.created_at)
    }
}
