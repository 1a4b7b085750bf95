//! Lock Registry — per-account, append-only lock sequences
//!
//! Each depositor owns a growable vector of slots. New locks are appended at
//! the next free index; release overwrites the slot with the Empty record.
//! Slots are never removed or compacted, so an index handed out once keeps
//! addressing the same slot forever.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use types::ids::{AccountId, AssetId};
use types::lock::LockRecord;
use types::numeric::Amount;

use crate::errors::LockError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRegistry {
    locks: BTreeMap<AccountId, Vec<LockRecord>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the next lock of `account` will receive.
    pub fn next_index(&self, account: &AccountId) -> usize {
        self.locks.get(account).map_or(0, Vec::len)
    }

    /// Append an Active record and return its index.
    pub fn append(&mut self, account: AccountId, record: LockRecord) -> usize {
        let slots = self.locks.entry(account).or_default();
        slots.push(record);
        slots.len() - 1
    }

    /// Raw slot lookup; released slots come back in their Empty form.
    pub fn get(&self, account: &AccountId, index: usize) -> Option<&LockRecord> {
        self.locks.get(account).and_then(|slots| slots.get(index))
    }

    /// Lookup that only succeeds for Active slots.
    pub fn get_active(&self, account: &AccountId, index: usize) -> Result<&LockRecord, LockError> {
        self.get(account, index)
            .filter(|record| record.is_active())
            .ok_or(LockError::InvalidIndex { index })
    }

    /// Reset a slot to the Empty form and hand back what it held.
    pub fn clear(&mut self, account: &AccountId, index: usize) -> Result<LockRecord, LockError> {
        let slot = self
            .locks
            .get_mut(account)
            .and_then(|slots| slots.get_mut(index))
            .filter(|record| record.is_active())
            .ok_or(LockError::InvalidIndex { index })?;
        Ok(std::mem::take(slot))
    }

    /// All slots of an account, Empty ones included.
    pub fn locks_of(&self, account: &AccountId) -> &[LockRecord] {
        self.locks.get(account).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate over every Active record across all accounts.
    pub fn active_records(&self) -> impl Iterator<Item = (&AccountId, &LockRecord)> {
        self.locks
            .iter()
            .flat_map(|(account, slots)| slots.iter().map(move |record| (account, record)))
            .filter(|(_, record)| record.is_active())
    }

    /// Sum of native amounts held by Active records.
    pub fn locked_native(&self) -> Option<Amount> {
        self.active_records()
            .try_fold(0 as Amount, |acc, (_, record)| acc.checked_add(record.native_amount))
    }

    /// Per-asset sum of fungible amounts held by Active records (zero amounts skipped).
    pub fn locked_fungible(&self) -> Option<BTreeMap<AssetId, Amount>> {
        let mut totals = BTreeMap::new();
        for (_, record) in self.active_records() {
            if record.fungible_amount == 0 {
                continue;
            }
            let asset = record.asset_id.clone()?;
            let total: &mut Amount = totals.entry(asset).or_default();
            *total = total.checked_add(record.fungible_amount)?;
        }
        Some(totals)
    }

    /// First slot no sequence of operations could have produced, if any.
    pub fn find_malformed(&self) -> Option<(AccountId, usize, &'static str)> {
        self.locks.iter().find_map(|(account, slots)| {
            slots
                .iter()
                .enumerate()
                .find_map(|(index, record)| malformed_reason(record).map(|r| (*account, index, r)))
        })
    }
}

fn malformed_reason(record: &LockRecord) -> Option<&'static str> {
    if !record.is_active() {
        return (*record != LockRecord::default()).then_some("empty slot carries data");
    }
    match &record.asset_id {
        None => Some("active slot has no asset"),
        Some(asset) if AssetId::try_new(asset.as_str()).is_err() => Some("invalid asset identifier"),
        Some(_) if record.matures_at < record.created_at => Some("matures before creation"),
        Some(_) => None,
    }
}
