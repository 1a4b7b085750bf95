//! Transfer Adapter — boundary to the asset ledgers
//!
//! The engine never moves assets itself. Fungible deposits are pulled from
//! the depositor through the adapter, and every payout (release or fee
//! sweep) is pushed through it. Native inbound value arrives bundled with
//! the triggering call and is not routed through the adapter.
//!
//! `InMemoryAssetLedger` is a deterministic implementation backed by
//! in-process balances and allowances, used by tests and simulations.

use std::collections::BTreeMap;
use tracing::debug;
use types::ids::{AccountId, AssetId};
use types::numeric::Amount;

use crate::errors::TransferError;

const NATIVE: &str = "native";

/// Capability for moving assets into and out of custody.
pub trait TransferAdapter {
    /// Fungible balance of `owner`.
    fn balance_of(&self, owner: &AccountId, asset: &AssetId) -> Amount;

    /// Amount `owner` has authorized the engine to pull.
    fn allowance(&self, owner: &AccountId, asset: &AssetId) -> Amount;

    /// Move `amount` of `asset` from `from` into custody.
    fn pull_fungible(
        &mut self,
        from: &AccountId,
        asset: &AssetId,
        amount: Amount,
    ) -> Result<(), TransferError>;

    /// Move assets out of custody to `to`. Zero amounts are no-ops.
    fn push(
        &mut self,
        to: &AccountId,
        native_amount: Amount,
        fungible_amount: Amount,
        asset: &AssetId,
    ) -> Result<(), TransferError>;
}

/// In-process asset ledger with balances, allowances and engine custody.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryAssetLedger {
    native: BTreeMap<AccountId, Amount>,
    fungible: BTreeMap<(AccountId, AssetId), Amount>,
    allowances: BTreeMap<(AccountId, AssetId), Amount>,
    custody_native: Amount,
    custody_fungible: BTreeMap<AssetId, Amount>,
    rejected_push: Option<String>,
}

impl InMemoryAssetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue fungible units to `owner`.
    pub fn mint(&mut self, owner: AccountId, asset: &AssetId, amount: Amount) {
        let balance = self.fungible.entry((owner, asset.clone())).or_default();
        *balance = balance.saturating_add(amount);
    }

    /// Set the engine's allowance over `owner`'s units.
    pub fn approve(&mut self, owner: AccountId, asset: &AssetId, amount: Amount) {
        self.allowances.insert((owner, asset.clone()), amount);
    }

    /// Give `owner` native value to attach to calls.
    pub fn fund_native(&mut self, owner: AccountId, amount: Amount) {
        let balance = self.native.entry(owner).or_default();
        *balance = balance.saturating_add(amount);
    }

    /// Move native value from `from` into custody, as a value-carrying call would.
    pub fn attach_native(&mut self, from: &AccountId, amount: Amount) -> Result<(), TransferError> {
        let available = self.native_balance(from);
        if available < amount {
            return Err(TransferError::InsufficientFunds {
                asset: NATIVE.to_string(),
                required: amount,
                available,
            });
        }
        self.custody_native = self
            .custody_native
            .checked_add(amount)
            .ok_or(TransferError::Overflow)?;
        self.native.insert(*from, available - amount);
        Ok(())
    }

    /// Native value held by custody from outside any call (construction endowment).
    pub fn endow_custody(&mut self, amount: Amount) {
        self.custody_native = self.custody_native.saturating_add(amount);
    }

    /// Fail the next `push` with `reason`, leaving all balances untouched.
    pub fn reject_next_push(&mut self, reason: impl Into<String>) {
        self.rejected_push = Some(reason.into());
    }

    /// Drop a pending rejection that no `push` has consumed yet.
    pub fn cancel_rejected_push(&mut self) {
        self.rejected_push = None;
    }

    pub fn native_balance(&self, owner: &AccountId) -> Amount {
        self.native.get(owner).copied().unwrap_or(0)
    }

    pub fn custody_native(&self) -> Amount {
        self.custody_native
    }

    pub fn custody_fungible(&self, asset: &AssetId) -> Amount {
        self.custody_fungible.get(asset).copied().unwrap_or(0)
    }
}

impl TransferAdapter for InMemoryAssetLedger {
    fn balance_of(&self, owner: &AccountId, asset: &AssetId) -> Amount {
        self.fungible
            .get(&(*owner, asset.clone()))
            .copied()
            .unwrap_or(0)
    }

    fn allowance(&self, owner: &AccountId, asset: &AssetId) -> Amount {
        self.allowances
            .get(&(*owner, asset.clone()))
            .copied()
            .unwrap_or(0)
    }

    fn pull_fungible(
        &mut self,
        from: &AccountId,
        asset: &AssetId,
        amount: Amount,
    ) -> Result<(), TransferError> {
        if amount == 0 {
            return Ok(());
        }

        let available = self.balance_of(from, asset);
        if available < amount {
            return Err(TransferError::InsufficientFunds {
                asset: asset.to_string(),
                required: amount,
                available,
            });
        }
        let approved = self.allowance(from, asset);
        if approved < amount {
            return Err(TransferError::InsufficientAllowance {
                asset: asset.to_string(),
                required: amount,
                approved,
            });
        }

        let custody = self
            .custody_fungible(asset)
            .checked_add(amount)
            .ok_or(TransferError::Overflow)?;

        let key = (*from, asset.clone());
        self.fungible.insert(key.clone(), available - amount);
        self.allowances.insert(key, approved - amount);
        self.custody_fungible.insert(asset.clone(), custody);

        debug!(from = %from, asset = %asset, amount = %amount, "Pulled fungible into custody");
        Ok(())
    }

    fn push(
        &mut self,
        to: &AccountId,
        native_amount: Amount,
        fungible_amount: Amount,
        asset: &AssetId,
    ) -> Result<(), TransferError> {
        if let Some(reason) = self.rejected_push.take() {
            return Err(TransferError::Rejected { reason });
        }

        let custody_fungible = self.custody_fungible(asset);
        if self.custody_native < native_amount || custody_fungible < fungible_amount {
            return Err(TransferError::Rejected {
                reason: "custody balance too low".to_string(),
            });
        }

        let native_after = self
            .native_balance(to)
            .checked_add(native_amount)
            .ok_or(TransferError::Overflow)?;
        let fungible_after = self
            .balance_of(to, asset)
            .checked_add(fungible_amount)
            .ok_or(TransferError::Overflow)?;

        if native_amount > 0 {
            self.custody_native -= native_amount;
            self.native.insert(*to, native_after);
        }
        if fungible_amount > 0 {
            self.custody_fungible
                .insert(asset.clone(), custody_fungible - fungible_amount);
            self.fungible.insert((*to, asset.clone()), fungible_after);
        }

        debug!(
            to = %to,
            asset = %asset,
            native_amount = %native_amount,
            fungible_amount = %fungible_amount,
            "Pushed assets out of custody"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usdt() -> AssetId {
        AssetId::new("USDT")
    }

    #[test]
    fn test_pull_moves_into_custody_and_spends_allowance() {
        let mut ledger = InMemoryAssetLedger::new();
        let alice = AccountId::new();
        ledger.mint(alice, &usdt(), 1000);
        ledger.approve(alice, &usdt(), 600);

        ledger.pull_fungible(&alice, &usdt(), 400).unwrap();

        assert_eq!(ledger.balance_of(&alice, &usdt()), 600);
        assert_eq!(ledger.allowance(&alice, &usdt()), 200);
        assert_eq!(ledger.custody_fungible(&usdt()), 400);
    }

    #[test]
    fn test_pull_checks_funds_before_allowance() {
        let mut ledger = InMemoryAssetLedger::new();
        let alice = AccountId::new();

        let result = ledger.pull_fungible(&alice, &usdt(), 1);
        assert!(matches!(result, Err(TransferError::InsufficientFunds { .. })));

        ledger.mint(alice, &usdt(), 10);
        let result = ledger.pull_fungible(&alice, &usdt(), 1);
        assert!(matches!(result, Err(TransferError::InsufficientAllowance { .. })));
    }

    #[test]
    fn test_push_pays_out_of_custody() {
        let mut ledger = InMemoryAssetLedger::new();
        let alice = AccountId::new();
        ledger.fund_native(alice, 100);
        ledger.attach_native(&alice, 100).unwrap();
        ledger.mint(alice, &usdt(), 50);
        ledger.approve(alice, &usdt(), 50);
        ledger.pull_fungible(&alice, &usdt(), 50).unwrap();

        ledger.push(&alice, 95, 45, &usdt()).unwrap();

        assert_eq!(ledger.native_balance(&alice), 95);
        assert_eq!(ledger.balance_of(&alice, &usdt()), 45);
        assert_eq!(ledger.custody_native(), 5);
        assert_eq!(ledger.custody_fungible(&usdt()), 5);
    }

    #[test]
    fn test_push_beyond_custody_rejected() {
        let mut ledger = InMemoryAssetLedger::new();
        let result = ledger.push(&AccountId::new(), 1, 0, &usdt());
        assert!(matches!(result, Err(TransferError::Rejected { .. })));
    }

    #[test]
    fn test_reject_next_push_is_one_shot() {
        let mut ledger = InMemoryAssetLedger::new();
        ledger.endow_custody(10);
        ledger.reject_next_push("recipient blocked");
        let bob = AccountId::new();

        assert_eq!(
            ledger.push(&bob, 1, 0, &usdt()),
            Err(TransferError::Rejected {
                reason: "recipient blocked".to_string()
            })
        );
        assert_eq!(ledger.native_balance(&bob), 0);
        assert!(ledger.push(&bob, 1, 0, &usdt()).is_ok());
    }

    #[test]
    fn test_cancelled_rejection_does_not_fire() {
        let mut ledger = InMemoryAssetLedger::new();
        ledger.endow_custody(10);
        ledger.reject_next_push("recipient blocked");
        ledger.cancel_rejected_push();

        assert!(ledger.push(&AccountId::new(), 1, 0, &usdt()).is_ok());
    }

    #[test]
    fn test_attach_native_requires_balance() {
        let mut ledger = InMemoryAssetLedger::new();
        let alice = AccountId::new();
        assert!(ledger.attach_native(&alice, 1).is_err());
        assert_eq!(ledger.custody_native(), 0);
    }
}
