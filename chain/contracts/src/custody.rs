//! Custody Ledger — what the engine actually holds
//!
//! Holdings are tracked per asset in two compartments: `locked` (backing
//! Active lock records) and `accrued` (owned by the operator). The held
//! total is their sum, so the conservation identity
//!
//! ```text
//! held == sum(Active record amounts) + fee accrual
//! ```
//!
//! reduces to `locked == registry totals` and `accrued == fee accruals`,
//! which `verify` checks for the native asset and every fungible asset.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::error;
use types::fee::FeeSplit;
use types::ids::AssetId;
use types::numeric::Amount;

use crate::errors::CustodyError;
use crate::fees::FeeAccounting;
use crate::registry::LockRegistry;

const NATIVE: &str = "native";

/// Holdings of a single asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Holdings {
    pub locked: Amount,
    pub accrued: Amount,
}

impl Holdings {
    /// Total held; construction through `CustodyLedger` guarantees no overflow.
    pub fn held(&self) -> Amount {
        self.locked.saturating_add(self.accrued)
    }

    fn checked(locked: Amount, accrued: Amount) -> Result<Self, CustodyError> {
        locked.checked_add(accrued).ok_or(CustodyError::Overflow)?;
        Ok(Self { locked, accrued })
    }

    fn lock(&self, amount: Amount) -> Result<Self, CustodyError> {
        let locked = self.locked.checked_add(amount).ok_or(CustodyError::Overflow)?;
        Self::checked(locked, self.accrued)
    }

    /// Unlock `split.total()`, of which `split.operator` stays as accrual.
    fn settle(&self, asset: &str, split: &FeeSplit) -> Result<Self, CustodyError> {
        let total = split.total();
        let locked = self
            .locked
            .checked_sub(total)
            .ok_or_else(|| CustodyError::Underflow {
                asset: asset.to_string(),
                amount: total,
                held: self.locked,
            })?;
        let accrued = self
            .accrued
            .checked_add(split.operator)
            .ok_or(CustodyError::Overflow)?;
        Self::checked(locked, accrued)
    }

    fn sweep(&self, asset: &str, amount: Amount) -> Result<Self, CustodyError> {
        let accrued = self
            .accrued
            .checked_sub(amount)
            .ok_or_else(|| CustodyError::Underflow {
                asset: asset.to_string(),
                amount,
                held: self.accrued,
            })?;
        Ok(Self {
            locked: self.locked,
            accrued,
        })
    }
}

/// Custody totals after a prepared change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustodyUpdate {
    native: Holdings,
    fungible: Option<(AssetId, Holdings)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyLedger {
    native: Holdings,
    fungible: BTreeMap<AssetId, Holdings>,
}

impl CustodyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger holding an operator-owned native endowment.
    pub fn with_native_endowment(endowment: Amount) -> Self {
        Self {
            native: Holdings {
                locked: 0,
                accrued: endowment,
            },
            fungible: BTreeMap::new(),
        }
    }

    pub fn native(&self) -> Holdings {
        self.native
    }

    pub fn fungible(&self, asset: &AssetId) -> Holdings {
        self.fungible.get(asset).copied().unwrap_or_default()
    }

    pub fn held_native(&self) -> Amount {
        self.native.held()
    }

    pub fn held_fungible(&self, asset: &AssetId) -> Amount {
        self.fungible(asset).held()
    }

    /// Totals after taking a new deposit into custody.
    pub fn prepare_deposit(
        &self,
        native_amount: Amount,
        asset: &AssetId,
        fungible_amount: Amount,
    ) -> Result<CustodyUpdate, CustodyError> {
        let native = self.native.lock(native_amount)?;
        let fungible = if fungible_amount > 0 {
            Some((asset.clone(), self.fungible(asset).lock(fungible_amount)?))
        } else {
            None
        };
        Ok(CustodyUpdate { native, fungible })
    }

    /// Totals after a release: locked drops by the full record, operator shares stay as accrual.
    pub fn prepare_release(
        &self,
        native: &FeeSplit,
        asset: &AssetId,
        fungible: &FeeSplit,
    ) -> Result<CustodyUpdate, CustodyError> {
        let native = self.native.settle(NATIVE, native)?;
        let fungible = if fungible.total() > 0 {
            Some((
                asset.clone(),
                self.fungible(asset).settle(asset.as_str(), fungible)?,
            ))
        } else {
            None
        };
        Ok(CustodyUpdate { native, fungible })
    }

    /// Totals after the operator sweeps accrued fees out of custody.
    pub fn prepare_sweep(
        &self,
        native_amount: Amount,
        asset: &AssetId,
        fungible_amount: Amount,
    ) -> Result<CustodyUpdate, CustodyError> {
        let native = self.native.sweep(NATIVE, native_amount)?;
        let fungible = if fungible_amount > 0 {
            Some((
                asset.clone(),
                self.fungible(asset).sweep(asset.as_str(), fungible_amount)?,
            ))
        } else {
            None
        };
        Ok(CustodyUpdate { native, fungible })
    }

    /// Commit a prepared update.
    pub fn apply(&mut self, update: CustodyUpdate) {
        self.native = update.native;
        if let Some((asset, holdings)) = update.fungible {
            self.fungible.insert(asset, holdings);
        }
    }

    /// Check the conservation identity against the registry and fee accounting.
    pub fn verify(&self, registry: &LockRegistry, fees: &FeeAccounting) -> Result<(), CustodyError> {
        let locked_native = registry.locked_native().ok_or(CustodyError::Overflow)?;
        check(NATIVE, "locked", self.native.locked, locked_native)?;
        check(NATIVE, "accrued", self.native.accrued, fees.native_accrual())?;

        let locked_fungible = registry.locked_fungible().ok_or(CustodyError::Overflow)?;
        let assets: BTreeSet<&AssetId> = self
            .fungible
            .keys()
            .chain(locked_fungible.keys())
            .chain(fees.fungible_accruals().keys())
            .collect();

        for asset in assets {
            let holdings = self.fungible(asset);
            let expected_locked = locked_fungible.get(asset).copied().unwrap_or(0);
            check(asset.as_str(), "locked", holdings.locked, expected_locked)?;
            check(asset.as_str(), "accrued", holdings.accrued, fees.fungible_accrual(asset))?;
        }
        Ok(())
    }
}

fn check(
    asset: &str,
    component: &'static str,
    actual: Amount,
    expected: Amount,
) -> Result<(), CustodyError> {
    if actual != expected {
        error!(asset, component, actual = %actual, expected = %expected, "Custody invariant violated");
        return Err(CustodyError::Mismatch {
            asset: asset.to_string(),
            component,
            actual,
            expected,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::fee::FeeRate;
    use types::ids::AccountId;
    use types::lock::LockRecord;

    fn usdt() -> AssetId {
        AssetId::new("USDT")
    }

    #[test]
    fn test_deposit_increases_locked() {
        let mut ledger = CustodyLedger::new();
        let update = ledger.prepare_deposit(500, &usdt(), 1000).unwrap();
        ledger.apply(update);
        assert_eq!(ledger.native().locked, 500);
        assert_eq!(ledger.fungible(&usdt()).locked, 1000);
        assert_eq!(ledger.held_fungible(&usdt()), 1000);
    }

    #[test]
    fn test_release_keeps_operator_share() {
        let mut ledger = CustodyLedger::new();
        let update = ledger.prepare_deposit(1000, &usdt(), 1000).unwrap();
        ledger.apply(update);

        let split = FeeRate::new(95).unwrap().split(1000);
        let update = ledger.prepare_release(&split, &usdt(), &split).unwrap();
        ledger.apply(update);

        assert_eq!(ledger.native(), Holdings { locked: 0, accrued: 50 });
        assert_eq!(ledger.held_native(), 50);
        assert_eq!(ledger.held_fungible(&usdt()), 50);
    }

    #[test]
    fn test_release_more_than_locked_underflows() {
        let ledger = CustodyLedger::new();
        let split = FeeRate::new(50).unwrap().split(10);
        let result = ledger.prepare_release(&split, &usdt(), &FeeSplit::default());
        assert!(matches!(result, Err(CustodyError::Underflow { .. })));
    }

    #[test]
    fn test_deposit_overflow_rejected() {
        let ledger = CustodyLedger::with_native_endowment(Amount::MAX);
        assert_eq!(
            ledger.prepare_deposit(1, &usdt(), 0),
            Err(CustodyError::Overflow)
        );
    }

    #[test]
    fn test_sweep_reduces_accrued_only() {
        let mut ledger = CustodyLedger::with_native_endowment(100);
        let update = ledger.prepare_sweep(30, &usdt(), 0).unwrap();
        ledger.apply(update);
        assert_eq!(ledger.native(), Holdings { locked: 0, accrued: 70 });
    }

    #[test]
    fn test_verify_detects_mismatch() {
        let mut registry = LockRegistry::new();
        let fees = FeeAccounting::new(FeeRate::new(95).unwrap());
        let ledger = CustodyLedger::new();

        registry.append(
            AccountId::new(),
            LockRecord::active(0, 10, usdt(), 0, 1).unwrap(),
        );

        let err = ledger.verify(&registry, &fees).unwrap_err();
        assert_eq!(
            err,
            CustodyError::Mismatch {
                asset: "USDT".to_string(),
                component: "locked",
                actual: 0,
                expected: 10,
            }
        );
    }

    #[test]
    fn test_verify_consistent_state() {
        let mut registry = LockRegistry::new();
        let fees = FeeAccounting::with_native_endowment(FeeRate::new(95).unwrap(), 7);
        let mut ledger = CustodyLedger::with_native_endowment(7);

        registry.append(
            AccountId::new(),
            LockRecord::active(3, 10, usdt(), 0, 1).unwrap(),
        );
        let update = ledger.prepare_deposit(3, &usdt(), 10).unwrap();
        ledger.apply(update);

        assert_eq!(ledger.verify(&registry, &fees), Ok(()));
    }
}
