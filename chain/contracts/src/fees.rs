//! Fee Accounting — release split and operator accruals
//!
//! Every release splits the native and fungible amounts independently with
//! the configured `FeeRate`. Operator shares accumulate in one native
//! accrual and one accrual per asset identifier. Accruals only grow on
//! release and only shrink on operator withdrawal.
//!
//! Mutations are two-phase: `prepare_*` validates with checked arithmetic
//! against `&self` and returns the resulting balances, `apply` commits them
//! without any possibility of failure.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use types::fee::{FeeRate, FeeSplit};
use types::ids::AssetId;
use types::lock::LockRecord;
use types::numeric::Amount;

use crate::errors::{CustodyError, WithdrawError};

/// Split of one lock record at release time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReleaseSplit {
    pub native: FeeSplit,
    pub fungible: FeeSplit,
}

/// Accrual balances after a prepared change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccrualUpdate {
    native: Amount,
    fungible: Option<(AssetId, Amount)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeAccounting {
    rate: FeeRate,
    native_accrual: Amount,
    fungible_accruals: BTreeMap<AssetId, Amount>,
}

impl FeeAccounting {
    pub fn new(rate: FeeRate) -> Self {
        Self {
            rate,
            native_accrual: 0,
            fungible_accruals: BTreeMap::new(),
        }
    }

    /// Start with a native balance already owned by the operator.
    pub fn with_native_endowment(rate: FeeRate, endowment: Amount) -> Self {
        Self {
            native_accrual: endowment,
            ..Self::new(rate)
        }
    }

    pub fn rate(&self) -> FeeRate {
        self.rate
    }

    pub fn native_accrual(&self) -> Amount {
        self.native_accrual
    }

    pub fn fungible_accrual(&self, asset: &AssetId) -> Amount {
        self.fungible_accruals.get(asset).copied().unwrap_or(0)
    }

    pub fn fungible_accruals(&self) -> &BTreeMap<AssetId, Amount> {
        &self.fungible_accruals
    }

    /// Apply the rate to both amounts of a record.
    pub fn compute_split(&self, record: &LockRecord) -> ReleaseSplit {
        ReleaseSplit {
            native: self.rate.split(record.native_amount),
            fungible: self.rate.split(record.fungible_amount),
        }
    }

    /// Accruals after crediting the operator shares of a release.
    pub fn prepare_accrual(
        &self,
        asset: &AssetId,
        split: &ReleaseSplit,
    ) -> Result<AccrualUpdate, CustodyError> {
        let native = self
            .native_accrual
            .checked_add(split.native.operator)
            .ok_or(CustodyError::Overflow)?;

        let fungible = if split.fungible.operator > 0 {
            let accrued = self
                .fungible_accrual(asset)
                .checked_add(split.fungible.operator)
                .ok_or(CustodyError::Overflow)?;
            Some((asset.clone(), accrued))
        } else {
            None
        };

        Ok(AccrualUpdate { native, fungible })
    }

    /// Accruals after an operator withdrawal; native is checked before fungible.
    pub fn prepare_withdrawal(
        &self,
        native_amount: Amount,
        asset: &AssetId,
        fungible_amount: Amount,
    ) -> Result<AccrualUpdate, WithdrawError> {
        let native = self.native_accrual.checked_sub(native_amount).ok_or(
            WithdrawError::InsufficientNativeAccrual {
                requested: native_amount,
                accrued: self.native_accrual,
            },
        )?;

        let accrued = self.fungible_accrual(asset);
        let remaining = accrued.checked_sub(fungible_amount).ok_or_else(|| {
            WithdrawError::InsufficientFungibleAccrual {
                asset: asset.clone(),
                requested: fungible_amount,
                accrued,
            }
        })?;

        let fungible = (fungible_amount > 0).then(|| (asset.clone(), remaining));
        Ok(AccrualUpdate { native, fungible })
    }

    /// Commit a prepared update.
    pub fn apply(&mut self, update: AccrualUpdate) {
        self.native_accrual = update.native;
        if let Some((asset, amount)) = update.fungible {
            self.fungible_accruals.insert(asset, amount);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accounting(rate: u8) -> FeeAccounting {
        FeeAccounting::new(FeeRate::new(rate).unwrap())
    }

    fn usdt() -> AssetId {
        AssetId::new("USDT")
    }

    fn matured_record(native: Amount, fungible: Amount) -> LockRecord {
        LockRecord::active(native, fungible, usdt(), 0, 1).unwrap()
    }

    #[test]
    fn test_compute_split_applies_rate_independently() {
        let fees = accounting(95);
        let split = fees.compute_split(&matured_record(1000, 1000));
        assert_eq!(split.native.depositor, 950);
        assert_eq!(split.native.operator, 50);
        assert_eq!(split.fungible.depositor, 950);
        assert_eq!(split.fungible.operator, 50);
    }

    #[test]
    fn test_accrual_accumulates_per_asset() {
        let mut fees = accounting(90);
        let dai = AssetId::new("DAI");

        let split = fees.compute_split(&matured_record(100, 200));
        let update = fees.prepare_accrual(&usdt(), &split).unwrap();
        fees.apply(update);

        let split = fees.compute_split(&matured_record(0, 50));
        let update = fees.prepare_accrual(&dai, &split).unwrap();
        fees.apply(update);

        assert_eq!(fees.native_accrual(), 10);
        assert_eq!(fees.fungible_accrual(&usdt()), 20);
        assert_eq!(fees.fungible_accrual(&dai), 5);
    }

    #[test]
    fn test_zero_fungible_fee_creates_no_entry() {
        let mut fees = accounting(95);
        let split = fees.compute_split(&matured_record(1000, 0));
        let update = fees.prepare_accrual(&usdt(), &split).unwrap();
        fees.apply(update);
        assert!(fees.fungible_accruals().is_empty());
        assert_eq!(fees.native_accrual(), 50);
    }

    #[test]
    fn test_accrual_overflow_is_rejected() {
        let fees = FeeAccounting::with_native_endowment(FeeRate::new(0).unwrap(), Amount::MAX);
        let split = fees.compute_split(&matured_record(1, 0));
        assert_eq!(
            fees.prepare_accrual(&usdt(), &split),
            Err(CustodyError::Overflow)
        );
    }

    #[test]
    fn test_partial_withdrawal() {
        let mut fees = FeeAccounting::with_native_endowment(FeeRate::new(95).unwrap(), 100);
        let update = fees.prepare_withdrawal(40, &usdt(), 0).unwrap();
        fees.apply(update);
        assert_eq!(fees.native_accrual(), 60);
    }

    #[test]
    fn test_withdrawal_exceeding_native_accrual() {
        let fees = FeeAccounting::with_native_endowment(FeeRate::new(95).unwrap(), 10);
        assert_eq!(
            fees.prepare_withdrawal(11, &usdt(), 0),
            Err(WithdrawError::InsufficientNativeAccrual {
                requested: 11,
                accrued: 10
            })
        );
    }

    #[test]
    fn test_withdrawal_exceeding_fungible_accrual() {
        let fees = accounting(95);
        assert_eq!(
            fees.prepare_withdrawal(0, &usdt(), 1),
            Err(WithdrawError::InsufficientFungibleAccrual {
                asset: usdt(),
                requested: 1,
                accrued: 0
            })
        );
    }
}
