//! TimeLock — deposit-and-lock, release and operator fee withdrawal
//!
//! Every public operation takes `&mut self`, so operations are serialized
//! by construction and each one either commits completely or returns an
//! error with no observable change. Operations follow the same order:
//!
//! 1. Validate against current state (no mutation)
//! 2. Prepare new fee and custody balances with checked arithmetic
//! 3. Perform the external transfer (last fallible step)
//! 4. Commit registry, fee and custody updates and emit the event

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use types::fee::FeeRate;
use types::ids::{AccountId, AssetId};
use types::lock::LockRecord;
use types::numeric::{Amount, Duration};

use crate::adapter::TransferAdapter;
use crate::clock::Clock;
use crate::config::TimeLockConfig;
use crate::custody::CustodyLedger;
use crate::errors::{ConfigError, CustodyError, LockError, SnapshotError, WithdrawError};
use crate::events::{ContractEvent, FeesWithdrawn, LockCreated, LockReleased};
use crate::fees::FeeAccounting;
use crate::registry::LockRegistry;
use crate::security::AccessControl;
use crate::snapshot::{EngineState, Snapshot};

/// Amounts paid to the depositor by a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Released {
    pub native: Amount,
    pub fungible: Amount,
}

/// Time-lock custody engine.
///
/// Generic over the asset boundary `A` and the time source `C` so the same
/// state machine runs against a real ledger or an in-memory fake.
#[derive(Debug)]
pub struct TimeLock<A, C> {
    access_control: AccessControl,
    allow_empty_locks: bool,
    registry: LockRegistry,
    fees: FeeAccounting,
    custody: CustodyLedger,
    adapter: A,
    clock: C,
    /// Emitted events log (append-only)
    events: Vec<ContractEvent>,
}

impl<A: TransferAdapter, C: Clock> TimeLock<A, C> {
    /// Create an engine from a validated configuration.
    ///
    /// `initial_native_balance` is treated as operator-owned: it is held in
    /// custody and credited to the native fee accrual.
    pub fn new(config: TimeLockConfig, adapter: A, clock: C) -> Result<Self, ConfigError> {
        let rate = config.fee_rate()?;
        let endowment = config.initial_native_balance;

        info!(
            operator = %config.operator,
            fee_rate = %rate,
            initial_native_balance = %endowment,
            allow_empty_locks = config.allow_empty_locks,
            "TimeLock initialized"
        );

        Ok(Self {
            access_control: AccessControl::new(config.operator),
            allow_empty_locks: config.allow_empty_locks,
            registry: LockRegistry::new(),
            fees: FeeAccounting::with_native_endowment(rate, endowment),
            custody: CustodyLedger::with_native_endowment(endowment),
            adapter,
            clock,
            events: Vec::new(),
        })
    }

    /// Resume from a snapshot after checking version, hash, lock slots and custody.
    pub fn restore(snapshot: Snapshot, adapter: A, clock: C) -> Result<Self, SnapshotError> {
        snapshot.verify()?;
        let state = snapshot.state;

        info!(
            operator = %state.access_control.operator(),
            fee_rate = %state.fees.rate(),
            "TimeLock restored from snapshot"
        );

        Ok(Self {
            access_control: state.access_control,
            allow_empty_locks: state.allow_empty_locks,
            registry: state.registry,
            fees: state.fees,
            custody: state.custody,
            adapter,
            clock,
            events: Vec::new(),
        })
    }

    // ───────────────────────── Lock ─────────────────────────

    /// Lock `fungible_amount` of `asset` plus the attached `native_amount`
    /// for `duration` seconds. Returns the new lock's index.
    ///
    /// The native value is assumed to have arrived with the call.
    pub fn deposit_and_lock(
        &mut self,
        caller: AccountId,
        fungible_amount: Amount,
        duration: Duration,
        asset: AssetId,
        native_amount: Amount,
    ) -> Result<usize, LockError> {
        let result = self.try_deposit_and_lock(caller, fungible_amount, duration, asset, native_amount);
        if let Err(e) = &result {
            warn!(account = %caller, error = %e, "Lock rejected");
        }
        result
    }

    fn try_deposit_and_lock(
        &mut self,
        caller: AccountId,
        fungible_amount: Amount,
        duration: Duration,
        asset: AssetId,
        native_amount: Amount,
    ) -> Result<usize, LockError> {
        if !self.allow_empty_locks && native_amount == 0 && fungible_amount == 0 {
            return Err(LockError::EmptyDeposit);
        }

        if fungible_amount > 0 {
            let available = self.adapter.balance_of(&caller, &asset);
            if available < fungible_amount {
                return Err(LockError::InsufficientFunds {
                    asset,
                    required: fungible_amount,
                    available,
                });
            }
            let approved = self.adapter.allowance(&caller, &asset);
            if approved < fungible_amount {
                return Err(LockError::InsufficientAllowance {
                    asset,
                    required: fungible_amount,
                    approved,
                });
            }
        }

        let now = self.clock.now();
        let record = LockRecord::active(native_amount, fungible_amount, asset.clone(), now, duration)
            .ok_or(LockError::Overflow)?;
        let matures_at = record.matures_at;
        let custody = self
            .custody
            .prepare_deposit(native_amount, &asset, fungible_amount)?;

        if fungible_amount > 0 {
            self.adapter.pull_fungible(&caller, &asset, fungible_amount)?;
        }

        self.custody.apply(custody);
        let index = self.registry.append(caller, record);

        info!(
            account = %caller,
            index,
            asset = %asset,
            fungible_amount = %fungible_amount,
            native_amount = %native_amount,
            duration,
            matures_at,
            "Lock created"
        );

        self.events.push(ContractEvent::LockCreated(LockCreated {
            account_id: caller,
            asset_id: asset,
            fungible_amount,
            native_amount,
            duration,
            matures_at,
            index,
        }));

        Ok(index)
    }

    // ───────────────────────── Release ─────────────────────────

    /// Release a matured lock of `caller`, paying the depositor share and
    /// accruing the remainder to the operator.
    pub fn release(&mut self, caller: AccountId, index: usize) -> Result<Released, LockError> {
        let result = self.try_release(caller, index);
        if let Err(e) = &result {
            warn!(account = %caller, index, error = %e, "Release rejected");
        }
        result
    }

    fn try_release(&mut self, caller: AccountId, index: usize) -> Result<Released, LockError> {
        let now = self.clock.now();
        let record = self.registry.get_active(&caller, index)?;

        if !record.is_matured(now) {
            return Err(LockError::StillLocked {
                matures_at: record.matures_at,
                now,
            });
        }
        if record.holds_nothing() {
            return Err(LockError::NothingToRelease { index });
        }

        // Active records always carry the asset they were created with
        let asset = record
            .asset_id
            .clone()
            .ok_or(LockError::InvalidIndex { index })?;
        let split = self.fees.compute_split(record);
        let accrual = self.fees.prepare_accrual(&asset, &split)?;
        let custody = self
            .custody
            .prepare_release(&split.native, &asset, &split.fungible)?;

        self.adapter
            .push(&caller, split.native.depositor, split.fungible.depositor, &asset)?;

        self.registry.clear(&caller, index)?;
        self.fees.apply(accrual);
        self.custody.apply(custody);

        let released = Released {
            native: split.native.depositor,
            fungible: split.fungible.depositor,
        };

        info!(
            account = %caller,
            index,
            asset = %asset,
            native_to_depositor = %released.native,
            fungible_to_depositor = %released.fungible,
            native_fee = %split.native.operator,
            fungible_fee = %split.fungible.operator,
            "Lock released"
        );

        self.events.push(ContractEvent::LockReleased(LockReleased {
            account_id: caller,
            index,
            asset_id: asset,
            native_to_depositor: released.native,
            fungible_to_depositor: released.fungible,
            native_fee: split.native.operator,
            fungible_fee: split.fungible.operator,
        }));

        Ok(released)
    }

    // ───────────────────────── Operator ─────────────────────────

    /// Withdraw accrued fees. Operator-only; partial amounts allowed.
    pub fn withdraw(
        &mut self,
        caller: AccountId,
        native_amount: Amount,
        fungible_amount: Amount,
        asset: AssetId,
    ) -> Result<(), WithdrawError> {
        let result = self.try_withdraw(caller, native_amount, fungible_amount, asset);
        if let Err(e) = &result {
            warn!(caller = %caller, error = %e, "Fee withdrawal rejected");
        }
        result
    }

    fn try_withdraw(
        &mut self,
        caller: AccountId,
        native_amount: Amount,
        fungible_amount: Amount,
        asset: AssetId,
    ) -> Result<(), WithdrawError> {
        if !self.access_control.is_operator(&caller) {
            return Err(WithdrawError::NotAuthorized);
        }

        let accrual = self
            .fees
            .prepare_withdrawal(native_amount, &asset, fungible_amount)?;
        let custody = self
            .custody
            .prepare_sweep(native_amount, &asset, fungible_amount)?;

        self.adapter
            .push(&caller, native_amount, fungible_amount, &asset)?;

        self.fees.apply(accrual);
        self.custody.apply(custody);

        info!(
            operator = %caller,
            asset = %asset,
            native_amount = %native_amount,
            fungible_amount = %fungible_amount,
            "Fees withdrawn"
        );

        self.events.push(ContractEvent::FeesWithdrawn(FeesWithdrawn {
            operator: caller,
            asset_id: asset,
            native_amount,
            fungible_amount,
        }));

        Ok(())
    }

    // ───────────────────────── Queries ─────────────────────────

    /// Look up a slot by index.
    ///
    /// Released slots stay addressable and read as the Empty record, so a
    /// released index is observably never reused. Only indices past the end
    /// of the sequence fail with `InvalidIndex`; `release` still rejects
    /// Empty slots with `InvalidIndex`.
    pub fn lock(&self, account: &AccountId, index: usize) -> Result<&LockRecord, LockError> {
        self.registry
            .get(account, index)
            .ok_or(LockError::InvalidIndex { index })
    }

    /// Number of slots ever assigned to `account`; also the next index.
    pub fn lock_count(&self, account: &AccountId) -> usize {
        self.registry.next_index(account)
    }

    /// All slots of `account` in index order.
    pub fn locks_of(&self, account: &AccountId) -> &[LockRecord] {
        self.registry.locks_of(account)
    }

    pub fn fee_rate(&self) -> FeeRate {
        self.fees.rate()
    }

    pub fn operator(&self) -> &AccountId {
        self.access_control.operator()
    }

    pub fn native_accrual(&self) -> Amount {
        self.fees.native_accrual()
    }

    pub fn fungible_accrual(&self, asset: &AssetId) -> Amount {
        self.fees.fungible_accrual(asset)
    }

    pub fn fungible_accruals(&self) -> &BTreeMap<AssetId, Amount> {
        self.fees.fungible_accruals()
    }

    pub fn held_native(&self) -> Amount {
        self.custody.held_native()
    }

    pub fn held_fungible(&self, asset: &AssetId) -> Amount {
        self.custody.held_fungible(asset)
    }

    pub fn custody(&self) -> &CustodyLedger {
        &self.custody
    }

    /// Recompute the conservation identity for every asset.
    pub fn verify_custody(&self) -> Result<(), CustodyError> {
        debug!("Verifying custody invariant");
        self.custody.verify(&self.registry, &self.fees)
    }

    // ───────────────────────── Collaborators ─────────────────────────

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    // ───────────────────────── Events ─────────────────────────

    /// Get all emitted events.
    pub fn events(&self) -> &[ContractEvent] {
        &self.events
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<ContractEvent> {
        std::mem::take(&mut self.events)
    }

    // ───────────────────────── Persistence ─────────────────────────

    /// Capture the current state.
    pub fn snapshot(&self) -> Result<Snapshot, SnapshotError> {
        Snapshot::new(EngineState {
            access_control: self.access_control.clone(),
            allow_empty_locks: self.allow_empty_locks,
            registry: self.registry.clone(),
            fees: self.fees.clone(),
            custody: self.custody.clone(),
        })
    }
}
