//! Contract-specific error types
//!
//! Every rejection is synchronous and leaves state untouched; the `Display`
//! text of each variant is the reason string surfaced to the caller.

use thiserror::Error;
use types::errors::TypeError;
use types::ids::{AccountId, AssetId};
use types::numeric::{Amount, Timestamp};

/// Failures reported by the asset transfer boundary
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransferError {
    #[error("Insufficient funds for {asset}: required {required}, available {available}")]
    InsufficientFunds {
        asset: String,
        required: Amount,
        available: Amount,
    },

    #[error("Insufficient allowance for {asset}: required {required}, approved {approved}")]
    InsufficientAllowance {
        asset: String,
        required: Amount,
        approved: Amount,
    },

    #[error("Transfer rejected: {reason}")]
    Rejected { reason: String },

    #[error("Arithmetic overflow in transfer")]
    Overflow,
}

/// Lock registry errors (deposit-and-lock, release, lookup)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LockError {
    #[error("Lock: Not enough funds of {asset}: required {required}, available {available}")]
    InsufficientFunds {
        asset: AssetId,
        required: Amount,
        available: Amount,
    },

    #[error("Lock: Not enough allowance of {asset}: required {required}, approved {approved}")]
    InsufficientAllowance {
        asset: AssetId,
        required: Amount,
        approved: Amount,
    },

    #[error("Lock: Wrong lock number {index}")]
    InvalidIndex { index: usize },

    #[error("Lock: Amount is still locked until {matures_at} (now {now})")]
    StillLocked { matures_at: Timestamp, now: Timestamp },

    #[error("Lock: Nothing to release at lock number {index}")]
    NothingToRelease { index: usize },

    #[error("Lock: Empty deposits are disabled")]
    EmptyDeposit,

    #[error("Lock: Arithmetic overflow")]
    Overflow,

    #[error("Lock: Custody error: {0}")]
    Custody(#[from] CustodyError),

    #[error("Lock: Transfer failed: {0}")]
    Transfer(#[from] TransferError),
}

/// Operator fee withdrawal errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WithdrawError {
    #[error("Withdraw: Unauthorized, caller is not the operator")]
    NotAuthorized,

    #[error("Withdraw: Not enough native fees: requested {requested}, accrued {accrued}")]
    InsufficientNativeAccrual { requested: Amount, accrued: Amount },

    #[error("Withdraw: Not enough {asset} fees: requested {requested}, accrued {accrued}")]
    InsufficientFungibleAccrual {
        asset: AssetId,
        requested: Amount,
        accrued: Amount,
    },

    #[error("Withdraw: Custody error: {0}")]
    Custody(#[from] CustodyError),

    #[error("Withdraw: Transfer failed: {0}")]
    Transfer(#[from] TransferError),
}

/// Custody ledger bookkeeping and audit errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CustodyError {
    #[error("Custody mismatch for {asset}: {component} is {actual}, expected {expected}")]
    Mismatch {
        asset: String,
        component: &'static str,
        actual: Amount,
        expected: Amount,
    },

    #[error("Custody underflow for {asset}: debit {amount}, held {held}")]
    Underflow {
        asset: String,
        amount: Amount,
        held: Amount,
    },

    #[error("Arithmetic overflow in custody totals")]
    Overflow,
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid fee rate: {0}")]
    InvalidFeeRate(#[from] TypeError),

    #[error("Config parse error: {0}")]
    Parse(String),
}

/// Snapshot persistence and restore errors
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported snapshot version: {0}")]
    UnsupportedVersion(u32),

    #[error("Integrity check failed: expected {expected}, got {actual}")]
    IntegrityFailure { expected: String, actual: String },

    #[error("Malformed lock {index} of {account}: {reason}")]
    MalformedLock {
        account: AccountId,
        index: usize,
        reason: &'static str,
    },

    #[error("Snapshot state violates custody invariant: {0}")]
    Custody(#[from] CustodyError),
}
