//! Time-Lock Custody Engine
//!
//! Depositors lock a fungible asset together with native value for a chosen
//! duration. After maturity the depositor releases the lock and receives the
//! configured share of both amounts; the remainder accrues to a single
//! operator, who may withdraw accrued fees at any time.
//!
//! # Modules
//! - `timelock`: Engine entry points (lock, release, withdraw, queries)
//! - `registry`: Per-account, append-only lock slots
//! - `fees`: Release split and operator accruals
//! - `custody`: Held totals and the conservation check
//! - `adapter`: Asset transfer boundary and an in-memory ledger
//! - `clock`: Ledger time sources
//! - `config`: Engine configuration
//! - `snapshot`: Hash-protected state snapshots
//! - `events`: Emitted events
//! - `errors`: Contract-specific error types
//! - `security`: Operator access control

pub mod adapter;
pub mod clock;
pub mod config;
pub mod custody;
pub mod errors;
pub mod events;
pub mod fees;
pub mod registry;
pub mod security;
pub mod snapshot;
pub mod timelock;

pub use timelock::{Released, TimeLock};

/// Contract ABI version — frozen after release
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";
