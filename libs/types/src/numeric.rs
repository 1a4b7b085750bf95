//! Integer amount and time types
//!
//! Custody amounts are whole base units (wei-style), so plain unsigned
//! integers are used instead of decimals. All arithmetic on them must be
//! checked by callers.

/// Amount of an asset in its smallest indivisible unit
pub type Amount = u128;

/// Ledger timestamp in seconds
pub type Timestamp = u64;

/// Lock duration in seconds
pub type Duration = u64;
