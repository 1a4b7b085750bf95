//! Types library for the time-lock custody engine
//!
//! This library provides the value types shared by the engine and its
//! integrations, keeping arithmetic and identifiers in one frozen place.
//!
//! # Version
//! v1.0.0
//!
//! # Modules
//! - `ids`: Identifiers (AccountId, AssetId)
//! - `numeric`: Integer amount and timestamp aliases
//! - `fee`: Fee rate and depositor/operator split
//! - `lock`: Lock record and lifecycle state
//! - `errors`: Type-level validation errors

pub mod ids;
pub mod numeric;
pub mod fee;
pub mod lock;
pub mod errors;
