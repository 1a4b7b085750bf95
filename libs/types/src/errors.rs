//! Validation errors for value types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("Invalid fee rate: {rate}% (must be between 0 and 100)")]
    InvalidFeeRate { rate: u8 },

    #[error("Invalid asset identifier: {id:?}")]
    InvalidAssetId { id: String },
}
