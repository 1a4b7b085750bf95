//! Engine configuration
//!
//! Everything here is fixed for the lifetime of a `TimeLock`.

use serde::{Deserialize, Serialize};
use types::fee::FeeRate;
use types::ids::AccountId;
use types::numeric::Amount;

use crate::errors::ConfigError;

/// Depositor share when none is configured.
pub const DEFAULT_FEE_RATE_DEPOSITOR_PERCENT: u8 = 95;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeLockConfig {
    /// Percentage of each released amount paid back to the depositor.
    #[serde(default = "default_fee_rate")]
    pub fee_rate_depositor_percent: u8,
    /// Account allowed to withdraw accrued fees.
    pub operator: AccountId,
    /// Native value held at construction, owned by the operator.
    #[serde(default)]
    pub initial_native_balance: Amount,
    /// Accept locks where both amounts are zero.
    #[serde(default = "default_allow_empty_locks")]
    pub allow_empty_locks: bool,
}

fn default_fee_rate() -> u8 {
    DEFAULT_FEE_RATE_DEPOSITOR_PERCENT
}

fn default_allow_empty_locks() -> bool {
    true
}

impl TimeLockConfig {
    /// Defaults for everything but the operator.
    pub fn new(operator: AccountId) -> Self {
        Self {
            fee_rate_depositor_percent: DEFAULT_FEE_RATE_DEPOSITOR_PERCENT,
            operator,
            initial_native_balance: 0,
            allow_empty_locks: true,
        }
    }

    pub fn with_fee_rate(mut self, depositor_percent: u8) -> Self {
        self.fee_rate_depositor_percent = depositor_percent;
        self
    }

    pub fn with_initial_native_balance(mut self, amount: Amount) -> Self {
        self.initial_native_balance = amount;
        self
    }

    pub fn with_empty_locks(mut self, allow: bool) -> Self {
        self.allow_empty_locks = allow;
        self
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fee_rate().map(|_| ())
    }

    pub fn fee_rate(&self) -> Result<FeeRate, ConfigError> {
        Ok(FeeRate::new(self.fee_rate_depositor_percent)?)
    }
}
