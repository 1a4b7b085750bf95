//! Fee rate and release split
//!
//! The configured rate is the share of every released amount that goes back
//! to the depositor. The operator keeps the exact complement, so the floor
//! remainder of the percentage always lands with the operator and nothing
//! is lost to rounding.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::TypeError;
use crate::numeric::Amount;

/// Percentage of a released amount paid to the depositor (0..=100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct FeeRate(u8);

impl FeeRate {
    /// Upper bound of the percentage scale
    pub const MAX_PERCENT: u8 = 100;

    /// Create a rate, rejecting anything above 100
    pub fn new(depositor_percent: u8) -> Result<Self, TypeError> {
        if depositor_percent > Self::MAX_PERCENT {
            return Err(TypeError::InvalidFeeRate {
                rate: depositor_percent,
            });
        }
        Ok(Self(depositor_percent))
    }

    /// Depositor share in percent
    pub fn depositor_percent(&self) -> u8 {
        self.0
    }

    /// Operator share in percent
    pub fn operator_percent(&self) -> u8 {
        Self::MAX_PERCENT - self.0
    }

    /// Split `total` into depositor and operator shares.
    ///
    /// `depositor = floor(total * rate / 100)` computed as
    /// `(total / 100) * rate + (total % 100) * rate / 100`, which is exact
    /// and cannot overflow for any `u128` total.
    pub fn split(&self, total: Amount) -> FeeSplit {
        let rate = Amount::from(self.0);
        let scale = Amount::from(Self::MAX_PERCENT);
        let depositor = (total / scale) * rate + (total % scale) * rate / scale;
        FeeSplit {
            depositor,
            operator: total - depositor,
        }
    }
}

impl TryFrom<u8> for FeeRate {
    type Error = TypeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FeeRate> for u8 {
    fn from(rate: FeeRate) -> Self {
        rate.0
    }
}

impl fmt::Display for FeeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Result of applying a fee rate to one released amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeeSplit {
    /// Paid out to the depositor
    pub depositor: Amount,
    /// Accrued to the operator
    pub operator: Amount,
}

impl FeeSplit {
    /// Sum of both shares; always equals the amount that was split
    pub fn total(&self) -> Amount {
        self.depositor + self.operator
    }
}
