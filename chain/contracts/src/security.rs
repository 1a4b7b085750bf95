//! Access control for operator-only operations

use serde::{Deserialize, Serialize};
use types::ids::AccountId;

/// Operator access control.
///
/// The operator is fixed at construction; there is no role transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    operator: AccountId,
}

impl AccessControl {
    pub fn new(operator: AccountId) -> Self {
        Self { operator }
    }

    /// Check if a caller is the operator.
    pub fn is_operator(&self, caller: &AccountId) -> bool {
        self.operator == *caller
    }

    /// Get the operator identifier.
    pub fn operator(&self) -> &AccountId {
        &self.operator
    }
}
