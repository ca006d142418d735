use serde::{Deserialize, Serialize};

use crate::domain::{
    CheckingLimits, Cents, LimitsError, WithdrawalWindow, DEFAULT_MAX_WITHDRAWALS,
    DEFAULT_WITHDRAWAL_LIMIT,
};

/// Settings applied to every account the service opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankConfig {
    pub withdrawal_limit: Cents,
    pub max_withdrawals: u32,
    pub withdrawal_window: WithdrawalWindow,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            withdrawal_limit: DEFAULT_WITHDRAWAL_LIMIT,
            max_withdrawals: DEFAULT_MAX_WITHDRAWALS,
            withdrawal_window: WithdrawalWindow::Lifetime,
        }
    }
}

impl BankConfig {
    /// Validate into the limits handed to new checking accounts.
    pub fn checking_limits(&self) -> Result<CheckingLimits, LimitsError> {
        Ok(CheckingLimits::new(self.withdrawal_limit, self.max_withdrawals)?
            .with_window(self.withdrawal_window))
    }
}
