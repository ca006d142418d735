use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Cents, EntryKind, History, TransactionError};

/// Default per-withdrawal ceiling for checking accounts (500.00).
pub const DEFAULT_WITHDRAWAL_LIMIT: Cents = 50_000;

/// Default number of withdrawals a checking account may perform.
pub const DEFAULT_MAX_WITHDRAWALS: u32 = 3;

/// Which recorded withdrawals count toward the withdrawal cap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalWindow {
    /// Every withdrawal ever recorded on the account.
    #[default]
    Lifetime,
    /// Withdrawals recorded on the current UTC calendar day.
    Daily,
}

impl WithdrawalWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalWindow::Lifetime => "lifetime",
            WithdrawalWindow::Daily => "daily",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "lifetime" => Some(WithdrawalWindow::Lifetime),
            "daily" => Some(WithdrawalWindow::Daily),
            _ => None,
        }
    }

    /// Earliest timestamp that still counts at `now`.
    pub fn start(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            WithdrawalWindow::Lifetime => None,
            WithdrawalWindow::Daily => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .map(|midnight| midnight.and_utc()),
        }
    }
}

impl std::fmt::Display for WithdrawalWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LimitsError {
    #[error("withdrawal limit must be positive, got {0} cents")]
    NonPositiveLimit(Cents),

    #[error("maximum number of withdrawals must be positive")]
    ZeroWithdrawals,
}

/// Restrictions a checking account layers on top of the base withdrawal rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckingLimits {
    withdrawal_limit: Cents,
    max_daily_withdrawals: u32,
    window: WithdrawalWindow,
}

impl CheckingLimits {
    pub fn new(withdrawal_limit: Cents, max_daily_withdrawals: u32) -> Result<Self, LimitsError> {
        if withdrawal_limit <= 0 {
            return Err(LimitsError::NonPositiveLimit(withdrawal_limit));
        }
        if max_daily_withdrawals == 0 {
            return Err(LimitsError::ZeroWithdrawals);
        }
        Ok(Self {
            withdrawal_limit,
            max_daily_withdrawals,
            window: WithdrawalWindow::Lifetime,
        })
    }

    pub fn with_window(mut self, window: WithdrawalWindow) -> Self {
        self.window = window;
        self
    }

    pub fn withdrawal_limit(&self) -> Cents {
        self.withdrawal_limit
    }

    pub fn max_daily_withdrawals(&self) -> u32 {
        self.max_daily_withdrawals
    }

    pub fn window(&self) -> WithdrawalWindow {
        self.window
    }
}

impl Default for CheckingLimits {
    fn default() -> Self {
        Self {
            withdrawal_limit: DEFAULT_WITHDRAWAL_LIMIT,
            max_daily_withdrawals: DEFAULT_MAX_WITHDRAWALS,
            window: WithdrawalWindow::Lifetime,
        }
    }
}

/// Everything a policy may look at when deciding on a withdrawal.
#[derive(Debug, Clone, Copy)]
pub struct WithdrawalRequest<'a> {
    pub amount: Cents,
    pub balance: Cents,
    pub history: &'a History,
    pub now: DateTime<Utc>,
}

/// Decides whether a withdrawal may go ahead. Policies never mutate the
/// account; the account applies the balance change once authorized.
pub trait AccountPolicy {
    fn authorize_withdrawal(&self, request: &WithdrawalRequest<'_>)
    -> Result<(), TransactionError>;
}

/// Rules every account enforces: positive amount, enough funds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BasePolicy;

impl AccountPolicy for BasePolicy {
    fn authorize_withdrawal(
        &self,
        request: &WithdrawalRequest<'_>,
    ) -> Result<(), TransactionError> {
        if request.amount <= 0 {
            return Err(TransactionError::InvalidAmount(EntryKind::Withdrawal));
        }
        if request.amount > request.balance {
            return Err(TransactionError::InsufficientFunds {
                balance: request.balance,
                requested: request.amount,
            });
        }
        Ok(())
    }
}

/// Checks the withdrawal count and the per-withdrawal ceiling, in that order,
/// before handing the request to the inner policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckingPolicy<P = BasePolicy> {
    limits: CheckingLimits,
    inner: P,
}

impl CheckingPolicy {
    pub fn new(limits: CheckingLimits) -> Self {
        Self::wrap(limits, BasePolicy)
    }
}

impl<P: AccountPolicy> CheckingPolicy<P> {
    pub fn wrap(limits: CheckingLimits, inner: P) -> Self {
        Self { limits, inner }
    }

    pub fn limits(&self) -> &CheckingLimits {
        &self.limits
    }
}

impl<P: AccountPolicy> AccountPolicy for CheckingPolicy<P> {
    fn authorize_withdrawal(
        &self,
        request: &WithdrawalRequest<'_>,
    ) -> Result<(), TransactionError> {
        let since = self.limits.window.start(request.now);
        let performed = request.history.count_since(EntryKind::Withdrawal, since);
        if performed >= self.limits.max_daily_withdrawals as usize {
            return Err(TransactionError::WithdrawalCountExceeded {
                max: self.limits.max_daily_withdrawals,
            });
        }

        if request.amount > self.limits.withdrawal_limit {
            return Err(TransactionError::WithdrawalLimitExceeded {
                limit: self.limits.withdrawal_limit,
                requested: request.amount,
            });
        }

        self.inner.authorize_withdrawal(request)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn request(amount: Cents, balance: Cents, history: &History) -> WithdrawalRequest<'_> {
        WithdrawalRequest {
            amount,
            balance,
            history,
            now: Utc::now(),
        }
    }

    #[test]
    fn test_limits_reject_non_positive_values() {
        assert_eq!(
            CheckingLimits::new(0, 3),
            Err(LimitsError::NonPositiveLimit(0))
        );
        assert_eq!(
            CheckingLimits::new(-100, 3),
            Err(LimitsError::NonPositiveLimit(-100))
        );
        assert_eq!(
            CheckingLimits::new(50_000, 0),
            Err(LimitsError::ZeroWithdrawals)
        );
    }

    #[test]
    fn test_default_limits() {
        let limits = CheckingLimits::default();
        assert_eq!(limits.withdrawal_limit(), 50_000);
        assert_eq!(limits.max_daily_withdrawals(), 3);
        assert_eq!(limits.window(), WithdrawalWindow::Lifetime);
    }

    #[test]
    fn test_base_policy() {
        let history = History::new();
        let policy = BasePolicy;

        assert!(policy.authorize_withdrawal(&request(500, 500, &history)).is_ok());
        assert_eq!(
            policy.authorize_withdrawal(&request(0, 500, &history)),
            Err(TransactionError::InvalidAmount(EntryKind::Withdrawal))
        );
        assert_eq!(
            policy.authorize_withdrawal(&request(-5, 500, &history)),
            Err(TransactionError::InvalidAmount(EntryKind::Withdrawal))
        );
        assert_eq!(
            policy.authorize_withdrawal(&request(501, 500, &history)),
            Err(TransactionError::InsufficientFunds {
                balance: 500,
                requested: 501
            })
        );
    }

    #[test]
    fn test_checking_policy_checks_count_before_limit() {
        let mut history = History::new();
        let now = Utc::now();
        for _ in 0..3 {
            history.record(EntryKind::Withdrawal, 10, now);
        }
        let policy = CheckingPolicy::new(CheckingLimits::default());

        // Over the ceiling and over the count: the count wins.
        assert_eq!(
            policy.authorize_withdrawal(&request(60_000, 100_000, &history)),
            Err(TransactionError::WithdrawalCountExceeded { max: 3 })
        );
    }

    #[test]
    fn test_checking_policy_checks_limit_before_funds() {
        let history = History::new();
        let policy = CheckingPolicy::new(CheckingLimits::default());

        assert_eq!(
            policy.authorize_withdrawal(&request(50_001, 0, &history)),
            Err(TransactionError::WithdrawalLimitExceeded {
                limit: 50_000,
                requested: 50_001
            })
        );
        assert_eq!(
            policy.authorize_withdrawal(&request(100, 0, &history)),
            Err(TransactionError::InsufficientFunds {
                balance: 0,
                requested: 100
            })
        );
    }

    #[test]
    fn test_deposits_do_not_count_toward_cap() {
        let mut history = History::new();
        let now = Utc::now();
        for _ in 0..5 {
            history.record(EntryKind::Deposit, 10, now);
        }
        let policy = CheckingPolicy::new(CheckingLimits::default());

        assert!(policy.authorize_withdrawal(&request(10, 50, &history)).is_ok());
    }

    #[test]
    fn test_daily_window_ignores_previous_days() {
        let mut history = History::new();
        let yesterday = Utc.with_ymd_and_hms(2024, 5, 9, 18, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap();
        for _ in 0..3 {
            history.record(EntryKind::Withdrawal, 10, yesterday);
        }

        let daily = CheckingPolicy::new(
            CheckingLimits::default().with_window(WithdrawalWindow::Daily),
        );
        let lifetime = CheckingPolicy::new(CheckingLimits::default());
        let req = WithdrawalRequest {
            amount: 10,
            balance: 1_000,
            history: &history,
            now,
        };

        assert!(daily.authorize_withdrawal(&req).is_ok());
        assert_eq!(
            lifetime.authorize_withdrawal(&req),
            Err(TransactionError::WithdrawalCountExceeded { max: 3 })
        );
    }

    #[test]
    fn test_window_start() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 8, 15, 0).unwrap();
        assert_eq!(WithdrawalWindow::Lifetime.start(now), None);
        assert_eq!(
            WithdrawalWindow::Daily.start(now),
            Some(Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap())
        );
    }
}
