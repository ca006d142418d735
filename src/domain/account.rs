use chrono::{DateTime, Utc};

use super::{
    format_cents, AccountPolicy, BasePolicy, CheckingLimits, CheckingPolicy, Cents, CustomerId,
    EntryKind, History, TransactionError, WithdrawalRequest,
};

pub type AccountNumber = u32;

/// Every account in this bank lives in the same branch.
pub const AGENCY: &str = "0001";

/// Withdrawal rules attached to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    Basic(BasePolicy),
    Checking(CheckingPolicy),
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Basic(_) => "basic",
            AccountKind::Checking(_) => "checking",
        }
    }

    pub fn limits(&self) -> Option<&CheckingLimits> {
        match self {
            AccountKind::Basic(_) => None,
            AccountKind::Checking(policy) => Some(policy.limits()),
        }
    }
}

impl AccountPolicy for AccountKind {
    fn authorize_withdrawal(
        &self,
        request: &WithdrawalRequest<'_>,
    ) -> Result<(), TransactionError> {
        match self {
            AccountKind::Basic(policy) => policy.authorize_withdrawal(request),
            AccountKind::Checking(policy) => policy.authorize_withdrawal(request),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Account {
    number: AccountNumber,
    agency: &'static str,
    owner: CustomerId,
    balance: Cents,
    history: History,
    kind: AccountKind,
}

impl Account {
    /// Open a checking account for `owner`. The number must come from the
    /// registry's sequential allocator.
    pub fn create(owner: CustomerId, number: AccountNumber, limits: CheckingLimits) -> Self {
        Self::with_kind(owner, number, AccountKind::Checking(CheckingPolicy::new(limits)))
    }

    /// Open an account that only enforces the base withdrawal rules.
    pub fn basic(owner: CustomerId, number: AccountNumber) -> Self {
        Self::with_kind(owner, number, AccountKind::Basic(BasePolicy))
    }

    fn with_kind(owner: CustomerId, number: AccountNumber, kind: AccountKind) -> Self {
        Self {
            number,
            agency: AGENCY,
            owner,
            balance: 0,
            history: History::new(),
            kind,
        }
    }

    pub fn number(&self) -> AccountNumber {
        self.number
    }

    pub fn agency(&self) -> &'static str {
        self.agency
    }

    pub fn owner(&self) -> CustomerId {
        self.owner
    }

    pub fn balance(&self) -> Cents {
        self.balance
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn kind(&self) -> &AccountKind {
        &self.kind
    }

    pub(crate) fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    /// Take `amount` out of the balance if the account's policy allows it.
    /// The history is left alone; recording is the transaction's job.
    pub(crate) fn withdraw(
        &mut self,
        amount: Cents,
        now: DateTime<Utc>,
    ) -> Result<(), TransactionError> {
        let request = WithdrawalRequest {
            amount,
            balance: self.balance,
            history: &self.history,
            now,
        };
        if let Err(err) = self.kind.authorize_withdrawal(&request) {
            tracing::warn!(account = self.number, %err, "withdrawal rejected");
            return Err(err);
        }

        self.balance -= amount;
        tracing::info!(
            account = self.number,
            amount = %format_cents(amount),
            balance = %format_cents(self.balance),
            "withdrawal completed"
        );
        Ok(())
    }

    pub(crate) fn deposit(&mut self, amount: Cents) -> Result<(), TransactionError> {
        if amount <= 0 {
            let err = TransactionError::InvalidAmount(EntryKind::Deposit);
            tracing::warn!(account = self.number, %err, "deposit rejected");
            return Err(err);
        }

        let Some(balance) = self.balance.checked_add(amount) else {
            let err = TransactionError::BalanceOverflow {
                balance: self.balance,
                requested: amount,
            };
            tracing::warn!(account = self.number, %err, "deposit rejected");
            return Err(err);
        };

        self.balance = balance;
        tracing::info!(
            account = self.number,
            amount = %format_cents(amount),
            balance = %format_cents(self.balance),
            "deposit completed"
        );
        Ok(())
    }
}

impl std::fmt::Display for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "agency {} account {}", self.agency, self.number)
    }
}
