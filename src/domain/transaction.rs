use chrono::{DateTime, Utc};
use thiserror::Error;

use super::{format_cents, Account, AccountNumber, Cents, Entry, EntryKind};

/// Why an operation was refused. None of these mutate the account.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("invalid amount for {0}")]
    InvalidAmount(EntryKind),

    #[error("insufficient funds: balance {}, requested {}", format_cents(*.balance), format_cents(*.requested))]
    InsufficientFunds { balance: Cents, requested: Cents },

    #[error("amount {} exceeds the withdrawal limit of {}", format_cents(*.requested), format_cents(*.limit))]
    WithdrawalLimitExceeded { limit: Cents, requested: Cents },

    #[error("withdrawal limit reached ({max} withdrawals)")]
    WithdrawalCountExceeded { max: u32 },

    #[error("deposit of {} would overflow the balance of {}", format_cents(*.requested), format_cents(*.balance))]
    BalanceOverflow { balance: Cents, requested: Cents },

    #[error("account {0} not found")]
    UnknownAccount(AccountNumber),
}

/// A requested operation against a single account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transaction {
    Withdrawal(Cents),
    Deposit(Cents),
}

impl Transaction {
    pub fn withdrawal(amount: Cents) -> Self {
        Transaction::Withdrawal(amount)
    }

    pub fn deposit(amount: Cents) -> Self {
        Transaction::Deposit(amount)
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Transaction::Withdrawal(_) => EntryKind::Withdrawal,
            Transaction::Deposit(_) => EntryKind::Deposit,
        }
    }

    pub fn amount(&self) -> Cents {
        match self {
            Transaction::Withdrawal(amount) | Transaction::Deposit(amount) => *amount,
        }
    }

    /// Execute against `account` and record it in the account's history.
    pub fn apply(&self, account: &mut Account) -> Result<Entry, TransactionError> {
        self.apply_at(account, Utc::now())
    }

    /// Same as [`Transaction::apply`] with an explicit clock reading.
    pub fn apply_at(
        &self,
        account: &mut Account,
        now: DateTime<Utc>,
    ) -> Result<Entry, TransactionError> {
        match *self {
            Transaction::Withdrawal(amount) => account.withdraw(amount, now)?,
            Transaction::Deposit(amount) => account.deposit(amount)?,
        }
        Ok(account
            .history_mut()
            .record(self.kind(), self.amount(), now))
    }
}
