use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::domain::{
    format_cents, Account, AccountNumber, CheckingLimits, Cents, Customer, CustomerId, Entry,
    EntryKind, Person, Transaction, TransactionError,
};
use crate::storage::Registry;

use super::{AppError, BankConfig};

/// Application service providing high-level banking operations.
/// This is the primary interface for any client (shell, tests, etc.).
pub struct BankService {
    registry: Registry,
    limits: CheckingLimits,
}

/// Result of a deposit or withdrawal
#[derive(Debug, Clone)]
pub struct OperationResult {
    pub entry: Entry,
    pub account: AccountNumber,
    pub balance: Cents,
}

/// Account statement: every recorded operation plus the current balance
#[derive(Debug, Clone, Serialize)]
pub struct Statement {
    pub agency: String,
    pub number: AccountNumber,
    pub holder: String,
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<Entry>,
    pub total_deposits: Cents,
    pub total_withdrawals: Cents,
    pub balance: Cents,
}

/// One line of the account listing
#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    pub agency: String,
    pub number: AccountNumber,
    pub holder: String,
    pub kind: String,
    pub balance: Cents,
    pub withdrawals_made: usize,
    pub max_withdrawals: Option<u32>,
}

/// One line of the customer listing
#[derive(Debug, Clone, Serialize)]
pub struct CustomerSummary {
    pub id: CustomerId,
    pub name: String,
    pub tax_id: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub address: String,
    pub accounts: Vec<AccountNumber>,
}

impl BankService {
    /// Create a service whose new accounts use the limits from `config`.
    pub fn new(config: BankConfig) -> Result<Self, AppError> {
        let limits = config.checking_limits()?;
        tracing::debug!(
            withdrawal_limit = %format_cents(limits.withdrawal_limit()),
            max_withdrawals = limits.max_daily_withdrawals(),
            window = %limits.window(),
            "bank service configured"
        );
        Ok(Self {
            registry: Registry::new(),
            limits,
        })
    }

    pub fn limits(&self) -> &CheckingLimits {
        &self.limits
    }

    // ========================
    // Customer operations
    // ========================

    /// Register an individual customer. The tax id must be digits only and
    /// unique in the bank.
    pub fn register_customer(
        &mut self,
        name: String,
        birth_date: NaiveDate,
        tax_id: String,
        address: String,
    ) -> Result<CustomerSummary, AppError> {
        if tax_id.is_empty() || !tax_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::InvalidTaxId(tax_id));
        }
        if self.registry.customer_by_tax_id(&tax_id).is_some() {
            return Err(AppError::CustomerAlreadyExists(tax_id));
        }

        let customer = Customer::new(address).with_person(Person {
            name,
            birth_date,
            tax_id: tax_id.clone(),
        });
        let id = self.registry.insert_customer(customer);
        tracing::info!(customer = %id, "customer registered");

        self.get_customer(&tax_id).map(summarize_customer)
    }

    /// Get a customer by tax id.
    pub fn get_customer(&self, tax_id: &str) -> Result<&Customer, AppError> {
        self.registry
            .customer_by_tax_id(tax_id)
            .ok_or_else(|| AppError::CustomerNotFound(tax_id.to_string()))
    }

    /// List customers in registration order.
    pub fn list_customers(&self) -> Vec<CustomerSummary> {
        self.registry
            .customers()
            .iter()
            .map(summarize_customer)
            .collect()
    }

    // ========================
    // Account operations
    // ========================

    /// Open a checking account for the customer with the next free number.
    pub fn open_account(&mut self, tax_id: &str) -> Result<AccountSummary, AppError> {
        let owner = self.get_customer(tax_id)?.id();
        let number = self.registry.next_account_number();
        let account = Account::create(owner, number, self.limits);

        let customer = self.customer_mut(owner, tax_id)?;
        customer.add_account(account);
        tracing::info!(customer = %owner, account = number, "account opened");

        let customer = self.get_customer(tax_id)?;
        let account = customer
            .account(number)
            .ok_or_else(|| AppError::NoAccounts(tax_id.to_string()))?;
        Ok(summarize_account(customer, account))
    }

    /// List every account in the bank, ordered by number.
    pub fn list_accounts(&self) -> Vec<AccountSummary> {
        self.registry
            .accounts()
            .into_iter()
            .filter_map(|account| {
                self.registry
                    .customer(account.owner())
                    .map(|customer| summarize_account(customer, account))
            })
            .collect()
    }

    /// Deposit into one of the customer's accounts (the first one when
    /// `account` is `None`).
    pub fn deposit(
        &mut self,
        tax_id: &str,
        account: Option<AccountNumber>,
        amount: Cents,
    ) -> Result<OperationResult, AppError> {
        self.perform(tax_id, account, Transaction::deposit(amount))
    }

    /// Withdraw from one of the customer's accounts (the first one when
    /// `account` is `None`).
    pub fn withdraw(
        &mut self,
        tax_id: &str,
        account: Option<AccountNumber>,
        amount: Cents,
    ) -> Result<OperationResult, AppError> {
        self.perform(tax_id, account, Transaction::withdrawal(amount))
    }

    /// Build the statement for one of the customer's accounts.
    pub fn statement(
        &self,
        tax_id: &str,
        account: Option<AccountNumber>,
    ) -> Result<Statement, AppError> {
        let customer = self.get_customer(tax_id)?;
        let number = select_account(customer, tax_id, account)?;
        let account = customer
            .account(number)
            .ok_or(TransactionError::UnknownAccount(number))?;
        let history = account.history();

        Ok(Statement {
            agency: account.agency().to_string(),
            number: account.number(),
            holder: customer.display_name(),
            generated_at: Utc::now(),
            entries: history.entries().to_vec(),
            total_deposits: history.total(EntryKind::Deposit),
            total_withdrawals: history.total(EntryKind::Withdrawal),
            balance: account.balance(),
        })
    }

    fn perform(
        &mut self,
        tax_id: &str,
        account: Option<AccountNumber>,
        transaction: Transaction,
    ) -> Result<OperationResult, AppError> {
        let customer = self.get_customer(tax_id)?;
        let number = select_account(customer, tax_id, account)?;
        let owner = customer.id();

        let customer = self.customer_mut(owner, tax_id)?;
        let entry = customer.perform(number, transaction)?;
        let balance = customer
            .account(number)
            .map(|a| a.balance())
            .ok_or(TransactionError::UnknownAccount(number))?;

        Ok(OperationResult {
            entry,
            account: number,
            balance,
        })
    }

    fn customer_mut(&mut self, id: CustomerId, tax_id: &str) -> Result<&mut Customer, AppError> {
        self.registry
            .customer_mut(id)
            .ok_or_else(|| AppError::CustomerNotFound(tax_id.to_string()))
    }
}

/// Pick the requested account, or the customer's first one.
fn select_account(
    customer: &Customer,
    tax_id: &str,
    requested: Option<AccountNumber>,
) -> Result<AccountNumber, AppError> {
    match requested {
        Some(number) => Ok(number),
        None => customer
            .accounts()
            .first()
            .map(|a| a.number())
            .ok_or_else(|| AppError::NoAccounts(tax_id.to_string())),
    }
}

fn summarize_customer(customer: &Customer) -> CustomerSummary {
    let person = customer.person();
    CustomerSummary {
        id: customer.id(),
        name: customer.display_name(),
        tax_id: person.map(|p| p.tax_id.clone()),
        birth_date: person.map(|p| p.birth_date),
        address: customer.address().to_string(),
        accounts: customer.accounts().iter().map(|a| a.number()).collect(),
    }
}

fn summarize_account(customer: &Customer, account: &Account) -> AccountSummary {
    let limits = account.kind().limits();
    let since = limits.and_then(|l| l.window().start(Utc::now()));
    AccountSummary {
        agency: account.agency().to_string(),
        number: account.number(),
        holder: customer.display_name(),
        kind: account.kind().as_str().to_string(),
        balance: account.balance(),
        withdrawals_made: account
            .history()
            .count_since(EntryKind::Withdrawal, since),
        max_withdrawals: limits.map(|l| l.max_daily_withdrawals()),
    }
}
