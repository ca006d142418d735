use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Account, AccountNumber, Entry, Transaction, TransactionError};

pub type CustomerId = Uuid;

/// Identity of an individual customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub birth_date: NaiveDate,
    /// National tax id, digits only
    pub tax_id: String,
}

#[derive(Debug, Clone)]
pub struct Customer {
    id: CustomerId,
    address: String,
    person: Option<Person>,
    accounts: Vec<Account>,
}

impl Customer {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            address: address.into(),
            person: None,
            accounts: Vec::new(),
        }
    }

    pub fn with_person(mut self, person: Person) -> Self {
        self.person = Some(person);
        self
    }

    pub fn id(&self) -> CustomerId {
        self.id
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn person(&self) -> Option<&Person> {
        self.person.as_ref()
    }

    /// Name to show for this customer; falls back to the id.
    pub fn display_name(&self) -> String {
        match &self.person {
            Some(person) => person.name.clone(),
            None => self.id.to_string(),
        }
    }

    pub fn tax_id(&self) -> Option<&str> {
        self.person.as_ref().map(|p| p.tax_id.as_str())
    }

    /// Attach an account. Duplicate numbers are not checked here; the registry
    /// hands out unique ones.
    pub fn add_account(&mut self, account: Account) {
        self.accounts.push(account);
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn account(&self, number: AccountNumber) -> Option<&Account> {
        self.accounts.iter().find(|a| a.number() == number)
    }

    /// Run `transaction` against one of this customer's accounts.
    pub fn perform(
        &mut self,
        number: AccountNumber,
        transaction: Transaction,
    ) -> Result<Entry, TransactionError> {
        let account = self
            .accounts
            .iter_mut()
            .find(|a| a.number() == number)
            .ok_or(TransactionError::UnknownAccount(number))?;
        transaction.apply(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CheckingLimits, EntryKind};

    fn customer_with_account() -> Customer {
        let mut customer = Customer::new("Rua das Flores, 10 - Centro - Recife/PE");
        let account = Account::create(customer.id(), 1, CheckingLimits::default());
        customer.add_account(account);
        customer
    }

    #[test]
    fn test_new_customer_has_no_accounts() {
        let customer = Customer::new("somewhere");
        assert!(customer.accounts().is_empty());
        assert!(customer.person().is_none());
        assert_eq!(customer.display_name(), customer.id().to_string());
    }

    #[test]
    fn test_with_person() {
        let customer = Customer::new("somewhere").with_person(Person {
            name: "Maria Souza".into(),
            birth_date: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
            tax_id: "12345678900".into(),
        });

        assert_eq!(customer.display_name(), "Maria Souza");
        assert_eq!(customer.tax_id(), Some("12345678900"));
    }

    #[test]
    fn test_perform_routes_to_account() {
        let mut customer = customer_with_account();

        let entry = customer.perform(1, Transaction::deposit(20_000)).unwrap();

        assert_eq!(entry.kind, EntryKind::Deposit);
        let account = customer.account(1).unwrap();
        assert_eq!(account.balance(), 20_000);
        assert_eq!(account.history().len(), 1);
    }

    #[test]
    fn test_perform_returns_account_outcome() {
        let mut customer = customer_with_account();

        let result = customer.perform(1, Transaction::withdrawal(100));

        assert!(matches!(
            result,
            Err(TransactionError::InsufficientFunds { .. })
        ));
    }

    #[test]
    fn test_perform_unknown_account() {
        let mut customer = customer_with_account();

        assert_eq!(
            customer.perform(9, Transaction::deposit(100)),
            Err(TransactionError::UnknownAccount(9))
        );
    }

    #[test]
    fn test_add_account_keeps_order() {
        let mut customer = customer_with_account();
        customer.add_account(Account::create(customer.id(), 4, CheckingLimits::default()));

        let numbers: Vec<_> = customer.accounts().iter().map(|a| a.number()).collect();
        assert_eq!(numbers, vec![1, 4]);
    }
}
