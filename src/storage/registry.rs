use crate::domain::{Account, AccountNumber, Customer, CustomerId};

/// In-memory store of customers and the account-number allocator.
/// Lives for one run of the process.
#[derive(Debug, Default)]
pub struct Registry {
    customers: Vec<Customer>,
    last_account_number: AccountNumber,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================
    // Customer operations
    // ========================

    /// Store a new customer and return its id.
    pub fn insert_customer(&mut self, customer: Customer) -> CustomerId {
        let id = customer.id();
        tracing::debug!(customer = %id, "customer stored");
        self.customers.push(customer);
        id
    }

    pub fn customer(&self, id: CustomerId) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id() == id)
    }

    pub fn customer_mut(&mut self, id: CustomerId) -> Option<&mut Customer> {
        self.customers.iter_mut().find(|c| c.id() == id)
    }

    pub fn customer_by_tax_id(&self, tax_id: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.tax_id() == Some(tax_id))
    }

    /// Customers in registration order.
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    // ========================
    // Account operations
    // ========================

    /// Reserve the next account number. Numbers start at 1 and are never
    /// reused.
    pub fn next_account_number(&mut self) -> AccountNumber {
        self.last_account_number += 1;
        self.last_account_number
    }

    /// Every account of every customer, ordered by account number.
    pub fn accounts(&self) -> Vec<&Account> {
        let mut accounts: Vec<&Account> = self
            .customers
            .iter()
            .flat_map(|c| c.accounts().iter())
            .collect();
        accounts.sort_by_key(|a| a.number());
        accounts
    }

    pub fn account_count(&self) -> usize {
        self.customers.iter().map(|c| c.accounts().len()).sum()
    }
}
