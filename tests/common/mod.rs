// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use teller::application::{BankConfig, BankService};
use teller::domain::{Account, CheckingLimits, Customer};

/// Helper to create a service with the default limits
pub fn test_service() -> Result<BankService> {
    Ok(BankService::new(BankConfig::default())?)
}

/// Helper to parse a date string into a NaiveDate
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Customer with one default checking account numbered 1
pub fn customer_with_checking() -> Customer {
    let mut customer = Customer::new("Rua Augusta, 100 - Centro - Sao Paulo/SP");
    let account = Account::create(customer.id(), 1, CheckingLimits::default());
    customer.add_account(account);
    customer
}

/// Test fixture: standard customers
pub struct StandardCustomers;

impl StandardCustomers {
    pub const ANA: &'static str = "11122233344";
    pub const BRUNO: &'static str = "55566677788";

    /// Register Ana and Bruno without accounts
    pub fn register(service: &mut BankService) -> Result<()> {
        service.register_customer(
            "Ana Lima".into(),
            parse_date("1990-04-12"),
            Self::ANA.into(),
            "Rua A, 1 - Centro - Recife/PE".into(),
        )?;
        service.register_customer(
            "Bruno Costa".into(),
            parse_date("1982-11-30"),
            Self::BRUNO.into(),
            "Av. B, 200 - Boa Vista - Recife/PE".into(),
        )?;
        Ok(())
    }

    /// Register both customers and open one account for Ana funded with `amount`
    pub fn with_funded_account(service: &mut BankService, amount: i64) -> Result<()> {
        Self::register(service)?;
        service.open_account(Self::ANA)?;
        service.deposit(Self::ANA, None, amount)?;
        Ok(())
    }
}
