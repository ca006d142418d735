use thiserror::Error;

use crate::domain::{LimitsError, TransactionError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    #[error("Customer already exists: {0}")]
    CustomerAlreadyExists(String),

    #[error("Invalid tax id '{0}': use digits only")]
    InvalidTaxId(String),

    #[error("Customer {0} has no accounts")]
    NoAccounts(String),

    #[error(transparent)]
    Rejected(#[from] TransactionError),

    #[error("Invalid account limits")]
    InvalidLimits(#[from] LimitsError),
}
