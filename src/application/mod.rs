// Application layer - use cases and orchestration on top of the domain and
// the in-memory registry. Every client (the shell, tests) goes through
// BankService.

pub mod config;
pub mod error;
pub mod service;

pub use config::*;
pub use error::*;
pub use service::*;
