mod account;
mod customer;
mod history;
mod money;
mod policy;
mod transaction;

pub use account::*;
pub use customer::*;
pub use history::*;
pub use money::*;
pub use policy::*;
pub use transaction::*;
