//! Imports the remote dataset of product sales, replacing the stored transactions.

mod endpoint;
mod job;
mod sanitize;

pub use endpoint::initialize_database;
pub use job::{replace_all_transactions, sanitize_all};
pub use sanitize::{defaults, sanitize_transaction};
