//! Product sale transactions.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and how it is stored in SQLite
//! - Filtered and paginated listing queries
//! - The JSON route handlers for listing transactions

mod core;
mod handlers;
mod query;

pub use core::{
    SaleTimestamp, Transaction, count_transactions, create_transaction_table,
    delete_all_transactions, insert_transactions,
};
pub(crate) use core::get_count;
pub use handlers::{get_all_transactions, get_transactions};
pub use query::{ListOptions, list_all_transactions, list_transactions};

#[cfg(test)]
pub(crate) use core::test_utils;
