//! Dashboard module
//!
//! Provides a page with the transactions table, the month's sales statistics
//! and charts. Includes controls for searching, filtering by month and paging.

mod charts;
mod handlers;
mod state;
mod tables;

pub use handlers::get_dashboard_page;
