//! A reporting web app for product sale transactions.
//!
//! The library imports a remote JSON dataset of transactions into SQLite and
//! serves a JSON API for listing, searching and summarising them, plus a
//! server-rendered dashboard that shows a filterable table and two charts.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod access;
mod app_state;
mod config;
mod dashboard;
mod db;
mod endpoints;
mod error;
mod html;
mod import;
mod logging;
mod pagination;
mod params;
mod report;
mod routing;
#[cfg(test)]
mod test_utils;
mod transaction;

pub use access::AccessConfig;
pub use app_state::AppState;
pub use config::{AppConfig, DEFAULT_IMPORT_URL};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use import::{defaults, replace_all_transactions, sanitize_all, sanitize_transaction};
pub use logging::logging_middleware;
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use transaction::Transaction;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
