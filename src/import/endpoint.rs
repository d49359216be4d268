//! The route handler that replaces the stored transactions with the remote dataset.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{AppState, Error};

use super::job::{fetch_raw_transactions, replace_all_transactions, sanitize_all};

/// The message sent after a successful import.
pub const IMPORT_SUCCESS_MESSAGE: &str = "Database initialized successfully";

/// The response body of a successful import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportResponse {
    /// A human readable summary.
    pub message: String,
}

/// The state needed for importing transactions.
#[derive(Debug, Clone)]
pub struct ImportState {
    /// The database connection for managing transactions.
    db_connection: Arc<Mutex<Connection>>,
    /// The client used to download the dataset.
    http_client: reqwest::Client,
    /// Where the dataset is downloaded from.
    import_url: String,
}

impl FromRef<AppState> for ImportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            http_client: state.http_client.clone(),
            import_url: state.import_url.clone(),
        }
    }
}

/// A route handler that downloads the dataset, sanitizes it and replaces
/// every stored transaction with it.
///
/// The download finishes before the database lock is taken.
pub async fn initialize_database(
    State(state): State<ImportState>,
) -> Result<Json<ImportResponse>, Error> {
    let start_time = std::time::Instant::now();

    let records = fetch_raw_transactions(&state.http_client, &state.import_url)
        .await
        .inspect_err(|error| {
            tracing::error!("could not fetch transactions from {}: {error}", state.import_url)
        })?;
    let transactions = sanitize_all(&records, OffsetDateTime::now_utc());

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    let imported = replace_all_transactions(&transactions, &connection)
        .inspect_err(|error| tracing::error!("could not replace transactions: {error}"))?;

    tracing::info!(
        "Imported {imported} transactions in {}ms",
        start_time.elapsed().as_millis()
    );

    Ok(Json(ImportResponse {
        message: IMPORT_SUCCESS_MESSAGE.to_owned(),
    }))
}
