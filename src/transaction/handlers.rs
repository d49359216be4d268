//! Route handlers for the JSON transaction listing.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    pagination::{Page, PageRequest, PaginationConfig},
};

use super::{
    core::Transaction,
    query::{ListOptions, TransactionsQuery, list_all_transactions, list_transactions},
};

/// The state needed for listing transactions.
#[derive(Debug, Clone)]
pub struct TransactionsState {
    /// The database connection for reading transactions.
    db_connection: Arc<Mutex<Connection>>,
    /// Default and maximum page sizes.
    pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// A route handler for one page of transactions filtered by month, year and search text.
pub async fn get_transactions(
    State(state): State<TransactionsState>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Json<Page<Transaction>>, Error> {
    let options = ListOptions::from_query(&query, &state.pagination_config);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    list_transactions(&options, &connection)
        .inspect_err(|error| tracing::error!("could not list transactions: {error}"))
        .map(Json)
}

/// A route handler for one page of all transactions, ignoring any filters.
pub async fn get_all_transactions(
    State(state): State<TransactionsState>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Json<Page<Transaction>>, Error> {
    let page = PageRequest::from_query(
        query.page.as_deref(),
        query.per_page.as_deref(),
        &state.pagination_config,
    );

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    list_all_transactions(page, &connection)
        .inspect_err(|error| tracing::error!("could not list all transactions: {error}"))
        .map(Json)
}
