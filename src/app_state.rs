//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    Error, access::AccessConfig, config::AppConfig, db::initialize, pagination::PaginationConfig,
    report::local_offset, transaction::count_transactions,
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// The URL the import job fetches the dataset from.
    pub import_url: String,

    /// The HTTP client used by the import job.
    pub http_client: reqwest::Client,

    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,

    /// Authentication and request limits.
    pub access_config: AccessConfig,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized or if
    /// `config.local_timezone` is not a canonical timezone name.
    pub fn new(db_connection: Connection, config: AppConfig) -> Result<Self, Error> {
        local_offset(&config.local_timezone)?;
        initialize(&db_connection)?;

        let stored = count_transactions(&db_connection)?;
        tracing::info!("Opened database with {stored} stored transactions");

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            local_timezone: config.local_timezone,
            import_url: config.import_url,
            http_client: reqwest::Client::new(),
            pagination_config: config.pagination,
            access_config: config.access,
        })
    }
}
