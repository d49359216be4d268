//! Runtime configuration shared by the server and the route handlers.

use crate::{access::AccessConfig, pagination::PaginationConfig};

/// Where the dataset is fetched from when `/api/initialize` is called.
pub const DEFAULT_IMPORT_URL: &str = "https://s3.amazonaws.com/roxiler.com/product_transaction.json";

/// The timezone used for month boundaries when none is configured.
pub const DEFAULT_TIMEZONE: &str = "Etc/UTC";

/// Settings that control how the app behaves, independent of how it is served.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// Monthly statistics use the first day of the month at midnight in this
    /// timezone as their lower bound.
    pub local_timezone: String,
    /// The URL of the JSON array of transactions to import.
    pub import_url: String,
    /// Page size limits for the list endpoints and the dashboard.
    pub pagination: PaginationConfig,
    /// Authentication and request limits.
    pub access: AccessConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            local_timezone: DEFAULT_TIMEZONE.to_owned(),
            import_url: DEFAULT_IMPORT_URL.to_owned(),
            pagination: PaginationConfig::default(),
            access: AccessConfig::default(),
        }
    }
}
