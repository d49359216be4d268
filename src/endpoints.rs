//! The API endpoints URIs.

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The dashboard page with the transactions table and charts.
pub const DASHBOARD_VIEW: &str = "/dashboard";

/// The route that replaces the stored transactions with the remote dataset.
pub const INITIALIZE: &str = "/api/initialize";
/// The route for listing transactions filtered by month, year and search text.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route for listing every transaction without filters.
pub const ALL_TRANSACTIONS: &str = "/api/transactions/all";
/// The route for the sales statistics of a month.
pub const STATISTICS: &str = "/api/statistics";
/// The route for the price range histogram of a month.
pub const BAR_CHART: &str = "/api/bar-chart";
/// The route for the number of transactions per category in a month.
pub const CATEGORIES: &str = "/api/categories";
/// The route for the categories and statistics of a month in one response.
pub const COMBINED: &str = "/api/combined";

/// The prefix shared by every JSON API route.
pub const API_PREFIX: &str = "/api";
