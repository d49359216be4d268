//! Route handlers for the monthly reports.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{AppState, Error, params::strict_integer};

use super::{
    bar_chart::{BarChartData, get_price_range_histogram},
    categories::{CategoryCount, CombinedReport, get_category_counts, get_combined_report},
    period::{MonthPeriod, local_timezone},
    statistics::{MonthlyStatistics, get_monthly_statistics},
};

/// The state needed for the report routes.
#[derive(Debug, Clone)]
pub struct ReportState {
    /// The database connection for reading transactions.
    db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    local_timezone: String,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

impl ReportState {
    fn connection(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)
    }
}

/// The query string for the report routes.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct MonthYearQuery {
    /// The month number, 1 to 12.
    pub month: Option<String>,
    /// The calendar year.
    pub year: Option<String>,
}

/// The message for a report request without a month or year.
pub const MONTH_AND_YEAR_REQUIRED: &str = "Month and year are required.";
/// The message for a histogram request without a month.
pub const MONTH_REQUIRED: &str = "Month is required";

/// Parse the month and year of a report request.
///
/// # Errors
/// Returns [Error::Validation] if either is missing, not a whole number, or
/// the month is not 1 to 12.
pub fn parse_month_year(query: &MonthYearQuery) -> Result<(u8, i32), Error> {
    let (Some(month), Some(year)) = (
        strict_integer(query.month.as_deref()),
        strict_integer(query.year.as_deref()),
    ) else {
        return Err(Error::Validation(MONTH_AND_YEAR_REQUIRED.to_owned()));
    };

    let year = i32::try_from(year)
        .map_err(|_| Error::Validation(format!("Year {year} is out of range.")))?;

    Ok((parse_month(month)?, year))
}

fn parse_month(month: i64) -> Result<u8, Error> {
    u8::try_from(month)
        .ok()
        .filter(|month| (1..=12).contains(month))
        .ok_or_else(|| Error::Validation("Month must be between 1 and 12.".to_owned()))
}

fn month_period(query: &MonthYearQuery, timezone: &str) -> Result<MonthPeriod, Error> {
    let (month, year) = parse_month_year(query)?;

    MonthPeriod::new(month, year, local_timezone(timezone)?)
}

/// A route handler for the sales statistics of a month.
pub async fn get_statistics(
    State(state): State<ReportState>,
    Query(query): Query<MonthYearQuery>,
) -> Result<Json<MonthlyStatistics>, Error> {
    let period = month_period(&query, &state.local_timezone)?;
    let connection = state.connection()?;

    get_monthly_statistics(&period, &connection)
        .inspect_err(|error| tracing::error!("could not get statistics: {error}"))
        .map(Json)
}

/// A route handler for the price range histogram of a month.
pub async fn get_bar_chart(
    State(state): State<ReportState>,
    Query(query): Query<MonthYearQuery>,
) -> Result<Json<BarChartData>, Error> {
    let month = strict_integer(query.month.as_deref())
        .ok_or_else(|| Error::Validation(MONTH_REQUIRED.to_owned()))
        .and_then(parse_month)?;
    let connection = state.connection()?;

    get_price_range_histogram(month, &connection)
        .inspect_err(|error| tracing::error!("could not get price range histogram: {error}"))
        .map(Json)
}

/// A route handler for the number of items per category in a month.
pub async fn get_categories(
    State(state): State<ReportState>,
    Query(query): Query<MonthYearQuery>,
) -> Result<Json<Vec<CategoryCount>>, Error> {
    let period = month_period(&query, &state.local_timezone)?;
    let connection = state.connection()?;

    get_category_counts(&period, &connection)
        .inspect_err(|error| tracing::error!("could not get category counts: {error}"))
        .map(Json)
}

/// A route handler for the category breakdown and statistics of a month.
pub async fn get_combined(
    State(state): State<ReportState>,
    Query(query): Query<MonthYearQuery>,
) -> Result<Json<CombinedReport>, Error> {
    let period = month_period(&query, &state.local_timezone)?;
    let connection = state.connection()?;

    get_combined_report(&period, &connection)
        .inspect_err(|error| tracing::error!("could not get combined report: {error}"))
        .map(Json)
}

#[cfg(test)]
mod tests {
    use axum::{Router, http::StatusCode, routing::get};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};
    use time::macros::datetime;

    use crate::{
        AppConfig, AppState, Transaction, endpoints,
        transaction::{insert_transactions, test_utils::transaction},
    };

    use super::{
        MONTH_AND_YEAR_REQUIRED, MONTH_REQUIRED, get_bar_chart, get_categories, get_combined,
        get_statistics,
    };

    fn get_test_server() -> TestServer {
        let state = AppState::new(Connection::open_in_memory().unwrap(), AppConfig::default())
            .expect("Could not create app state");
        {
            let connection = state.db_connection.lock().unwrap();
            insert_transactions(
                &[
                    Transaction {
                        category: "electronics".to_owned(),
                        ..transaction(250.0, datetime!(2022-03-02 10:00 UTC))
                    },
                    Transaction {
                        category: "jewelery".to_owned(),
                        sold: false,
                        ..transaction(80.0, datetime!(2022-03-20 10:00 UTC))
                    },
                    transaction(950.0, datetime!(2021-03-05 10:00 UTC)),
                ],
                &connection,
            )
            .unwrap();
        }

        let app = Router::new()
            .route(endpoints::STATISTICS, get(get_statistics))
            .route(endpoints::BAR_CHART, get(get_bar_chart))
            .route(endpoints::CATEGORIES, get(get_categories))
            .route(endpoints::COMBINED, get(get_combined))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn statistics_for_month() {
        let server = get_test_server();

        let response = server
            .get(endpoints::STATISTICS)
            .add_query_param("month", "3")
            .add_query_param("year", "2022")
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "totalSale": 250.0,
            "soldItemsCount": 1,
            "notSoldItemsCount": 1,
            "month": 3,
            "year": 2022,
        }));
    }

    #[tokio::test]
    async fn statistics_requires_month_and_year() {
        let server = get_test_server();

        let response = server
            .get(endpoints::STATISTICS)
            .add_query_param("month", "3")
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "message": MONTH_AND_YEAR_REQUIRED }));
    }

    #[tokio::test]
    async fn reports_reject_invalid_month() {
        let server = get_test_server();

        for route in [endpoints::STATISTICS, endpoints::CATEGORIES, endpoints::COMBINED] {
            let response = server
                .get(route)
                .add_query_param("month", "13")
                .add_query_param("year", "2022")
                .await;

            assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{route}");
        }
    }

    #[tokio::test]
    async fn bar_chart_counts_any_year() {
        let server = get_test_server();

        let response = server
            .get(endpoints::BAR_CHART)
            .add_query_param("month", "3")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        let counts: Vec<_> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["count"].as_u64().unwrap())
            .collect();
        assert_eq!(counts, vec![1, 0, 1, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[tokio::test]
    async fn bar_chart_requires_month() {
        let server = get_test_server();

        for month in [None, Some("March"), Some("2.5")] {
            let mut request = server.get(endpoints::BAR_CHART);
            if let Some(month) = month {
                request = request.add_query_param("month", month);
            }

            let response = request.await;

            assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{month:?}");
        }

        let response = server.get(endpoints::BAR_CHART).await;
        response.assert_json(&json!({ "message": MONTH_REQUIRED }));
    }

    #[tokio::test]
    async fn categories_for_month() {
        let server = get_test_server();

        let response = server
            .get(endpoints::CATEGORIES)
            .add_query_param("month", "3")
            .add_query_param("year", "2022")
            .await;

        response.assert_status_ok();
        response.assert_json(&json!([
            {"category": "electronics", "count": 1},
            {"category": "jewelery", "count": 1},
        ]));
    }

    #[tokio::test]
    async fn combined_for_month() {
        let server = get_test_server();

        let response = server
            .get(endpoints::COMBINED)
            .add_query_param("month", "3")
            .add_query_param("year", "2021")
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "categories": [{"category": "testing", "count": 1}],
            "totalSaleAmount": 950.0,
            "soldItemsCount": 1,
            "notSoldItemsCount": 0,
        }));
    }
}
