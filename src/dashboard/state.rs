//! The dashboard state and the data loaded for it.
//!
//! Every dashboard state is encoded in the query string of `/dashboard`, so
//! each control only needs to produce the URL of the state it leads to.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    endpoints,
    pagination::{PageRequest, PaginationConfig},
    params::{clamped_integer, strict_integer},
    report::{
        BarChartData, CategoryCount, MonthPeriod, MonthlyStatistics, get_category_counts,
        get_monthly_statistics, get_price_range_histogram, local_timezone,
    },
    transaction::{ListOptions, Transaction, list_all_transactions, list_transactions},
};

/// The month shown when the dashboard is first opened.
pub(super) const DEFAULT_MONTH: u8 = 3;

/// The month the list filter falls back to when only a search is given.
const LIST_DEFAULT_MONTH: u8 = 1;

/// The raw query string of the dashboard page.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DashboardQuery {
    /// The 1-based page of the transactions table.
    pub page: Option<String>,
    /// The selected month. An empty value selects every month.
    pub month: Option<String>,
    /// The year used for the statistics and category breakdown.
    pub year: Option<String>,
    /// The search text.
    pub search: Option<String>,
}

/// A normalized dashboard state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct DashboardParams {
    pub page: u64,
    /// `None` shows every month.
    pub month: Option<u8>,
    pub year: i32,
    pub search: String,
}

#[derive(Serialize)]
struct EncodedParams<'a> {
    page: u64,
    month: String,
    year: i32,
    search: &'a str,
}

impl DashboardParams {
    /// Normalize `query`, falling back to the first load defaults.
    ///
    /// A missing or invalid month selects [DEFAULT_MONTH] while an empty month
    /// selects every month. A missing or invalid year selects `current_year`.
    pub fn from_query(query: &DashboardQuery, current_year: i32) -> Self {
        let month = match query.month.as_deref().map(str::trim) {
            None => Some(DEFAULT_MONTH),
            Some("") => None,
            Some(raw) => Some(
                strict_integer(Some(raw))
                    .filter(|month| (1..=12).contains(month))
                    .map_or(DEFAULT_MONTH, |month| month as u8),
            ),
        };

        let year = strict_integer(query.year.as_deref())
            .and_then(|year| i32::try_from(year).ok())
            .unwrap_or(current_year);

        Self {
            page: clamped_integer(query.page.as_deref(), 1, 1, i64::MAX) as u64,
            month,
            year,
            search: query.search.clone().unwrap_or_default(),
        }
    }

    /// Go back to the full list: no search, every month, first page.
    pub fn clear(&self) -> Self {
        Self {
            page: 1,
            month: None,
            year: self.year,
            search: String::new(),
        }
    }

    /// The next page, or `None` on the last page.
    pub fn next_page(&self, total_pages: u64) -> Option<Self> {
        (self.page < total_pages).then(|| self.with_page(self.page + 1))
    }

    /// The previous page, or `None` on the first page.
    ///
    /// A page past the end goes back to the last page.
    pub fn previous_page(&self, total_pages: u64) -> Option<Self> {
        (self.page > 1).then(|| self.with_page((self.page - 1).min(total_pages.max(1))))
    }

    fn with_page(&self, page: u64) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// Encode the state as a query string, e.g. `page=1&month=3&year=2022&search=`.
    pub fn to_query_string(&self) -> String {
        let encoded = EncodedParams {
            page: self.page,
            month: self.month.map(|month| month.to_string()).unwrap_or_default(),
            year: self.year,
            search: &self.search,
        };

        serde_urlencoded::to_string(&encoded)
            .inspect_err(|error| tracing::error!("could not encode dashboard state: {error}"))
            .unwrap_or_default()
    }

    /// The dashboard URL that shows this state.
    pub fn to_url(&self) -> String {
        format!("{}?{}", endpoints::DASHBOARD_VIEW, self.to_query_string())
    }

    fn source(&self) -> TransactionSource {
        match self.month {
            None if self.search.is_empty() => TransactionSource::All,
            month => TransactionSource::Filtered(month.unwrap_or(LIST_DEFAULT_MONTH)),
        }
    }
}

/// Where the rows of the transactions table come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransactionSource {
    /// Every transaction, ignoring the search and month.
    All,
    /// The transactions sold in the given month that match the search.
    Filtered(u8),
}

/// Everything the dashboard shows for one state.
#[derive(Debug)]
pub(super) struct DashboardData {
    pub params: DashboardParams,
    pub transactions: Vec<Transaction>,
    pub total_pages: u64,
    /// `None` when every month is selected or the query failed.
    pub statistics: Option<MonthlyStatistics>,
    pub bar_chart: Option<BarChartData>,
    pub categories: Option<Vec<CategoryCount>>,
    /// The message of the last failed query.
    pub error: Option<String>,
}

impl DashboardData {
    /// Whether the table should be replaced by the error panel.
    pub fn show_error_panel(&self) -> bool {
        self.error.is_some() && self.transactions.is_empty()
    }
}

/// Run every query the dashboard needs for `params`.
///
/// A failed query does not stop the others. Its message is kept in
/// [DashboardData::error] and its section is left empty.
pub(super) fn load_dashboard(
    params: DashboardParams,
    timezone_name: &str,
    pagination_config: &PaginationConfig,
    connection: &Connection,
) -> DashboardData {
    let mut error = None;
    let mut record = |message: String| {
        tracing::error!("could not load dashboard data: {message}");
        error = Some(message);
    };

    let mut statistics = None;
    let mut bar_chart = None;
    let mut categories = None;

    if let Some(month) = params.month {
        match local_timezone(timezone_name)
            .and_then(|timezone| MonthPeriod::new(month, params.year, timezone))
        {
            Ok(period) => {
                match get_monthly_statistics(&period, connection) {
                    Ok(got) => statistics = Some(got),
                    Err(failure) => record(failure.to_string()),
                }

                match get_category_counts(&period, connection) {
                    Ok(got) => categories = Some(got),
                    Err(failure) => record(failure.to_string()),
                }
            }
            Err(failure) => record(failure.to_string()),
        }

        match get_price_range_histogram(month, connection) {
            Ok(got) => bar_chart = Some(got),
            Err(failure) => record(failure.to_string()),
        }
    }

    let page = PageRequest {
        page: params.page,
        per_page: pagination_config.dashboard_page_size.max(1),
    };
    let listed = match params.source() {
        TransactionSource::All => list_all_transactions(page, connection),
        TransactionSource::Filtered(month) => list_transactions(
            &ListOptions {
                page,
                search: params.search.clone(),
                month,
            },
            connection,
        ),
    };

    let (transactions, total_pages) = match listed {
        Ok(listed) => (listed.items, listed.total_pages),
        Err(failure) => {
            record(failure.to_string());
            (Vec::new(), 1)
        }
    };

    DashboardData {
        params,
        transactions,
        total_pages,
        statistics,
        bar_chart,
        categories,
        error,
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::{
        pagination::PaginationConfig,
        transaction::test_utils::{get_test_connection, insert, transaction},
    };

    use super::{
        DEFAULT_MONTH, DashboardParams, DashboardQuery, TransactionSource, load_dashboard,
    };

    fn query(month: Option<&str>, search: Option<&str>) -> DashboardQuery {
        DashboardQuery {
            page: None,
            month: month.map(str::to_owned),
            year: None,
            search: search.map(str::to_owned),
        }
    }

    fn params(page: u64, month: Option<u8>, search: &str) -> DashboardParams {
        DashboardParams {
            page,
            month,
            year: 2022,
            search: search.to_owned(),
        }
    }

    #[test]
    fn first_load_uses_defaults() {
        let got = DashboardParams::from_query(&DashboardQuery::default(), 2026);

        assert_eq!(got, DashboardParams {
            page: 1,
            month: Some(DEFAULT_MONTH),
            year: 2026,
            search: String::new(),
        });
    }

    #[test]
    fn empty_month_selects_every_month() {
        let got = DashboardParams::from_query(&query(Some(""), None), 2022);

        assert_eq!(got.month, None);
    }

    #[test]
    fn invalid_values_fall_back() {
        let raw = DashboardQuery {
            page: Some("abc".to_owned()),
            month: Some("13".to_owned()),
            year: Some("last year".to_owned()),
            search: None,
        };

        let got = DashboardParams::from_query(&raw, 2022);

        assert_eq!(got, params(1, Some(DEFAULT_MONTH), ""));
    }

    #[test]
    fn clear_resets_search_month_and_page() {
        let got = params(4, Some(7), "jacket").clear();

        assert_eq!(got, params(1, None, ""));
    }

    #[test]
    fn pages_stay_within_bounds() {
        assert_eq!(params(1, Some(3), "").previous_page(3), None);
        assert_eq!(params(3, Some(3), "").next_page(3), None);
        assert_eq!(params(0, Some(3), "").next_page(0), None);
        assert_eq!(
            params(2, Some(3), "").next_page(3),
            Some(params(3, Some(3), ""))
        );
        assert_eq!(
            params(2, Some(3), "").previous_page(3),
            Some(params(1, Some(3), ""))
        );
    }

    #[test]
    fn previous_page_past_the_end_goes_to_last_page() {
        assert_eq!(
            params(99, Some(3), "").previous_page(3),
            Some(params(3, Some(3), ""))
        );
        assert_eq!(
            params(5, Some(3), "").previous_page(0),
            Some(params(1, Some(3), ""))
        );
    }

    #[test]
    fn query_string_round_trips() {
        let state = params(2, None, "blue shirt & tie");

        let query_string = state.to_query_string();
        let decoded: DashboardQuery = serde_urlencoded::from_str(&query_string).unwrap();

        assert_eq!(query_string, "page=2&month=&year=2022&search=blue+shirt+%26+tie");
        assert_eq!(DashboardParams::from_query(&decoded, 1999), state);
    }

    #[test]
    fn chooses_transaction_source() {
        assert_eq!(params(1, None, "").source(), TransactionSource::All);
        assert_eq!(params(1, Some(5), "").source(), TransactionSource::Filtered(5));
        assert_eq!(params(1, None, "bag").source(), TransactionSource::Filtered(1));
    }

    #[test]
    fn loads_month_with_reports() {
        let conn = get_test_connection();
        let mut unsold = transaction(250.0, datetime!(2022-03-10 12:00 UTC));
        unsold.sold = false;
        insert(
            &[
                transaction(50.0, datetime!(2022-03-02 12:00 UTC)),
                unsold,
                transaction(75.0, datetime!(2021-04-02 12:00 UTC)),
            ],
            &conn,
        );

        let got = load_dashboard(
            params(1, Some(3), ""),
            "Etc/UTC",
            &PaginationConfig::default(),
            &conn,
        );

        assert_eq!(got.error, None);
        assert_eq!(got.transactions.len(), 2);
        assert_eq!(got.total_pages, 1);
        let statistics = got.statistics.expect("missing statistics");
        assert_eq!(statistics.total_sale, 50.0);
        assert_eq!(statistics.sold_items_count, 1);
        assert_eq!(statistics.not_sold_items_count, 1);
        let bar_chart = got.bar_chart.expect("missing bar chart");
        assert_eq!(bar_chart.data[0].count, 1);
        assert_eq!(bar_chart.data[2].count, 1);
        assert_eq!(got.categories.expect("missing categories")[0].count, 2);
    }

    #[test]
    fn every_month_lists_all_without_reports() {
        let conn = get_test_connection();
        let first_day = datetime!(2022-01-01 12:00 UTC);
        let transactions: Vec<_> = (1..=8)
            .map(|day| transaction(day as f64, first_day.replace_day(day).unwrap()))
            .collect();
        insert(&transactions, &conn);

        let got = load_dashboard(
            params(2, None, ""),
            "Etc/UTC",
            &PaginationConfig::default(),
            &conn,
        );

        assert_eq!(got.error, None);
        assert_eq!(got.transactions.len(), 2);
        assert_eq!(got.total_pages, 2);
        assert!(got.statistics.is_none());
        assert!(got.bar_chart.is_none());
        assert!(got.categories.is_none());
    }

    #[test]
    fn failures_are_collected() {
        let conn = get_test_connection();
        conn.execute("DROP TABLE product_transaction", []).unwrap();

        let got = load_dashboard(
            params(1, Some(3), ""),
            "Etc/UTC",
            &PaginationConfig::default(),
            &conn,
        );

        assert!(got.error.is_some());
        assert!(got.transactions.is_empty());
        assert!(got.show_error_panel());
        assert!(got.statistics.is_none());
    }
}
