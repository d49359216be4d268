//! Filtered and paginated queries over the stored transactions.

use rusqlite::{Connection, params_from_iter, types::Value};
use serde::Deserialize;

use crate::{
    Error,
    pagination::{Page, PageRequest, PaginationConfig},
    params::clamped_integer,
};

use super::core::{TRANSACTION_COLUMNS, Transaction, get_count, map_transaction_row};

/// The only sale years a filtered listing matches, whatever year was asked for.
pub const YEAR_ALLOW_LIST: [i32; 2] = [2021, 2022];

/// How far a numeric search may be from a price and still match it.
const PRICE_SEARCH_TOLERANCE: f64 = 2.0;

/// The raw query string for the transaction listing routes.
///
/// Values are kept as text so that junk like `page=abc` falls back to a
/// default instead of rejecting the request.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsQuery {
    /// The 1-based page number.
    pub page: Option<String>,
    /// The number of transactions per page.
    pub per_page: Option<String>,
    /// Free text matched against the title, description and price.
    pub search: Option<String>,
    /// The month of the sale date, 1 to 12.
    pub month: Option<String>,
    /// Accepted but ignored, listings always match [YEAR_ALLOW_LIST].
    pub year: Option<String>,
}

/// Validated options for listing transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct ListOptions {
    /// Which page to return.
    pub page: PageRequest,
    /// Search text, empty for no search.
    pub search: String,
    /// The month of the sale date, 1 to 12.
    pub month: u8,
}

impl ListOptions {
    /// Normalize the raw query values.
    ///
    /// The month defaults to January and is clamped to 1..=12.
    pub fn from_query(query: &TransactionsQuery, config: &PaginationConfig) -> Self {
        Self {
            page: PageRequest::from_query(
                query.page.as_deref(),
                query.per_page.as_deref(),
                config,
            ),
            search: query.search.clone().unwrap_or_default(),
            month: clamped_integer(query.month.as_deref(), 1, 1, 12) as u8,
        }
    }
}

/// A SQL `WHERE` clause and the values bound to its placeholders.
#[derive(Debug, Default)]
struct Filter {
    conditions: Vec<String>,
    values: Vec<Value>,
}

impl Filter {
    fn push(&mut self, condition: impl Into<String>, values: impl IntoIterator<Item = Value>) {
        self.conditions.push(condition.into());
        self.values.extend(values);
    }

    fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }
}

fn build_filter(options: &ListOptions) -> Filter {
    let mut filter = Filter::default();

    filter.push(
        "CAST(strftime('%m', date_of_sale) AS INTEGER) = ?",
        [Value::Integer(options.month.into())],
    );

    let placeholders = vec!["?"; YEAR_ALLOW_LIST.len()].join(", ");
    filter.push(
        format!("CAST(strftime('%Y', date_of_sale) AS INTEGER) IN ({placeholders})"),
        YEAR_ALLOW_LIST.map(|year| Value::Integer(year.into())),
    );

    if !options.search.trim().is_empty() {
        let search = Value::Text(options.search.clone());
        let mut condition = "(instr(lower(title), lower(?)) > 0 \
            OR instr(lower(description), lower(?)) > 0"
            .to_owned();
        let mut values = vec![search.clone(), search];

        if let Some(price) = search_price(&options.search) {
            condition.push_str(" OR price BETWEEN ? AND ?");
            values.push(Value::Real(price - PRICE_SEARCH_TOLERANCE));
            values.push(Value::Real(price + PRICE_SEARCH_TOLERANCE));
        }

        condition.push(')');
        filter.push(condition, values);
    }

    filter
}

/// The price a search term refers to, if it is a number.
fn search_price(search: &str) -> Option<f64> {
    let search = search.trim();

    if search.is_empty() {
        return None;
    }

    search.parse::<f64>().ok().filter(|price| price.is_finite())
}

/// Get one page of the transactions that match `options`, in insertion order.
///
/// # Errors
/// Returns [Error::SqlError] if the SQL query fails or a row cannot be mapped.
pub fn list_transactions(
    options: &ListOptions,
    connection: &Connection,
) -> Result<Page<Transaction>, Error> {
    query_page(&build_filter(options), options.page, connection)
}

/// Get one page of every stored transaction, in insertion order.
///
/// # Errors
/// Returns [Error::SqlError] if the SQL query fails or a row cannot be mapped.
pub fn list_all_transactions(
    page: PageRequest,
    connection: &Connection,
) -> Result<Page<Transaction>, Error> {
    query_page(&Filter::default(), page, connection)
}

fn query_page(
    filter: &Filter,
    page: PageRequest,
    connection: &Connection,
) -> Result<Page<Transaction>, Error> {
    let where_clause = filter.where_clause();

    let total: u64 = connection.query_row(
        &format!("SELECT COUNT(*) FROM product_transaction {where_clause}"),
        params_from_iter(filter.values.iter()),
        |row| get_count(row, 0),
    )?;

    let limit = Value::Integer(page.per_page.min(i64::MAX as u64) as i64);
    let offset = Value::Integer(page.offset().min(i64::MAX as u64) as i64);
    let transactions = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM product_transaction {where_clause} \
            ORDER BY row_id ASC LIMIT ? OFFSET ?"
        ))?
        .query_map(
            params_from_iter(filter.values.iter().chain([&limit, &offset])),
            map_transaction_row,
        )?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Page::new(transactions, total, page))
}
