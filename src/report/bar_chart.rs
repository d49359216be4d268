//! The price range histogram.

use rusqlite::Connection;
use serde::Serialize;

use crate::Error;

/// The labels of the ten price ranges, lowest first.
pub const PRICE_RANGES: [&str; 10] = [
    "0 - 100",
    "101 - 200",
    "201 - 300",
    "301 - 400",
    "401 - 500",
    "501 - 600",
    "601 - 700",
    "701 - 800",
    "801 - 900",
    "901 and above",
];

/// The number of items whose price falls in one range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceRangeCount {
    /// The range label, e.g. "101 - 200".
    pub range: &'static str,
    /// The number of items in the range.
    pub count: u64,
}

/// The response body of the bar chart route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarChartData {
    /// One entry per price range, in [PRICE_RANGES] order.
    pub data: Vec<PriceRangeCount>,
}

/// The index into [PRICE_RANGES] for `price`.
///
/// Prices up to and including 100 go in the first range, as do negative
/// prices and NaN. Above that, each range covers the next 100, so a
/// fractional price such as 100.5 lands in "101 - 200".
pub fn price_range_index(price: f64) -> usize {
    if price.is_nan() || price <= 100.0 {
        return 0;
    }

    let index = (price / 100.0).ceil() - 1.0;

    (index as usize).min(PRICE_RANGES.len() - 1)
}

/// Count `prices` into the ten price ranges.
pub fn bucket_prices(prices: impl IntoIterator<Item = f64>) -> BarChartData {
    let mut counts = [0u64; PRICE_RANGES.len()];

    for price in prices {
        counts[price_range_index(price)] += 1;
    }

    BarChartData {
        data: PRICE_RANGES
            .into_iter()
            .zip(counts)
            .map(|(range, count)| PriceRangeCount { range, count })
            .collect(),
    }
}

/// Build the price range histogram of the items sold in `month` of any year.
///
/// # Errors
/// Returns [Error::SqlError] if the SQL query fails.
pub fn get_price_range_histogram(
    month: u8,
    connection: &Connection,
) -> Result<BarChartData, Error> {
    let prices = connection
        .prepare(
            "SELECT price FROM product_transaction
            WHERE CAST(strftime('%m', date_of_sale) AS INTEGER) = ?1",
        )?
        .query_map([month], |row| row.get::<_, f64>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(bucket_prices(prices))
}
