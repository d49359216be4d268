//! Per-category item counts, alone or combined with the month's statistics.

use rusqlite::Connection;
use serde::Serialize;

use crate::{
    Error,
    transaction::{SaleTimestamp, get_count},
};

use super::period::MonthPeriod;

/// The number of items sold in a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    /// The category name.
    pub category: String,
    /// The number of items in the category.
    pub count: u64,
}

/// The category breakdown and sales figures for a month in one response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedReport {
    /// The item count per category, in the order the categories first appear.
    pub categories: Vec<CategoryCount>,
    /// The sum of the prices of the sold items.
    pub total_sale_amount: f64,
    /// How many items sold.
    pub sold_items_count: u64,
    /// How many items did not sell.
    pub not_sold_items_count: u64,
}

/// Count the items sold within `period` per category.
///
/// Categories are listed in the order they were first imported.
///
/// # Errors
/// Returns [Error::SqlError] if the SQL query fails.
pub fn get_category_counts(
    period: &MonthPeriod,
    connection: &Connection,
) -> Result<Vec<CategoryCount>, Error> {
    connection
        .prepare(
            "SELECT category, COUNT(*) FROM product_transaction
            WHERE date_of_sale >= ?1 AND date_of_sale < ?2
            GROUP BY category
            ORDER BY MIN(row_id)",
        )?
        .query_map((SaleTimestamp(period.start), SaleTimestamp(period.end)), |row| {
            Ok(CategoryCount {
                category: row.get(0)?,
                count: get_count(row, 1)?,
            })
        })?
        .map(|count_result| count_result.map_err(Error::SqlError))
        .collect()
}

/// The fields of a transaction that the combined report needs.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CategorySale {
    pub category: String,
    pub price: f64,
    pub sold: bool,
}

/// Build the category breakdown and sales figures for `period` from a single query.
///
/// # Errors
/// Returns [Error::SqlError] if the SQL query fails.
pub fn get_combined_report(
    period: &MonthPeriod,
    connection: &Connection,
) -> Result<CombinedReport, Error> {
    let sales = connection
        .prepare(
            "SELECT category, price, sold FROM product_transaction
            WHERE date_of_sale >= ?1 AND date_of_sale < ?2
            ORDER BY row_id",
        )?
        .query_map((SaleTimestamp(period.start), SaleTimestamp(period.end)), |row| {
            Ok(CategorySale {
                category: row.get(0)?,
                price: row.get(1)?,
                sold: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(summarise_sales(&sales))
}

pub(crate) fn summarise_sales(sales: &[CategorySale]) -> CombinedReport {
    let mut report = CombinedReport {
        categories: Vec::new(),
        total_sale_amount: 0.0,
        sold_items_count: 0,
        not_sold_items_count: 0,
    };

    for sale in sales {
        match report
            .categories
            .iter_mut()
            .find(|entry| entry.category == sale.category)
        {
            Some(entry) => entry.count += 1,
            None => report.categories.push(CategoryCount {
                category: sale.category.clone(),
                count: 1,
            }),
        }

        if sale.sold {
            report.total_sale_amount += sale.price;
            report.sold_items_count += 1;
        } else {
            report.not_sold_items_count += 1;
        }
    }

    report
}
