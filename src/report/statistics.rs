//! Sales totals for one calendar month.

use rusqlite::Connection;
use serde::Serialize;

use crate::{
    Error,
    transaction::{SaleTimestamp, get_count},
};

use super::period::MonthPeriod;

/// The sales figures for a month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStatistics {
    /// The sum of the prices of the sold items, zero if nothing sold.
    pub total_sale: f64,
    /// How many items sold.
    pub sold_items_count: u64,
    /// How many items did not sell.
    pub not_sold_items_count: u64,
    /// The requested month.
    pub month: u8,
    /// The requested year.
    pub year: i32,
}

/// Count the sold and unsold items sold within `period` and total the sales.
///
/// # Errors
/// Returns [Error::SqlError] if the SQL query fails.
pub fn get_monthly_statistics(
    period: &MonthPeriod,
    connection: &Connection,
) -> Result<MonthlyStatistics, Error> {
    let (total_sale, sold_items_count, not_sold_items_count) = connection.query_row(
        "SELECT
            COALESCE(SUM(price) FILTER (WHERE sold = 1), 0.0),
            COUNT(*) FILTER (WHERE sold = 1),
            COUNT(*) FILTER (WHERE sold = 0)
        FROM product_transaction
        WHERE date_of_sale >= ?1 AND date_of_sale < ?2",
        (SaleTimestamp(period.start), SaleTimestamp(period.end)),
        |row| Ok((row.get(0)?, get_count(row, 1)?, get_count(row, 2)?)),
    )?;

    Ok(MonthlyStatistics {
        total_sale,
        sold_items_count,
        not_sold_items_count,
        month: period.month,
        year: period.year,
    })
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::{
        report::period::{MonthPeriod, local_timezone},
        transaction::{
            Transaction,
            test_utils::{get_test_connection, insert, transaction},
        },
    };

    use super::{MonthlyStatistics, get_monthly_statistics};

    fn march_2022() -> MonthPeriod {
        MonthPeriod::new(3, 2022, local_timezone("Etc/UTC").unwrap()).unwrap()
    }

    #[test]
    fn totals_sold_items_in_month() {
        let conn = get_test_connection();
        insert(
            &[
                transaction(10.5, datetime!(2022-03-01 00:00 UTC)),
                transaction(20.0, datetime!(2022-03-31 23:59:59 UTC)),
                Transaction {
                    sold: false,
                    ..transaction(99.0, datetime!(2022-03-15 12:00 UTC))
                },
                transaction(1000.0, datetime!(2022-04-01 00:00 UTC)),
                transaction(1000.0, datetime!(2021-03-15 00:00 UTC)),
            ],
            &conn,
        );

        let got = get_monthly_statistics(&march_2022(), &conn).unwrap();

        assert_eq!(
            got,
            MonthlyStatistics {
                total_sale: 30.5,
                sold_items_count: 2,
                not_sold_items_count: 1,
                month: 3,
                year: 2022,
            }
        );
    }

    #[test]
    fn no_sold_items_gives_zero_total() {
        let conn = get_test_connection();
        insert(
            &[Transaction {
                sold: false,
                ..transaction(42.0, datetime!(2022-03-15 12:00 UTC))
            }],
            &conn,
        );

        let got = get_monthly_statistics(&march_2022(), &conn).unwrap();

        assert_eq!(got.total_sale, 0.0);
        assert_eq!(got.sold_items_count, 0);
        assert_eq!(got.not_sold_items_count, 1);
    }

    #[test]
    fn local_month_start_includes_previous_utc_evening() {
        let conn = get_test_connection();
        insert(
            &[transaction(5.0, datetime!(2022-02-28 20:00 UTC))],
            &conn,
        );
        let period = MonthPeriod::new(3, 2022, local_timezone("Asia/Kolkata").unwrap()).unwrap();

        let got = get_monthly_statistics(&period, &conn).unwrap();

        assert_eq!(got.sold_items_count, 1);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(MonthlyStatistics {
            total_sale: 0.0,
            sold_items_count: 0,
            not_sold_items_count: 0,
            month: 3,
            year: 2022,
        })
        .unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "totalSale": 0.0,
                "soldItemsCount": 0,
                "notSoldItemsCount": 0,
                "month": 3,
                "year": 2022,
            })
        );
    }
}
