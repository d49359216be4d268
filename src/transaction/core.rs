//! Defines the core data model and database functions for transactions.

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Type, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{
    OffsetDateTime, PrimitiveDateTime, UtcOffset, format_description::BorrowedFormatItem,
    macros::format_description,
};

use crate::Error;

// ============================================================================
// MODELS
// ============================================================================

/// A product sale, as imported from the remote dataset.
///
/// Every field is always populated, the import job fills in defaults for
/// anything the source left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The identifier from the source dataset.
    pub id: String,
    /// The product name.
    pub title: String,
    /// A text description of the product.
    pub description: String,
    /// The sale price.
    pub price: f64,
    /// The product category, e.g. "electronics".
    pub category: String,
    /// URL of a product image.
    pub image: String,
    /// Whether the product was sold.
    pub sold: bool,
    /// When the sale happened.
    #[serde(with = "time::serde::rfc3339")]
    pub date_of_sale: OffsetDateTime,
}

/// The storage format for sale dates: UTC with whole seconds.
///
/// Every stored date uses this exact layout so that comparing the text
/// compares the instants, and SQLite's `strftime` can read it.
const SALE_TIMESTAMP_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

/// A sale date as stored in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SaleTimestamp(pub OffsetDateTime);

impl ToSql for SaleTimestamp {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let text = self
            .0
            .to_offset(UtcOffset::UTC)
            .format(SALE_TIMESTAMP_FORMAT)
            .map_err(|error| rusqlite::Error::ToSqlConversionFailure(Box::new(error)))?;

        Ok(ToSqlOutput::from(text))
    }
}

impl FromSql for SaleTimestamp {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        PrimitiveDateTime::parse(text, SALE_TIMESTAMP_FORMAT)
            .map(|date_time| SaleTimestamp(date_time.assume_utc()))
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// The columns selected for a [Transaction], in the order [map_transaction_row] expects.
pub(crate) const TRANSACTION_COLUMNS: &str =
    "id, title, description, price, category, image, sold, date_of_sale";

/// Insert `transactions` in order, returning how many rows were written.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn insert_transactions(
    transactions: &[Transaction],
    connection: &Connection,
) -> Result<usize, Error> {
    let mut statement = connection.prepare(
        "INSERT INTO product_transaction
            (id, title, description, price, category, image, sold, date_of_sale)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;

    let mut inserted = 0;
    for transaction in transactions {
        inserted += statement.execute((
            &transaction.id,
            &transaction.title,
            &transaction.description,
            transaction.price,
            &transaction.category,
            &transaction.image,
            transaction.sold,
            SaleTimestamp(transaction.date_of_sale),
        ))?;
    }

    Ok(inserted)
}

/// Delete every stored transaction, returning how many rows were removed.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn delete_all_transactions(connection: &Connection) -> Result<usize, Error> {
    connection
        .execute("DELETE FROM product_transaction", ())
        .map_err(|error| error.into())
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u64, Error> {
    connection
        .query_row("SELECT COUNT(*) FROM product_transaction", [], |row| {
            get_count(row, 0)
        })
        .map_err(|error| error.into())
}

/// Read the `COUNT(*)` at `index`, which SQLite stores as a signed integer.
pub(crate) fn get_count(row: &Row, index: usize) -> Result<u64, rusqlite::Error> {
    let count: i64 = row.get(index)?;

    u64::try_from(count).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Integer, Box::new(error))
    })
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    // `row_id` keeps the import order, which is also the listing order.
    connection.execute(
        "CREATE TABLE IF NOT EXISTS product_transaction (
                row_id INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                price REAL NOT NULL,
                category TEXT NOT NULL,
                image TEXT NOT NULL,
                sold INTEGER NOT NULL,
                date_of_sale TEXT NOT NULL
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_product_transaction_date
            ON product_transaction(date_of_sale);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let SaleTimestamp(date_of_sale) = row.get(7)?;

    Ok(Transaction {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        category: row.get(4)?,
        image: row.get(5)?,
        sold: row.get(6)?,
        date_of_sale,
    })
}

// ============================================================================
// TESTS
// ============================================================================
