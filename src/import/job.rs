//! Fetches the remote dataset and replaces the stored transactions with it.

use rusqlite::Connection;
use serde_json::Value;
use time::OffsetDateTime;

use crate::{
    Error, Transaction,
    transaction::{delete_all_transactions, insert_transactions},
};

use super::sanitize::sanitize_transaction;

/// Download the JSON array of raw transaction records at `url`.
///
/// # Errors
/// Returns [Error::UpstreamFetch] if the request fails, the server does not
/// answer with a success status, or the body is not a JSON array.
pub async fn fetch_raw_transactions(
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<Value>, Error> {
    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<Value>()
        .await?;

    match body {
        Value::Array(records) => Ok(records),
        other => Err(Error::UpstreamFetch(format!(
            "expected a JSON array of transactions, got {}",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Sanitize every raw record, dating records without a sale date `imported_at`.
pub fn sanitize_all(records: &[Value], imported_at: OffsetDateTime) -> Vec<Transaction> {
    records
        .iter()
        .map(|record| sanitize_transaction(record, imported_at))
        .collect()
}

/// Replace every stored transaction with `transactions`, returning how many were inserted.
///
/// The delete and the inserts run in one SQL transaction, so if any insert
/// fails the previous contents are kept.
///
/// # Errors
/// Returns [Error::SqlError] if the delete or any insert fails.
pub fn replace_all_transactions(
    transactions: &[Transaction],
    connection: &Connection,
) -> Result<usize, Error> {
    let transaction = connection.unchecked_transaction()?;

    let deleted = delete_all_transactions(&transaction)?;
    let inserted = insert_transactions(transactions, &transaction)?;

    transaction.commit()?;

    tracing::info!("Replaced {deleted} transactions with {inserted} imported transactions");

    Ok(inserted)
}
