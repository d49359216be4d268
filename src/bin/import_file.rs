use std::error::Error;
use std::fs;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use serde_json::Value;
use time::OffsetDateTime;

use sales_dashboard::{initialize_db, replace_all_transactions, sanitize_all};

/// A utility for loading a local copy of the transactions dataset into a database.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to a JSON array of transaction records.
    #[arg(long, short)]
    input_path: String,

    /// File path to the SQLite database. It is created if it does not exist.
    #[arg(long, short, env = "DB_PATH")]
    db_path: String,
}

/// Replace the stored transactions with the records in a local JSON file.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let input_path = Path::new(&args.input_path);

    if !input_path.is_file() {
        eprintln!("No file found at {input_path:#?}!");
        exit(1);
    }

    println!("Reading transactions from {input_path:#?}");
    let records: Value = serde_json::from_str(&fs::read_to_string(input_path)?)?;

    let Value::Array(records) = records else {
        eprintln!("Expected {input_path:#?} to contain a JSON array of transactions.");
        exit(1);
    };

    let transactions = sanitize_all(&records, OffsetDateTime::now_utc());

    println!("Opening database at {:#?}", args.db_path);
    let conn = Connection::open(&args.db_path)?;

    initialize_db(&conn)?;

    let imported = replace_all_transactions(&transactions, &conn)?;

    println!("Imported {imported} transactions.");

    Ok(())
}
