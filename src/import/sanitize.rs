//! Turns the loosely typed records of the remote dataset into [Transaction]s.

use serde_json::Value;
use time::{
    Date, OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339,
    macros::format_description,
};

use crate::Transaction;

/// The value each field takes when a record leaves it out.
///
/// A field counts as left out when it is missing, `null`, `false`, `0` or
/// the empty string.
pub mod defaults {
    /// The identifier of a record without one.
    pub const ID: &str = "No ID";
    /// The title of a record without one.
    pub const TITLE: &str = "Untitled";
    /// The description of a record without one.
    pub const DESCRIPTION: &str = "No description";
    /// The price of a record without one, or whose price is not a number.
    pub const PRICE: f64 = 0.0;
    /// The category of a record without one.
    pub const CATEGORY: &str = "Uncategorized";
    /// The image of a record whose image is blank or not text.
    pub const IMAGE: &str = "https://via.placeholder.com/150";
    /// Whether a record sold when its `sold` field is not a boolean.
    pub const SOLD: bool = false;
}

/// Build a [Transaction] from one raw record, filling every missing or
/// unusable field with its default from [defaults].
///
/// Records with a missing or unreadable `dateOfSale` are dated `imported_at`.
/// Anything other than a JSON object is treated as an empty record.
pub fn sanitize_transaction(raw: &Value, imported_at: OffsetDateTime) -> Transaction {
    let field = |name: &str| raw.get(name).filter(|value| is_truthy(value));

    Transaction {
        id: text_or(field("id"), defaults::ID),
        title: text_or(field("title"), defaults::TITLE),
        description: text_or(field("description"), defaults::DESCRIPTION),
        price: field("price").map_or(defaults::PRICE, coerce_price),
        category: text_or(field("category"), defaults::CATEGORY),
        image: raw
            .get("image")
            .and_then(Value::as_str)
            .filter(|image| !image.trim().is_empty())
            .unwrap_or(defaults::IMAGE)
            .to_owned(),
        sold: raw
            .get("sold")
            .and_then(Value::as_bool)
            .unwrap_or(defaults::SOLD),
        date_of_sale: field("dateOfSale")
            .map(|value| {
                parse_date_of_sale(value).unwrap_or_else(|| {
                    tracing::warn!("Could not read dateOfSale {value}, using the import time");
                    imported_at
                })
            })
            .unwrap_or(imported_at),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(boolean) => *boolean,
        Value::Number(number) => number.as_f64().is_some_and(|number| number != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn text_or(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => default.to_owned(),
    }
}

fn coerce_price(value: &Value) -> f64 {
    let price = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        Value::Bool(true) => Some(1.0),
        _ => None,
    };

    price
        .filter(|price: &f64| price.is_finite())
        .unwrap_or(defaults::PRICE)
}

/// Read a sale date given as an RFC 3339 string, a `YYYY-MM-DD` date, or
/// milliseconds since the Unix epoch.
///
/// The result is in UTC with whole seconds, matching how it will be stored.
fn parse_date_of_sale(value: &Value) -> Option<OffsetDateTime> {
    let date_time = match value {
        Value::String(text) => {
            let text = text.trim();
            OffsetDateTime::parse(text, &Rfc3339).ok().or_else(|| {
                Date::parse(text, format_description!("[year]-[month]-[day]"))
                    .ok()
                    .map(|date| date.midnight().assume_utc())
            })?
        }
        Value::Number(number) => {
            let millis = number.as_f64()?;
            OffsetDateTime::from_unix_timestamp_nanos((millis * 1_000_000.0) as i128).ok()?
        }
        _ => return None,
    };

    date_time
        .to_offset(UtcOffset::UTC)
        .replace_nanosecond(0)
        .ok()
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::datetime;

    use crate::Transaction;

    use super::{defaults, sanitize_transaction};

    const IMPORTED_AT: time::OffsetDateTime = datetime!(2024-06-01 12:00 UTC);

    #[test]
    fn keeps_complete_record() {
        let raw = json!({
            "id": 1,
            "title": "Fjallraven  - Foldsack No. 1 Backpack, Fits 15 Laptops",
            "price": 329.85,
            "description": "Your perfect pack for everyday use",
            "category": "men's clothing",
            "image": "https://fakestoreapi.com/img/81fPKd-2AYL._AC_SL1500_.jpg",
            "sold": false,
            "dateOfSale": "2021-11-27T20:29:54+05:30"
        });

        let got = sanitize_transaction(&raw, IMPORTED_AT);

        assert_eq!(
            got,
            Transaction {
                id: "1".to_owned(),
                title: "Fjallraven  - Foldsack No. 1 Backpack, Fits 15 Laptops".to_owned(),
                description: "Your perfect pack for everyday use".to_owned(),
                price: 329.85,
                category: "men's clothing".to_owned(),
                image: "https://fakestoreapi.com/img/81fPKd-2AYL._AC_SL1500_.jpg".to_owned(),
                sold: false,
                date_of_sale: datetime!(2021-11-27 14:59:54 UTC),
            }
        );
    }

    #[test]
    fn fills_defaults_for_empty_record() {
        let got = sanitize_transaction(&json!({}), IMPORTED_AT);

        assert_eq!(
            got,
            Transaction {
                id: defaults::ID.to_owned(),
                title: defaults::TITLE.to_owned(),
                description: defaults::DESCRIPTION.to_owned(),
                price: defaults::PRICE,
                category: defaults::CATEGORY.to_owned(),
                image: defaults::IMAGE.to_owned(),
                sold: defaults::SOLD,
                date_of_sale: IMPORTED_AT,
            }
        );
    }

    #[test]
    fn falsy_values_count_as_missing() {
        let raw = json!({
            "id": 0,
            "title": "",
            "description": null,
            "price": false,
            "category": "",
            "image": "   ",
            "sold": "yes",
            "dateOfSale": 0
        });

        let got = sanitize_transaction(&raw, IMPORTED_AT);

        assert_eq!(got.id, "No ID");
        assert_eq!(got.title, "Untitled");
        assert_eq!(got.description, "No description");
        assert_eq!(got.price, 0.0);
        assert_eq!(got.category, "Uncategorized");
        assert_eq!(got.image, "https://via.placeholder.com/150");
        assert!(!got.sold);
        assert_eq!(got.date_of_sale, IMPORTED_AT);
    }

    #[test]
    fn coerces_price() {
        let price = |value| sanitize_transaction(&json!({ "price": value }), IMPORTED_AT).price;

        assert_eq!(price(json!("12.50")), 12.5);
        assert_eq!(price(json!(" 7 ")), 7.0);
        assert_eq!(price(json!("twelve")), 0.0);
        assert_eq!(price(json!(true)), 1.0);
        assert_eq!(price(json!([1, 2])), 0.0);
    }

    #[test]
    fn stringifies_non_text_fields() {
        let raw = json!({ "id": 42, "title": true, "category": ["a", "b"] });

        let got = sanitize_transaction(&raw, IMPORTED_AT);

        assert_eq!(got.id, "42");
        assert_eq!(got.title, "true");
        assert_eq!(got.category, r#"["a","b"]"#);
    }

    #[test]
    fn reads_other_date_formats() {
        let date = |value| sanitize_transaction(&json!({ "dateOfSale": value }), IMPORTED_AT);

        assert_eq!(
            date(json!("2022-03-05")).date_of_sale,
            datetime!(2022-03-05 00:00 UTC)
        );
        assert_eq!(
            date(json!(1_646_438_400_000_i64)).date_of_sale,
            datetime!(2022-03-05 00:00 UTC)
        );
        assert_eq!(
            date(json!("2022-03-05T10:11:12.345Z")).date_of_sale,
            datetime!(2022-03-05 10:11:12 UTC)
        );
    }

    #[test]
    fn unreadable_date_uses_import_time() {
        let got = sanitize_transaction(&json!({ "dateOfSale": "last tuesday" }), IMPORTED_AT);

        assert_eq!(got.date_of_sale, IMPORTED_AT);
    }

    #[test]
    fn non_object_record_gets_all_defaults() {
        let got = sanitize_transaction(&json!("not a record"), IMPORTED_AT);

        assert_eq!(got, sanitize_transaction(&json!({}), IMPORTED_AT));
    }
}
