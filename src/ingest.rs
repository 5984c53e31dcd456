//! Raw record sources
//!
//! Customers arrive as a JSON array, orders as a headed CSV file. Anything that
//! does not have the expected shape aborts the read with
//! [`PipelineError::MalformedRecord`]; the domain rules are applied later by the
//! transform stage.

use std::{fs::File, io::BufReader, path::Path};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use tracing::info;

use crate::{
    error::{PipelineError, Result},
    models::{CustomerRecord, OrderRecord},
};

pub const CUSTOMERS_FILE: &str = "customers.json";
pub const ORDERS_FILE: &str = "orders.csv";

const ORDER_COLUMNS: [&str; 3] = ["order_id", "customer_identity", "amount"];

#[derive(Debug, Deserialize)]
struct RawCustomer {
    identity: Option<String>,
    display_name: Option<String>,
    timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawOrder {
    order_id: Option<String>,
    customer_identity: Option<String>,
    amount: Option<String>,
}

/// Parse a creation timestamp. Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` and
/// bare dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(ts.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}

fn required(
    value: Option<String>,
    field: &str,
    source_name: &str,
    location: &str,
) -> Result<String> {
    value.ok_or_else(|| {
        PipelineError::malformed(
            source_name,
            location,
            format!("missing required field '{}'", field),
        )
    })
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read every customer record from a JSON array file.
pub fn read_customers(path: &Path) -> Result<Vec<CustomerRecord>> {
    let name = source_name(path);
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;

    let raw: Vec<RawCustomer> = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        PipelineError::malformed(
            &name,
            format!("line {}, column {}", e.line(), e.column()),
            e.to_string(),
        )
    })?;

    let customers = raw
        .into_iter()
        .enumerate()
        .map(|(idx, rec)| -> Result<CustomerRecord> {
            let location = format!("record {}", idx + 1);
            let identity = required(rec.identity, "identity", &name, &location)?;
            let display_name = required(rec.display_name, "display_name", &name, &location)?;
            let raw_ts = required(rec.timestamp, "timestamp", &name, &location)?;
            let timestamp = parse_timestamp(&raw_ts).ok_or_else(|| {
                PipelineError::malformed(
                    &name,
                    &location,
                    format!("timestamp '{}' is not a recognised date/time", raw_ts),
                )
            })?;
            Ok(CustomerRecord {
                identity,
                display_name,
                timestamp,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    info!(source = %name, count = customers.len(), "📥 customers read");
    Ok(customers)
}

/// Read every order record from a headed CSV file.
pub fn read_orders(path: &Path) -> Result<Vec<OrderRecord>> {
    let name = source_name(path);
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(BufReader::new(file));

    let headers = reader
        .headers()
        .map_err(|e| PipelineError::malformed(&name, "header", e.to_string()))?
        .clone();
    for column in ORDER_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(PipelineError::malformed(
                &name,
                "header",
                format!("missing column '{}'", column),
            ));
        }
    }

    let mut orders = Vec::new();
    // Line 1 is the header
    for (idx, result) in reader.deserialize::<RawOrder>().enumerate() {
        let location = format!("line {}", idx + 2);
        let rec = result.map_err(|e| PipelineError::malformed(&name, &location, e.to_string()))?;

        let order_id = required(rec.order_id, "order_id", &name, &location)?;
        let customer_identity =
            required(rec.customer_identity, "customer_identity", &name, &location)?;
        let raw_amount = required(rec.amount, "amount", &name, &location)?;
        let amount = raw_amount
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|a| a.is_finite())
            .ok_or_else(|| {
                PipelineError::malformed(
                    &name,
                    &location,
                    format!("amount '{}' is not a finite number", raw_amount),
                )
            })?;

        orders.push(OrderRecord {
            order_id,
            customer_identity,
            amount,
        });
    }

    info!(source = %name, count = orders.len(), "📥 orders read");
    Ok(orders)
}
