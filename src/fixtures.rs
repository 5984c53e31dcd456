//! Sample raw dataset
//!
//! Writes a small, fixed customer/order pair that exercises every cleaning
//! rule: a customer recorded twice, a negative amount, an order for a customer
//! that does not exist.

use std::{fs, path::Path};

use serde::Serialize;
use tracing::info;

use crate::{
    error::{PipelineError, Result},
    ingest::{CUSTOMERS_FILE, ORDERS_FILE},
};

#[derive(Serialize)]
struct FixtureCustomer {
    identity: &'static str,
    display_name: &'static str,
    timestamp: &'static str,
}

#[derive(Serialize)]
struct FixtureOrder {
    order_id: u32,
    customer_identity: &'static str,
    amount: f64,
}

const CUSTOMERS: [FixtureCustomer; 4] = [
    FixtureCustomer {
        identity: "alice@example.com",
        display_name: "Alice",
        timestamp: "2023-01-01",
    },
    FixtureCustomer {
        identity: "bob@example.com",
        display_name: "Bob",
        timestamp: "2023-01-05",
    },
    // Newer record for Alice
    FixtureCustomer {
        identity: "alice@example.com",
        display_name: "Alice Smith",
        timestamp: "2023-01-10",
    },
    FixtureCustomer {
        identity: "charlie@example.com",
        display_name: "Charlie",
        timestamp: "2023-02-01",
    },
];

const ORDERS: [FixtureOrder; 6] = [
    FixtureOrder {
        order_id: 101,
        customer_identity: "alice@example.com",
        amount: 1000.0,
    },
    FixtureOrder {
        order_id: 102,
        customer_identity: "bob@example.com",
        amount: 50.0,
    },
    FixtureOrder {
        order_id: 103,
        customer_identity: "alice@example.com",
        amount: 400.0,
    },
    FixtureOrder {
        order_id: 104,
        customer_identity: "charlie@example.com",
        amount: -50.0,
    },
    FixtureOrder {
        order_id: 105,
        customer_identity: "nobody@example.com",
        amount: 10.0,
    },
    FixtureOrder {
        order_id: 106,
        customer_identity: "charlie@example.com",
        amount: 0.0,
    },
];

/// Write `customers.json` and `orders.csv` into `data_dir`, creating it.
pub fn generate_fixtures(data_dir: &Path) -> Result<()> {
    fs::create_dir_all(data_dir).map_err(|e| PipelineError::io(data_dir, e))?;

    let customers_path = data_dir.join(CUSTOMERS_FILE);
    let json = serde_json::to_string_pretty(&CUSTOMERS)
        .map_err(|e| PipelineError::io(&customers_path, e.into()))?;
    fs::write(&customers_path, json).map_err(|e| PipelineError::io(&customers_path, e))?;

    let orders_path = data_dir.join(ORDERS_FILE);
    let mut writer =
        csv::Writer::from_path(&orders_path).map_err(|e| PipelineError::io(&orders_path, e.into()))?;
    for order in &ORDERS {
        writer
            .serialize(order)
            .map_err(|e| PipelineError::io(&orders_path, e.into()))?;
    }
    writer
        .flush()
        .map_err(|e| PipelineError::io(&orders_path, e))?;

    info!(dir = %data_dir.display(), "🧪 sample data generated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ingest::{read_customers, read_orders},
        transform::transform,
    };

    #[test]
    fn test_fixtures_contain_each_defect_once() {
        let dir = tempfile::tempdir().unwrap();
        generate_fixtures(dir.path()).unwrap();

        let customers = read_customers(&dir.path().join(CUSTOMERS_FILE)).unwrap();
        let orders = read_orders(&dir.path().join(ORDERS_FILE)).unwrap();
        assert_eq!(customers.len(), 4);
        assert_eq!(orders.len(), 6);

        let (dataset, report) = transform(&customers, &orders);
        assert_eq!(report.duplicates_collapsed(), 1);
        assert_eq!(report.orders_rejected_invalid, 1);
        assert_eq!(report.orders_rejected_integrity, 1);
        assert_eq!(dataset.orders().len(), 4);
    }

    #[test]
    fn test_generation_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        generate_fixtures(dir.path()).unwrap();
        let first = fs::read(dir.path().join(ORDERS_FILE)).unwrap();
        generate_fixtures(dir.path()).unwrap();
        let second = fs::read(dir.path().join(ORDERS_FILE)).unwrap();
        assert_eq!(first, second);
    }
}
