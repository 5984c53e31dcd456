//! SQLite-backed table storage
//!
//! - Foreign keys enforced, so an order can never outlive its customer
//! - Full refresh runs inside one IMMEDIATE transaction; any failed statement
//!   drops the transaction and SQLite rolls back to the previous contents
//! - Existing tables are checked against the expected columns on open

use std::path::Path;

use rusqlite::{params, Connection, OpenFlags, TransactionBehavior};
use tracing::{debug, info};

use super::{Storage, CUSTOMERS_TABLE, ORDERS_TABLE};
use crate::{
    error::StorageError,
    models::{CustomerRecord, LtvRow, OrderRecord},
};

const SCHEMA_SQL: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS customers (
    identity TEXT PRIMARY KEY,
    display_name TEXT NOT NULL,
    created_at TEXT NOT NULL
) WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS orders (
    order_id TEXT NOT NULL,
    customer_identity TEXT NOT NULL REFERENCES customers(identity),
    amount REAL NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_orders_customer
    ON orders(customer_identity);
"#;

const CUSTOMER_COLUMNS: [&str; 3] = ["identity", "display_name", "created_at"];
const ORDER_COLUMNS: [&str; 3] = ["order_id", "customer_identity", "amount"];

const LTV_SQL: &str = "SELECT c.identity, c.display_name, SUM(o.amount) AS total_amount, COUNT(o.order_id) AS order_count
     FROM customers c
     JOIN orders o ON o.customer_identity = c.identity
     GROUP BY c.identity, c.display_name
     ORDER BY total_amount DESC, c.identity ASC
     LIMIT ?1";

pub struct SqliteStore {
    conn: Connection,
    target: String,
}

impl SqliteStore {
    /// Open (creating if needed) a database file.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db_path = db_path.as_ref();
        let target = db_path.display().to_string();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(db_path, flags).map_err(|source| {
            StorageError::Unreachable {
                target: target.clone(),
                source,
            }
        })?;
        Self::init(conn, target)
    }

    /// Private in-memory database, gone when the store is dropped.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|source| StorageError::Unreachable {
            target: ":memory:".to_string(),
            source,
        })?;
        Self::init(conn, ":memory:".to_string())
    }

    fn init(conn: Connection, target: String) -> Result<Self, StorageError> {
        // Verify before CREATE ... IF NOT EXISTS, which would silently accept a foreign table
        verify_columns(&conn, CUSTOMERS_TABLE, &CUSTOMER_COLUMNS)?;
        verify_columns(&conn, ORDERS_TABLE, &ORDER_COLUMNS)?;

        conn.execute_batch(SCHEMA_SQL)
            .map_err(|source| StorageError::Query {
                operation: "apply schema",
                source,
            })?;

        let store = Self { conn, target };
        let (customers, orders) = store.row_counts()?;
        info!(
            db = %store.target,
            customers,
            orders,
            "📊 storage opened"
        );
        Ok(store)
    }

    /// All stored customers, ordered by identity.
    pub fn customers(&self) -> Result<Vec<CustomerRecord>, StorageError> {
        let query_err = |source| StorageError::Query {
            operation: "read customers",
            source,
        };
        let mut stmt = self
            .conn
            .prepare_cached(
                "SELECT identity, display_name, created_at FROM customers ORDER BY identity",
            )
            .map_err(query_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CustomerRecord {
                    identity: row.get(0)?,
                    display_name: row.get(1)?,
                    timestamp: row.get(2)?,
                })
            })
            .map_err(query_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(query_err)
    }

    /// All stored orders, in insertion order.
    pub fn orders(&self) -> Result<Vec<OrderRecord>, StorageError> {
        let query_err = |source| StorageError::Query {
            operation: "read orders",
            source,
        };
        let mut stmt = self
            .conn
            .prepare_cached(
                "SELECT order_id, customer_identity, amount FROM orders ORDER BY rowid",
            )
            .map_err(query_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(OrderRecord {
                    order_id: row.get(0)?,
                    customer_identity: row.get(1)?,
                    amount: row.get(2)?,
                })
            })
            .map_err(query_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(query_err)
    }

    fn count(&self, table: &'static str) -> Result<usize, StorageError> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })
            .map_err(|source| StorageError::Query {
                operation: "count rows",
                source,
            })?;
        Ok(count as usize)
    }
}

/// Compare an existing table's columns with `expected`. A missing table passes.
fn verify_columns(
    conn: &Connection,
    table: &'static str,
    expected: &[&str],
) -> Result<(), StorageError> {
    let query_err = |source| StorageError::Query {
        operation: "inspect schema",
        source,
    };
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")
        .map_err(query_err)?;
    let found = stmt
        .query_map([table], |row| row.get::<_, String>(0))
        .map_err(query_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(query_err)?;

    if found.is_empty() || found.iter().map(String::as_str).eq(expected.iter().copied()) {
        return Ok(());
    }

    Err(StorageError::SchemaMismatch {
        table,
        expected: expected.iter().map(|c| c.to_string()).collect(),
        found,
    })
}

impl Storage for SqliteStore {
    fn replace_all(
        &mut self,
        customers: &[CustomerRecord],
        orders: &[OrderRecord],
    ) -> Result<(), StorageError> {
        let customer_err = |source| StorageError::Write {
            table: CUSTOMERS_TABLE,
            rows: customers.len(),
            source,
        };
        let order_err = |source| StorageError::Write {
            table: ORDERS_TABLE,
            rows: orders.len(),
            source,
        };

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|source| StorageError::Query {
                operation: "begin transaction",
                source,
            })?;

        // Orders first: they reference customers
        tx.execute("DELETE FROM orders", []).map_err(order_err)?;
        tx.execute("DELETE FROM customers", []).map_err(customer_err)?;

        {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT INTO customers (identity, display_name, created_at) VALUES (?1, ?2, ?3)",
                )
                .map_err(customer_err)?;
            for c in customers {
                stmt.execute(params![&c.identity, &c.display_name, &c.timestamp])
                    .map_err(customer_err)?;
            }
        }

        {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT INTO orders (order_id, customer_identity, amount) VALUES (?1, ?2, ?3)",
                )
                .map_err(order_err)?;
            for o in orders {
                stmt.execute(params![&o.order_id, &o.customer_identity, o.amount])
                    .map_err(order_err)?;
            }
        }

        tx.commit().map_err(|source| StorageError::Query {
            operation: "commit transaction",
            source,
        })?;

        debug!(
            customers = customers.len(),
            orders = orders.len(),
            "📦 tables replaced"
        );
        Ok(())
    }

    fn lifetime_values(&self, limit: usize) -> Result<Vec<LtvRow>, StorageError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let query_err = |source| StorageError::Query {
            operation: "lifetime value query",
            source,
        };
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let mut stmt = self.conn.prepare_cached(LTV_SQL).map_err(query_err)?;
        let rows = stmt
            .query_map([limit], |row| {
                Ok(LtvRow {
                    identity: row.get(0)?,
                    display_name: row.get(1)?,
                    total_amount: row.get(2)?,
                    order_count: row.get::<_, i64>(3)? as u64,
                })
            })
            .map_err(query_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(query_err)
    }

    fn row_counts(&self) -> Result<(usize, usize), StorageError> {
        Ok((self.count(CUSTOMERS_TABLE)?, self.count(ORDERS_TABLE)?))
    }
}
