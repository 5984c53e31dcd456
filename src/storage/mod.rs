//! Relational storage capability
//!
//! The pipeline only needs two things from a backing store: an atomic full
//! refresh of both tables, and a grouped-sum query with a stable ordering.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::{
    error::StorageError,
    models::{CustomerRecord, LtvRow, OrderRecord},
};

pub const CUSTOMERS_TABLE: &str = "customers";
pub const ORDERS_TABLE: &str = "orders";

pub trait Storage {
    /// Replace the contents of the customer and order tables.
    ///
    /// All or nothing: on error the previous contents must remain visible.
    fn replace_all(
        &mut self,
        customers: &[CustomerRecord],
        orders: &[OrderRecord],
    ) -> Result<(), StorageError>;

    /// Sum order amounts per customer, ordered by total descending then
    /// identity ascending, keeping at most `limit` rows. Customers without
    /// orders produce no row.
    fn lifetime_values(&self, limit: usize) -> Result<Vec<LtvRow>, StorageError>;

    /// Current `(customers, orders)` row counts.
    fn row_counts(&self) -> Result<(usize, usize), StorageError>;
}
