//! In-process table storage
//!
//! Same contract as [`super::SqliteStore`] without a database file: identities
//! are unique and every order references a stored customer. Useful as an
//! alternative sink and for exercising the stages in isolation.

use std::collections::{BTreeMap, HashSet};

use super::{Storage, CUSTOMERS_TABLE, ORDERS_TABLE};
use crate::{
    error::StorageError,
    models::{CustomerRecord, LtvRow, OrderRecord},
};

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    customers: Vec<CustomerRecord>,
    orders: Vec<OrderRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn customers(&self) -> &[CustomerRecord] {
        &self.customers
    }

    pub fn orders(&self) -> &[OrderRecord] {
        &self.orders
    }
}

impl Storage for MemoryStore {
    fn replace_all(
        &mut self,
        customers: &[CustomerRecord],
        orders: &[OrderRecord],
    ) -> Result<(), StorageError> {
        // Checked up front so a rejected refresh leaves the old tables in place
        let mut identities: HashSet<&str> = HashSet::with_capacity(customers.len());
        for customer in customers {
            if !identities.insert(customer.identity.as_str()) {
                return Err(StorageError::Constraint {
                    table: CUSTOMERS_TABLE,
                    rows: customers.len(),
                    reason: format!("duplicate identity '{}'", customer.identity),
                });
            }
        }
        if let Some(order) = orders
            .iter()
            .find(|o| !identities.contains(o.customer_identity.as_str()))
        {
            return Err(StorageError::Constraint {
                table: ORDERS_TABLE,
                rows: orders.len(),
                reason: format!(
                    "order '{}' references unknown customer '{}'",
                    order.order_id, order.customer_identity
                ),
            });
        }

        self.customers = customers.to_vec();
        self.orders = orders.to_vec();
        Ok(())
    }

    fn lifetime_values(&self, limit: usize) -> Result<Vec<LtvRow>, StorageError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        // identity -> (total, count); BTreeMap gives the identity tie-break for free
        let mut totals: BTreeMap<&str, (f64, u64)> = BTreeMap::new();
        for order in &self.orders {
            let entry = totals.entry(order.customer_identity.as_str()).or_default();
            entry.0 += order.amount;
            entry.1 += 1;
        }

        let mut rows: Vec<LtvRow> = self
            .customers
            .iter()
            .filter_map(|c| {
                totals.get(c.identity.as_str()).map(|&(total, count)| LtvRow {
                    identity: c.identity.clone(),
                    display_name: c.display_name.clone(),
                    total_amount: total,
                    order_count: count,
                })
            })
            .collect();

        rows.sort_by(|a, b| {
            b.total_amount
                .total_cmp(&a.total_amount)
                .then_with(|| a.identity.cmp(&b.identity))
        });
        rows.truncate(limit);
        Ok(rows)
    }

    fn row_counts(&self) -> Result<(usize, usize), StorageError> {
        Ok((self.customers.len(), self.orders.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn customer(identity: &str, name: &str) -> CustomerRecord {
        CustomerRecord::new(identity, name, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_replace_all_overwrites() {
        let mut store = MemoryStore::new();
        store
            .replace_all(&[customer("a@x", "A")], &[OrderRecord::new("1", "a@x", 1.0)])
            .unwrap();
        store.replace_all(&[customer("b@x", "B")], &[]).unwrap();
        assert_eq!(store.row_counts().unwrap(), (1, 0));
        assert_eq!(store.customers()[0].identity, "b@x");
    }

    #[test]
    fn test_lifetime_values_ordering() {
        let mut store = MemoryStore::new();
        store
            .replace_all(
                &[customer("c@x", "C"), customer("b@x", "B"), customer("a@x", "A"), customer("z@x", "Z")],
                &[
                    OrderRecord::new("1", "c@x", 30.0),
                    OrderRecord::new("2", "b@x", 50.0),
                    OrderRecord::new("3", "a@x", 20.0),
                    OrderRecord::new("4", "a@x", 30.0),
                ],
            )
            .unwrap();

        let rows = store.lifetime_values(10).unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.identity.as_str()).collect();
        // a and b tie at 50, identity breaks the tie; z has no orders
        assert_eq!(ids, vec!["a@x", "b@x", "c@x"]);
        assert_eq!(rows[0].order_count, 2);
        assert!(store.lifetime_values(0).unwrap().is_empty());
        assert_eq!(store.lifetime_values(1).unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_identity_rejected_atomically() {
        let mut store = MemoryStore::new();
        store
            .replace_all(&[customer("b@x", "B")], &[OrderRecord::new("9", "b@x", 7.0)])
            .unwrap();

        let err = store
            .replace_all(
                &[customer("a@x", "A"), customer("a@x", "A2")],
                &[OrderRecord::new("1", "a@x", 10.0)],
            )
            .unwrap_err();
        match err {
            StorageError::Constraint { table, rows, reason } => {
                assert_eq!(table, CUSTOMERS_TABLE);
                assert_eq!(rows, 2);
                assert!(reason.contains("a@x"));
            }
            other => panic!("unexpected error {:?}", other),
        }

        assert_eq!(store.row_counts().unwrap(), (1, 1));
        let rows = store.lifetime_values(10).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].identity, "b@x");
    }

    #[test]
    fn test_unknown_customer_order_rejected_atomically() {
        let mut store = MemoryStore::new();
        store
            .replace_all(&[customer("b@x", "B")], &[OrderRecord::new("9", "b@x", 7.0)])
            .unwrap();

        let err = store
            .replace_all(
                &[customer("a@x", "A")],
                &[OrderRecord::new("1", "a@x", 10.0), OrderRecord::new("2", "ghost@x", 5.0)],
            )
            .unwrap_err();
        assert!(matches!(
            err,
            StorageError::Constraint { table: ORDERS_TABLE, rows: 2, .. }
        ));

        assert_eq!(store.customers()[0].identity, "b@x");
        assert_eq!(store.orders()[0].order_id, "9");
    }
}
