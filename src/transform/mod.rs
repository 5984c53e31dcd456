//! Transform stage
//!
//! Raw customers are deduplicated into the canonical set; raw orders are
//! filtered for validity and then against that set. The result is a
//! [`CleanedDataset`] and a [`TransformReport`] with exact rejection counts.

pub mod dedupe;
pub mod integrity;
pub mod validator;

use std::collections::HashSet;

use tracing::info;

use crate::models::{CleanedDataset, CustomerRecord, OrderRecord};

pub use dedupe::dedupe;
pub use integrity::{check_order, enforce_integrity, FilteredOrders, RejectReason};
pub use validator::is_valid_order;

/// Counts produced by one transform run. Same input, same counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformReport {
    pub customers_read: usize,
    pub customers_kept: usize,
    pub orders_read: usize,
    pub orders_kept: usize,
    pub orders_rejected_invalid: usize,
    pub orders_rejected_integrity: usize,
}

impl TransformReport {
    pub fn duplicates_collapsed(&self) -> usize {
        self.customers_read - self.customers_kept
    }

    pub fn orders_rejected(&self) -> usize {
        self.orders_rejected_invalid + self.orders_rejected_integrity
    }

    /// One-line summary suitable for logging.
    pub fn summary(&self) -> String {
        format!(
            "customers={}/{} (dups={}), orders={}/{} (invalid={}, integrity={})",
            self.customers_kept,
            self.customers_read,
            self.duplicates_collapsed(),
            self.orders_kept,
            self.orders_read,
            self.orders_rejected_invalid,
            self.orders_rejected_integrity
        )
    }
}

/// Run dedup, validity and integrity checks over the raw record sets.
pub fn transform(
    customers: &[CustomerRecord],
    orders: &[OrderRecord],
) -> (CleanedDataset, TransformReport) {
    let canonical = dedupe(customers);
    let identities: HashSet<&str> = canonical.iter().map(|c| c.identity.as_str()).collect();
    let filtered = enforce_integrity(orders, &identities);

    let report = TransformReport {
        customers_read: customers.len(),
        customers_kept: canonical.len(),
        orders_read: orders.len(),
        orders_kept: filtered.orders.len(),
        orders_rejected_invalid: filtered.rejected_invalid,
        orders_rejected_integrity: filtered.rejected_integrity,
    };

    info!(
        read = report.customers_read,
        kept = report.customers_kept,
        duplicates = report.duplicates_collapsed(),
        "👥 customers deduplicated"
    );
    info!(
        read = report.orders_read,
        kept = report.orders_kept,
        invalid = report.orders_rejected_invalid,
        integrity = report.orders_rejected_integrity,
        "🧾 orders filtered"
    );

    (CleanedDataset::new(canonical, filtered.orders), report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::parse_timestamp;

    fn customer(identity: &str, name: &str, ts: &str) -> CustomerRecord {
        CustomerRecord::new(identity, name, parse_timestamp(ts).unwrap())
    }

    #[test]
    fn test_transform_concrete_scenario() {
        let customers = vec![
            customer("a@x", "Alice", "2024-01-01"),
            customer("a@x", "Alice2", "2024-02-01"),
            customer("b@x", "Bob", "2024-01-01"),
        ];
        let orders = vec![
            OrderRecord::new("1", "a@x", 100.0),
            OrderRecord::new("2", "a@x", -5.0),
            OrderRecord::new("3", "b@x", 50.0),
            OrderRecord::new("4", "ghost@x", 999.0),
        ];

        let (dataset, report) = transform(&customers, &orders);

        assert_eq!(dataset.customers().len(), 2);
        let alice = dataset
            .customers()
            .iter()
            .find(|c| c.identity == "a@x")
            .unwrap();
        assert_eq!(alice.display_name, "Alice2");

        let kept: Vec<_> = dataset.orders().iter().map(|o| o.order_id.as_str()).collect();
        assert_eq!(kept, vec!["1", "3"]);

        assert_eq!(
            report,
            TransformReport {
                customers_read: 3,
                customers_kept: 2,
                orders_read: 4,
                orders_kept: 2,
                orders_rejected_invalid: 1,
                orders_rejected_integrity: 1,
            }
        );
        assert_eq!(report.duplicates_collapsed(), 1);
        assert_eq!(report.orders_rejected(), 2);
    }

    #[test]
    fn test_transform_is_reproducible() {
        let customers = vec![
            customer("a@x", "A1", "2024-01-01"),
            customer("a@x", "A2", "2024-01-01"),
        ];
        let orders = vec![OrderRecord::new("1", "a@x", 1.0)];
        let first = transform(&customers, &orders);
        let second = transform(&customers, &orders);
        assert_eq!(first, second);
        assert_eq!(first.0.customers()[0].display_name, "A2");
    }

    #[test]
    fn test_summary_mentions_counts() {
        let report = TransformReport {
            customers_read: 4,
            customers_kept: 3,
            orders_read: 6,
            orders_kept: 3,
            orders_rejected_invalid: 2,
            orders_rejected_integrity: 1,
        };
        assert_eq!(
            report.summary(),
            "customers=3/4 (dups=1), orders=3/6 (invalid=2, integrity=1)"
        );
    }
}
