use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A customer as produced by the raw customer source.
///
/// `identity` is both the dedup key and the join key for orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub identity: String,
    pub display_name: String,
    pub timestamp: DateTime<Utc>,
}

impl CustomerRecord {
    pub fn new(
        identity: impl Into<String>,
        display_name: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            identity: identity.into(),
            display_name: display_name.into(),
            timestamp,
        }
    }
}

/// An order referencing a customer by identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Opaque, not required to be unique
    pub order_id: String,
    pub customer_identity: String,
    pub amount: f64,
}

impl OrderRecord {
    pub fn new(
        order_id: impl Into<String>,
        customer_identity: impl Into<String>,
        amount: f64,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            customer_identity: customer_identity.into(),
            amount,
        }
    }
}

/// Output of the transform stage: canonical customers plus the orders that
/// passed both the validity and the integrity checks.
///
/// Only [`crate::transform::transform`] builds one, so every value of this type
/// upholds: identities are unique, amounts are non-negative and every order
/// references a customer in the set.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedDataset {
    customers: Vec<CustomerRecord>,
    orders: Vec<OrderRecord>,
}

impl CleanedDataset {
    pub(crate) fn new(customers: Vec<CustomerRecord>, orders: Vec<OrderRecord>) -> Self {
        Self { customers, orders }
    }

    pub fn customers(&self) -> &[CustomerRecord] {
        &self.customers
    }

    pub fn orders(&self) -> &[OrderRecord] {
        &self.orders
    }
}

/// One line of the lifetime value report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LtvRow {
    pub identity: String,
    pub display_name: String,
    pub total_amount: f64,
    pub order_count: u64,
}
