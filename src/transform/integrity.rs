//! Order validity and referential integrity filter.

use std::collections::HashSet;

use tracing::debug;

use super::validator::is_valid_order;
use crate::models::OrderRecord;

/// Why an order was excluded from the cleaned dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Amount below zero.
    InvalidAmount,
    /// Customer identity absent from the canonical customer set.
    UnknownCustomer,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::InvalidAmount => "invalid_amount",
            RejectReason::UnknownCustomer => "unknown_customer",
        }
    }
}

/// Surviving orders plus exact rejection counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredOrders {
    pub orders: Vec<OrderRecord>,
    pub rejected_invalid: usize,
    pub rejected_integrity: usize,
}

impl FilteredOrders {
    pub fn rejected(&self) -> usize {
        self.rejected_invalid + self.rejected_integrity
    }
}

/// Classify one order. Validity is checked first, so an order that fails both
/// rules is attributed to `InvalidAmount` only.
pub fn check_order(
    order: &OrderRecord,
    valid_customer_identities: &HashSet<&str>,
) -> Option<RejectReason> {
    if !is_valid_order(order) {
        return Some(RejectReason::InvalidAmount);
    }
    if !valid_customer_identities.contains(order.customer_identity.as_str()) {
        return Some(RejectReason::UnknownCustomer);
    }
    None
}

/// Drop invalid orders and orders referencing unknown customers.
///
/// Inputs are left untouched; survivors keep their relative order.
pub fn enforce_integrity(
    orders: &[OrderRecord],
    valid_customer_identities: &HashSet<&str>,
) -> FilteredOrders {
    let mut out = FilteredOrders {
        orders: Vec::with_capacity(orders.len()),
        ..Default::default()
    };

    for order in orders {
        match check_order(order, valid_customer_identities) {
            None => out.orders.push(order.clone()),
            Some(reason) => {
                debug!(
                    order_id = %order.order_id,
                    customer = %order.customer_identity,
                    amount = order.amount,
                    reason = reason.as_str(),
                    "dropping order"
                );
                match reason {
                    RejectReason::InvalidAmount => out.rejected_invalid += 1,
                    RejectReason::UnknownCustomer => out.rejected_integrity += 1,
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids<'a>(list: &[&'a str]) -> HashSet<&'a str> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_drops_unknown_customer() {
        let orders = vec![
            OrderRecord::new("1", "a@x", 10.0),
            OrderRecord::new("2", "ghost@x", 20.0),
        ];
        let out = enforce_integrity(&orders, &ids(&["a@x"]));
        assert_eq!(out.orders, vec![OrderRecord::new("1", "a@x", 10.0)]);
        assert_eq!(out.rejected_integrity, 1);
        assert_eq!(out.rejected_invalid, 0);
    }

    #[test]
    fn test_order_failing_both_rules_counted_once() {
        let orders = vec![OrderRecord::new("1", "ghost@x", -3.0)];
        let out = enforce_integrity(&orders, &ids(&["a@x"]));
        assert!(out.orders.is_empty());
        assert_eq!(out.rejected_invalid, 1);
        assert_eq!(out.rejected_integrity, 0);
        assert_eq!(out.rejected(), 1);
    }

    #[test]
    fn test_preserves_relative_order_and_input() {
        let orders = vec![
            OrderRecord::new("1", "b@x", 5.0),
            OrderRecord::new("2", "a@x", -1.0),
            OrderRecord::new("3", "a@x", 0.0),
            OrderRecord::new("4", "zed@x", 1.0),
            OrderRecord::new("5", "b@x", 7.0),
        ];
        let before = orders.clone();
        let out = enforce_integrity(&orders, &ids(&["a@x", "b@x"]));

        let kept: Vec<_> = out.orders.iter().map(|o| o.order_id.as_str()).collect();
        assert_eq!(kept, vec!["1", "3", "5"]);
        assert_eq!(orders, before);
        assert_eq!(out.rejected_invalid, 1);
        assert_eq!(out.rejected_integrity, 1);
    }

    #[test]
    fn test_empty_reference_set_drops_everything_valid() {
        let orders = vec![OrderRecord::new("1", "a@x", 1.0)];
        let out = enforce_integrity(&orders, &HashSet::new());
        assert!(out.orders.is_empty());
        assert_eq!(out.rejected_integrity, 1);
    }
}
