//! Record-level domain rules.

use crate::models::OrderRecord;

/// An order is valid unless its amount is negative. Zero is a valid amount.
///
/// Amounts are checked for finiteness at ingest, so this is total over every
/// `OrderRecord` that reaches the transform stage.
#[inline]
pub fn is_valid_order(order: &OrderRecord) -> bool {
    order.amount >= 0.0
}
