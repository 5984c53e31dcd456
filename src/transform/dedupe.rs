//! Customer deduplication
//!
//! Records sharing an identity collapse to the one with the latest timestamp.
//! When several records share the latest timestamp the one seen last in input
//! order wins, so the result never depends on hash or sort stability.

use std::collections::HashMap;

use crate::models::CustomerRecord;

/// Collapse `customers` to one canonical record per identity.
///
/// Output holds one record per identity, positioned where that identity first
/// appeared in the input.
pub fn dedupe(customers: &[CustomerRecord]) -> Vec<CustomerRecord> {
    let mut slots: HashMap<&str, usize> = HashMap::with_capacity(customers.len());
    let mut canonical: Vec<CustomerRecord> = Vec::with_capacity(customers.len());

    for record in customers {
        match slots.get(record.identity.as_str()) {
            Some(&slot) => {
                // `>=` makes the later record win on equal timestamps
                if record.timestamp >= canonical[slot].timestamp {
                    canonical[slot] = record.clone();
                }
            }
            None => {
                slots.insert(record.identity.as_str(), canonical.len());
                canonical.push(record.clone());
            }
        }
    }

    canonical
}
