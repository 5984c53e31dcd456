//! Aggregation stage: lifetime value ranking over stored data.

use tracing::{error, info};

use crate::{
    error::{PipelineError, Result, Stage},
    models::LtvRow,
    storage::Storage,
};

pub const DEFAULT_TOP_N: usize = 3;

/// Top `top_n` customers by summed order amount.
///
/// Read-only. Ties on the total are broken by identity ascending, so the
/// ranking is stable across runs. `top_n == 0` yields an empty report; a
/// `top_n` beyond the number of customers with orders yields all of them.
pub fn ltv_report<S: Storage + ?Sized>(storage: &S, top_n: usize) -> Result<Vec<LtvRow>> {
    if top_n == 0 {
        return Ok(Vec::new());
    }

    let rows = storage.lifetime_values(top_n).map_err(|source| {
        error!(top_n, error = %source, "💥 lifetime value query failed");
        PipelineError::Storage {
            stage: Stage::Report,
            source,
        }
    })?;

    info!(top_n, rows = rows.len(), "🏆 lifetime value report ready");
    Ok(rows)
}
