//! Load stage: full refresh of storage from a cleaned dataset.

use tracing::{error, info};

use crate::{
    error::{PipelineError, Result, Stage},
    models::CleanedDataset,
    storage::Storage,
};

/// Row counts written by one load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub customers: usize,
    pub orders: usize,
}

/// Replace storage contents with `dataset`.
///
/// Either the whole dataset becomes visible or storage keeps what it had.
/// Loading the same dataset twice leaves storage in the same state.
pub fn load<S: Storage + ?Sized>(dataset: CleanedDataset, storage: &mut S) -> Result<LoadSummary> {
    let summary = LoadSummary {
        customers: dataset.customers().len(),
        orders: dataset.orders().len(),
    };

    storage
        .replace_all(dataset.customers(), dataset.orders())
        .map_err(|source| {
            error!(
                customers = summary.customers,
                orders = summary.orders,
                error = %source,
                "💥 load failed, storage left unchanged"
            );
            PipelineError::Storage {
                stage: Stage::Load,
                source,
            }
        })?;

    info!(
        customers = summary.customers,
        orders = summary.orders,
        "💾 cleaned dataset loaded"
    );
    Ok(summary)
}
