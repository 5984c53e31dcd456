//! End-to-end run: ingest, transform, load, report.
//!
//! Stages run one after another on the calling thread. The storage handle is
//! passed in explicitly; [`run`] opens the SQLite file for the duration of the
//! call and closes it on return.

use tracing::info;

use crate::{
    aggregate::ltv_report,
    config::PipelineConfig,
    error::{PipelineError, Result, Stage},
    fixtures::generate_fixtures,
    ingest::{read_customers, read_orders},
    load::{load, LoadSummary},
    models::LtvRow,
    storage::{SqliteStore, Storage},
    transform::{transform, TransformReport},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Write the sample dataset before reading it
    pub generate: bool,
    /// Only report from what storage already holds
    pub skip_etl: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// `None` when the ETL stages were skipped
    pub transform: Option<TransformReport>,
    pub load: Option<LoadSummary>,
    pub report: Vec<LtvRow>,
}

/// Read the raw files, clean them and load the result into `storage`.
pub fn etl<S: Storage + ?Sized>(
    config: &PipelineConfig,
    storage: &mut S,
) -> Result<(TransformReport, LoadSummary)> {
    let customers = read_customers(&config.customers_path())?;
    let orders = read_orders(&config.orders_path())?;

    let (dataset, report) = transform(&customers, &orders);
    info!("🧹 transform complete: {}", report.summary());

    let summary = load(dataset, storage)?;
    Ok((report, summary))
}

/// Run every stage against an already opened store.
pub fn run_with<S: Storage + ?Sized>(
    config: &PipelineConfig,
    options: RunOptions,
    storage: &mut S,
) -> Result<RunOutcome> {
    if options.generate || !config.data_dir.exists() {
        generate_fixtures(&config.data_dir)?;
    }

    let (transform, load) = if options.skip_etl {
        info!("⏭️ ETL skipped, reporting from existing storage");
        (None, None)
    } else {
        let (report, summary) = etl(config, storage)?;
        (Some(report), Some(summary))
    };

    let report = ltv_report(&*storage, config.top_n)?;
    Ok(RunOutcome {
        transform,
        load,
        report,
    })
}

/// Open the configured SQLite database and run every stage against it.
pub fn run(config: &PipelineConfig, options: RunOptions) -> Result<RunOutcome> {
    let stage = if options.skip_etl {
        Stage::Report
    } else {
        Stage::Load
    };
    let mut storage =
        SqliteStore::open(&config.db_path).map_err(|source| PipelineError::Storage { stage, source })?;
    run_with(config, options, &mut storage)
}
