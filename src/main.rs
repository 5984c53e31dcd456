//! LTV Pipeline CLI
//!
//! Usage:
//!   ltv-pipeline --generate
//!   ltv-pipeline --data-dir ./data --db ./shop_data.db --top 5
//!   ltv-pipeline --no-etl --json
//!
//! Environment Variables:
//!   LTV_PIPELINE_CONFIG - Path to TOML config file (default: ltv_pipeline.toml)
//!   RUST_LOG            - Log filter (default: ltv_pipeline=info)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use ltv_pipeline::{
    config::PipelineConfig,
    pipeline::{run, RunOptions},
    report::{render_json, render_table},
};

#[derive(Parser, Debug)]
#[command(name = "ltv-pipeline")]
#[command(about = "Clean customer/order data, load it and report top customers by lifetime value")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, env = "LTV_PIPELINE_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding customers.json and orders.csv
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// SQLite database file
    #[arg(long)]
    db: Option<PathBuf>,

    /// Number of customers in the report
    #[arg(short, long)]
    top: Option<usize>,

    /// Write the sample dataset before running
    #[arg(long)]
    generate: bool,

    /// Skip ingest/transform/load and only report from the existing database
    #[arg(long)]
    no_etl: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let _ = dotenv::dotenv();
    init_tracing();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::from_env()?,
    };
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(db) = args.db {
        config.db_path = db;
    }
    if let Some(top) = args.top {
        config.top_n = top;
    }

    info!(
        data_dir = %config.data_dir.display(),
        db = %config.db_path.display(),
        top_n = config.top_n,
        "🚀 starting LTV pipeline"
    );

    let outcome = run(
        &config,
        RunOptions {
            generate: args.generate,
            skip_etl: args.no_etl,
        },
    )
    .context("Pipeline run failed")?;

    if let Some(transform) = &outcome.transform {
        info!(
            "rejected orders: invalid={}, integrity={}",
            transform.orders_rejected_invalid, transform.orders_rejected_integrity
        );
    }

    if args.json {
        println!("{}", render_json(&outcome.report)?);
    } else {
        println!("\n--- TOP {} CUSTOMERS (LTV Report) ---", config.top_n);
        print!("{}", render_table(&outcome.report));
    }

    Ok(())
}

/// Initialize tracing from RUST_LOG
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ltv_pipeline=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
