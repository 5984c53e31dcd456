//! Customer lifetime value pipeline
//!
//! Cleans raw customer and order records (dedup, validity, referential
//! integrity), loads them into relational storage as a full refresh and ranks
//! customers by summed order amount.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod ingest;
pub mod load;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod storage;
pub mod transform;

pub use aggregate::ltv_report;
pub use error::{PipelineError, Result, Stage, StorageError};
pub use load::load;
pub use models::{CleanedDataset, CustomerRecord, LtvRow, OrderRecord};
pub use storage::{MemoryStore, SqliteStore, Storage};
pub use transform::{dedupe, enforce_integrity, is_valid_order, transform};
