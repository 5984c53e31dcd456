//! Pipeline configuration
//!
//! Read from a TOML file; every field is optional and falls back to its
//! default. Command-line flags override whatever the file says.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::aggregate::DEFAULT_TOP_N;

pub const CONFIG_PATH_ENV: &str = "LTV_PIPELINE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "ltv_pipeline.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory holding `customers.json` and `orders.csv`
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// SQLite database file
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Rows in the lifetime value report
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_db_path() -> PathBuf {
    PathBuf::from("shop_data.db")
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            db_path: default_db_path(),
            top_n: default_top_n(),
        }
    }
}

impl PipelineConfig {
    /// Load from TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Load from the file named by `LTV_PIPELINE_CONFIG`, or the default path.
    /// A missing default file yields the defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load(path),
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::load(DEFAULT_CONFIG_PATH),
            Err(_) => {
                tracing::debug!("No {} found, using default config", DEFAULT_CONFIG_PATH);
                Ok(Self::default())
            }
        }
    }

    /// Save to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn customers_path(&self) -> PathBuf {
        self.data_dir.join(crate::ingest::CUSTOMERS_FILE)
    }

    pub fn orders_path(&self) -> PathBuf {
        self.data_dir.join(crate::ingest::ORDERS_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.top_n, 3);
        assert_eq!(config.db_path, PathBuf::from("shop_data.db"));
        assert_eq!(config.orders_path(), PathBuf::from("data").join("orders.csv"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: PipelineConfig = toml::from_str("top_n = 5").unwrap();
        assert_eq!(config.top_n, 5);
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ltv.toml");
        let config = PipelineConfig {
            data_dir: dir.path().join("raw"),
            db_path: dir.path().join("out.db"),
            top_n: 10,
        };
        config.save(&path).unwrap();
        assert_eq!(PipelineConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "top_n = \"many\"").unwrap();
        assert!(PipelineConfig::load(&path).is_err());
    }
}
