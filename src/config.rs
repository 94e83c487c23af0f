use std::env;
use std::path::PathBuf;

use crate::constants::dataset::{
    DEFAULT_DATASET_PATH, ENV_DATASET_PATH, ENV_PAGES_DIR, ENV_TABLE_CACHE_CAPACITY,
};
use crate::constants::pages::DEFAULT_PAGES_DIR;
use crate::constants::tables::DEFAULT_TABLE_CACHE_CAPACITY;
use crate::errors::DatasetError;
use crate::splits::SplitCutoffs;

/// Where the dataset lives and how it is served.
#[derive(Clone, Debug, PartialEq)]
pub struct DatasetConfig {
    /// Path of the dataset JSON document.
    pub dataset_path: PathBuf,
    /// Directory holding the per-page JSON files.
    pub pages_dir: PathBuf,
    /// Max number of resolved tables kept in memory (0 disables caching).
    pub table_cache_capacity: usize,
    /// Split boundaries over the conversation ordering.
    pub split: SplitCutoffs,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            pages_dir: PathBuf::from(DEFAULT_PAGES_DIR),
            table_cache_capacity: DEFAULT_TABLE_CACHE_CAPACITY,
            split: SplitCutoffs::default(),
        }
    }
}

impl DatasetConfig {
    /// Defaults overridden by `HYBRID_DIALOGUE_*` environment variables when set.
    pub fn from_env() -> Result<Self, DatasetError> {
        let mut config = Self::default();
        if let Some(path) = env::var_os(ENV_DATASET_PATH) {
            config.dataset_path = PathBuf::from(path);
        }
        if let Some(dir) = env::var_os(ENV_PAGES_DIR) {
            config.pages_dir = PathBuf::from(dir);
        }
        if let Ok(raw) = env::var(ENV_TABLE_CACHE_CAPACITY) {
            config.table_cache_capacity = parse_capacity(&raw)?;
        }
        Ok(config)
    }

    /// Set the dataset document path.
    pub fn with_dataset_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.dataset_path = path.into();
        self
    }

    /// Set the per-page directory.
    pub fn with_pages_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.pages_dir = dir.into();
        self
    }

    /// Set the resolved-table cache capacity.
    pub fn with_table_cache_capacity(mut self, capacity: usize) -> Self {
        self.table_cache_capacity = capacity;
        self
    }

    /// Set the split boundaries.
    pub fn with_split(mut self, split: SplitCutoffs) -> Self {
        self.split = split;
        self
    }
}

fn parse_capacity(raw: &str) -> Result<usize, DatasetError> {
    raw.trim().parse::<usize>().map_err(|_| {
        DatasetError::Configuration(format!(
            "{ENV_TABLE_CACHE_CAPACITY} must be a non-negative integer (got '{raw}')"
        ))
    })
}
