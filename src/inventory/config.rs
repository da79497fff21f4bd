//! Run configuration values. Parsing lives in the CLI layer.

use std::path::PathBuf;

use super::scheduler::DEFAULT_MAX_CONCURRENCY;

#[derive(Debug, Clone)]
pub struct Config {
    /// User-supplied region list, before normalization.
    pub regions: Vec<String>,
    /// Maximum in-flight provider calls; non-positive means default.
    pub max_concurrency: i64,
    /// Optional subset of registered category names.
    pub categories: Option<Vec<String>>,
    /// Directory the CSV report files are written to.
    pub output_dir: PathBuf,
    /// Also write the full report as one JSON document.
    pub json: bool,
    /// Optional AWS shared config profile.
    pub profile: Option<String>,
}

impl Config {
    pub fn effective_concurrency(&self) -> usize {
        if self.max_concurrency > 0 {
            self.max_concurrency as usize
        } else {
            DEFAULT_MAX_CONCURRENCY
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            regions: Vec::new(),
            max_concurrency: 0,
            categories: None,
            output_dir: PathBuf::from("inventory-out"),
            json: false,
            profile: None,
        }
    }
}
