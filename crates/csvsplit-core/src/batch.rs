//! Batch files: several split jobs described in one JSON document

use crate::error::{Error, Result};
use crate::options::{SplitOptions, DEFAULT_COLUMN_INDEX, DEFAULT_MAX_ROWS_PER_FILE};
use crate::splitter::{split, SplitReport};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One source file to split
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchJob {
    /// Source CSV file
    pub source: PathBuf,
    /// 1-based column to extract
    #[serde(default = "default_column_index")]
    pub column_index: i64,
    /// Row cap per output file
    #[serde(default = "default_max_rows")]
    pub max_rows_per_file: i64,
    /// Overrides the batch-wide output directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl BatchJob {
    /// Create a job with the default column and row cap
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            column_index: DEFAULT_COLUMN_INDEX,
            max_rows_per_file: DEFAULT_MAX_ROWS_PER_FILE,
            output_dir: None,
        }
    }

    /// Validated options for this job, falling back to `default_output`
    pub fn options(&self, default_output: &Path) -> Result<SplitOptions> {
        SplitOptions::new(
            &self.source,
            self.column_index,
            self.max_rows_per_file,
            self.output_dir.as_deref().unwrap_or(default_output),
        )
    }
}

fn default_column_index() -> i64 {
    DEFAULT_COLUMN_INDEX
}

fn default_max_rows() -> i64 {
    DEFAULT_MAX_ROWS_PER_FILE
}

/// A batch file containing multiple split jobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFile {
    /// Output directory for jobs without their own
    pub output_dir: PathBuf,
    /// Jobs, run in order
    pub jobs: Vec<BatchJob>,
}

impl BatchFile {
    /// Load a batch file from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the batch file to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Outcome of running every job in a batch
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Reports of jobs that completed
    pub reports: Vec<SplitReport>,
    /// Jobs that failed (source path, error message)
    pub errors: Vec<(PathBuf, String)>,
}

impl BatchResult {
    /// Total files written across all completed jobs
    pub fn files_written(&self) -> usize {
        self.reports.iter().map(SplitReport::file_count).sum()
    }
}

/// Run every job in order; a failing job does not stop the rest
pub fn run_batch(batch: &BatchFile) -> BatchResult {
    let mut result = BatchResult::default();

    for job in &batch.jobs {
        match job.options(&batch.output_dir).and_then(|opts| split(&opts)) {
            Ok(report) => result.reports.push(report),
            Err(e) => {
                warn!(source = %job.source.display(), error = %e, "batch job failed");
                result.errors.push((job.source.clone(), e.to_string()));
            }
        }
    }

    result
}
