//! Validated parameters for a single split run

use crate::error::{Error, Result};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Column read when the caller does not pick one (1-based)
pub const DEFAULT_COLUMN_INDEX: i64 = 4;

/// Row cap per output file when the caller does not pick one
pub const DEFAULT_MAX_ROWS_PER_FILE: i64 = 10_000;

/// Required suffix of the source file name
pub const CSV_EXTENSION: &str = ".csv";

/// Parameters for one split run, validated on construction
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Source CSV file
    pub source: PathBuf,
    /// 1-based index of the column to extract
    pub column_index: NonZeroUsize,
    /// Maximum data rows per output file (header excluded)
    pub max_rows_per_file: NonZeroUsize,
    /// Directory receiving the numbered output files
    pub output_dir: PathBuf,
    base_name: String,
}

impl SplitOptions {
    /// Validate raw parameters
    ///
    /// Checks run in order: column index, row cap, file extension. Nothing
    /// on disk is touched.
    pub fn new(
        source: impl Into<PathBuf>,
        column_index: i64,
        max_rows_per_file: i64,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let column_index = positive(column_index)
            .ok_or_else(|| Error::InvalidInput("column index must be positive".to_string()))?;
        let max_rows_per_file = positive(max_rows_per_file)
            .ok_or_else(|| Error::InvalidInput("row cap must be positive".to_string()))?;

        let source = source.into();
        let base_name = csv_base_name(&source).ok_or_else(|| {
            Error::InvalidInput(format!("not a csv file: {}", source.display()))
        })?;

        Ok(Self {
            source,
            column_index,
            max_rows_per_file,
            output_dir: output_dir.into(),
            base_name,
        })
    }

    /// Source file name without the `.csv` suffix
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Path of the `index`-th output file (1-based)
    pub fn output_path(&self, index: usize) -> PathBuf {
        self.output_dir.join(format!("{}_{}.csv", self.base_name, index))
    }
}

fn positive(value: i64) -> Option<NonZeroUsize> {
    usize::try_from(value).ok().and_then(NonZeroUsize::new)
}

/// Strip a case-sensitive `.csv` suffix from the file name of `path`
fn csv_base_name(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    file_name
        .strip_suffix(CSV_EXTENSION)
        .map(|stem| stem.to_string())
}
