//! csvsplit-core: Core library for splitting a CSV column into capped files
//!
//! This library provides functionality to:
//! - Validate the parameters of a split run
//! - Read one column of a CSV file and deduplicate it case-insensitively
//! - Write the distinct values into numbered files with a fixed header
//! - Run several split jobs from a JSON batch file

pub mod batch;
pub mod dedup;
pub mod error;
pub mod options;
pub mod splitter;
pub mod writer;

pub use batch::{run_batch, BatchFile, BatchJob, BatchResult};
pub use dedup::{read_column, DedupTable, ReadOutcome};
pub use error::{Error, Result};
pub use options::{SplitOptions, DEFAULT_COLUMN_INDEX, DEFAULT_MAX_ROWS_PER_FILE};
pub use splitter::{preview, split, split_with, SplitReport};
pub use writer::{planned_file_count, ChunkWriter, OUTPUT_HEADER};
