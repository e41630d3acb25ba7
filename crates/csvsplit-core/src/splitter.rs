//! The split operation: read, deduplicate, write numbered chunks

use crate::dedup::{read_column, ReadOutcome};
use crate::error::{Error, Result};
use crate::options::SplitOptions;
use crate::writer::{planned_file_count, ChunkWriter};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::info;

/// Summary of a split run
#[derive(Debug, Clone, Serialize)]
pub struct SplitReport {
    /// Source CSV file
    pub source: PathBuf,
    /// Prefix shared by the output files and their first column
    pub base_name: String,
    /// Records parsed, header included
    pub records_read: usize,
    /// Rows skipped for having too few fields
    pub skipped_rows: usize,
    /// Rows whose target field was empty
    pub empty_values: usize,
    /// Distinct values after case-insensitive deduplication
    pub distinct_values: usize,
    /// Record number where reading stopped early, if it did
    pub truncated_at: Option<usize>,
    /// Output files, written or planned, in order
    pub files: Vec<PathBuf>,
}

impl SplitReport {
    fn new(options: &SplitOptions, outcome: &ReadOutcome, files: Vec<PathBuf>) -> Self {
        Self {
            source: options.source.clone(),
            base_name: options.base_name().to_string(),
            records_read: outcome.records_read,
            skipped_rows: outcome.skipped_rows,
            empty_values: outcome.empty_values,
            distinct_values: outcome.table.len(),
            truncated_at: outcome.truncated_at,
            files,
        }
    }

    /// Number of output files
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

/// Split the target column of `options.source` into capped output files
///
/// The whole source is read and deduplicated before the first file is
/// written. A write failure aborts the run; files written before it stay.
pub fn split(options: &SplitOptions) -> Result<SplitReport> {
    let outcome = read_source(options)?;

    let mut writer = ChunkWriter::new(options);
    for value in outcome.table.values() {
        writer.push(value)?;
    }
    let files = writer.finish()?;

    let report = SplitReport::new(options, &outcome, files);
    info!(
        source = %report.source.display(),
        distinct = report.distinct_values,
        skipped = report.skipped_rows,
        files = report.file_count(),
        "split complete"
    );
    Ok(report)
}

/// Validate the four raw parameters and run [`split`]
pub fn split_with(
    source: impl Into<PathBuf>,
    column_index: i64,
    max_rows_per_file: i64,
    output_dir: impl Into<PathBuf>,
) -> Result<SplitReport> {
    let options = SplitOptions::new(source, column_index, max_rows_per_file, output_dir)?;
    split(&options)
}

/// Read and deduplicate like [`split`], listing the files it would write
pub fn preview(options: &SplitOptions) -> Result<SplitReport> {
    let outcome = read_source(options)?;
    let count = planned_file_count(outcome.table.len(), options.max_rows_per_file.get());
    let files = (1..=count).map(|i| options.output_path(i)).collect();
    Ok(SplitReport::new(options, &outcome, files))
}

fn read_source(options: &SplitOptions) -> Result<ReadOutcome> {
    let path = &options.source;
    let file = File::open(path).map_err(|e| Error::Read {
        path: path.clone(),
        source: e,
    })?;

    info!(
        file = %path.display(),
        column = options.column_index.get(),
        max_rows = options.max_rows_per_file.get(),
        "reading source"
    );
    read_column(BufReader::new(file), options.column_index).map_err(|e| Error::Read {
        path: path.clone(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::OUTPUT_HEADER;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    const GIFTS: &str = "id,name,code,extra,code2\n\
                         1,a,X1,ignore,X1\n\
                         2,b,x1,ignore,x1\n\
                         3,c,Y2,ignore,Y2\n";

    fn write_source(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn data_lines(path: &Path) -> Vec<String> {
        let content = fs::read_to_string(path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some(OUTPUT_HEADER));
        lines.map(str::to_string).collect()
    }

    #[test]
    fn test_split_gifts_one_row_per_file() {
        let dir = tempdir().unwrap();
        let source = write_source(dir.path(), "gifts.csv", GIFTS);
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();

        let report = split_with(&source, 5, 1, &out).unwrap();

        assert_eq!(report.distinct_values, 2);
        assert_eq!(report.file_count(), 2);
        assert_eq!(report.files[0], out.join("gifts_1.csv"));
        assert_eq!(report.files[1], out.join("gifts_2.csv"));
        assert_eq!(data_lines(&report.files[0]), vec!["gifts,x1"]);
        assert_eq!(data_lines(&report.files[1]), vec!["gifts,Y2"]);
    }

    #[test]
    fn test_split_file_sizes_follow_row_cap() {
        let dir = tempdir().unwrap();
        let mut content = String::from("code\n");
        for i in 0..25 {
            content.push_str(&format!("CODE{i}\ncode{i}\n"));
        }
        let source = write_source(dir.path(), "batch.csv", &content);

        let report = split_with(&source, 1, 10, dir.path()).unwrap();

        assert_eq!(report.distinct_values, 25);
        assert_eq!(report.file_count(), 3);
        let sizes: Vec<usize> = report.files.iter().map(|f| data_lines(f).len()).collect();
        assert_eq!(sizes, vec![10, 10, 5]);
        assert_eq!(data_lines(&report.files[0])[0], "batch,code0");
    }

    #[test]
    fn test_split_exact_multiple_fills_last_file() {
        let dir = tempdir().unwrap();
        let source = write_source(dir.path(), "even.csv", "c\na\nb\nc\nd\n");

        let report = split_with(&source, 1, 2, dir.path()).unwrap();

        assert_eq!(report.file_count(), 2);
        assert_eq!(data_lines(&report.files[1]), vec!["even,c", "even,d"]);
    }

    #[test]
    fn test_split_header_only_writes_nothing() {
        let dir = tempdir().unwrap();
        let source = write_source(dir.path(), "empty.csv", "a,b,c\n");
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();

        let report = split_with(&source, 2, 5, &out).unwrap();

        assert_eq!(report.file_count(), 0);
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn test_split_short_rows_do_not_fail_run() {
        let dir = tempdir().unwrap();
        let source = write_source(dir.path(), "short.csv", "a,b,c\n1,2,X\n1,2\n3,4,Y\n");

        let report = split_with(&source, 3, 100, dir.path()).unwrap();

        assert_eq!(report.skipped_rows, 1);
        assert_eq!(data_lines(&report.files[0]), vec!["short,X", "short,Y"]);
    }

    #[test]
    fn test_split_invalid_input_writes_nothing() {
        let dir = tempdir().unwrap();
        let source = write_source(dir.path(), "gifts.csv", GIFTS);
        let txt = write_source(dir.path(), "gifts.txt", GIFTS);
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();

        let cases = [
            (&source, 0, 1),
            (&source, -1, 1),
            (&source, 1, 0),
            (&source, 1, -3),
            (&txt, 1, 1),
        ];
        for (path, column, rows) in cases {
            let err = split_with(path, column, rows, &out).unwrap_err();
            assert!(err.is_invalid_input());
        }
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn test_split_missing_source_is_read_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.csv");

        let err = split_with(&missing, 1, 1, dir.path()).unwrap_err();

        assert!(matches!(err, Error::Read { .. }));
        assert_eq!(err.path(), Some(missing.as_path()));
    }

    #[test]
    fn test_split_unreadable_source_is_read_error() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("folder.csv");
        fs::create_dir(&source).unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();

        let err = split_with(&source, 1, 1, &out).unwrap_err();

        assert!(matches!(err, Error::Read { .. }));
        assert_eq!(err.path(), Some(source.as_path()));
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn test_split_keeps_non_utf8_values() {
        let dir = tempdir().unwrap();
        // GBK-encoded header, one GBK value among plain ones
        let content = b"\xC3\xFB\xB3\xC6,\xC2\xEB\na,X1\nb,Y2\nc,\xC2\xEB\n";
        let source = dir.path().join("legacy.csv");
        fs::write(&source, content).unwrap();

        let report = split_with(&source, 2, 10, dir.path()).unwrap();

        assert_eq!(report.distinct_values, 3);
        assert_eq!(report.truncated_at, None);
        let written = fs::read(&report.files[0]).unwrap();
        assert!(written.ends_with(b"legacy,\xC2\xEB\n"));
    }

    #[test]
    fn test_split_missing_output_dir_is_write_error() {
        let dir = tempdir().unwrap();
        let source = write_source(dir.path(), "gifts.csv", GIFTS);
        let out = dir.path().join("not-there");

        let err = split_with(&source, 5, 1, &out).unwrap_err();

        assert!(matches!(err, Error::Write { .. }));
        assert_eq!(err.path(), Some(out.join("gifts_1.csv").as_path()));
    }

    #[test]
    fn test_preview_writes_nothing() {
        let dir = tempdir().unwrap();
        let source = write_source(dir.path(), "gifts.csv", GIFTS);
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        let opts = SplitOptions::new(&source, 5, 1, &out).unwrap();

        let report = preview(&opts).unwrap();

        assert_eq!(report.files, vec![out.join("gifts_1.csv"), out.join("gifts_2.csv")]);
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn test_report_serializes() {
        let dir = tempdir().unwrap();
        let source = write_source(dir.path(), "gifts.csv", GIFTS);
        let opts = SplitOptions::new(&source, 5, 1, dir.path()).unwrap();

        let report = preview(&opts).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["base_name"], "gifts");
        assert_eq!(json["distinct_values"], 2);
        assert_eq!(json["truncated_at"], serde_json::Value::Null);
    }
}
