//! Chunked output: numbered CSV files capped at a fixed row count

use crate::error::{Error, Result};
use crate::options::SplitOptions;
use csv::{Terminator, WriterBuilder};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::debug;

/// Header line written at the top of every output file ("name", "gift code")
pub const OUTPUT_HEADER: &str = "名称,礼包码";

/// Buffers one output chunk at a time and flushes it whole to disk
pub struct ChunkWriter<'a> {
    options: &'a SplitOptions,
    buffer: Option<csv::Writer<Vec<u8>>>,
    lines_in_buffer: usize,
    next_index: usize,
    written: Vec<PathBuf>,
}

impl<'a> ChunkWriter<'a> {
    pub fn new(options: &'a SplitOptions) -> Self {
        Self {
            options,
            buffer: None,
            lines_in_buffer: 0,
            next_index: 1,
            written: Vec::new(),
        }
    }

    /// Append one value, flushing the open chunk first if it is full
    ///
    /// Values are written byte for byte, quoted only when they contain a
    /// delimiter, quote or line break.
    pub fn push(&mut self, value: &[u8]) -> Result<()> {
        if self.lines_in_buffer == self.options.max_rows_per_file.get() {
            self.flush()?;
        }

        if self.buffer.is_none() {
            let chunk = new_chunk().map_err(|e| self.write_error(e.into()))?;
            self.buffer = Some(chunk);
        }

        let record = [self.options.base_name().as_bytes(), value];
        let written = match self.buffer.as_mut() {
            Some(chunk) => chunk.write_record(record),
            None => Ok(()),
        };
        written.map_err(|e| self.write_error(e.into()))?;
        self.lines_in_buffer += 1;

        Ok(())
    }

    /// Write the open chunk, if any, to its numbered file
    fn flush(&mut self) -> Result<()> {
        let Some(chunk) = self.buffer.take() else {
            return Ok(());
        };

        let content = chunk
            .into_inner()
            .map_err(|e| self.write_error(e.into_error()))?;
        let path = self.options.output_path(self.next_index);
        fs::write(&path, content).map_err(|e| self.write_error(e))?;
        debug!(path = %path.display(), rows = self.lines_in_buffer, "wrote chunk");

        self.lines_in_buffer = 0;
        self.next_index += 1;
        self.written.push(path);
        Ok(())
    }

    /// Flush the last chunk and return every file written, in order
    pub fn finish(mut self) -> Result<Vec<PathBuf>> {
        self.flush()?;
        Ok(self.written)
    }

    fn write_error(&self, source: io::Error) -> Error {
        Error::Write {
            path: self.options.output_path(self.next_index),
            source,
        }
    }
}

/// A fresh in-memory chunk holding just the header line
fn new_chunk() -> csv::Result<csv::Writer<Vec<u8>>> {
    let mut chunk = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    chunk.write_record(OUTPUT_HEADER.split(','))?;
    Ok(chunk)
}

/// Number of files needed for `distinct` values at `max_rows` per file
pub fn planned_file_count(distinct: usize, max_rows: usize) -> usize {
    if max_rows == 0 {
        return 0;
    }
    distinct.div_ceil(max_rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_planned_file_count() {
        assert_eq!(planned_file_count(0, 10), 0);
        assert_eq!(planned_file_count(1, 10), 1);
        assert_eq!(planned_file_count(10, 10), 1);
        assert_eq!(planned_file_count(11, 10), 2);
        assert_eq!(planned_file_count(5, 1), 5);
    }

    #[test]
    fn test_writer_splits_at_row_cap() {
        let dir = tempdir().unwrap();
        let opts = SplitOptions::new("codes.csv", 1, 2, dir.path()).unwrap();

        let mut writer = ChunkWriter::new(&opts);
        for v in ["a", "b", "c"] {
            writer.push(v.as_bytes()).unwrap();
        }
        let files = writer.finish().unwrap();

        assert_eq!(files, vec![opts.output_path(1), opts.output_path(2)]);
        let first = fs::read_to_string(&files[0]).unwrap();
        assert_eq!(first, "名称,礼包码\ncodes,a\ncodes,b\n");
        let second = fs::read_to_string(&files[1]).unwrap();
        assert_eq!(second, "名称,礼包码\ncodes,c\n");
    }

    #[test]
    fn test_writer_without_values_writes_nothing() {
        let dir = tempdir().unwrap();
        let opts = SplitOptions::new("codes.csv", 1, 2, dir.path()).unwrap();

        let files = ChunkWriter::new(&opts).finish().unwrap();
        assert!(files.is_empty());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_writer_quotes_values_with_commas() {
        let dir = tempdir().unwrap();
        let opts = SplitOptions::new("codes.csv", 1, 5, dir.path()).unwrap();

        let mut writer = ChunkWriter::new(&opts);
        writer.push(b"a,b").unwrap();
        writer.push(b"say \"hi\"").unwrap();
        writer.push(b"two\nlines").unwrap();
        let files = writer.finish().unwrap();

        let content = fs::read_to_string(&files[0]).unwrap();
        assert_eq!(
            content,
            "名称,礼包码\ncodes,\"a,b\"\ncodes,\"say \"\"hi\"\"\"\ncodes,\"two\nlines\"\n"
        );
    }

    #[test]
    fn test_writer_passes_raw_bytes_through() {
        let dir = tempdir().unwrap();
        let opts = SplitOptions::new("codes.csv", 1, 5, dir.path()).unwrap();

        let mut writer = ChunkWriter::new(&opts);
        writer.push(&[0xC2, 0xEB]).unwrap();
        let files = writer.finish().unwrap();

        let content = fs::read(&files[0]).unwrap();
        let mut expected = "名称,礼包码\ncodes,".as_bytes().to_vec();
        expected.extend_from_slice(&[0xC2, 0xEB, b'\n']);
        assert_eq!(content, expected);
    }

    #[test]
    fn test_writer_reports_failing_path() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");
        let opts = SplitOptions::new("codes.csv", 1, 1, &missing).unwrap();

        let mut writer = ChunkWriter::new(&opts);
        writer.push(b"a").unwrap();
        let err = writer.push(b"b").unwrap_err();

        assert!(matches!(err, Error::Write { .. }));
        assert_eq!(err.path(), Some(missing.join("codes_1.csv").as_path()));
    }
}
