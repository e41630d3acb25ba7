//! Reading the target column into a case-insensitive deduplication table

use std::collections::HashMap;
use std::io::{self, Read};
use std::num::NonZeroUsize;
use tracing::{debug, warn};

/// Values keyed by their lower-cased form
///
/// Values are kept as raw bytes so sources in legacy encodings pass
/// through untouched. Inserting a value whose key already exists replaces
/// the stored value but keeps the key's original position, so iteration
/// follows first-seen order.
#[derive(Debug, Clone, Default)]
pub struct DedupTable {
    positions: HashMap<Vec<u8>, usize>,
    values: Vec<Vec<u8>>,
}

impl DedupTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value`, overwriting any earlier value with the same key.
    /// Returns true if the key was new.
    pub fn insert(&mut self, value: &[u8]) -> bool {
        let key = fold_case(value);
        match self.positions.get(&key) {
            Some(&idx) => {
                self.values[idx] = value.to_vec();
                false
            }
            None => {
                self.positions.insert(key, self.values.len());
                self.values.push(value.to_vec());
                true
            }
        }
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Stored value for a key, matched case-insensitively
    pub fn get(&self, value: &[u8]) -> Option<&[u8]> {
        self.positions
            .get(&fold_case(value))
            .map(|&idx| self.values[idx].as_slice())
    }

    /// Stored values in first-seen key order
    pub fn values(&self) -> impl Iterator<Item = &[u8]> {
        self.values.iter().map(Vec::as_slice)
    }
}

/// Unicode lower-casing for UTF-8 values, ASCII lower-casing otherwise
fn fold_case(value: &[u8]) -> Vec<u8> {
    match std::str::from_utf8(value) {
        Ok(s) => s.to_lowercase().into_bytes(),
        Err(_) => value.to_ascii_lowercase(),
    }
}

/// What a pass over the source produced
#[derive(Debug, Clone, Default)]
pub struct ReadOutcome {
    /// Deduplicated values of the target column
    pub table: DedupTable,
    /// Records parsed, header included
    pub records_read: usize,
    /// Data rows with fewer fields than the target column
    pub skipped_rows: usize,
    /// Data rows whose target field was empty
    pub empty_values: usize,
    /// 1-based record number at which the tokenizer gave up, if it did
    pub truncated_at: Option<usize>,
}

/// Read CSV from `reader` and collect column `column_index` (1-based)
///
/// The first record is always treated as a header and ignored. Rows may
/// have any number of fields and any encoding. Empty target values are
/// counted in `empty_values` but never collected, so no `<base>,` lines are
/// produced for them. A failure of the underlying reader is returned; a record the
/// tokenizer rejects ends the pass and everything read before it is kept.
pub fn read_column<R: Read>(reader: R, column_index: NonZeroUsize) -> io::Result<ReadOutcome> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let field = column_index.get() - 1;
    let mut outcome = ReadOutcome::default();

    for (idx, result) in csv_reader.byte_records().enumerate() {
        let record_number = idx + 1;
        let record = match result {
            Ok(record) => record,
            Err(e) => match e.into_kind() {
                csv::ErrorKind::Io(err) => return Err(err),
                kind => {
                    warn!(record = record_number, error = ?kind, "stopping at unreadable record");
                    outcome.truncated_at = Some(record_number);
                    break;
                }
            },
        };
        outcome.records_read += 1;

        if record_number == 1 {
            continue;
        }

        match record.get(field) {
            Some(b"") => outcome.empty_values += 1,
            Some(value) => {
                outcome.table.insert(value);
            }
            None => {
                warn!(
                    record = record_number,
                    fields = record.len(),
                    column = column_index.get(),
                    "line with not enough columns encountered"
                );
                outcome.skipped_rows += 1;
            }
        }
    }

    debug!(
        records = outcome.records_read,
        distinct = outcome.table.len(),
        "finished reading source"
    );
    Ok(outcome)
}
