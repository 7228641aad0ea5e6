//! Header-driven reader for delimited metadata tables.
//!
//! The first line is the header. Column names are matched case-insensitively
//! and every value is trimmed of surrounding whitespace.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use cordex_common::SourceRecord;
use tracing::debug;

use crate::error::{CollectionError, Result};

/// One table row keyed by lower-cased column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: BTreeMap<String, String>,
}

impl Row {
    /// Column value, or `""` when the column is absent.
    pub fn get(&self, column: &str) -> &str {
        self.values
            .get(&column.to_lowercase())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Whether the column holds a truthy flag (`true`, any case).
    pub fn flag(&self, column: &str) -> bool {
        self.get(column).eq_ignore_ascii_case("true")
    }

    /// Copy every column into `record`'s field map.
    pub fn copy_into(&self, record: &mut SourceRecord) {
        for (column, value) in &self.values {
            record.insert(column, value.as_str());
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = BTreeMap::new();
        for (k, v) in iter {
            values
                .entry(k.into().to_lowercase())
                .or_insert_with(|| v.into().trim().to_string());
        }
        Self { values }
    }
}

/// An open table. Owns the file handle until dropped.
pub struct RowTable {
    path: PathBuf,
    reader: csv::Reader<File>,
    headers: Vec<String>,
    record: csv::StringRecord,
}

impl RowTable {
    pub fn open(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| CollectionError::malformed(path, e))?;

        let headers = reader
            .headers()
            .map_err(|e| CollectionError::malformed(path, e))?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect::<Vec<_>>();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(CollectionError::malformed(path, "table has no header row"));
        }

        debug!(path = %path.display(), columns = headers.len(), "Opened table");
        Ok(Self {
            path: path.to_path_buf(),
            reader,
            headers,
            record: csv::StringRecord::new(),
        })
    }

    /// Read the next row, `Ok(None)` at end of table.
    pub fn next_row(&mut self) -> Result<Option<Row>> {
        let more = self
            .reader
            .read_record(&mut self.record)
            .map_err(|e| CollectionError::malformed(&self.path, e))?;
        if !more {
            return Ok(None);
        }

        // First occurrence of a duplicated header wins; short rows leave
        // trailing columns absent.
        let row = self
            .headers
            .iter()
            .zip(self.record.iter())
            .map(|(h, v)| (h.as_str(), v))
            .collect::<Row>();
        Ok(Some(row))
    }
}
