//! CORD-19 collections: a metadata table whose rows point at JSON
//! side-files.
//!
//! Two readers share the row handling in this module:
//! - `ParagraphSegment` expands each row into a title record followed by
//!   one record per abstract paragraph and one per body paragraph
//! - `FullTextSegment` folds each row and its side-file into one record

pub mod full_text;
pub mod paragraph;

pub use full_text::FullTextSegment;
pub use paragraph::{ParagraphSegment, ParagraphType};

use cordex_common::fields::{ArticleField, CORD_UID};
use cordex_common::SourceRecord;
use tracing::{debug, warn};

use crate::side_file::{self, SideFile, SideFileError, SideFileLayout};
use crate::table::Row;

/// Immutable per-row context threaded into every record the row produces.
#[derive(Debug, Clone)]
pub(crate) struct RowContext {
    pub base_id: String,
    pub row: Row,
    pub has_covid: String,
}

impl RowContext {
    pub fn new(row: Row, side: Option<&SideFile>) -> Self {
        Self {
            base_id: row.get(CORD_UID).to_string(),
            has_covid: side
                .map(|s| s.has_covid.clone())
                .unwrap_or_else(|| "False".to_string()),
            row,
        }
    }

    /// Build a record carrying the row's columns plus annotation fields.
    pub fn record(&self, id: String, content: String, concepts: &str, semtypes: &str) -> SourceRecord {
        let mut record = SourceRecord::new(id, content);
        self.row.copy_into(&mut record);
        record.insert(ArticleField::Umls.as_str(), concepts);
        record.insert(ArticleField::Semtypes.as_str(), semtypes);
        record.insert(ArticleField::HasCovid.as_str(), self.has_covid.as_str());
        record
    }
}

/// Resolve and load the side-file for `row`.
///
/// Failure is absorbed: the row degrades to metadata-only and the reason is
/// logged. The side-file handle is released before this returns.
pub(crate) fn load_side_file(layout: &SideFileLayout, row: &Row) -> Option<SideFile> {
    let uid = row.get(CORD_UID);
    let result = match layout.resolve(row) {
        Some(path) => {
            debug!(cord_uid = uid, path = %path.display(), "Loading side-file");
            side_file::load(&path)
        }
        None => Err(SideFileError::Unresolved),
    };

    match result {
        Ok(side) => Some(side),
        Err(SideFileError::Unresolved) => {
            debug!(cord_uid = uid, "No side-file for row, emitting metadata only");
            None
        }
        Err(e) => {
            warn!(cord_uid = uid, error = %e, "Side-file unavailable, emitting metadata only");
            None
        }
    }
}

/// Title used for a row's summary record: side-file title, else the table's.
pub(crate) fn row_title(row: &Row, side: Option<&SideFile>) -> String {
    side.map(|s| s.metadata.title.trim())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| row.get(ArticleField::Title.as_str()))
        .to_string()
}
