//! Full-text CORD-19 reader: one record per table row.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cordex_common::fields::ArticleField;
use cordex_common::SourceRecord;
use tracing::debug;

use super::{load_side_file, RowContext};
use crate::error::Result;
use crate::side_file::{SideFile, SideFileLayout};
use crate::table::{Row, RowTable};

pub struct FullTextSegment {
    path: PathBuf,
    layout: Arc<SideFileLayout>,
    table: Option<RowTable>,
}

impl FullTextSegment {
    pub fn open(path: &Path, layout: Arc<SideFileLayout>) -> Result<Self> {
        let table = RowTable::open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            layout,
            table: Some(table),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.table.is_some()
    }

    pub fn advance(&mut self) -> Result<Option<SourceRecord>> {
        let Some(table) = self.table.as_mut() else {
            return Ok(None);
        };
        match table.next_row() {
            Ok(Some(row)) => Ok(Some(full_text_record(&self.layout, row))),
            Ok(None) => {
                self.close();
                Ok(None)
            }
            Err(e) => {
                self.close();
                Err(e)
            }
        }
    }

    pub fn close(&mut self) {
        if self.table.take().is_some() {
            debug!(path = %self.path.display(), "Closed full-text segment");
        }
    }
}

/// Concept lists, accumulated in document order and never deduplicated.
#[derive(Default)]
struct Annotations {
    concepts: Vec<String>,
    semtypes: Vec<String>,
}

impl Annotations {
    fn push(&mut self, concepts: &str, semtypes: &str) {
        if !concepts.is_empty() {
            self.concepts.push(concepts.to_string());
        }
        if !semtypes.is_empty() {
            self.semtypes.push(semtypes.to_string());
        }
    }
}

fn full_text_record(layout: &SideFileLayout, row: Row) -> SourceRecord {
    let side = load_side_file(layout, &row);
    let ctx = RowContext::new(row, side.as_ref());

    let mut content_parts: Vec<&str> = Vec::new();
    let mut full_text_parts: Vec<&str> = Vec::new();
    let mut annotations = Annotations::default();

    if let Some(SideFile { metadata, abstract_paragraphs, body_paragraphs, .. }) = side.as_ref() {
        annotations.push(&metadata.concepts, &metadata.semtypes);
        annotations.push(&metadata.title_concepts, &metadata.title_semtypes);
        content_parts.push(&metadata.title);

        for p in abstract_paragraphs.iter().chain(body_paragraphs.iter()) {
            content_parts.push(&p.text);
            full_text_parts.push(&p.text);
            annotations.push(&p.concepts, &p.semtypes);
        }
    }

    let mut content = join_non_empty(&content_parts);
    if content.is_empty() {
        content = format!(
            "{} {}",
            ctx.row.get(ArticleField::Title.as_str()),
            ctx.row.get(ArticleField::Abstract.as_str())
        );
    }

    let mut record = ctx.record(
        ctx.base_id.clone(),
        content,
        &annotations.concepts.join(","),
        &annotations.semtypes.join(","),
    );
    record.insert(ArticleField::FullText.as_str(), join_non_empty(&full_text_parts));
    if let Some(side) = side {
        record.raw = Some(side.raw);
    }
    record
}

fn join_non_empty(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
