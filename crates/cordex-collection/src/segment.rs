//! The segment capability: one streaming cursor over one input file.

use std::iter::FusedIterator;
use std::path::Path;
use std::sync::Arc;

use cordex_common::{CollectionKind, SourceRecord};

use crate::clinical::ArticleSegment;
use crate::cord19::{FullTextSegment, ParagraphSegment};
use crate::error::{CollectionError, Result};
use crate::side_file::SideFileLayout;

/// A single-use cursor over one file, one variant per collection format.
///
/// `advance` yields `Ok(Some(record))` until the file is exhausted, then
/// `Ok(None)` forever. Any error is fatal for this segment: its handles are
/// released and later calls return `Ok(None)`. Handles are also released on
/// `close` and on drop, so abandoning iteration early is safe.
pub enum Segment {
    Cord19Paragraph(ParagraphSegment),
    Cord19FullText(FullTextSegment),
    ClinicalArticle(ArticleSegment),
}

impl Segment {
    pub fn open(kind: CollectionKind, path: &Path, layout: Arc<SideFileLayout>) -> Result<Self> {
        Ok(match kind {
            CollectionKind::Cord19Paragraph => Segment::Cord19Paragraph(ParagraphSegment::open(path, layout)?),
            CollectionKind::Cord19FullText  => Segment::Cord19FullText(FullTextSegment::open(path, layout)?),
            CollectionKind::ClinicalArticle => Segment::ClinicalArticle(ArticleSegment::open(path)?),
        })
    }

    pub fn kind(&self) -> CollectionKind {
        match self {
            Segment::Cord19Paragraph(_) => CollectionKind::Cord19Paragraph,
            Segment::Cord19FullText(_)  => CollectionKind::Cord19FullText,
            Segment::ClinicalArticle(_) => CollectionKind::ClinicalArticle,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Segment::Cord19Paragraph(s) => s.path(),
            Segment::Cord19FullText(s)  => s.path(),
            Segment::ClinicalArticle(s) => s.path(),
        }
    }

    /// Next record, or `Ok(None)` at end of segment.
    pub fn advance(&mut self) -> Result<Option<SourceRecord>> {
        match self {
            Segment::Cord19Paragraph(s) => s.advance(),
            Segment::Cord19FullText(s)  => s.advance(),
            Segment::ClinicalArticle(s) => s.advance(),
        }
    }

    /// Release every handle the segment owns. Idempotent.
    pub fn close(&mut self) {
        match self {
            Segment::Cord19Paragraph(s) => s.close(),
            Segment::Cord19FullText(s)  => s.close(),
            Segment::ClinicalArticle(s) => s.close(),
        }
    }

    /// Whether the segment still holds its input open.
    pub fn is_open(&self) -> bool {
        match self {
            Segment::Cord19Paragraph(s) => s.is_open(),
            Segment::Cord19FullText(s)  => s.is_open(),
            Segment::ClinicalArticle(s) => s.is_open(),
        }
    }
}

impl Iterator for Segment {
    type Item = std::result::Result<SourceRecord, CollectionError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance().transpose()
    }
}

impl FusedIterator for Segment {}

impl std::fmt::Debug for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Segment")
            .field("kind", &self.kind())
            .field("path", &self.path())
            .field("open", &self.is_open())
            .finish()
    }
}
