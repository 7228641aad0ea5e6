//! Paragraph-expanded CORD-19 reader.
//!
//! Each table row yields a title record, then every abstract paragraph, then
//! every body paragraph of its side-file, before the next row is read. Only
//! one row's side-file content is held at a time.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::vec;

use cordex_common::SourceRecord;
use tracing::debug;

use super::{load_side_file, row_title, RowContext};
use crate::error::Result;
use crate::side_file::{Paragraph, SideFileLayout};
use crate::table::{Row, RowTable};

/// Kind of record a row expands into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphType {
    Title,
    Abstract,
    Body,
}

impl ParagraphType {
    /// Code used in generated ids.
    pub fn code(&self) -> char {
        match self {
            ParagraphType::Title    => 't',
            ParagraphType::Abstract => 'a',
            ParagraphType::Body     => 'c',
        }
    }
}

/// `{base_id}_{type_code}_{sequence:05}`
pub fn paragraph_id(base_id: &str, kind: ParagraphType, seq: usize) -> String {
    format!("{}_{}_{:05}", base_id, kind.code(), seq)
}

/// Cursor state, highest priority first.
enum Expansion {
    /// Draining the current row's abstract; its body follows.
    Abstract {
        row: RowContext,
        abstracts: vec::IntoIter<Paragraph>,
        body: vec::IntoIter<Paragraph>,
        seq: usize,
    },
    /// Draining the current row's body.
    Body {
        row: RowContext,
        body: vec::IntoIter<Paragraph>,
        seq: usize,
    },
    AwaitingRow,
    Exhausted,
}

pub struct ParagraphSegment {
    path: PathBuf,
    layout: Arc<SideFileLayout>,
    table: Option<RowTable>,
    state: Expansion,
}

impl ParagraphSegment {
    pub fn open(path: &Path, layout: Arc<SideFileLayout>) -> Result<Self> {
        let table = RowTable::open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            layout,
            table: Some(table),
            state: Expansion::AwaitingRow,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.table.is_some()
    }

    /// Next record, or `Ok(None)` once the table and the last row's
    /// paragraphs are drained. An error closes the segment for good.
    pub fn advance(&mut self) -> Result<Option<SourceRecord>> {
        loop {
            let state = std::mem::replace(&mut self.state, Expansion::Exhausted);
            let (next, emitted) = match self.step(state) {
                Ok(transition) => transition,
                Err(e) => {
                    self.close();
                    return Err(e);
                }
            };
            self.state = next;

            if emitted.is_some() {
                return Ok(emitted);
            }
            if matches!(self.state, Expansion::Exhausted) {
                self.close();
                return Ok(None);
            }
        }
    }

    /// Release the table handle. Idempotent.
    pub fn close(&mut self) {
        if self.table.take().is_some() {
            debug!(path = %self.path.display(), "Closed paragraph segment");
        }
        self.state = Expansion::Exhausted;
    }

    /// The single transition function of the cursor state machine.
    fn step(&mut self, state: Expansion) -> Result<(Expansion, Option<SourceRecord>)> {
        Ok(match state {
            Expansion::Abstract { row, mut abstracts, body, seq } => match abstracts.next() {
                Some(p) => {
                    let record = paragraph_record(&row, ParagraphType::Abstract, seq, p);
                    (Expansion::Abstract { row, abstracts, body, seq: seq + 1 }, Some(record))
                }
                None => (Expansion::Body { row, body, seq: 0 }, None),
            },
            Expansion::Body { row, mut body, seq } => match body.next() {
                Some(p) => {
                    let record = paragraph_record(&row, ParagraphType::Body, seq, p);
                    (Expansion::Body { row, body, seq: seq + 1 }, Some(record))
                }
                None => (Expansion::AwaitingRow, None),
            },
            Expansion::AwaitingRow => {
                let Some(table) = self.table.as_mut() else {
                    return Ok((Expansion::Exhausted, None));
                };
                match table.next_row()? {
                    Some(row) => {
                        let (state, title) = expand_row(&self.layout, row);
                        (state, Some(title))
                    }
                    None => (Expansion::Exhausted, None),
                }
            }
            Expansion::Exhausted => (Expansion::Exhausted, None),
        })
    }
}

/// Install fresh paragraph cursors for `row` and build its title record.
/// Without a side-file both cursors are empty and only the title is emitted.
fn expand_row(layout: &SideFileLayout, row: Row) -> (Expansion, SourceRecord) {
    let side = load_side_file(layout, &row);
    let title = row_title(&row, side.as_ref());
    let ctx = RowContext::new(row, side.as_ref());

    let (abstracts, body, title_concepts, title_semtypes) = match side {
        Some(side) => (
            side.abstract_paragraphs,
            side.body_paragraphs,
            side.metadata.title_concepts,
            side.metadata.title_semtypes,
        ),
        None => (Vec::new(), Vec::new(), String::new(), String::new()),
    };

    let record = ctx.record(
        paragraph_id(&ctx.base_id, ParagraphType::Title, 0),
        title,
        &title_concepts,
        &title_semtypes,
    );
    let state = Expansion::Abstract {
        row: ctx,
        abstracts: abstracts.into_iter(),
        body: body.into_iter(),
        seq: 0,
    };
    (state, record)
}

fn paragraph_record(row: &RowContext, kind: ParagraphType, seq: usize, p: Paragraph) -> SourceRecord {
    row.record(
        paragraph_id(&row.base_id, kind, seq),
        p.text,
        &p.concepts,
        &p.semtypes,
    )
}
