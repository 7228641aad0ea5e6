//! cordex-collection: pull-based readers over biomedical document
//! collections.
//!
//! A `Collection` discovers eligible files under a root and hands out one
//! `Segment` per file. A segment is a single-use cursor: `advance()` yields
//! the next `SourceRecord` or `Ok(None)` once the file is exhausted.
//!
//! Formats:
//! - CORD-19 metadata tables whose rows point at JSON side-files
//!   (paragraph-expanded or one full-text record per row)
//! - JATS-style markup files, one article per file

pub mod clinical;
pub mod collection;
pub mod cord19;
pub mod error;
pub mod segment;
pub mod side_file;
pub mod table;

pub use collection::Collection;
pub use error::{CollectionError, Result};
pub use segment::Segment;
pub use side_file::SideFileLayout;
