//! cordex-index: turns source records into policy-tagged documents and
//! feeds them to an external indexer.
//!
//! - `DocumentGenerator` projects one `SourceRecord` into a `NormalizedDocument`
//! - `run_collection` fans segments out over blocking workers and streams the
//!   resulting documents into an `IndexSink`

pub mod analysis;
pub mod document;
pub mod error;
pub mod generator;
pub mod normalise;
pub mod pipeline;

pub use analysis::{Analyzer, StandardAnalyzer};
pub use document::{FieldPolicy, FieldValue, IndexOptions, IndexedField, NormalizedDocument};
pub use error::{GeneratorError, IndexError, Result};
pub use generator::DocumentGenerator;
pub use pipeline::{run_collection, IndexSink, IndexingResult, MemorySink};
