use cordex_collection::CollectionError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexError>;

/// Projection failure for a single record. Never fatal for its segment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("Document {id} has no content")]
    EmptyDocument { id: String },
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Collection error: {0}")]
    Collection(#[from] CollectionError),

    #[error("Sink error: {0}")]
    Sink(String),

    #[error("Worker failed: {0}")]
    Join(String),
}
