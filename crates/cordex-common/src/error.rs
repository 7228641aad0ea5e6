//! Shared error types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommonError {
    #[error("Unknown collection kind: {0}")]
    UnknownCollectionKind(String),
}
