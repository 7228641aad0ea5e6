//! cordex-common: types shared by the collection readers and the
//! document generator.
//!
//! - `SourceRecord`: the flat field map a parser produces
//! - `fields`: upstream column names and output field names
//! - `CollectionKind`: the closed set of supported collection formats
//! - `config`: TOML configuration for collections, generator and pipeline

pub mod config;
pub mod error;
pub mod fields;
pub mod kind;
pub mod record;

pub use config::{CollectionConfig, CordexConfig, GeneratorConfig, PipelineConfig};
pub use error::CommonError;
pub use kind::CollectionKind;
pub use record::SourceRecord;
