//! Configuration loading for cordex.
//! Reads cordex.toml from the current directory or the path in CORDEX_CONFIG.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::kind::CollectionKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CordexConfig {
    pub collection: CollectionConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Where a collection lives and how its side-files are laid out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    pub kind: CollectionKind,
    pub root: PathBuf,
    /// Sub-directory of a bucket holding markup-derived parses.
    #[serde(default = "default_markup_subdir")]
    pub markup_subdir: String,
    /// Sub-directory of a bucket holding parses keyed by content hash.
    #[serde(default = "default_derived_subdir")]
    pub derived_subdir: String,
    /// Directory under the root searched for rows with neither parse.
    #[serde(default = "default_fallback_subdir")]
    pub fallback_subdir: String,
}

fn default_markup_subdir()   -> String { "pmc_json".to_string() }
fn default_derived_subdir()  -> String { "pdf_json".to_string() }
fn default_fallback_subdir() -> String { "newJsonFiles".to_string() }

impl CollectionConfig {
    pub fn new(kind: CollectionKind, root: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            root: root.into(),
            markup_subdir: default_markup_subdir(),
            derived_subdir: default_derived_subdir(),
            fallback_subdir: default_fallback_subdir(),
        }
    }
}

/// Indexing policy switches. These gate the policy assigned to fields,
/// never which fields are extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Store the verbatim source text in a `raw` field.
    #[serde(default)]
    pub store_raw: bool,
    /// Store the analyzed text fields so they can be displayed.
    #[serde(default = "bool_true")]
    pub store_contents: bool,
    /// Store per-field term vectors (with positions).
    #[serde(default)]
    pub store_docvectors: bool,
    /// Build a positional index instead of a frequency-only one.
    #[serde(default = "bool_true")]
    pub store_positions: bool,
}

fn bool_true() -> bool { true }

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            store_raw: false,
            store_contents: true,
            store_docvectors: false,
            store_positions: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Segments processed concurrently.
    #[serde(default = "default_threads")]
    pub threads: usize,
    /// Documents buffered between the segment workers and the sink.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_threads()          -> usize { 4 }
fn default_channel_capacity() -> usize { 256 }

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            channel_capacity: default_channel_capacity(),
        }
    }
}


impl CordexConfig {
    /// Load configuration from cordex.toml.
    /// Checks CORDEX_CONFIG env var first, then current directory.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CORDEX_CONFIG")
            .unwrap_or_else(|_| "cordex.toml".to_string());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: CordexConfig = toml::from_str(content)?;
        if config.pipeline.threads == 0 {
            anyhow::bail!("pipeline.threads must be at least 1");
        }
        tracing::debug!(kind = %config.collection.kind, root = ?config.collection.root, "Loaded config");
        Ok(config)
    }
}
