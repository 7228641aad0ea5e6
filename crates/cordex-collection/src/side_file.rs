//! Per-article JSON side-files referenced by metadata table rows.
//!
//! A side-file holds full text and concept annotations:
//!
//! ```json
//! { "metadata":  { "title": "...", "title_umls_concepts": "C01,C02", ... },
//!   "abstract":  [ { "text": "...", "text_umls_concepts": "...", "text_umls_semtypes": "..." } ],
//!   "body_text": [ { "text": "..." } ],
//!   "hasCovid19": true }
//! ```
//!
//! Every key is optional.

use std::path::{Path, PathBuf};

use cordex_common::fields::{CORD_UID, FULL_TEXT_FILE, HAS_PDF_PARSE, HAS_PMC_XML_PARSE};
use cordex_common::fields::ArticleField;
use cordex_common::CollectionConfig;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::table::Row;

/// Why a row ended up without side-file content. Never fatal.
#[derive(Debug, Error)]
pub enum SideFileError {
    #[error("no side-file resolvable for row")]
    Unresolved,

    #[error("cannot read side-file {}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },

    #[error("cannot parse side-file {}: {source}", path.display())]
    Json { path: PathBuf, source: serde_json::Error },
}

/// Directory layout used to turn a row into a side-file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideFileLayout {
    pub root: PathBuf,
    pub markup_subdir: String,
    pub derived_subdir: String,
    pub fallback_subdir: String,
}

impl SideFileLayout {
    /// Side-files sit next to the table, so a root naming the table file
    /// itself resolves against its directory.
    pub fn from_config(cfg: &CollectionConfig) -> Self {
        let root = if cfg.root.is_file() {
            cfg.root.parent().map(Path::to_path_buf).unwrap_or_else(|| cfg.root.clone())
        } else {
            cfg.root.clone()
        };
        Self {
            root,
            markup_subdir: cfg.markup_subdir.clone(),
            derived_subdir: cfg.derived_subdir.clone(),
            fallback_subdir: cfg.fallback_subdir.clone(),
        }
    }

    /// Resolve the side-file for `row`. First match wins:
    /// 1. markup parse flag → `{root}/{bucket}/{markup_subdir}/{pmcid}.xml.json`
    /// 2. derived parse flag → `{root}/{bucket}/{derived_subdir}/{last sha}.json`
    /// 3. `{root}/{fallback_subdir}/{cord_uid}.json`, only if it exists
    pub fn resolve(&self, row: &Row) -> Option<PathBuf> {
        let bucket = row.get(FULL_TEXT_FILE);

        if row.flag(HAS_PMC_XML_PARSE) {
            let pmcid = row.get(ArticleField::PmcId.as_str());
            if pmcid.is_empty() {
                return None;
            }
            return Some(
                self.root
                    .join(bucket)
                    .join(&self.markup_subdir)
                    .join(format!("{pmcid}.xml.json")),
            );
        }

        if row.flag(HAS_PDF_PARSE) {
            let hash = row
                .get(ArticleField::Sha.as_str())
                .split(';')
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .last()?;
            return Some(
                self.root
                    .join(bucket)
                    .join(&self.derived_subdir)
                    .join(format!("{hash}.json")),
            );
        }

        let uid = row.get(CORD_UID);
        if uid.is_empty() {
            return None;
        }
        let fallback = self.root.join(&self.fallback_subdir).join(format!("{uid}.json"));
        fallback.is_file().then_some(fallback)
    }
}

/// One paragraph with its concept annotations (comma-joined strings).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub text: String,
    pub concepts: String,
    pub semtypes: String,
}

/// Side-file metadata block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SideFileMetadata {
    pub title: String,
    pub title_concepts: String,
    pub title_semtypes: String,
    pub concepts: String,
    pub semtypes: String,
}

/// A fully parsed side-file. No file handle outlives `load`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SideFile {
    pub metadata: SideFileMetadata,
    /// `"True"` or `"False"`.
    pub has_covid: String,
    pub abstract_paragraphs: Vec<Paragraph>,
    pub body_paragraphs: Vec<Paragraph>,
    /// Verbatim file text.
    pub raw: String,
}

// ── Wire format ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct WireSideFile {
    #[serde(default)]
    metadata: Option<WireMetadata>,
    #[serde(default, rename = "hasCovid19")]
    has_covid: Option<Value>,
    #[serde(default, rename = "abstract")]
    abstract_paragraphs: Option<Vec<WireParagraph>>,
    #[serde(default)]
    body_text: Option<Vec<WireParagraph>>,
}

#[derive(Debug, Deserialize)]
struct WireMetadata {
    #[serde(default)]
    title: Option<Value>,
    #[serde(default)]
    title_umls_concepts: Option<Value>,
    #[serde(default)]
    title_umls_semtypes: Option<Value>,
    #[serde(default)]
    umls: Option<Value>,
    #[serde(default)]
    semtypes: Option<Value>,
    #[serde(default, rename = "hasCovid19")]
    has_covid: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct WireParagraph {
    #[serde(default)]
    text: Option<Value>,
    #[serde(default)]
    text_umls_concepts: Option<Value>,
    #[serde(default)]
    text_umls_semtypes: Option<Value>,
}

impl From<WireParagraph> for Paragraph {
    fn from(p: WireParagraph) -> Self {
        Self {
            text: value_text(p.text.as_ref()),
            concepts: value_text(p.text_umls_concepts.as_ref()),
            semtypes: value_text(p.text_umls_semtypes.as_ref()),
        }
    }
}

/// Textual form of a scalar JSON value; containers and null read as empty.
fn value_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b))   => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn covid_flag(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b)   => Some(*b),
        Value::String(s) => Some(s.trim().eq_ignore_ascii_case("true")),
        _ => None,
    }
}

/// Parse side-file text.
pub fn parse(text: &str) -> Result<SideFile, serde_json::Error> {
    let wire: WireSideFile = serde_json::from_str(text)?;

    let has_covid = covid_flag(wire.has_covid.as_ref())
        .or_else(|| wire.metadata.as_ref().and_then(|m| covid_flag(m.has_covid.as_ref())))
        .unwrap_or(false);

    let metadata = wire
        .metadata
        .map(|m| SideFileMetadata {
            title: value_text(m.title.as_ref()),
            title_concepts: value_text(m.title_umls_concepts.as_ref()),
            title_semtypes: value_text(m.title_umls_semtypes.as_ref()),
            concepts: value_text(m.umls.as_ref()),
            semtypes: value_text(m.semtypes.as_ref()),
        })
        .unwrap_or_default();

    Ok(SideFile {
        metadata,
        has_covid: if has_covid { "True" } else { "False" }.to_string(),
        abstract_paragraphs: wire
            .abstract_paragraphs
            .unwrap_or_default()
            .into_iter()
            .map(Paragraph::from)
            .collect(),
        body_paragraphs: wire
            .body_text
            .unwrap_or_default()
            .into_iter()
            .map(Paragraph::from)
            .collect(),
        raw: text.to_string(),
    })
}

/// Read and parse the side-file at `path`. The handle is closed before this
/// returns, whether or not parsing succeeded.
pub fn load(path: &Path) -> Result<SideFile, SideFileError> {
    let text = std::fs::read_to_string(path).map_err(|source| SideFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text).map_err(|source| SideFileError::Json {
        path: path.to_path_buf(),
        source,
    })
}
