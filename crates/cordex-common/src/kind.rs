//! Supported collection formats.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CommonError;

/// The closed set of collection formats a reader can walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    /// CORD-19 metadata table expanded into title, abstract and body
    /// paragraph records.
    Cord19Paragraph,
    /// CORD-19 metadata table, one full-text record per row.
    Cord19FullText,
    /// One JATS-style markup file per article.
    ClinicalArticle,
}

impl CollectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::Cord19Paragraph => "cord19_paragraph",
            CollectionKind::Cord19FullText  => "cord19_full_text",
            CollectionKind::ClinicalArticle => "clinical_article",
        }
    }

    /// File suffixes a collection of this kind accepts (lower case, with dot).
    pub fn allowed_suffixes(&self) -> &'static [&'static str] {
        match self {
            CollectionKind::Cord19Paragraph | CollectionKind::Cord19FullText => &[".csv"],
            CollectionKind::ClinicalArticle => &[".nxml", ".xml"],
        }
    }

    /// Whether `path` carries one of the accepted suffixes (case-insensitive).
    pub fn accepts(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        let name = name.to_lowercase();
        self.allowed_suffixes().iter().any(|suffix| name.ends_with(suffix))
    }
}

impl FromStr for CollectionKind {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cord19_paragraph" => Ok(CollectionKind::Cord19Paragraph),
            "cord19_full_text" => Ok(CollectionKind::Cord19FullText),
            "clinical_article" => Ok(CollectionKind::ClinicalArticle),
            other => Err(CommonError::UnknownCollectionKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
