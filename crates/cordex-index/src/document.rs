//! Normalized documents: an ordered list of fields, each tagged with the
//! policy the external indexer should apply to it.

use serde::Serialize;

/// How the indexer treats a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldPolicy {
    /// Stored for retrieval, never indexed.
    StoredOnly,
    /// Tokenized and stemmed by the indexer's main analyzer.
    StemmedIndexed,
    /// Indexed as given; `tokens` holds the exact terms.
    LiteralIndexed,
    /// Numeric point for range queries.
    NumericPoint,
    /// Doc-values key used to break score ties.
    SortKey,
}

impl FieldPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldPolicy::StoredOnly     => "stored_only",
            FieldPolicy::StemmedIndexed => "stemmed_indexed",
            FieldPolicy::LiteralIndexed => "literal_indexed",
            FieldPolicy::NumericPoint   => "numeric_point",
            FieldPolicy::SortKey        => "sort_key",
        }
    }
}

/// Postings detail recorded for an indexed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexOptions {
    None,
    Docs,
    DocsAndFreqs,
    DocsAndFreqsAndPositions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Int(i64),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexedField {
    pub name: String,
    pub value: FieldValue,
    pub policy: FieldPolicy,
    pub stored: bool,
    pub index_options: IndexOptions,
    pub term_vectors: bool,
    /// Pre-analyzed terms for literal fields. `None` leaves analysis to the
    /// indexer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Vec<String>>,
}

impl IndexedField {
    /// Stored, unindexed text.
    pub fn stored_only(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: FieldValue::Text(value.into()),
            policy: FieldPolicy::StoredOnly,
            stored: true,
            index_options: IndexOptions::None,
            term_vectors: false,
            tokens: None,
        }
    }

    /// Exact-match keyword: stored, indexed as a single term.
    pub fn keyword(name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            name: name.to_string(),
            tokens: Some(vec![value.clone()]),
            value: FieldValue::Text(value),
            policy: FieldPolicy::LiteralIndexed,
            stored: true,
            index_options: IndexOptions::Docs,
            term_vectors: false,
        }
    }

    pub fn sort_key(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: FieldValue::Text(value.into()),
            policy: FieldPolicy::SortKey,
            stored: false,
            index_options: IndexOptions::None,
            term_vectors: false,
            tokens: None,
        }
    }

    pub fn numeric_point(name: &str, value: i64) -> Self {
        Self {
            name: name.to_string(),
            value: FieldValue::Int(value),
            policy: FieldPolicy::NumericPoint,
            stored: false,
            index_options: IndexOptions::None,
            term_vectors: false,
            tokens: None,
        }
    }
}

/// Projected document, fields in emission order. Field names repeat for
/// multi-valued attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizedDocument {
    pub id: String,
    pub fields: Vec<IndexedField>,
}

impl NormalizedDocument {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), fields: Vec::new() }
    }

    pub fn push(&mut self, field: IndexedField) {
        self.fields.push(field);
    }

    /// Every field instance named `name`, in order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a IndexedField> + 'a {
        self.fields.iter().filter(move |f| f.name == name)
    }

    /// First field named `name` with the given policy.
    pub fn get(&self, name: &str, policy: FieldPolicy) -> Option<&IndexedField> {
        self.fields.iter().find(|f| f.name == name && f.policy == policy)
    }

    /// Text values of every instance of `name`.
    pub fn texts(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.name == name)
            .filter_map(|f| f.value.as_text())
            .collect()
    }
}
