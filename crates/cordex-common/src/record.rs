//! Source records produced by the format parsers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One unprojected document observation.
///
/// `fields` has no fixed schema: every key is optional and must be checked
/// by the consumer. Keys are case-folded on insert and lookup, so a table
/// header `Title` and a lookup for `title` meet in the same slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Identity string. Uniqueness is inherited from the upstream id scheme
    /// and is not enforced here.
    pub id: String,
    /// Primary text. May be empty; the generator rejects blank content.
    pub content: String,
    /// Original unparsed text, kept verbatim for archival storage.
    pub raw: Option<String>,
    fields: BTreeMap<String, String>,
}

impl SourceRecord {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            raw: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a field.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.fields.insert(name.to_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Field value, or `""` when the key is absent.
    pub fn get_or_empty(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(&name.to_lowercase())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let rec = SourceRecord::new("ug7v899j", "text")
            .with_field("WHO #Covidence", "#3252");
        assert_eq!(rec.get("who #covidence"), Some("#3252"));
        assert!(rec.contains("WHO #COVIDENCE"));
    }

    #[test]
    fn test_missing_field_reads_empty() {
        let rec = SourceRecord::new("a", "b");
        assert_eq!(rec.get("journal"), None);
        assert_eq!(rec.get_or_empty("journal"), "");
        assert!(!rec.contains("journal"));
    }

    #[test]
    fn test_insert_replaces_existing() {
        let mut rec = SourceRecord::new("a", "b").with_field("umls", "C001");
        rec.insert("UMLS", "C002");
        assert_eq!(rec.get("umls"), Some("C002"));
        assert_eq!(rec.field_count(), 1);
    }
}
