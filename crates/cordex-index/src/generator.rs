//! Document generator: projects a `SourceRecord` onto the fixed article
//! schema.
//!
//! Emission order:
//! 1. `id` keyword, then `id` sort key
//! 2. `raw` (stored only, when `store_raw`)
//! 3. `contents`, `title`, `abstract`, then `full_text` if present
//! 4. `umls`* and `semtypes`* (one instance per code), then `has_covid`, if present
//! 5. exact-match metadata keywords, always emitted, empty when absent
//! 6. `author_string` and `authors`* when the author string is non-empty
//! 7. `year` numeric point when the publish date starts with a year
//!
//! Configuration changes the policy of these fields, never which of them
//! appear.

use std::sync::Arc;

use cordex_common::fields::{ArticleField, CONTENTS, ID, RAW};
use cordex_common::{GeneratorConfig, SourceRecord};

use crate::analysis::{Analyzer, StandardAnalyzer};
use crate::document::{FieldPolicy, FieldValue, IndexOptions, IndexedField, NormalizedDocument};
use crate::error::GeneratorError;
use crate::normalise::{extract_year, split_authors, split_multi_valued};

pub struct DocumentGenerator {
    config: GeneratorConfig,
    literal: Arc<dyn Analyzer>,
}

impl DocumentGenerator {
    /// Generator whose literal fields go through the non-stemming analyzer.
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            literal: Arc::new(StandardAnalyzer::non_stemming()),
        }
    }

    /// Replace the analyzer used for author and annotation fields.
    pub fn with_analyzer(mut self, analyzer: Arc<dyn Analyzer>) -> Self {
        self.literal = analyzer;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Project `record`, or fail with `EmptyDocument` when its content is blank.
    pub fn create_document(&self, record: &SourceRecord) -> Result<NormalizedDocument, GeneratorError> {
        if record.content.trim().is_empty() {
            return Err(GeneratorError::EmptyDocument { id: record.id.clone() });
        }

        let mut doc = NormalizedDocument::new(record.id.as_str());

        doc.push(IndexedField::keyword(ID, record.id.as_str()));
        doc.push(IndexedField::sort_key(ID, record.id.as_str()));

        if self.config.store_raw {
            let raw = record.raw.as_deref().unwrap_or(&record.content);
            doc.push(IndexedField::stored_only(RAW, raw));
        }

        // ── Long text ──────────────────────────────────────────────────────
        doc.push(self.stemmed(CONTENTS, &record.content));
        doc.push(self.stemmed(ArticleField::Title.as_str(), record.get_or_empty(ArticleField::Title.as_str())));
        doc.push(self.stemmed(ArticleField::Abstract.as_str(), record.get_or_empty(ArticleField::Abstract.as_str())));
        if let Some(full_text) = record.get(ArticleField::FullText.as_str()) {
            doc.push(self.stemmed(ArticleField::FullText.as_str(), full_text));
        }

        // ── Annotations ────────────────────────────────────────────────────
        for field in [ArticleField::Umls, ArticleField::Semtypes] {
            if let Some(codes) = record.get(field.as_str()) {
                for code in split_multi_valued(codes) {
                    doc.push(self.literal(field.as_str(), code));
                }
            }
        }
        if let Some(flag) = record.get(ArticleField::HasCovid.as_str()) {
            doc.push(IndexedField::keyword(ArticleField::HasCovid.as_str(), flag));
        }

        // ── Exact-match metadata ───────────────────────────────────────────
        for field in ArticleField::KEYWORDS {
            doc.push(IndexedField::keyword(field.as_str(), record.get_or_empty(field.as_str())));
        }

        // ── Authors ────────────────────────────────────────────────────────
        let author_string = record.get_or_empty(ArticleField::Authors.as_str());
        if !author_string.is_empty() {
            doc.push(self.literal(ArticleField::AuthorString.as_str(), author_string));
            for author in split_authors(author_string) {
                doc.push(self.literal(ArticleField::Authors.as_str(), &author));
            }
        }

        if let Some(year) = extract_year(record.get_or_empty(ArticleField::PublishTime.as_str())) {
            doc.push(IndexedField::numeric_point(ArticleField::Year.as_str(), year));
        }

        Ok(doc)
    }

    fn index_options(&self) -> IndexOptions {
        if self.config.store_positions {
            IndexOptions::DocsAndFreqsAndPositions
        } else {
            IndexOptions::DocsAndFreqs
        }
    }

    /// Long text left for the indexer's stemming analyzer.
    fn stemmed(&self, name: &str, value: &str) -> IndexedField {
        IndexedField {
            name: name.to_string(),
            value: FieldValue::Text(value.to_string()),
            policy: FieldPolicy::StemmedIndexed,
            stored: self.config.store_contents,
            index_options: self.index_options(),
            term_vectors: self.config.store_docvectors,
            tokens: None,
        }
    }

    /// Text analyzed here without stemming. Always stored.
    fn literal(&self, name: &str, value: &str) -> IndexedField {
        IndexedField {
            name: name.to_string(),
            value: FieldValue::Text(value.to_string()),
            policy: FieldPolicy::LiteralIndexed,
            stored: true,
            index_options: self.index_options(),
            term_vectors: self.config.store_docvectors,
            tokens: Some(self.literal.analyze(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SourceRecord {
        SourceRecord::new("ug7v899j", "Clinical features of culture-proven Mycoplasma")
            .with_raw("{\"paper_id\": \"x\"}")
            .with_field("title", "Clinical features")
            .with_field("abstract", "OBJECTIVE: This retrospective chart review")
            .with_field("authors", "Madani, Tariq A; Al-Ghamdi, Aisha A")
            .with_field("publish_time", "2001-07-04")
            .with_field("doi", "10.1186/1471-2334-1-6")
            .with_field("journal", "BMC Infect Dis")
            .with_field("umls", "C001,,C002")
            .with_field("semtypes", "T047")
            .with_field("has_covid", "False")
    }

    fn names(doc: &NormalizedDocument) -> Vec<&str> {
        doc.fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_emission_order() {
        let doc = DocumentGenerator::new(GeneratorConfig::default())
            .create_document(&record())
            .unwrap();
        assert_eq!(
            names(&doc),
            vec![
                "id", "id", "contents", "title", "abstract",
                "umls", "umls", "semtypes", "has_covid",
                "sha", "doi", "source_x", "journal", "WHO #Covidence", "pmcid",
                "pubmed_id", "Microsoft Academic Paper ID", "publish_time", "license", "url",
                "author_string", "authors", "authors", "year",
            ]
        );
    }

    #[test]
    fn test_identity_fields() {
        let doc = DocumentGenerator::new(GeneratorConfig::default())
            .create_document(&record())
            .unwrap();
        assert_eq!(doc.id, "ug7v899j");
        assert!(doc.get(ID, FieldPolicy::LiteralIndexed).is_some_and(|f| f.stored));
        assert!(doc.get(ID, FieldPolicy::SortKey).is_some());
    }

    #[test]
    fn test_authors_kept_raw_and_normalised() {
        let doc = DocumentGenerator::new(GeneratorConfig::default())
            .create_document(&record())
            .unwrap();
        assert_eq!(doc.texts("author_string"), vec!["Madani, Tariq A; Al-Ghamdi, Aisha A"]);
        assert_eq!(doc.texts("authors"), vec!["Tariq A Madani", "Aisha A Al-Ghamdi"]);
        let first = doc.get_all("authors").next().unwrap();
        assert_eq!(first.policy, FieldPolicy::LiteralIndexed);
        assert_eq!(
            first.tokens.as_deref(),
            Some(&["tariq".to_string(), "a".to_string(), "madani".to_string()][..])
        );
    }

    #[test]
    fn test_annotations_split_without_empty_tokens() {
        let doc = DocumentGenerator::new(GeneratorConfig::default())
            .create_document(&record())
            .unwrap();
        assert_eq!(doc.texts("umls"), vec!["C001", "C002"]);
        assert!(doc.get_all("umls").all(|f| f.stored && f.policy == FieldPolicy::LiteralIndexed));
    }

    #[test]
    fn test_year_point_and_unparseable_year() {
        let gen = DocumentGenerator::new(GeneratorConfig::default());
        let doc = gen.create_document(&record()).unwrap();
        let year = doc.get("year", FieldPolicy::NumericPoint).unwrap();
        assert_eq!(year.value.as_int(), Some(2001));

        let rec = record().with_field("publish_time", "N/A");
        let doc = gen.create_document(&rec).unwrap();
        assert!(doc.get_all("year").next().is_none());
    }

    #[test]
    fn test_empty_content_is_rejected() {
        let gen = DocumentGenerator::new(GeneratorConfig::default());
        for content in ["", "   \n\t"] {
            let rec = SourceRecord::new("blank", content).with_field("title", "Has a title");
            assert_eq!(
                gen.create_document(&rec),
                Err(GeneratorError::EmptyDocument { id: "blank".to_string() })
            );
        }
    }

    #[test]
    fn test_optional_fields_skipped_when_absent() {
        let rec = SourceRecord::new("p1", "body text");
        let doc = DocumentGenerator::new(GeneratorConfig::default())
            .create_document(&rec)
            .unwrap();
        for absent in ["full_text", "umls", "semtypes", "has_covid", "author_string", "authors", "year", "raw"] {
            assert!(doc.get_all(absent).next().is_none(), "{absent}");
        }
        // Exact-match metadata is always present.
        assert_eq!(doc.texts("journal"), vec![""]);
        assert_eq!(doc.texts("WHO #Covidence"), vec![""]);
    }

    #[test]
    fn test_store_raw_falls_back_to_content() {
        let cfg = GeneratorConfig { store_raw: true, ..GeneratorConfig::default() };
        let gen = DocumentGenerator::new(cfg);

        let doc = gen.create_document(&record()).unwrap();
        assert_eq!(doc.texts("raw"), vec!["{\"paper_id\": \"x\"}"]);
        assert_eq!(doc.get("raw", FieldPolicy::StoredOnly).map(|f| f.stored), Some(true));

        let doc = gen.create_document(&SourceRecord::new("p", "plain")).unwrap();
        assert_eq!(doc.texts("raw"), vec!["plain"]);
    }

    #[test]
    fn test_policy_switches_apply_uniformly() {
        let cfg = GeneratorConfig {
            store_raw: false,
            store_contents: false,
            store_docvectors: true,
            store_positions: false,
        };
        let doc = DocumentGenerator::new(cfg).create_document(&record()).unwrap();

        let contents = doc.get("contents", FieldPolicy::StemmedIndexed).unwrap();
        assert!(!contents.stored);
        assert!(contents.term_vectors);
        assert_eq!(contents.index_options, IndexOptions::DocsAndFreqs);

        let author = doc.get("authors", FieldPolicy::LiteralIndexed).unwrap();
        assert!(author.stored);
        assert_eq!(author.index_options, IndexOptions::DocsAndFreqs);

        // Same fields regardless of policy.
        let default_doc = DocumentGenerator::new(GeneratorConfig::default())
            .create_document(&record())
            .unwrap();
        assert_eq!(names(&doc), names(&default_doc));
    }

    #[test]
    fn test_custom_analyzer() {
        let gen = DocumentGenerator::new(GeneratorConfig::default())
            .with_analyzer(Arc::new(StandardAnalyzer::syntax()));
        let rec = SourceRecord::new("x", "text").with_field("authors", "The Consortium");
        let doc = gen.create_document(&rec).unwrap();
        let tokens = doc.get("authors", FieldPolicy::LiteralIndexed).and_then(|f| f.tokens.clone());
        assert_eq!(tokens, Some(vec!["consortium".to_string()]));
    }
}
