//! Field vocabulary.
//!
//! Upstream table columns are looked up by their lower-cased header name;
//! output field names keep the casing the index schema expects.

/// Identity field, emitted both as a stored keyword and as a sort key.
pub const ID: &str = "id";
/// Primary text field.
pub const CONTENTS: &str = "contents";
/// Verbatim source text, stored but never indexed.
pub const RAW: &str = "raw";

// ── Table-only columns ────────────────────────────────────────────────────────

pub const CORD_UID: &str = "cord_uid";
pub const HAS_PMC_XML_PARSE: &str = "has_pmc_xml_parse";
pub const HAS_PDF_PARSE: &str = "has_pdf_parse";
pub const FULL_TEXT_FILE: &str = "full_text_file";

// ── Markup-only keys ──────────────────────────────────────────────────────────

pub const PUBLISHER_ID: &str = "publisher_id";
pub const BODY: &str = "body";

/// Fields of a biomedical article record as the generator emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArticleField {
    Sha,
    Source,
    Doi,
    Title,
    Authors,
    AuthorString,
    Abstract,
    Journal,
    PublishTime,
    Year,
    PmcId,
    PubmedId,
    License,
    MicrosoftId,
    Who,
    Url,
    Umls,
    Semtypes,
    HasCovid,
    FullText,
}

impl ArticleField {
    /// Output field name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleField::Sha          => "sha",
            ArticleField::Source       => "source_x",
            ArticleField::Doi          => "doi",
            ArticleField::Title        => "title",
            ArticleField::Authors      => "authors",
            ArticleField::AuthorString => "author_string",
            ArticleField::Abstract     => "abstract",
            ArticleField::Journal      => "journal",
            ArticleField::PublishTime  => "publish_time",
            ArticleField::Year         => "year",
            ArticleField::PmcId        => "pmcid",
            ArticleField::PubmedId     => "pubmed_id",
            ArticleField::License      => "license",
            ArticleField::MicrosoftId  => "Microsoft Academic Paper ID",
            ArticleField::Who          => "WHO #Covidence",
            ArticleField::Url          => "url",
            ArticleField::Umls         => "umls",
            ArticleField::Semtypes     => "semtypes",
            ArticleField::HasCovid     => "has_covid",
            ArticleField::FullText     => "full_text",
        }
    }

    /// Short metadata fields emitted as exact-match stored keywords, in
    /// emission order.
    pub const KEYWORDS: [ArticleField; 11] = [
        ArticleField::Sha,
        ArticleField::Doi,
        ArticleField::Source,
        ArticleField::Journal,
        ArticleField::Who,
        ArticleField::PmcId,
        ArticleField::PubmedId,
        ArticleField::MicrosoftId,
        ArticleField::PublishTime,
        ArticleField::License,
        ArticleField::Url,
    ];
}
