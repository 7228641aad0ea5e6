//! Clinical article reader: one JATS-style markup file per article.
//!
//! The document tree is scanned for a fixed set of elements and the first
//! occurrence of each is captured with the text of all its descendants:
//!
//! | Element                      | Record field            |
//! |------------------------------|-------------------------|
//! | `article-title`              | `title`                 |
//! | `abstract`                   | `abstract`              |
//! | `body`                       | `body`                  |
//! | `journal-title`              | `journal`               |
//! | `year`                       | `year`, `publish_time`  |
//! | `article-id pub-id-type=pmid`| `pubmed_id`             |
//! | `article-id pub-id-type=pmc` | `pmcid`                 |
//! | `article-id pub-id-type=publisher-id` | `publisher_id` |
//! | `article-id pub-id-type=doi` | `doi`                   |

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use cordex_common::fields::{ArticleField, BODY, PUBLISHER_ID};
use cordex_common::SourceRecord;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{CollectionError, Result};

/// Id fields in best-id order.
const ID_PRECEDENCE: [&str; 4] = ["pubmed_id", "pmcid", PUBLISHER_ID, "doi"];

/// Elements whose end separates words in captured text.
const BLOCK_ELEMENTS: &[&[u8]] = &[
    b"p", b"title", b"sec", b"label", b"caption", b"list-item", b"td", b"th", b"fn",
];

pub struct ArticleSegment {
    path: PathBuf,
    done: bool,
}

impl ArticleSegment {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CollectionError::malformed(path, "not a readable file"));
        }
        Ok(Self { path: path.to_path_buf(), done: false })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the single record has yet to be produced.
    pub fn is_open(&self) -> bool {
        !self.done
    }

    pub fn advance(&mut self) -> Result<Option<SourceRecord>> {
        if self.done {
            return Ok(None);
        }
        self.done = true;

        debug!(path = %self.path.display(), "Parsing article");
        let xml = std::fs::read_to_string(&self.path)
            .map_err(|e| CollectionError::malformed(&self.path, e))?;
        parse_article(&xml, &self.path).map(Some)
    }

    pub fn close(&mut self) {
        self.done = true;
    }
}

/// A capture in progress.
struct Capture {
    key: String,
    depth: usize,
    text: String,
}

/// Record field a start tag is captured under, if any.
fn capture_key(e: &BytesStart<'_>, path: &Path) -> Result<Option<String>> {
    let key = match e.local_name().as_ref() {
        b"article-title" => ArticleField::Title.as_str().to_string(),
        b"abstract"      => ArticleField::Abstract.as_str().to_string(),
        b"body"          => BODY.to_string(),
        b"journal-title" => ArticleField::Journal.as_str().to_string(),
        b"year"          => ArticleField::Year.as_str().to_string(),
        b"article-id" => {
            let id_type = e
                .try_get_attribute("pub-id-type")
                .map_err(|err| CollectionError::malformed(path, err))?
                .map(|attr| attr.unescape_value().map(|v| v.trim().to_lowercase()))
                .transpose()
                .map_err(|err| CollectionError::malformed(path, err))?;
            match id_type.as_deref() {
                Some("pmid")         => "pubmed_id".to_string(),
                Some("pmc")          => "pmcid".to_string(),
                Some("publisher-id") => PUBLISHER_ID.to_string(),
                Some("doi")          => "doi".to_string(),
                Some(other)          => format!("article-id-{other}"),
                None => return Ok(None),
            }
        }
        _ => return Ok(None),
    };
    Ok(Some(key))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse one article into a source record.
pub fn parse_article(xml: &str, path: &Path) -> Result<SourceRecord> {
    let mut reader = Reader::from_str(xml);

    let mut captured: HashMap<String, String> = HashMap::new();
    let mut open: Vec<Capture> = Vec::new();
    let mut depth = 0usize;
    let mut saw_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                saw_root = true;
                if let Some(key) = capture_key(e, path)? {
                    let pending = captured.contains_key(&key) || open.iter().any(|c| c.key == key);
                    if !pending {
                        open.push(Capture { key, depth, text: String::new() });
                    }
                }
            }
            Ok(Event::Empty(_)) => saw_root = true,
            Ok(Event::Text(ref e)) if !open.is_empty() => {
                let text = e
                    .unescape()
                    .map(|t| t.into_owned())
                    .unwrap_or_else(|_| unescape_lossy(&String::from_utf8_lossy(e)));
                for c in open.iter_mut() {
                    c.text.push_str(&text);
                }
            }
            Ok(Event::CData(ref e)) if !open.is_empty() => {
                let text = String::from_utf8_lossy(e);
                for c in open.iter_mut() {
                    c.text.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => {
                if BLOCK_ELEMENTS.contains(&e.local_name().as_ref()) {
                    for c in open.iter_mut() {
                        c.text.push(' ');
                    }
                }
                while open.last().is_some_and(|c| c.depth == depth) {
                    if let Some(c) = open.pop() {
                        captured.entry(c.key).or_insert_with(|| collapse_whitespace(&c.text));
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(CollectionError::malformed(
                    path,
                    format!("XML parse error at byte {}: {e}", reader.error_position()),
                ));
            }
            _ => {}
        }
    }

    if !saw_root {
        return Err(CollectionError::malformed(path, "document has no root element"));
    }
    if depth != 0 {
        return Err(CollectionError::malformed(path, "unexpected end of document"));
    }

    Ok(build_record(captured, xml, path))
}

/// Resolve entity references one at a time, dropping any quick-xml does
/// not know (HTML names such as `&ndash;` outside a DTD). A bare `&` stays.
fn unescape_lossy(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let entity_len = tail[1..]
            .find(|c: char| c == ';' || c == '&' || c.is_whitespace())
            .filter(|&i| tail.as_bytes()[i + 1] == b';')
            .map(|i| i + 2);
        match entity_len {
            Some(len) => {
                if let Ok(text) = quick_xml::escape::unescape(&tail[..len]) {
                    out.push_str(&text);
                }
                rest = &tail[len..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn build_record(mut captured: HashMap<String, String>, xml: &str, path: &Path) -> SourceRecord {
    if let Some(year) = captured.get(ArticleField::Year.as_str()).cloned() {
        captured.insert(ArticleField::PublishTime.as_str().to_string(), year);
    }

    let title = captured.get(ArticleField::Title.as_str()).map(String::as_str).unwrap_or("");
    let content = [
        title,
        captured.get(ArticleField::Abstract.as_str()).map(String::as_str).unwrap_or(""),
        captured.get(BODY).map(String::as_str).unwrap_or(""),
    ]
    .iter()
    .filter(|part| !part.is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join("\n");

    let id = best_id(&captured, path);
    debug!(id = %id, path = %path.display(), "Parsed article");

    let mut record = SourceRecord::new(id, content).with_raw(xml);
    for (key, value) in &captured {
        record.insert(key, value.as_str());
    }
    record
}

/// PubMed id → PMC id → publisher id → DOI → title hash → file stem.
///
/// The title hash is stable across runs but two articles with the same
/// title collide; callers that need unique ids must check for themselves.
fn best_id(captured: &HashMap<String, String>, path: &Path) -> String {
    for key in ID_PRECEDENCE {
        if let Some(id) = captured.get(key).filter(|v| !v.is_empty()) {
            return id.clone();
        }
    }

    if let Some(title) = captured.get(ArticleField::Title.as_str()).filter(|t| !t.is_empty()) {
        let digest = Sha256::digest(title.as_bytes());
        return hex::encode(digest)[..16].to_string();
    }

    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
