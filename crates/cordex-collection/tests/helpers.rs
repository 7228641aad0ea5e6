//! Fixture builders shared by the collection tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use cordex_collection::Collection;
use cordex_common::{CollectionConfig, CollectionKind};
use serde_json::json;
use tempfile::TempDir;

pub const HEADER: &str = "cord_uid,sha,source_x,title,doi,pmcid,pubmed_id,license,abstract,publish_time,authors,journal,has_pdf_parse,has_pmc_xml_parse,full_text_file,url";

pub struct Cord19Fixture {
    pub dir: TempDir,
    rows: Vec<String>,
}

impl Cord19Fixture {
    pub fn new() -> Self {
        Self { dir: tempfile::tempdir().unwrap(), rows: Vec::new() }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Row whose markup parse lives at `{bucket}/pmc_json/{pmcid}.xml.json`.
    pub fn markup_row(&mut self, uid: &str, pmcid: &str, title: &str) -> &mut Self {
        self.rows.push(format!(
            "{uid},,PMC,{title},10.1/{uid},{pmcid},111,cc-by,Row abstract,2020-04-01,\"Jones, Bob; Smith, Ann\",Virol J,False,True,comm_use_subset,https://x/{uid}"
        ));
        self
    }

    /// Row whose derived parse is keyed by the last sha.
    pub fn derived_row(&mut self, uid: &str, shas: &str, title: &str) -> &mut Self {
        self.rows.push(format!(
            "{uid},{shas},Elsevier,{title},,,,els-covid,,2019,,Lancet,True,False,custom_license,"
        ));
        self
    }

    /// Row with neither parse flag.
    pub fn bare_row(&mut self, uid: &str, title: &str) -> &mut Self {
        self.rows.push(format!(
            "{uid},,WHO,{title},,,,unk,Bare abstract,N/A,,,False,False,,"
        ));
        self
    }

    pub fn side_file(&self, relative: &str, body: serde_json::Value) -> PathBuf {
        let path = self.root().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, serde_json::to_string(&body).unwrap()).unwrap();
        path
    }

    pub fn write_table(&self) -> PathBuf {
        let path = self.root().join("metadata.csv");
        let mut text = String::from(HEADER);
        text.push('\n');
        for row in &self.rows {
            text.push_str(row);
            text.push('\n');
        }
        std::fs::write(&path, text).unwrap();
        path
    }

    pub fn collection(&self, kind: CollectionKind) -> Collection {
        Collection::new(&CollectionConfig::new(kind, self.root()))
    }
}

/// Side-file with `k` abstract and `m` body paragraphs.
pub fn side_file_body(title: &str, k: usize, m: usize) -> serde_json::Value {
    let abstracts: Vec<_> = (0..k)
        .map(|i| json!({"text": format!("Abstract paragraph {i}."), "text_umls_concepts": format!("CA{i}"), "text_umls_semtypes": "T047"}))
        .collect();
    let body: Vec<_> = (0..m)
        .map(|i| json!({"text": format!("Body paragraph {i}."), "text_umls_concepts": format!("CB{i}"), "text_umls_semtypes": "T121"}))
        .collect();
    json!({
        "metadata": {
            "title": title,
            "title_umls_concepts": "CT1,CT2",
            "title_umls_semtypes": "T001",
        },
        "hasCovid19": true,
        "abstract": abstracts,
        "body_text": body,
    })
}
