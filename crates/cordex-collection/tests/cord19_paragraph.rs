//! Paragraph expansion over a CORD-19 style table.

mod helpers;

use cordex_collection::{CollectionError, Segment};
use cordex_common::{CollectionKind, SourceRecord};
use helpers::{side_file_body, Cord19Fixture};
use serde_json::json;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn drain(segment: &mut Segment) -> Vec<SourceRecord> {
    let mut out = Vec::new();
    while let Some(rec) = segment.advance().unwrap() {
        out.push(rec);
    }
    out
}

fn open_paragraph_segment(fx: &Cord19Fixture) -> Segment {
    let table = fx.write_table();
    fx.collection(CollectionKind::Cord19Paragraph)
        .open_segment(&table)
        .unwrap()
}

#[test]
fn test_row_expands_title_then_abstract_then_body() {
    let mut fx = Cord19Fixture::new();
    fx.markup_row("ug7v899j", "PMC1", "Row title");
    fx.side_file("comm_use_subset/pmc_json/PMC1.xml.json", side_file_body("Side title", 2, 3));

    let mut seg = open_paragraph_segment(&fx);
    let records = drain(&mut seg);

    let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "ug7v899j_t_00000",
            "ug7v899j_a_00000",
            "ug7v899j_a_00001",
            "ug7v899j_c_00000",
            "ug7v899j_c_00001",
            "ug7v899j_c_00002",
        ]
    );

    assert_eq!(records[0].content, "Side title");
    assert_eq!(records[0].get("umls"), Some("CT1,CT2"));
    assert_eq!(records[0].get("semtypes"), Some("T001"));
    assert_eq!(records[1].content, "Abstract paragraph 0.");
    assert_eq!(records[1].get("umls"), Some("CA0"));
    assert_eq!(records[5].content, "Body paragraph 2.");
    assert_eq!(records[5].get("semtypes"), Some("T121"));

    // Row columns and the row-level covid flag ride along on every record.
    for rec in &records {
        assert_eq!(rec.get("title"), Some("Row title"));
        assert_eq!(rec.get("journal"), Some("Virol J"));
        assert_eq!(rec.get("has_covid"), Some("True"));
    }
}

#[test]
fn test_ids_within_a_row_are_distinct_and_well_formed() {
    let mut fx = Cord19Fixture::new();
    fx.markup_row("r1", "PMC9", "T");
    fx.side_file("comm_use_subset/pmc_json/PMC9.xml.json", side_file_body("T", 4, 7));

    let records = drain(&mut open_paragraph_segment(&fx));
    assert_eq!(records.len(), 1 + 4 + 7);

    let mut ids: Vec<_> = records.iter().map(|r| r.id.clone()).collect();
    for id in &ids {
        let parts: Vec<_> = id.split('_').collect();
        assert_eq!(parts.len(), 3, "{id}");
        assert_eq!(parts[0], "r1");
        assert!(["t", "a", "c"].contains(&parts[1]), "{id}");
        assert_eq!(parts[2].len(), 5, "{id}");
        assert!(parts[2].chars().all(|c| c.is_ascii_digit()), "{id}");
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 12);
}

#[test]
fn test_missing_side_file_yields_single_title_record_and_continues() {
    init_tracing();
    let mut fx = Cord19Fixture::new();
    fx.markup_row("gone1", "PMC404", "Lost paper");
    fx.derived_row("next2", "aaa;bbb", "Next paper");
    fx.side_file("custom_license/pdf_json/bbb.json", side_file_body("Next side", 1, 1));

    let records = drain(&mut open_paragraph_segment(&fx));
    let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["gone1_t_00000", "next2_t_00000", "next2_a_00000", "next2_c_00000"]
    );

    // Metadata-only record falls back to the row title and a false flag.
    assert_eq!(records[0].content, "Lost paper");
    assert_eq!(records[0].get("has_covid"), Some("False"));
    assert_eq!(records[0].get("umls"), Some(""));
}

#[test]
fn test_unparseable_side_file_does_not_leak_previous_row_paragraphs() {
    let mut fx = Cord19Fixture::new();
    fx.markup_row("first", "PMC1", "First");
    fx.markup_row("broken", "PMC2", "Broken");
    fx.side_file("comm_use_subset/pmc_json/PMC1.xml.json", side_file_body("First", 1, 1));
    let broken = fx.root().join("comm_use_subset/pmc_json/PMC2.xml.json");
    std::fs::write(&broken, "{ truncated").unwrap();

    let records = drain(&mut open_paragraph_segment(&fx));
    let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["first_t_00000", "first_a_00000", "first_c_00000", "broken_t_00000"]
    );
    assert_eq!(records[3].get("has_covid"), Some("False"));
}

#[test]
fn test_fallback_side_file_for_rows_without_parses() {
    let mut fx = Cord19Fixture::new();
    fx.bare_row("bare1", "Bare title");
    fx.side_file(
        "newJsonFiles/bare1.json",
        json!({"metadata": {"title": "Recovered"}, "body_text": [{"text": "Only body."}]}),
    );

    let records = drain(&mut open_paragraph_segment(&fx));
    let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["bare1_t_00000", "bare1_c_00000"]);
    assert_eq!(records[0].content, "Recovered");
}

#[test]
fn test_segment_is_single_use_and_closes_at_end() {
    let mut fx = Cord19Fixture::new();
    fx.bare_row("only", "Only");

    let mut seg = open_paragraph_segment(&fx);
    assert!(seg.is_open());
    assert_eq!(seg.advance().unwrap().map(|r| r.id), Some("only_t_00000".to_string()));
    assert!(seg.advance().unwrap().is_none());
    assert!(!seg.is_open());
    assert!(seg.advance().unwrap().is_none());
}

#[test]
fn test_abandoned_segment_releases_table() {
    let mut fx = Cord19Fixture::new();
    fx.markup_row("a1", "PMC1", "A");
    fx.markup_row("a2", "PMC2", "B");
    fx.side_file("comm_use_subset/pmc_json/PMC1.xml.json", side_file_body("A", 3, 3));

    let mut seg = open_paragraph_segment(&fx);
    assert!(seg.advance().unwrap().is_some());
    seg.close();
    assert!(!seg.is_open());
    assert!(seg.advance().unwrap().is_none());
}

#[test]
fn test_iterator_surface_matches_advance() {
    let mut fx = Cord19Fixture::new();
    fx.derived_row("d1", "h1", "D");
    fx.side_file("custom_license/pdf_json/h1.json", side_file_body("D", 2, 0));

    let seg = open_paragraph_segment(&fx);
    let ids: Vec<_> = seg.map(|r| r.unwrap().id).collect();
    assert_eq!(ids, vec!["d1_t_00000", "d1_a_00000", "d1_a_00001"]);
}

#[test]
fn test_unreadable_table_is_segment_fatal() {
    let fx = Cord19Fixture::new();
    let bogus = fx.root().join("metadata.csv");
    std::fs::write(&bogus, [0xff, 0xfe, b'\n', 0xff]).unwrap();

    let collection = fx.collection(CollectionKind::Cord19Paragraph);
    match collection.open_segment(&bogus) {
        Err(CollectionError::MalformedResource { .. }) => {}
        Ok(mut seg) => {
            let err = seg.advance().unwrap_err();
            assert!(matches!(err, CollectionError::MalformedResource { .. }));
            assert!(!seg.is_open());
            assert!(seg.advance().unwrap().is_none());
        }
        Err(other) => panic!("unexpected error: {other}"),
    }
}
