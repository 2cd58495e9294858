//! Integration tests for loading contact exports and rule files from disk.

use chrono::{TimeZone, Utc};
use contacts::{loader, ContactBook, Field, LoadError, MaterializedSegment, Operator, RuleValue};
use std::fs;
use std::path::PathBuf;

/// Scratch directory unique to this test process and test name.
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("contacts-it-{}-{}", std::process::id(), name));
    fs::create_dir_all(&dir).unwrap();
    dir
}

const EXPORT_JSONL: &str = r#"{"id": "c1", "countryISO": "SA", "tags": ["VIP"], "phoneNumber": "+966501234567", "createdAt": "2024-03-01T08:30:00Z"}

{"id": "c2", "channel": "whatsapp", "createdAt": "2024-03-02 10:00:00", "lastInteractionTime": 1717243200000}
{"id": "c3", "firstName": "Noura", "createdAt": "2024-03-03", "conversationOpenedTime": null, "botStatus": ""}
"#;

#[test]
fn test_load_jsonl_export() {
    let dir = scratch_dir("jsonl");
    let path = dir.join("contacts.jsonl");
    fs::write(&path, EXPORT_JSONL).unwrap();

    let book = ContactBook::load_from_file(&path).unwrap();
    assert_eq!(book.len(), 3);

    let ids: Vec<&str> = book.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["c1", "c2", "c3"]);

    let c1 = book.get("c1").unwrap();
    assert_eq!(c1.country_iso.as_deref(), Some("SA"));
    assert_eq!(c1.created_at, Some(Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap()));

    let c2 = book.get("c2").unwrap();
    assert_eq!(c2.created_at, Some(Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap()));
    assert_eq!(
        c2.last_interaction_time,
        Some(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
    );
    assert!(c2.tags.is_empty());

    let c3 = book.get("c3").unwrap();
    assert_eq!(c3.created_at, Some(Utc.with_ymd_and_hms(2024, 3, 3, 0, 0, 0).unwrap()));
    assert_eq!(c3.conversation_opened_time, None);

    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_jsonl_error_reports_line() {
    let dir = scratch_dir("bad-line");
    let path = dir.join("contacts.jsonl");
    fs::write(&path, "{\"id\": \"a\"}\n\n{\"id\": \"b\", \"createdAt\": \"yesterday\"}\n").unwrap();

    match ContactBook::load_from_file(&path) {
        Err(LoadError::ParseError { file, line, .. }) => {
            assert_eq!(file, "contacts.jsonl");
            assert_eq!(line, 3);
        }
        other => panic!("expected a parse error, got {other:?}"),
    }

    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_duplicate_ids_in_file() {
    let dir = scratch_dir("dupes");
    let path = dir.join("contacts.json");
    fs::write(&path, r#"[{"id": "a"}, {"id": "b"}, {"id": "a"}]"#).unwrap();

    let err = ContactBook::load_from_file(&path).unwrap_err();
    assert!(matches!(err, LoadError::DuplicateId { ref id } if id == "a"));
    assert!(err.to_string().contains("a"));

    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_missing_and_unsupported_files() {
    let dir = scratch_dir("missing");

    let missing = dir.join("nope.json");
    assert!(matches!(
        ContactBook::load_from_file(&missing),
        Err(LoadError::FileNotFound { .. })
    ));

    let csv = dir.join("contacts.csv");
    fs::write(&csv, "id\na\n").unwrap();
    assert!(matches!(
        ContactBook::load_from_file(&csv),
        Err(LoadError::UnsupportedFormat { .. })
    ));

    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_rules_and_segments_files() {
    let dir = scratch_dir("rules");
    let rules_path = dir.join("rules.json");
    fs::write(
        &rules_path,
        r#"[
            {"field": "tags", "operator": "hasAnyOf", "value": ["VIP"]},
            {"field": "createdAt", "operator": "isTimestampBetween", "value": {"from": "2024-01-01", "to": "2024-01-31"}},
            {"field": "createdAt", "operator": "exists"},
            {"field": "shoeSize", "operator": "equals", "value": 42}
        ]"#,
    )
    .unwrap();

    let rules = loader::load_rules(&rules_path).unwrap();
    assert_eq!(rules.len(), 4);
    assert_eq!(rules[0].value, RuleValue::list(["VIP"]));
    assert_eq!(rules[1].value, RuleValue::range("2024-01-01", "2024-01-31"));
    assert_eq!(rules[2].operator, Operator::Exists);
    assert_eq!(rules[2].value, RuleValue::Null);
    assert_eq!(rules[3].field, Field::Unknown);

    let segments_path = dir.join("segments.json");
    fs::write(
        &segments_path,
        r#"[{"name": "vips", "rules": [{"field": "tags", "operator": "hasAnyOf", "value": ["VIP"]}]}, {"name": "nobody"}]"#,
    )
    .unwrap();
    let segments = loader::load_segments(&segments_path).unwrap();
    assert_eq!(segments.len(), 2);
    assert!(segments[1].rules.is_empty());

    let out = dir.join("out.json");
    let materialized = vec![MaterializedSegment {
        name: "vips".to_string(),
        contact_ids: vec!["c1".to_string()],
    }];
    loader::write_segments(&out, &materialized).unwrap();
    let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written[0]["contactIds"][0], "c1");

    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_duplicate_segment_names_rejected() {
    let dir = scratch_dir("segment-dupes");
    let path = dir.join("segments.json");
    fs::write(&path, r#"[{"name": "a", "rules": []}, {"name": "a", "rules": []}]"#).unwrap();

    assert!(matches!(
        loader::load_segments(&path),
        Err(LoadError::ValidationError(_))
    ));

    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_null_tags_do_not_reject_the_file() {
    let dir = scratch_dir("null-tags");
    let json = dir.join("contacts.json");
    fs::write(&json, r#"[{"id": "a", "tags": null}, {"id": "b", "tags": ["VIP"]}]"#).unwrap();
    let jsonl = dir.join("contacts.jsonl");
    fs::write(&jsonl, "{\"id\": \"a\", \"tags\": null}\n{\"id\": \"b\", \"tags\": [\"VIP\"]}\n").unwrap();

    for path in [json, jsonl] {
        let book = ContactBook::load_from_file(&path).unwrap();
        assert_eq!(book.len(), 2);
        assert!(book.get("a").unwrap().tags.is_empty());
        assert_eq!(book.get("b").unwrap().tags, vec!["VIP"]);
    }

    fs::remove_dir_all(dir).ok();
}
