/// Edge case tests for unusual but valid log content
mod common;

use std::fs;

use ai_history_search::{QueryOptions, build_index, parse_session_file};
use common::{LogDirBuilder, RecordLineBuilder, SessionFileBuilder};

#[test]
fn test_edge_case_blank_lines_between_records() {
    let session = SessionFileBuilder::new("blanks")
        .with_record(RecordLineBuilder::user("first"))
        .with_raw_line("")
        .with_raw_line("   ")
        .with_record(RecordLineBuilder::assistant("second"));
    let dir = LogDirBuilder::new().with_project("-p", &[session]);

    let parsed = parse_session_file(&dir.path().join("-p/blanks.jsonl")).unwrap();
    assert_eq!(parsed.session.len(), 2);
    assert!(parsed.skipped.is_empty());
}

#[test]
fn test_edge_case_crlf_line_endings() {
    let dir = LogDirBuilder::new();
    let content = format!(
        "{}\r\n{}\r\n",
        RecordLineBuilder::user("windows line").to_json(),
        RecordLineBuilder::assistant("still parsed").to_json()
    );
    fs::create_dir(dir.path().join("-p")).unwrap();
    fs::write(dir.path().join("-p/crlf.jsonl"), content).unwrap();

    let parsed = parse_session_file(&dir.path().join("-p/crlf.jsonl")).unwrap();
    assert_eq!(parsed.session.len(), 2);
    assert!(parsed.skipped.is_empty());
}

#[test]
fn test_edge_case_no_trailing_newline() {
    let dir = LogDirBuilder::new();
    fs::create_dir(dir.path().join("-p")).unwrap();
    fs::write(dir.path().join("-p/s.jsonl"), RecordLineBuilder::user("complete").to_json()).unwrap();

    let parsed = parse_session_file(&dir.path().join("-p/s.jsonl")).unwrap();
    assert_eq!(parsed.session.len(), 1);
    assert!(!parsed.pending_tail);
}

#[test]
fn test_edge_case_truncated_json_at_eof_is_pending_not_malformed() {
    let dir = LogDirBuilder::new();
    fs::create_dir(dir.path().join("-p")).unwrap();
    let content = format!(
        "{}\n{{\"type\":\"assistant\",\"message\":{{\"role\":\"assis",
        RecordLineBuilder::user("before the crash").to_json()
    );
    fs::write(dir.path().join("-p/s.jsonl"), content).unwrap();

    let parsed = parse_session_file(&dir.path().join("-p/s.jsonl")).unwrap();
    assert_eq!(parsed.session.len(), 1);
    assert!(parsed.skipped.is_empty());
    assert!(parsed.pending_tail);
}

#[test]
fn test_edge_case_non_conversation_entries_ignored() {
    let session = SessionFileBuilder::new("mixed")
        .with_raw_line(r#"{"type":"summary","summary":"Auth work","leafUuid":"x"}"#)
        .with_raw_line(r#"{"type":"system","content":"hook ran"}"#)
        .with_record(RecordLineBuilder::user("real question"));
    let dir = LogDirBuilder::new().with_project("-p", &[session]);

    let parsed = parse_session_file(&dir.path().join("-p/mixed.jsonl")).unwrap();
    assert_eq!(parsed.session.len(), 1);
    assert!(parsed.skipped.is_empty());
    assert_eq!(parsed.dropped, 0);
}

#[test]
fn test_edge_case_entries_without_text_are_dropped() {
    let session = SessionFileBuilder::new("empty")
        .with_record(RecordLineBuilder::user(""))
        .with_record(RecordLineBuilder::assistant("   "))
        .with_raw_line(r#"{"type":"user"}"#)
        .with_record(RecordLineBuilder::user("kept"));
    let dir = LogDirBuilder::new().with_project("-p", &[session]);

    let parsed = parse_session_file(&dir.path().join("-p/empty.jsonl")).unwrap();
    assert_eq!(parsed.session.len(), 1);
    assert_eq!(parsed.dropped, 3);
}

#[test]
fn test_edge_case_unicode_text_is_searchable() {
    let session = SessionFileBuilder::new("unicode")
        .with_record(RecordLineBuilder::user("Überprüfung der Datenbank 数据库 🚀"));
    let dir = LogDirBuilder::new().with_project("-p", &[session]);
    let index = build_index(dir.path()).unwrap();

    let options = QueryOptions::default();
    assert_eq!(index.search("überprüfung", &options).len(), 1);
    assert_eq!(index.search("ÜBERPRÜFUNG", &options).len(), 1);
    assert_eq!(index.search("数据库", &options).len(), 1);
}

#[test]
fn test_edge_case_very_long_record_truncated_in_snippet() {
    let long = format!("needle {}", "word ".repeat(2000));
    let session = SessionFileBuilder::new("long").with_record(RecordLineBuilder::user(&long));
    let dir = LogDirBuilder::new().with_project("-p", &[session]);
    let index = build_index(dir.path()).unwrap();

    let results = index.search("needle", &QueryOptions::default());
    let text = &results[0].snippets[0].lines[0].text;
    assert_eq!(text.chars().count(), 1000 + "...".len());
    assert!(text.ends_with("..."));
}

#[test]
fn test_edge_case_large_tool_result_only_head_indexed() {
    let payload = format!("{} tailmarker", "x ".repeat(400));
    let session = SessionFileBuilder::new("tool").with_record(
        RecordLineBuilder::user("")
            .blocks(serde_json::json!([{ "type": "tool_result", "content": payload }])),
    );
    let dir = LogDirBuilder::new().with_project("-p", &[session]);
    let index = build_index(dir.path()).unwrap();

    assert!(index.search("tailmarker", &QueryOptions::default()).is_empty());
    assert_eq!(index.session_count(), 1);
}

#[test]
fn test_edge_case_missing_timestamps_sort_last() {
    let dir = LogDirBuilder::new().with_project(
        "-p",
        &[
            SessionFileBuilder::new("dated")
                .with_record(RecordLineBuilder::user("dated").timestamp("2020-01-01T00:00:00Z")),
            SessionFileBuilder::new("undated")
                .with_record(RecordLineBuilder::user("undated").no_timestamp()),
        ],
    );
    let index = build_index(dir.path()).unwrap();

    let ids: Vec<String> = index.list_sessions().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec!["dated", "undated"]);
}

#[test]
fn test_edge_case_millisecond_timestamps() {
    let session = SessionFileBuilder::new("millis").with_raw_line(
        r#"{"type":"user","message":{"role":"user","content":"epoch millis"},"timestamp":1705314600000}"#,
    );
    let dir = LogDirBuilder::new().with_project("-p", &[session]);
    let index = build_index(dir.path()).unwrap();

    let summary = &index.list_sessions()[0];
    assert_eq!(
        summary.ended_at.map(|t| t.to_rfc3339()),
        Some("2024-01-15T10:30:00+00:00".to_string())
    );
}

#[test]
fn test_edge_case_relative_cwd_ignored() {
    let session = SessionFileBuilder::new("rel")
        .with_record(RecordLineBuilder::user("first").cwd("../../etc"))
        .with_record(RecordLineBuilder::user("second").cwd("/work/real"));
    let dir = LogDirBuilder::new().with_project("-p", &[session]);
    let index = build_index(dir.path()).unwrap();

    let session = index.show_session("rel").unwrap();
    assert_eq!(session.project_path.as_deref(), Some(std::path::Path::new("/work/real")));
}

#[test]
fn test_edge_case_non_jsonl_files_ignored() {
    let dir = LogDirBuilder::new()
        .with_project("-p", &[SessionFileBuilder::new("real").with_record(RecordLineBuilder::user("hi"))]);
    fs::write(dir.path().join("-p/notes.txt"), "not a log").unwrap();
    fs::write(dir.path().join("-p/real.json"), "{}").unwrap();

    let index = build_index(dir.path()).unwrap();
    assert_eq!(index.session_count(), 1);
}

#[test]
fn test_edge_case_empty_session_file_not_indexed() {
    let dir = LogDirBuilder::new().with_project(
        "-p",
        &[SessionFileBuilder::new("empty").with_raw_line(r#"{"type":"summary","summary":"x"}"#)],
    );
    let index = build_index(dir.path()).unwrap();
    assert!(index.is_empty());
}

#[test]
fn test_edge_case_many_small_sessions() {
    let sessions: Vec<SessionFileBuilder> = (0..200)
        .map(|i| {
            SessionFileBuilder::new(&format!("s{:04}", i))
                .with_record(RecordLineBuilder::user(&format!("common topic number{}", i)))
        })
        .collect();
    let dir = LogDirBuilder::new().with_project("-p", &sessions);
    let index = build_index(dir.path()).unwrap();

    assert_eq!(index.session_count(), 200);
    let results = index.search("common", &QueryOptions::default());
    assert_eq!(results.len(), 20);
    // Same timestamp everywhere, so ties break on id
    assert_eq!(results[0].session_id, "s0000");
    assert_eq!(index.search("number137", &QueryOptions::default()).len(), 1);
}
