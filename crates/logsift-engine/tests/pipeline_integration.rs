//! Integration tests for the full pipeline path: YAML config through the
//! factories, a running worker, and JSON-lines files on disk.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;

use logsift_engine::config::{parser, validator};
use logsift_engine::supervisor::{Supervisor, WorkerContext};
use logsift_types::FailedEvent;

fn wait_until(deadline: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let end = Instant::now() + deadline;
    while Instant::now() < end {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}

fn read_lines(path: &std::path::Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn deleter_pipeline_end_to_end_over_jsonl_files() {
    let dir = tempfile::tempdir().unwrap();
    let documents_path = dir.path().join("events.jsonl");
    let output_path = dir.path().join("out.jsonl");
    std::fs::write(
        &documents_path,
        "{\"do_not_delete\": \"1\"}\n{\"delete_me\": \"2\"}\n{\"do_not_delete\": \"3\"}\n",
    )
    .unwrap();

    let yaml = format!(
        r#"
version: "1"
timeout: 0.0001
connector:
  type: jsonl
  documents_path: {}
  output_path: {}
pipeline:
  - name: drop marked events
    type: deleter
    filter: delete_me
"#,
        documents_path.display(),
        output_path.display()
    );
    let config = parser::parse_pipeline_str(&yaml).unwrap();
    validator::validate_pipeline(&config).unwrap();

    let ctx = WorkerContext::new();
    let counter = ctx.counter.clone();
    let mut supervisor = Supervisor::new(Arc::new(config), ctx);
    supervisor.start_all();
    assert!(wait_until(Duration::from_secs(5), || counter.value() >= 2));
    supervisor.stop_all();
    supervisor.join_all();

    let lines = read_lines(&output_path);
    assert_eq!(
        lines,
        vec!["{\"do_not_delete\":\"1\"}", "{\"do_not_delete\":\"3\"}"]
    );
    // The deleted event reached neither the output nor the failed file.
    assert!(read_lines(&dir.path().join("out.jsonl.failed")).is_empty());
}

#[test]
fn malformed_lines_are_routed_to_the_failed_file() {
    let dir = tempfile::tempdir().unwrap();
    let documents_path = dir.path().join("events.jsonl");
    let output_path = dir.path().join("out.jsonl");
    std::fs::write(
        &documents_path,
        "this is not json\n{\"keep_me\": \"1\"}\n",
    )
    .unwrap();

    let yaml = format!(
        r#"
timeout: 0.0001
connector:
  type: jsonl
  documents_path: {}
  output_path: {}
"#,
        documents_path.display(),
        output_path.display()
    );
    let config = parser::parse_pipeline_str(&yaml).unwrap();
    validator::validate_pipeline(&config).unwrap();

    let ctx = WorkerContext::new();
    let counter = ctx.counter.clone();
    let mut supervisor = Supervisor::new(Arc::new(config), ctx);
    supervisor.start_all();
    assert!(wait_until(Duration::from_secs(5), || counter.value() >= 1));
    supervisor.stop_all();
    supervisor.join_all();

    assert_eq!(read_lines(&output_path), vec!["{\"keep_me\":\"1\"}"]);

    let failed_lines = read_lines(&dir.path().join("out.jsonl.failed"));
    assert_eq!(failed_lines.len(), 1);
    let record: FailedEvent = serde_json::from_str(&failed_lines[0]).unwrap();
    assert_eq!(record.original, json!("this is not json"));
    assert!(record.processed.is_empty());
}

#[test]
fn version_info_preprocessing_is_applied_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let documents_path = dir.path().join("events.jsonl");
    let output_path = dir.path().join("out.jsonl");
    std::fs::write(&documents_path, "{\"test\": \"message\"}\n").unwrap();

    let yaml = format!(
        r#"
version: "7"
timeout: 0.0001
connector:
  type: jsonl
  documents_path: {}
  output_path: {}
  consumer:
    preprocessing:
      version_info_target_field: version_info
"#,
        documents_path.display(),
        output_path.display()
    );
    let config = parser::parse_pipeline_str(&yaml).unwrap();
    validator::validate_pipeline(&config).unwrap();

    let ctx = WorkerContext::new();
    let counter = ctx.counter.clone();
    let mut supervisor = Supervisor::new(Arc::new(config), ctx);
    supervisor.start_all();
    assert!(wait_until(Duration::from_secs(5), || counter.value() >= 1));
    supervisor.stop_all();
    supervisor.join_all();

    let lines = read_lines(&output_path);
    assert_eq!(lines.len(), 1);
    let event: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(event["test"], "message");
    assert_eq!(event["version_info"]["configuration"], "7");
    assert!(event["version_info"]["logsift"].is_string());
}

#[test]
fn unknown_connector_type_fails_validation() {
    let config = parser::parse_pipeline_str(
        r#"
timeout: 1.0
connector:
  type: carrier-pigeon
"#,
    )
    .unwrap();
    let err = validator::validate_pipeline(&config).unwrap_err().to_string();
    assert!(err.contains("carrier-pigeon"));
}

#[test]
fn env_var_substitution_reaches_connector_options() {
    std::env::set_var("LS_IT_DOCUMENTS", "/tmp/does-not-matter.jsonl");
    let config = parser::parse_pipeline_str(
        r#"
timeout: 1.0
connector:
  type: jsonl
  documents_path: ${LS_IT_DOCUMENTS}
  output_path: /tmp/out.jsonl
"#,
    )
    .unwrap();
    assert_eq!(
        config.connector.options["documents_path"],
        "/tmp/does-not-matter.jsonl"
    );
    std::env::remove_var("LS_IT_DOCUMENTS");
}
