use pretty_assertions::assert_eq;
use serde_json::json;
use server::{logging::init_logging, logs::parse_entries};
use tracing::info;

#[test]
fn test_log_file_lines_read_back_as_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");

    let guard = init_logging(&path).unwrap();
    info!(user_id = "u-1", count = 3, "hello roundtrip");
    drop(guard);

    let content = std::fs::read_to_string(&path).unwrap();
    let entries = parse_entries(&content);
    let entry = entries
        .iter()
        .find(|entry| entry.message == "hello roundtrip")
        .unwrap();

    assert_eq!(entry.level, "INFO");
    assert!(!entry.timestamp.is_empty());
    assert_eq!(entry.metadata["user_id"], json!("u-1"));
    assert_eq!(entry.metadata["count"], json!(3));
    assert!(entries.iter().all(|entry| !entry.message.starts_with("Malformed")));
}
