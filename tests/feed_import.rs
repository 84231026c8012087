use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_notifyd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn notifyd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

#[test]
fn feed_import_replaces_the_store_and_applies_normalized_preferences() {
    let dir = temp_dir("notifyd-feed");
    let feed_path = dir.join("feed.json");
    let feed = json!({
        "notifications": [
            { "id": "n1", "recipientRole": "all", "category": "announcement",
              "timestamp": "2025-03-01T08:00:00Z" },
            { "recipientRole": "all", "category": "general",
              "timestamp": "2025-03-02T08:00:00Z" },
            { "id": "broken", "category": "marks" }
        ],
        "preferences": {
            "lowAttendance": false,
            "generalAlerts": false
        }
    });
    std::fs::write(&feed_path, serde_json::to_string_pretty(&feed).expect("serialize"))
        .expect("write feed file");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "session.open",
        json!({ "userId": "s1", "role": "student" }),
    );

    let summary = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "feed.import",
        json!({ "path": feed_path.to_string_lossy() }),
    );
    assert_eq!(summary.get("loaded").and_then(|v| v.as_u64()), Some(2));
    assert_eq!(summary.get("skipped").and_then(|v| v.as_u64()), Some(1));
    assert_eq!(
        summary.get("preferencesApplied").and_then(|v| v.as_bool()),
        Some(true)
    );

    // Mandatory toggle forced back on, editable one honored.
    let prefs = request_ok(&mut stdin, &mut reader, "3", "preferences.get", json!({}));
    assert_eq!(prefs.get("lowAttendance").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(prefs.get("generalAlerts").and_then(|v| v.as_bool()), Some(false));

    // generalAlerts is off, so only the announcement survives; the entry
    // without an id got one assigned.
    let listing = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "notifications.list",
        json!({ "filter": "All" }),
    );
    let items = listing.get("items").and_then(|v| v.as_array()).expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].get("id").and_then(|v| v.as_str()), Some("n1"));

    let _ = child.kill();
}

#[test]
fn feed_import_reports_missing_files_and_bad_json_distinctly() {
    let dir = temp_dir("notifyd-feed-bad");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let missing = request(
        &mut stdin,
        &mut reader,
        "1",
        "feed.import",
        json!({ "path": dir.join("nope.json").to_string_lossy() }),
    );
    assert_eq!(missing.get("ok").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(
        missing
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str()),
        Some("feed_read_failed")
    );

    let garbled_path = dir.join("garbled.json");
    std::fs::write(&garbled_path, "{ not json").expect("write garbled file");
    let garbled = request(
        &mut stdin,
        &mut reader,
        "2",
        "feed.import",
        json!({ "path": garbled_path.to_string_lossy() }),
    );
    assert_eq!(garbled.get("ok").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(
        garbled
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str()),
        Some("feed_parse_failed")
    );

    let _ = child.kill();
}

#[test]
fn push_assigns_ids_and_replaces_by_id() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "session.open",
        json!({ "userId": "s1", "role": "student" }),
    );

    let pushed = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "notifications.push",
        json!({
            "recipientRole": "all",
            "category": "general",
            "title": "Library hours",
            "timestamp": "2025-03-01T08:00:00Z"
        }),
    );
    let assigned = pushed
        .get("id")
        .and_then(|v| v.as_str())
        .expect("assigned id")
        .to_string();
    assert!(!assigned.is_empty());

    // Pushing the same id again replaces the record instead of duplicating.
    request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "notifications.push",
        json!({
            "id": assigned,
            "recipientRole": "all",
            "category": "general",
            "title": "Library hours (updated)",
            "timestamp": "2025-03-01T09:00:00Z"
        }),
    );

    let listing = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "notifications.list",
        json!({ "filter": "All" }),
    );
    let items = listing.get("items").and_then(|v| v.as_array()).expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(
        items[0].get("title").and_then(|v| v.as_str()),
        Some("Library hours (updated)")
    );

    let _ = child.kill();
}
