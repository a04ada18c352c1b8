// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashSet;
use std::sync::Arc;

use vigil_audit::{new_request_id, AuditEvent, AuditLogger, RequestSnapshot};

fn event(ts_ms: i64, request_id: &str) -> AuditEvent {
    let mut e = AuditEvent::new(request_id, "acme", "demo-d", "/v1/chat.completions");
    e.timestamp_ms = ts_ms;
    e.request = Some(RequestSnapshot::select(false, "gpt-4o-mini", "raw", "redacted"));
    e
}

fn lines(path: &std::path::Path) -> Vec<AuditEvent> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn events_rotate_by_their_own_utc_day() {
    let dir = tempfile::tempdir().unwrap();
    let logger = AuditLogger::new(dir.path().join("audit.jsonl"));

    let first = logger.write(&event(1_735_689_600_000, "a")).unwrap();
    let second = logger.write(&event(1_735_776_000_000, "b")).unwrap();

    assert_eq!(first, dir.path().join("audit-2025-01-01.jsonl"));
    assert_eq!(second, dir.path().join("audit-2025-01-02.jsonl"));

    let day1 = lines(&first);
    let day2 = lines(&second);
    assert_eq!(day1.len(), 1);
    assert_eq!(day1[0].request_id, "a");
    assert_eq!(day2.len(), 1);
    assert_eq!(day2[0].request_id, "b");
}

#[test]
fn late_events_append_to_older_partition_in_write_order() {
    let dir = tempfile::tempdir().unwrap();
    let logger = AuditLogger::new(dir.path().join("audit.jsonl"));

    logger.write(&event(1_735_689_600_000, "first")).unwrap();
    logger.write(&event(1_735_776_000_000, "next-day")).unwrap();
    let path = logger.write(&event(1_735_700_000_000, "late")).unwrap();

    let ids: Vec<_> = lines(&path).into_iter().map(|e| e.request_id).collect();
    assert_eq!(ids, ["first", "late"]);
}

#[test]
fn missing_directories_are_created() {
    let dir = tempfile::tempdir().unwrap();
    let logger = AuditLogger::new(dir.path().join("nested/logs/audit.jsonl"));
    let path = logger.write(&event(1_735_689_600_000, "x")).unwrap();
    assert!(path.exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writers_produce_whole_lines() {
    let dir = tempfile::tempdir().unwrap();
    let logger = Arc::new(AuditLogger::new(dir.path().join("audit.jsonl")));

    let mut handles = Vec::new();
    for _ in 0..40 {
        let logger = Arc::clone(&logger);
        handles.push(tokio::spawn(async move {
            let mut e = event(1_735_689_600_000, &new_request_id());
            e.request = Some(RequestSnapshot::select(false, "m", "", &"z".repeat(4096)));
            logger.write_async(e).await.unwrap()
        }));
    }
    let mut path = None;
    for h in handles {
        path = Some(h.await.unwrap());
    }

    let events = lines(&path.unwrap());
    assert_eq!(events.len(), 40);
    let ids: HashSet<_> = events.iter().map(|e| e.request_id.as_str()).collect();
    assert_eq!(ids.len(), 40);
}
