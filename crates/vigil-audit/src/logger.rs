// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Day-partitioned JSONL writer.
//!
//! An event with timestamp T goes to `<stem>-<YYYY-MM-DD><ext>` next to the
//! configured base path, where the date is T's UTC calendar day. Write time
//! plays no part, so replayed or late events land in the right file.
//! Files are opened in append mode and never truncated.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate};
use tracing::{error, info};
use vigil_core::VigilError;

use crate::event::AuditEvent;

/// Partition file for `day` derived from `base`.
pub fn partition_path(base: &Path, day: NaiveDate) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audit".to_string());
    let ext = base
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    base.with_file_name(format!("{stem}-{}{ext}", day.format("%Y-%m-%d")))
}

/// Appends audit events to per-day files.
#[derive(Debug)]
pub struct AuditLogger {
    base: PathBuf,
    /// Serializes appends so lines from concurrent writers never interleave.
    write_lock: Mutex<()>,
}

impl AuditLogger {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Partition for an event timestamp in milliseconds.
    pub fn partition_for(&self, timestamp_ms: i64) -> Result<PathBuf, VigilError> {
        let day = DateTime::from_timestamp_millis(timestamp_ms)
            .ok_or_else(|| {
                VigilError::Internal(format!("audit timestamp out of range: {timestamp_ms}"))
            })?
            .date_naive();
        Ok(partition_path(&self.base, day))
    }

    /// Append `event` as one JSON line. Blocking; returns the file written.
    pub fn write(&self, event: &AuditEvent) -> Result<PathBuf, VigilError> {
        let path = self.partition_for(event.timestamp_ms)?;
        let mut line = serde_json::to_string(event)
            .map_err(|e| VigilError::Internal(format!("audit serialization failed: {e}")))?;
        line.push('\n');

        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(VigilError::storage)?;
        }
        let created = !path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(VigilError::storage)?;
        file.write_all(line.as_bytes()).map_err(VigilError::storage)?;

        if created {
            info!(partition = %path.display(), "audit partition created");
        }
        Ok(path)
    }

    /// Append on the blocking pool.
    ///
    /// The write runs to completion even if the returned future is dropped.
    pub async fn write_async(
        self: &Arc<Self>,
        event: AuditEvent,
    ) -> Result<PathBuf, VigilError> {
        let logger = Arc::clone(self);
        let request_id = event.request_id.clone();
        let result = tokio::task::spawn_blocking(move || logger.write(&event))
            .await
            .map_err(|e| VigilError::Internal(format!("audit task failed: {e}")))?;
        if let Err(e) = &result {
            error!(request_id = %request_id, error = %e, "audit write failed");
        }
        result
    }
}
