// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection management: PRAGMA setup, WAL mode, migrations.
//!
//! All statements run on tokio-rusqlite's single background thread, which
//! serializes writers. Do not open a second connection for writes.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, info};
use vigil_core::VigilError;

use crate::migrations::run_migrations;

/// How long a statement waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Map a tokio-rusqlite error into the storage error variant.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> VigilError {
    VigilError::storage(e)
}

/// Handle to the usage database.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path` and bring the schema up to date.
    ///
    /// Missing parent directories are created.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, VigilError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(VigilError::storage)?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(VigilError::storage)?;
        let db = Self { conn };
        db.prepare(wal_mode).await?;
        info!(path, wal_mode, "usage database opened");
        Ok(db)
    }

    /// Fresh in-memory database with the schema applied. Used by tests.
    pub async fn open_in_memory() -> Result<Self, VigilError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(VigilError::storage)?;
        let db = Self { conn };
        db.prepare(false).await?;
        Ok(db)
    }

    async fn prepare(&self, wal_mode: bool) -> Result<(), VigilError> {
        self.conn
            .call(move |conn| -> Result<(), VigilError> {
                conn.busy_timeout(BUSY_TIMEOUT)
                    .map_err(VigilError::storage)?;
                if wal_mode {
                    let mode: String = conn
                        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
                        .map_err(VigilError::storage)?;
                    debug!(journal_mode = %mode, "journal mode set");
                    conn.pragma_update(None, "synchronous", "NORMAL")
                        .map_err(VigilError::storage)?;
                }
                run_migrations(conn)
            })
            .await
            .map_err(VigilError::storage)
    }

    /// The underlying async connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Current journal mode, lowercase (e.g. `wal`, `memory`).
    pub async fn journal_mode(&self) -> Result<String, VigilError> {
        self.conn
            .call(|conn| conn.pragma_query_value(None, "journal_mode", |row| row.get(0)))
            .await
            .map_err(map_tr_err)
            .map(|mode: String| mode.to_lowercase())
    }

    /// Close the connection, flushing pending work.
    pub async fn close(self) -> Result<(), VigilError> {
        self.conn.close().await.map_err(VigilError::storage)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}
