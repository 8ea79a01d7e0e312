// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use std::path::Path;
use std::time::Duration;

use farebot_core::FarebotError;
use tokio_rusqlite::Connection;
use tracing::{debug, warn};

/// Handle to the single SQLite connection. Query modules accept `&Database`
/// and go through [`Database::connection`].
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path` and bring its schema
    /// up to date. Pass `":memory:"` for an in-memory database.
    ///
    /// An unreadable on-disk file is moved aside to `<path>.corrupt` and the
    /// database is recreated empty, so a damaged file never blocks startup.
    pub async fn open(path: &str) -> Result<Self, FarebotError> {
        if path != ":memory:" {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| FarebotError::Storage {
                        source: Box::new(e),
                    })?;
                }
            }
        }

        match Self::try_open(path).await {
            Ok(db) => Ok(db),
            Err(e) if path != ":memory:" && Path::new(path).exists() => {
                warn!(path, error = %e, "unreadable database file, moving it aside");
                move_aside(path)?;
                Self::try_open(path).await
            }
            Err(e) => Err(e),
        }
    }

    async fn try_open(path: &str) -> Result<Self, FarebotError> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| FarebotError::Storage {
                source: Box::new(e),
            })?;

        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.busy_timeout(Duration::from_millis(5000))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| crate::migrations::run_migrations(conn))
            .await
            .map_err(|e| FarebotError::Storage {
                source: Box::new(e),
            })?;

        debug!(path, "database opened");
        Ok(Self { conn })
    }

    /// The underlying single-writer connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Flush and close the connection.
    pub async fn close(self) -> Result<(), FarebotError> {
        self.conn.close().await.map_err(map_tr_err)
    }
}

/// Rename a damaged database file to `<path>.corrupt` (overwriting any
/// previous one) and drop its WAL sidecar files.
fn move_aside(path: &str) -> Result<(), FarebotError> {
    std::fs::rename(path, format!("{path}.corrupt")).map_err(|e| FarebotError::Storage {
        source: Box::new(e),
    })?;
    for suffix in ["-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{path}{suffix}"));
    }
    Ok(())
}

/// Lift a tokio-rusqlite error into the crate-wide error type.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> FarebotError {
    FarebotError::Storage {
        source: Box::new(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested/deeper/farebot.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        assert!(db_path.exists());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopen_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("farebot.db");
        let path = db_path.to_str().unwrap();

        let db = Database::open(path).await.unwrap();
        db.close().await.unwrap();

        // Migrations must not re-run destructively.
        let db = Database::open(path).await.unwrap();
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_file_is_moved_aside_and_replaced() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("farebot.db");
        let path = db_path.to_str().unwrap();
        std::fs::write(&db_path, b"this is not a sqlite database").unwrap();

        let db = Database::open(path).await.unwrap();
        db.close().await.unwrap();

        let backup = dir.path().join("farebot.db.corrupt");
        assert!(backup.exists());
        assert_eq!(
            std::fs::read(backup).unwrap(),
            b"this is not a sqlite database"
        );

        // The replacement is a real, migrated database.
        let db = Database::open(path).await.unwrap();
        db.close().await.unwrap();
    }
}
