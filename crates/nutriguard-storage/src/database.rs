// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All statements are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances.

use std::time::Duration;

use nutriguard_config::model::StorageConfig;
use nutriguard_core::NutriguardError;
use tracing::debug;

/// Failure inside a `Connection::call` closure.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Migration(#[from] refinery::Error),

    /// A junction row points at a row that could not be loaded.
    #[error("{relation} references missing {entity} `{key}`")]
    Dangling {
        relation: &'static str,
        entity: &'static str,
        key: String,
    },
}

pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<QueryError>) -> NutriguardError {
    NutriguardError::Storage {
        source: Box::new(e),
    }
}

/// Extension trait for optional row queries.
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error>;
}

impl<T> OptionalExt<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Handle to the inventory database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open the database described by `config`, apply PRAGMAs and run
    /// pending migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, NutriguardError> {
        let conn = if config.is_in_memory() {
            tokio_rusqlite::Connection::open_in_memory().await
        } else {
            if let Some(parent) = std::path::Path::new(&config.database_path).parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent).map_err(NutriguardError::storage)?;
            }
            tokio_rusqlite::Connection::open(&config.database_path).await
        }
        .map_err(NutriguardError::storage)?;

        let wal_mode = config.wal_mode && !config.is_in_memory();
        let busy_timeout = Duration::from_millis(config.busy_timeout_ms);
        conn.call(move |conn| -> Result<(), QueryError> {
            conn.pragma_update(None, "foreign_keys", true)?;
            conn.busy_timeout(busy_timeout)?;
            if wal_mode {
                let mode: String =
                    conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
                debug!(journal_mode = %mode, "journal mode set");
            }
            crate::migrations::run_migrations(conn)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path = %config.database_path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// Open a private in-memory database with the full schema.
    pub async fn open_in_memory() -> Result<Self, NutriguardError> {
        Self::open(&StorageConfig::in_memory()).await
    }

    /// The underlying serialized connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), NutriguardError> {
        self.conn
            .call(|conn| -> Result<(), QueryError> {
                conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn file_config(path: &std::path::Path) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string_lossy().into_owned(),
            wal_mode: true,
            busy_timeout_ms: 1_000,
        }
    }

    async fn table_names(db: &Database) -> Vec<String> {
        db.connection()
            .call(|conn| -> Result<Vec<String>, QueryError> {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                )?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn open_creates_schema() {
        let db = Database::open_in_memory().await.unwrap();
        let tables = table_names(&db).await;
        for table in [
            "cart",
            "cart_items",
            "fooditem",
            "group_members",
            "groups",
            "user_friends",
            "userprofile",
        ] {
            assert!(tables.iter().any(|t| t == table), "missing table {table}");
        }
    }

    #[tokio::test]
    async fn open_enables_foreign_keys() {
        let db = Database::open_in_memory().await.unwrap();
        let enabled: i64 = db
            .connection()
            .call(|conn| -> Result<i64, QueryError> {
                Ok(conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?)
            })
            .await
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[tokio::test]
    async fn file_database_uses_wal_and_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("inventory.db");
        let config = file_config(&path);

        let db = Database::open(&config).await.unwrap();
        let mode: String = db
            .connection()
            .call(|conn| -> Result<String, QueryError> {
                Ok(conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?)
            })
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
        db.checkpoint().await.unwrap();
        drop(db);

        // Migrations are idempotent on reopen.
        let reopened = Database::open(&config).await.unwrap();
        assert!(table_names(&reopened).await.contains(&"cart".to_string()));
        assert!(path.exists());
    }
}
