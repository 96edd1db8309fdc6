//! `SQLite` session store.

use chrono::Utc;
use rusqlite::OptionalExtension;
use serde_json::Value;
use tokio_rusqlite::Connection;

use crate::core::config::StorageConfig;
use crate::core::errors::{ChatError, ChatResult};
use crate::core::ids::SessionId;
use crate::session::store::{SessionStore, StoreFuture};

/// `SQLite` implementation of the session store. Values are kept as JSON text,
/// one row per `(session_id, key)`.
pub struct SqliteSessionStore {
    conn: Connection,
    table: String,
}

impl SqliteSessionStore {
    /// Open (or create) the store described by `config`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub async fn new(config: &StorageConfig) -> ChatResult<Self> {
        let conn = Connection::open(&config.sqlite_path).await?;
        Self::with_connection(conn, &config.table).await
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    /// Returns an error if the database cannot be created.
    pub async fn in_memory(table: &str) -> ChatResult<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::with_connection(conn, table).await
    }

    async fn with_connection(conn: Connection, table: &str) -> ChatResult<Self> {
        if table.is_empty() || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ChatError::InvalidConfig(format!(
                "invalid table name `{table}`"
            )));
        }
        let table = table.to_string();
        let table_name = table.clone();

        conn.call(move |conn| {
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {table_name} (
                    session_id TEXT NOT NULL,
                    key TEXT NOT NULL,
                    value TEXT NOT NULL,
                    updated_at INTEGER NOT NULL,
                    PRIMARY KEY (session_id, key)
                )"
            ))?;
            Ok(())
        })
        .await?;

        Ok(Self { conn, table })
    }
}

impl SessionStore for SqliteSessionStore {
    fn get<'a>(
        &'a self,
        session: &'a SessionId,
        key: &'a str,
    ) -> StoreFuture<'a, ChatResult<Option<Value>>> {
        Box::pin(async move {
            let table = self.table.clone();
            let session = session.to_string();
            let key = key.to_string();
            let raw = self
                .conn
                .call(move |conn| {
                    let row = conn
                        .query_row(
                            &format!("SELECT value FROM {table} WHERE session_id = ?1 AND key = ?2"),
                            rusqlite::params![session, key],
                            |row| row.get::<_, String>(0),
                        )
                        .optional()?;
                    Ok(row)
                })
                .await?;

            match raw {
                Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
                None => Ok(None),
            }
        })
    }

    fn put<'a>(
        &'a self,
        session: &'a SessionId,
        key: &'a str,
        value: Value,
    ) -> StoreFuture<'a, ChatResult<()>> {
        Box::pin(async move {
            let table = self.table.clone();
            let session = session.to_string();
            let key = key.to_string();
            let raw = serde_json::to_string(&value)?;
            let updated_at = Utc::now().timestamp_millis();

            self.conn
                .call(move |conn| {
                    conn.execute(
                        &format!(
                            "INSERT OR REPLACE INTO {table} (session_id, key, value, updated_at)
                             VALUES (?1, ?2, ?3, ?4)"
                        ),
                        rusqlite::params![session, key, raw, updated_at],
                    )?;
                    Ok(())
                })
                .await?;
            Ok(())
        })
    }
}
