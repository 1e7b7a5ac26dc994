use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::StoreError;

use super::data_dir;

/// SQLite-backed key-value store.
///
/// rusqlite is synchronous; individual kv operations are short enough to run
/// inline under the connection mutex rather than hopping to a blocking pool.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (and initialize) a store at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open the store at its default location under the data directory.
    pub fn open_default() -> Result<Self, StoreError> {
        let path = default_path().map_err(|err| StoreError::QueryFailed(err.to_string()))?;
        Self::open(&path)
    }
}

fn default_path() -> std::io::Result<PathBuf> {
    Ok(data_dir()?.join("store.db"))
}

#[async_trait]
impl super::KvStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let conn = self.conn.lock().await;
        let raw: Option<String> = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        match raw {
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|err| StoreError::MalformedValue {
                    key: key.to_string(),
                    message: err.to_string(),
                }),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let text = serde_json::to_string(&value).map_err(|err| StoreError::MalformedValue {
            key: key.to_string(),
            message: err.to_string(),
        })?;
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, text],
        )?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::KvStore;
    use serde_json::json;

    #[tokio::test]
    async fn sqlite_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("store.db")).unwrap();

        assert!(store.get("missing").await.unwrap().is_none());

        store.set("list", json!([1, 2, 3])).await.unwrap();
        assert_eq!(store.get("list").await.unwrap(), Some(json!([1, 2, 3])));

        store.set("list", json!([4])).await.unwrap();
        assert_eq!(store.get("list").await.unwrap(), Some(json!([4])));

        store.remove("list").await.unwrap();
        assert!(store.get("list").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.set("flag", json!(true)).await.unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get("flag").await.unwrap(), Some(json!(true)));
    }
}
