use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Binary};
use diesel::sqlite::SqliteConnection;

use crate::config::Limits;
use crate::error::{ChatQueueError, Result};
use crate::interfaces::store::MessageBoxStore;
use crate::queue::MessageQueue;

#[derive(QueryableByName)]
struct BoxRow {
    #[diesel(sql_type = Binary)]
    queue: Vec<u8>,
}

/// Message boxes kept as persistence-stream BLOBs in a SQLite table.
#[derive(Debug, Clone)]
pub struct SqliteMessageBoxStore {
    db_path: PathBuf,
    limits: Limits,
}

impl SqliteMessageBoxStore {
    pub fn new<P: Into<PathBuf>>(db_path: P, limits: Limits) -> Self {
        Self {
            db_path: db_path.into(),
            limits,
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Path) -> Result<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || f(&db_path))
            .await
            .map_err(|e| ChatQueueError::Storage(e.to_string()))?
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn open_conn(db_path: &Path) -> Result<SqliteConnection> {
    ensure_parent_dir(db_path)?;
    let url = db_path
        .to_str()
        .ok_or_else(|| ChatQueueError::Storage(format!("non-utf8 path {}", db_path.display())))?;
    let mut conn =
        SqliteConnection::establish(url).map_err(|e| ChatQueueError::Storage(e.to_string()))?;
    ensure_table(&mut conn)?;
    Ok(conn)
}

fn ensure_table(conn: &mut SqliteConnection) -> Result<()> {
    diesel::sql_query(
        "CREATE TABLE IF NOT EXISTS message_boxes (
            chat_id INTEGER PRIMARY KEY,
            queue BLOB NOT NULL,
            updated_at INTEGER NOT NULL
        )",
    )
    .execute(conn)
    .map_err(|e| ChatQueueError::Storage(e.to_string()))?;
    Ok(())
}

fn now_secs() -> Result<i64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| ChatQueueError::Storage(e.to_string()))?
        .as_secs() as i64)
}

fn load_blob(db_path: &Path, chat_id: u32) -> Result<Option<Vec<u8>>> {
    let mut conn = open_conn(db_path)?;
    let row: Option<BoxRow> =
        diesel::sql_query("SELECT queue FROM message_boxes WHERE chat_id = ?1")
            .bind::<BigInt, _>(i64::from(chat_id))
            .get_result(&mut conn)
            .optional()
            .map_err(|e| ChatQueueError::Storage(e.to_string()))?;
    Ok(row.map(|r| r.queue))
}

fn store_blob(db_path: &Path, chat_id: u32, blob: Vec<u8>) -> Result<()> {
    let mut conn = open_conn(db_path)?;
    let ts = now_secs()?;
    diesel::sql_query(
        "INSERT INTO message_boxes (chat_id, queue, updated_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(chat_id) DO UPDATE SET queue = excluded.queue, updated_at = excluded.updated_at",
    )
    .bind::<BigInt, _>(i64::from(chat_id))
    .bind::<Binary, _>(blob)
    .bind::<BigInt, _>(ts)
    .execute(&mut conn)
    .map_err(|e| ChatQueueError::Storage(e.to_string()))?;
    Ok(())
}

fn delete_blob(db_path: &Path, chat_id: u32) -> Result<bool> {
    let mut conn = open_conn(db_path)?;
    let affected = diesel::sql_query("DELETE FROM message_boxes WHERE chat_id = ?1")
        .bind::<BigInt, _>(i64::from(chat_id))
        .execute(&mut conn)
        .map_err(|e| ChatQueueError::Storage(e.to_string()))?;
    Ok(affected > 0)
}

#[async_trait]
impl MessageBoxStore for SqliteMessageBoxStore {
    fn limits(&self) -> &Limits {
        &self.limits
    }

    async fn load(&self, chat_id: u32) -> Result<Option<MessageQueue>> {
        let blob = self
            .blocking(move |path| load_blob(path, chat_id))
            .await?;
        match blob {
            Some(bytes) => Ok(Some(MessageQueue::from_bytes(&bytes, &self.limits)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, queue: &MessageQueue) -> Result<()> {
        let chat_id = queue.chat_id();
        let blob = queue.to_bytes();
        self.blocking(move |path| store_blob(path, chat_id, blob))
            .await?;
        tracing::info!(chat_id, len = queue.len(), "message box saved");
        Ok(())
    }

    async fn remove(&self, chat_id: u32) -> Result<bool> {
        let existed = self
            .blocking(move |path| delete_blob(path, chat_id))
            .await?;
        if existed {
            tracing::info!(chat_id, "message box removed");
        }
        Ok(existed)
    }
}
