//! SQLite session-log backend.
//!
//! A single-file (or in-memory) append-only message log for single-node
//! deployments and tests. Timestamps are stored as RFC 3339 text.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use talentscout_core::capabilities::SessionStore;
use talentscout_core::error::StoreError;
use talentscout_core::message::{Message, Role, SessionId};
use tracing::{debug, info};

/// Session log over a SQLite database.
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    /// Open (creating if missing) a SQLite database at `path`.
    ///
    /// Pass `"sqlite::memory:"` for an ephemeral in-process database.
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::Connection(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite session store initialized at {path}");
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chat_messages (
                id         TEXT PRIMARY KEY,
                session_id TEXT NOT NULL,
                role       TEXT NOT NULL,
                content    TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::WriteFailed(format!("chat_messages table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_chat_messages_session ON chat_messages(session_id, created_at)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::WriteFailed(format!("session index: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn load_history(&self, session_id: &SessionId) -> Result<Vec<Message>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, role, content, created_at
            FROM chat_messages
            WHERE session_id = ?1
            ORDER BY created_at, rowid
            "#,
        )
        .bind(&session_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        rows.into_iter()
            .map(|row| {
                let role: String = row.get("role");
                let role: Role = role
                    .parse()
                    .map_err(|e: String| StoreError::QueryFailed(e))?;
                let created_at_str: String = row.get("created_at");
                let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| StoreError::QueryFailed(format!("created_at column: {e}")))?;
                Ok(Message {
                    id: row.get("id"),
                    role,
                    content: row.get("content"),
                    created_at,
                })
            })
            .collect()
    }

    async fn append_message(
        &self,
        session_id: &SessionId,
        message: &Message,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO chat_messages (id, session_id, role, content, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&message.id)
        .bind(&session_id.0)
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(message.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> SqliteSessionStore {
        SqliteSessionStore::new("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn unknown_session_is_empty_not_an_error() {
        let store = test_store().await;
        let history = store
            .load_history(&SessionId::from("never-seen"))
            .await
            .unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn append_then_load_preserves_insertion_order() {
        let store = test_store().await;
        let session = SessionId::new();

        store
            .append_message(&session, &Message::user("find rust engineers"))
            .await
            .unwrap();
        store
            .append_message(&session, &Message::assistant("I found two candidates"))
            .await
            .unwrap();
        store
            .append_message(&session, &Message::user("only in Berlin please"))
            .await
            .unwrap();

        let history = store.load_history(&session).await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].content, "find rust engineers");
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[2].content, "only in Berlin please");
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = test_store().await;
        let a = SessionId::new();
        let b = SessionId::new();

        store
            .append_message(&a, &Message::user("session a"))
            .await
            .unwrap();
        store
            .append_message(&b, &Message::user("session b"))
            .await
            .unwrap();

        let history_a = store.load_history(&a).await.unwrap();
        assert_eq!(history_a.len(), 1);
        assert_eq!(history_a[0].content, "session a");
    }

    #[tokio::test]
    async fn duplicate_message_id_fails_atomically() {
        let store = test_store().await;
        let session = SessionId::new();
        let msg = Message::user("once");

        store.append_message(&session, &msg).await.unwrap();
        let err = store.append_message(&session, &msg).await.unwrap_err();
        assert!(matches!(err, StoreError::WriteFailed(_)));

        // The failed append left no partial state behind.
        assert_eq!(store.load_history(&session).await.unwrap().len(), 1);
    }
}
