//! SQLite conversation repository implementation.
//!
//! Implements `ConversationRepository` from `scholar-core` using sqlx with
//! split read/write pools: raw queries, private Row structs, writes on the
//! single writer connection.

use chrono::{DateTime, Utc};
use scholar_core::conversation::repository::ConversationRepository;
use scholar_types::conversation::{Conversation, ConversationSummary, MessageRole, Mode, SubMode, Turn};
use scholar_types::error::RepositoryError;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `ConversationRepository`.
pub struct SqliteConversationRepository {
    pool: DatabasePool,
}

impl SqliteConversationRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ConversationRow {
    id: String,
    user_id: String,
    title: String,
    mode: String,
    sub_mode: Option<String>,
    active: bool,
    created_at: String,
    updated_at: String,
}

impl ConversationRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            title: row.try_get("title")?,
            mode: row.try_get("mode")?,
            sub_mode: row.try_get("sub_mode")?,
            active: row.try_get("active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_conversation(self) -> Result<Conversation, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid conversation id: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| RepositoryError::Query(format!("invalid user_id: {e}")))?;
        let mode: Mode = self.mode.parse().map_err(RepositoryError::Query)?;

        Ok(Conversation {
            id,
            user_id,
            title: self.title,
            mode,
            sub_mode: self.sub_mode.map(SubMode::from),
            active: self.active,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

struct TurnRow {
    seq: i64,
    id: String,
    conversation_id: String,
    role: String,
    content: String,
    tokens: Option<i64>,
    created_at: String,
}

impl TurnRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            seq: row.try_get("seq")?,
            id: row.try_get("id")?,
            conversation_id: row.try_get("conversation_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            tokens: row.try_get("tokens")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_turn(self) -> Result<Turn, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid turn id: {e}")))?;
        let conversation_id = Uuid::parse_str(&self.conversation_id)
            .map_err(|e| RepositoryError::Query(format!("invalid conversation_id: {e}")))?;
        let role: MessageRole = self.role.parse().map_err(RepositoryError::Query)?;
        let tokens = self
            .tokens
            .map(u32::try_from)
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("invalid token count: {e}")))?;

        Ok(Turn {
            id,
            conversation_id,
            seq: self.seq,
            role,
            content: self.content,
            tokens,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

/// Insert one turn through any executor, so the same statement serves a
/// plain append and a transaction.
async fn insert_turn<'e, E>(
    executor: E,
    conversation_id: &Uuid,
    role: MessageRole,
    content: &str,
    tokens: Option<u32>,
) -> Result<Turn, sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let id = Uuid::now_v7();
    let created_at = Utc::now();

    let result = sqlx::query(
        r#"INSERT INTO turns (id, conversation_id, role, content, tokens, created_at)
           VALUES (?, ?, ?, ?, ?, ?)"#,
    )
    .bind(id.to_string())
    .bind(conversation_id.to_string())
    .bind(role.to_string())
    .bind(content)
    .bind(tokens.map(i64::from))
    .bind(format_datetime(&created_at))
    .execute(executor)
    .await?;

    Ok(Turn {
        id,
        conversation_id: *conversation_id,
        seq: result.last_insert_rowid(),
        role,
        content: content.to_string(),
        tokens,
        created_at,
    })
}

fn map_write_error(err: sqlx::Error) -> RepositoryError {
    match err.as_database_error() {
        Some(db) if db.is_foreign_key_violation() => RepositoryError::NotFound,
        Some(db) if db.is_unique_violation() => RepositoryError::Conflict(db.message().to_string()),
        _ => RepositoryError::Query(err.to_string()),
    }
}

// ---------------------------------------------------------------------------
// ConversationRepository implementation
// ---------------------------------------------------------------------------

impl ConversationRepository for SqliteConversationRepository {
    async fn create_conversation(
        &self,
        conversation: &Conversation,
        system_turn: &str,
    ) -> Result<Conversation, RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query(
            r#"INSERT INTO conversations (id, user_id, title, mode, sub_mode, active, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(conversation.id.to_string())
        .bind(conversation.user_id.to_string())
        .bind(&conversation.title)
        .bind(conversation.mode.as_str())
        .bind(conversation.sub_mode.as_ref().map(|s| s.as_str().to_string()))
        .bind(conversation.active)
        .bind(format_datetime(&conversation.created_at))
        .bind(format_datetime(&conversation.updated_at))
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        insert_turn(&mut *tx, &conversation.id, MessageRole::System, system_turn, None)
            .await
            .map_err(map_write_error)?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(conversation.clone())
    }

    async fn get_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<Conversation>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM conversations WHERE id = ?")
            .bind(conversation_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let conversation_row = ConversationRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(conversation_row.into_conversation()?))
            }
            None => Ok(None),
        }
    }

    async fn list_conversations(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<ConversationSummary>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT c.*,
                      COUNT(t.seq) AS message_count,
                      MAX(c.updated_at, COALESCE(MAX(t.created_at), c.updated_at)) AS last_activity
               FROM conversations c
               LEFT JOIN turns t ON t.conversation_id = c.id
               WHERE c.user_id = ?
               GROUP BY c.id
               ORDER BY last_activity DESC"#,
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut summaries = Vec::with_capacity(rows.len());
        for row in &rows {
            let conversation = ConversationRow::from_row(row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?
                .into_conversation()?;
            let message_count: i64 = row
                .try_get("message_count")
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            let last_activity: String = row
                .try_get("last_activity")
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

            summaries.push(ConversationSummary {
                conversation,
                message_count: message_count as u32,
                last_activity: parse_datetime(&last_activity)?,
            });
        }

        Ok(summaries)
    }

    async fn delete_conversation(&self, conversation_id: &Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM conversations WHERE id = ?")
            .bind(conversation_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn append_turn(
        &self,
        conversation_id: &Uuid,
        role: MessageRole,
        content: &str,
        tokens: Option<u32>,
    ) -> Result<Turn, RepositoryError> {
        insert_turn(&self.pool.writer, conversation_id, role, content, tokens)
            .await
            .map_err(map_write_error)
    }

    async fn load_turns(&self, conversation_id: &Uuid) -> Result<Vec<Turn>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM turns WHERE conversation_id = ? ORDER BY seq ASC")
            .bind(conversation_id.to_string())
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut turns = Vec::with_capacity(rows.len());
        for row in &rows {
            let turn_row =
                TurnRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            turns.push(turn_row.into_turn()?);
        }

        Ok(turns)
    }

    async fn touch_conversation(
        &self,
        conversation_id: &Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE conversations SET updated_at = ? WHERE id = ?")
            .bind(format_datetime(&at))
            .bind(conversation_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
