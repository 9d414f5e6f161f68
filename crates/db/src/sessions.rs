//! Chat session and message queries.
//!
//! Every function takes any SQLite executor, so callers can run them
//! against the pool or inside a transaction.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqliteExecutor};

use crate::models::{ChatMessage, ChatSession, MessageBy};

/// Look up a session by its public id, including soft-deleted sessions.
pub async fn find_session<'e, E>(executor: E, session_id: &str) -> Result<Option<ChatSession>>
where
    E: SqliteExecutor<'e>,
{
    let session = sqlx::query_as::<_, ChatSession>(
        "SELECT * FROM chat_sessions WHERE session_id = ?",
    )
    .bind(session_id)
    .fetch_optional(executor)
    .await?;

    Ok(session)
}

/// Insert a new active session unless one with `session_id` already exists.
///
/// # Returns
/// The session and whether this call created it. A concurrent request that
/// created the same id first is returned with `false`.
pub async fn get_or_create_session(
    conn: &mut SqliteConnection,
    session_id: &str,
    label: &str,
    now: DateTime<Utc>,
) -> Result<(ChatSession, bool)> {
    let inserted = sqlx::query_as::<_, ChatSession>(
        r#"
        INSERT INTO chat_sessions (
            session_id, label, last_interaction, is_active, is_deleted,
            created_at, updated_at
        ) VALUES (?, ?, ?, 1, 0, ?, ?)
        ON CONFLICT(session_id) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(session_id)
    .bind(label)
    .bind(now)
    .bind(now)
    .bind(now)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(session) = inserted {
        return Ok((session, true));
    }

    let existing = find_session(&mut *conn, session_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("session {} vanished after insert conflict", session_id))?;
    Ok((existing, false))
}

/// Record an interaction on the session.
pub async fn touch_session<'e, E>(executor: E, id: i64, now: DateTime<Utc>) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("UPDATE chat_sessions SET last_interaction = ?, updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(executor)
        .await?;

    Ok(())
}

/// Sessions that have not been deleted, newest first.
pub async fn list_sessions<'e, E>(executor: E) -> Result<Vec<ChatSession>>
where
    E: SqliteExecutor<'e>,
{
    let sessions = sqlx::query_as::<_, ChatSession>(
        "SELECT * FROM chat_sessions WHERE is_deleted = 0 ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(executor)
    .await?;

    Ok(sessions)
}

/// Mark a session as deleted.
///
/// # Returns
/// `false` when no live session has that id.
pub async fn soft_delete_session<'e, E>(
    executor: E,
    session_id: &str,
    now: DateTime<Utc>,
) -> Result<bool>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE chat_sessions
        SET is_deleted = 1, is_active = 0, deleted_at = ?, updated_at = ?
        WHERE session_id = ? AND is_deleted = 0
        "#,
    )
    .bind(now)
    .bind(now)
    .bind(session_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Append a message to a session.
pub async fn insert_message<'e, E>(
    executor: E,
    session_row_id: i64,
    message_by: MessageBy,
    message: &str,
    now: DateTime<Utc>,
) -> Result<ChatMessage>
where
    E: SqliteExecutor<'e>,
{
    let message = sqlx::query_as::<_, ChatMessage>(
        r#"
        INSERT INTO chat_messages (session_id, message_by, message, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(session_row_id)
    .bind(message_by)
    .bind(message)
    .bind(now)
    .bind(now)
    .fetch_one(executor)
    .await?;

    Ok(message)
}

/// All messages of a session, oldest first.
pub async fn session_messages<'e, E>(executor: E, session_row_id: i64) -> Result<Vec<ChatMessage>>
where
    E: SqliteExecutor<'e>,
{
    let messages = sqlx::query_as::<_, ChatMessage>(
        "SELECT * FROM chat_messages WHERE session_id = ? ORDER BY created_at ASC, id ASC",
    )
    .bind(session_row_id)
    .fetch_all(executor)
    .await?;

    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbPool;
    use chrono::Duration;

    async fn setup() -> DbPool {
        let db = DbPool::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    async fn create_session(db: &DbPool, session_id: &str, label: &str, now: DateTime<Utc>) -> Result<ChatSession> {
        let mut conn = db.pool().acquire().await?;
        let (session, created) = get_or_create_session(&mut conn, session_id, label, now).await?;
        assert!(created);
        Ok(session)
    }

    #[tokio::test]
    async fn test_create_and_find_session() {
        let db = setup().await;
        let now = Utc::now();

        let created = create_session(&db, "abc", "What is LBW?", now).await.unwrap();
        assert_eq!(created.session_id, "abc");
        assert_eq!(created.label, "What is LBW?");
        assert!(created.is_active);
        assert!(!created.is_deleted);

        let found = find_session(db.pool(), "abc").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(find_session(db.pool(), "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_or_create_session_reuses_existing_row() {
        let db = setup().await;
        let now = Utc::now();
        let mut conn = db.pool().acquire().await.unwrap();

        let (first, created) = get_or_create_session(&mut conn, "shared", "first", now)
            .await
            .unwrap();
        assert!(created);

        let (second, created) = get_or_create_session(&mut conn, "shared", "second", now)
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(second.id, first.id);
        assert_eq!(second.label, "first");
    }

    #[tokio::test]
    async fn test_messages_are_ordered_oldest_first() {
        let db = setup().await;
        let now = Utc::now();
        let session = create_session(&db, "s1", "hi", now).await.unwrap();

        insert_message(db.pool(), session.id, MessageBy::User, "hi", now).await.unwrap();
        insert_message(db.pool(), session.id, MessageBy::Assistant, "hello", now).await.unwrap();
        insert_message(
            db.pool(),
            session.id,
            MessageBy::User,
            "how are you",
            now + Duration::seconds(1),
        )
        .await
        .unwrap();

        let messages = session_messages(db.pool(), session.id).await.unwrap();
        let texts: Vec<_> = messages.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(texts, vec!["hi", "hello", "how are you"]);
        assert_eq!(messages[1].message_by, MessageBy::Assistant);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_session_from_listing() {
        let db = setup().await;
        let now = Utc::now();
        create_session(&db, "old", "a", now).await.unwrap();
        create_session(&db, "new", "b", now + Duration::seconds(5)).await.unwrap();

        let listed = list_sessions(db.pool()).await.unwrap();
        assert_eq!(listed[0].session_id, "new");
        assert_eq!(listed[1].session_id, "old");

        assert!(soft_delete_session(db.pool(), "old", now).await.unwrap());
        assert!(!soft_delete_session(db.pool(), "old", now).await.unwrap());

        let listed = list_sessions(db.pool()).await.unwrap();
        assert_eq!(listed.len(), 1);

        let deleted = find_session(db.pool(), "old").await.unwrap().unwrap();
        assert!(deleted.is_deleted);
        assert!(deleted.deleted_at.is_some());
    }

    #[tokio::test]
    async fn test_touch_session_updates_last_interaction() {
        let db = setup().await;
        let now = Utc::now();
        let session = create_session(&db, "t", "x", now).await.unwrap();

        let later = now + Duration::minutes(3);
        touch_session(db.pool(), session.id, later).await.unwrap();

        let found = find_session(db.pool(), "t").await.unwrap().unwrap();
        assert_eq!(found.last_interaction.timestamp(), later.timestamp());
    }

    #[tokio::test]
    async fn test_deleting_session_row_cascades_to_messages() {
        let db = setup().await;
        let now = Utc::now();
        let session = create_session(&db, "c", "x", now).await.unwrap();
        insert_message(db.pool(), session.id, MessageBy::User, "x", now).await.unwrap();

        sqlx::query("DELETE FROM chat_sessions WHERE id = ?")
            .bind(session.id)
            .execute(db.pool())
            .await
            .unwrap();

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chat_messages")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }
}
