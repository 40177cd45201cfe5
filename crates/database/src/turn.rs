//! Conversation turns stored in the `messages` table.

use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::{Role, Turn, TurnContent};
use crate::time::now_iso;

/// Whether `chat_id` exists and belongs to `user_id`.
pub async fn chat_owned_by(conn: &mut SqliteConnection, chat_id: &str, user_id: &str) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT 1 FROM chats
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(chat_id)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(found.is_some())
}

/// Append a turn to a conversation.
pub async fn append_turn(
    conn: &mut SqliteConnection,
    chat_id: &str,
    user_id: &str,
    role: Role,
    content: &TurnContent,
) -> Result<Turn> {
    let id = Uuid::new_v4().to_string();
    let created_at = now_iso();
    let encoded = serde_json::to_string(content)
        .map_err(|e| DatabaseError::Validation(format!("unencodable turn content: {e}")))?;

    sqlx::query(
        r#"
        INSERT INTO messages (id, chat_id, user_id, role, content, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(chat_id)
    .bind(user_id)
    .bind(role.as_str())
    .bind(&encoded)
    .bind(&created_at)
    .execute(&mut *conn)
    .await
    .map_err(DatabaseError::from_statement)?;

    Ok(Turn {
        id,
        chat_id: Some(chat_id.to_string()),
        user_id: user_id.to_string(),
        role,
        content: content.clone(),
        created_at,
    })
}
