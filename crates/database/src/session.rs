//! Opaque session tokens.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::Principal;
use crate::Result;

/// Open a session for a user and return its token.
pub async fn create_session(pool: &SqlitePool, user_id: &str) -> Result<String> {
    let token = Uuid::new_v4().simple().to_string();

    sqlx::query(
        r#"
        INSERT INTO sessions (token, user_id)
        VALUES (?, ?)
        "#,
    )
    .bind(&token)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(token)
}

/// Resolve a token to the principal it was issued for.
pub async fn resolve(pool: &SqlitePool, token: &str) -> Result<Option<Principal>> {
    let principal = sqlx::query_as::<_, Principal>(
        r#"
        SELECT u.id, u.email
        FROM sessions s
        INNER JOIN users u ON u.id = s.user_id
        WHERE s.token = ?
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(principal)
}

/// Revoke a session. Returns true if a session was removed.
pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM sessions
        WHERE token = ?
        "#,
    )
    .bind(token)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_db, test_user};

    #[tokio::test]
    async fn test_session_lifecycle() {
        let db = test_db().await;
        let principal = test_user(&db, "alice@example.com").await;

        let token = create_session(db.pool(), &principal.id).await.unwrap();
        let resolved = resolve(db.pool(), &token).await.unwrap();
        assert_eq!(resolved, Some(principal));

        assert!(delete_session(db.pool(), &token).await.unwrap());
        assert!(resolve(db.pool(), &token).await.unwrap().is_none());
        assert!(!delete_session(db.pool(), &token).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let db = test_db().await;
        assert!(resolve(db.pool(), "nope").await.unwrap().is_none());
    }
}
