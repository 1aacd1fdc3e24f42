//! Listener sessions
//!
//! One row per browser session. Tokens are absent until the OAuth callback
//! succeeds and are cleared again when a refresh fails. All timestamps are
//! Unix epoch milliseconds.

use chrono::Utc;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;
use wmood_common::Result;

use crate::services::TokenSet;

/// Session lifetime
pub const SESSION_TTL_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Session {
    pub session_id: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_expires_at: Option<i64>,
    pub created_at: i64,
    pub expires_at: i64,
}

impl Session {
    /// Tokens, if the listener is logged in
    pub fn tokens(&self) -> Option<TokenSet> {
        let access_token = self.access_token.clone()?;
        Some(TokenSet {
            access_token,
            refresh_token: self.refresh_token.clone(),
            expires_at_ms: self.token_expires_at.unwrap_or(0),
        })
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Start a new session holding `tokens`
pub async fn create_session(pool: &SqlitePool, tokens: &TokenSet) -> Result<Session> {
    let now = now_ms();
    let session = Session {
        session_id: Uuid::new_v4().to_string(),
        access_token: Some(tokens.access_token.clone()),
        refresh_token: tokens.refresh_token.clone(),
        token_expires_at: Some(tokens.expires_at_ms),
        created_at: now,
        expires_at: now + SESSION_TTL_MS,
    };

    sqlx::query(
        r#"
        INSERT INTO sessions
            (session_id, access_token, refresh_token, token_expires_at, created_at, expires_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&session.session_id)
    .bind(&session.access_token)
    .bind(&session.refresh_token)
    .bind(session.token_expires_at)
    .bind(session.created_at)
    .bind(session.expires_at)
    .execute(pool)
    .await?;

    Ok(session)
}

/// Load a live session; expired rows read as absent
pub async fn load_session(pool: &SqlitePool, session_id: &str) -> Result<Option<Session>> {
    let session = sqlx::query_as::<_, Session>(
        r#"
        SELECT session_id, access_token, refresh_token, token_expires_at, created_at, expires_at
        FROM sessions
        WHERE session_id = ? AND expires_at > ?
        "#,
    )
    .bind(session_id)
    .bind(now_ms())
    .fetch_optional(pool)
    .await?;

    Ok(session)
}

pub async fn update_tokens(pool: &SqlitePool, session_id: &str, tokens: &TokenSet) -> Result<()> {
    sqlx::query(
        "UPDATE sessions SET access_token = ?, refresh_token = ?, token_expires_at = ? WHERE session_id = ?",
    )
    .bind(&tokens.access_token)
    .bind(&tokens.refresh_token)
    .bind(tokens.expires_at_ms)
    .bind(session_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Forget the tokens but keep the session row
pub async fn clear_tokens(pool: &SqlitePool, session_id: &str) -> Result<()> {
    sqlx::query(
        "UPDATE sessions SET access_token = NULL, refresh_token = NULL, token_expires_at = NULL WHERE session_id = ?",
    )
    .bind(session_id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete_session(pool: &SqlitePool, session_id: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE session_id = ?")
        .bind(session_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Remove expired sessions, returning how many were deleted
pub async fn purge_expired(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(now_ms())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::create_schema(&pool).await.unwrap();
        pool
    }

    fn tokens() -> TokenSet {
        TokenSet {
            access_token: "access-1".to_string(),
            refresh_token: Some("refresh-1".to_string()),
            expires_at_ms: now_ms() + 3_600_000,
        }
    }

    #[tokio::test]
    async fn test_create_and_load() {
        let pool = setup_pool().await;
        let created = create_session(&pool, &tokens()).await.unwrap();

        let loaded = load_session(&pool, &created.session_id).await.unwrap();
        assert_eq!(loaded, Some(created.clone()));
        assert_eq!(created.expires_at - created.created_at, SESSION_TTL_MS);
        assert_eq!(loaded.unwrap().tokens().unwrap().access_token, "access-1");
    }

    #[tokio::test]
    async fn test_unknown_session_is_none() {
        let pool = setup_pool().await;
        assert!(load_session(&pool, "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_and_clear_tokens() {
        let pool = setup_pool().await;
        let session = create_session(&pool, &tokens()).await.unwrap();

        let refreshed = TokenSet {
            access_token: "access-2".to_string(),
            refresh_token: Some("refresh-1".to_string()),
            expires_at_ms: now_ms() + 7_200_000,
        };
        update_tokens(&pool, &session.session_id, &refreshed).await.unwrap();

        let loaded = load_session(&pool, &session.session_id).await.unwrap().unwrap();
        assert_eq!(loaded.tokens(), Some(refreshed));

        clear_tokens(&pool, &session.session_id).await.unwrap();
        let loaded = load_session(&pool, &session.session_id).await.unwrap().unwrap();
        assert!(loaded.tokens().is_none());
    }

    #[tokio::test]
    async fn test_expired_sessions_hidden_and_purged() {
        let pool = setup_pool().await;
        let live = create_session(&pool, &tokens()).await.unwrap();
        let stale = create_session(&pool, &tokens()).await.unwrap();

        sqlx::query("UPDATE sessions SET expires_at = ? WHERE session_id = ?")
            .bind(now_ms() - 1)
            .bind(&stale.session_id)
            .execute(&pool)
            .await
            .unwrap();

        assert!(load_session(&pool, &stale.session_id).await.unwrap().is_none());
        assert_eq!(purge_expired(&pool).await.unwrap(), 1);
        assert!(load_session(&pool, &live.session_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_session() {
        let pool = setup_pool().await;
        let session = create_session(&pool, &tokens()).await.unwrap();

        delete_session(&pool, &session.session_id).await.unwrap();
        assert!(load_session(&pool, &session.session_id).await.unwrap().is_none());
    }
}
