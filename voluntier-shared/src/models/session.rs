/// Login session model and database operations
///
/// Sessions are server-side: the browser holds a random token in a cookie and
/// only its SHA-256 digest is stored here, so a leaked table cannot be replayed.
/// Deleting the row logs the session out.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE sessions (
///     token_hash TEXT PRIMARY KEY NOT NULL,
///     user_id BLOB NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     persistent INTEGER NOT NULL DEFAULT 0,
///     created_at TEXT NOT NULL,
///     expires_at TEXT NOT NULL
/// );
/// ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    /// SHA-256 hex digest of the cookie token
    pub token_hash: String,

    pub user_id: Uuid,

    /// Whether the session survives browser restarts ("remember me")
    pub persistent: bool,

    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateSession {
    pub token_hash: String,
    pub user_id: Uuid,
    pub persistent: bool,
    pub ttl: Duration,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    pub async fn create(pool: &SqlitePool, data: CreateSession) -> Result<Self, sqlx::Error> {
        let now = Utc::now();

        sqlx::query_as::<_, Session>(
            "INSERT INTO sessions (token_hash, user_id, persistent, created_at, expires_at)
             VALUES (?, ?, ?, ?, ?)
             RETURNING token_hash, user_id, persistent, created_at, expires_at",
        )
        .bind(data.token_hash)
        .bind(data.user_id)
        .bind(data.persistent)
        .bind(now)
        .bind(now + data.ttl)
        .fetch_one(pool)
        .await
    }

    /// Finds an unexpired session by token digest
    ///
    /// Expired rows are removed on sight and reported as missing.
    pub async fn find_active(
        pool: &SqlitePool,
        token_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT token_hash, user_id, persistent, created_at, expires_at
             FROM sessions
             WHERE token_hash = ?",
        )
        .bind(token_hash)
        .fetch_optional(pool)
        .await?;

        match session {
            Some(session) if session.is_expired() => {
                debug!(user_id = %session.user_id, "Discarding expired session");
                Self::delete(pool, token_hash).await?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    /// Returns true if a session was deleted
    pub async fn delete(pool: &SqlitePool, token_hash: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(token_hash)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes every expired session, returning how many were purged
    pub async fn delete_expired(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
        let sessions = sqlx::query_as::<_, Session>(
            "SELECT token_hash, user_id, persistent, created_at, expires_at FROM sessions",
        )
        .fetch_all(pool)
        .await?;

        let mut purged = 0;
        for session in sessions.iter().filter(|s| s.is_expired()) {
            if Self::delete(pool, &session.token_hash).await? {
                purged += 1;
            }
        }

        Ok(purged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{test_pool, test_user};

    #[tokio::test]
    async fn test_active_session_round_trip() {
        let pool = test_pool().await;
        let user = test_user(&pool, "alice").await;

        Session::create(
            &pool,
            CreateSession {
                token_hash: "digest".to_string(),
                user_id: user.id,
                persistent: true,
                ttl: Duration::days(30),
            },
        )
        .await
        .unwrap();

        let found = Session::find_active(&pool, "digest").await.unwrap().unwrap();
        assert_eq!(found.user_id, user.id);
        assert!(found.persistent);

        assert!(Session::delete(&pool, "digest").await.unwrap());
        assert!(Session::find_active(&pool, "digest").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_not_active() {
        let pool = test_pool().await;
        let user = test_user(&pool, "alice").await;

        Session::create(
            &pool,
            CreateSession {
                token_hash: "stale".to_string(),
                user_id: user.id,
                persistent: false,
                ttl: Duration::seconds(-1),
            },
        )
        .await
        .unwrap();

        assert!(Session::find_active(&pool, "stale").await.unwrap().is_none());
        assert_eq!(Session::delete_expired(&pool).await.unwrap(), 0);
    }
}
