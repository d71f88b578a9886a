/// User model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BLOB PRIMARY KEY NOT NULL,
///     username TEXT NOT NULL UNIQUE,
///     email TEXT NOT NULL UNIQUE COLLATE NOCASE,
///     password_hash TEXT NOT NULL,
///     skills TEXT,
///     contact_info TEXT,
///     profile_picture TEXT NOT NULL DEFAULT 'default.jpg',
///     created_at TEXT NOT NULL
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use voluntier_shared::models::user::{User, CreateUser};
/// use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, CreateUser {
///     username: "alice".to_string(),
///     email: "alice@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// })
/// .await?;
///
/// let found = User::find_by_email(&pool, "ALICE@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Placeholder picture assigned to every new account
pub const DEFAULT_PROFILE_PICTURE: &str = "default.jpg";

const USER_COLUMNS: &str =
    "id, username, email, password_hash, skills, contact_info, profile_picture, created_at";

/// A registered account
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,

    /// Unique, 2-15 characters
    pub username: String,

    /// Unique, compared case-insensitively
    pub email: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub skills: Option<String>,

    pub contact_info: Option<String>,

    /// Stored picture name, or [`DEFAULT_PROFILE_PICTURE`]
    pub profile_picture: String,

    pub created_at: DateTime<Utc>,
}

/// Public view of a user, as listed among a project's members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub skills: Option<String>,
    pub contact_info: Option<String>,
    pub profile_picture: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            skills: user.skills,
            contact_info: user.contact_info,
            profile_picture: user.profile_picture,
        }
    }
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,
}

/// Input for updating an existing user
///
/// Only `Some` fields are written. For the nullable columns use `Some(None)`
/// to clear the value.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub skills: Option<Option<String>>,
    pub contact_info: Option<Option<String>>,
    pub profile_picture: Option<String>,
}

impl UpdateUser {
    fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.skills.is_none()
            && self.contact_info.is_none()
            && self.profile_picture.is_none()
    }
}

impl User {
    /// Inserts a new user with the default profile picture
    ///
    /// # Errors
    ///
    /// Returns a database error on a username or email unique constraint violation.
    pub async fn create(pool: &SqlitePool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, username, email, password_hash, profile_picture, created_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(data.username)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(DEFAULT_PROFILE_PICTURE)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by email address (case-insensitive)
    pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_username(
        pool: &SqlitePool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(pool)
        .await
    }

    /// Updates an existing user
    ///
    /// Returns the updated row, or None if the user doesn't exist.
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        if data.is_empty() {
            return Self::find_by_id(pool, id).await;
        }

        // ?1 is the id; fields are numbered from ?2 in the order pushed below
        let mut assignments = Vec::new();
        let mut bind_count = 1;

        if data.username.is_some() {
            bind_count += 1;
            assignments.push(format!("username = ?{bind_count}"));
        }
        if data.skills.is_some() {
            bind_count += 1;
            assignments.push(format!("skills = ?{bind_count}"));
        }
        if data.contact_info.is_some() {
            bind_count += 1;
            assignments.push(format!("contact_info = ?{bind_count}"));
        }
        if data.profile_picture.is_some() {
            bind_count += 1;
            assignments.push(format!("profile_picture = ?{bind_count}"));
        }

        let query = format!(
            "UPDATE users SET {} WHERE id = ?1 RETURNING {USER_COLUMNS}",
            assignments.join(", ")
        );

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(username) = data.username {
            q = q.bind(username);
        }
        if let Some(skills) = data.skills {
            q = q.bind(skills);
        }
        if let Some(contact_info) = data.contact_info {
            q = q.bind(contact_info);
        }
        if let Some(profile_picture) = data.profile_picture {
            q = q.bind(profile_picture);
        }

        q.fetch_optional(pool).await
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_pool;

    fn new_user(username: &str, email: &str) -> CreateUser {
        CreateUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_default_picture() {
        let pool = test_pool().await;
        let user = User::create(&pool, new_user("alice", "alice@example.com"))
            .await
            .unwrap();

        assert_eq!(user.profile_picture, DEFAULT_PROFILE_PICTURE);
        assert!(user.skills.is_none());
        assert!(user.contact_info.is_none());
        assert_eq!(User::count(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_email_lookup_ignores_case() {
        let pool = test_pool().await;
        let user = User::create(&pool, new_user("alice", "alice@example.com"))
            .await
            .unwrap();

        let found = User::find_by_email(&pool, "Alice@Example.COM").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected_by_schema() {
        let pool = test_pool().await;
        User::create(&pool, new_user("alice", "alice@example.com"))
            .await
            .unwrap();

        let err = User::create(&pool, new_user("alice", "other@example.com"))
            .await
            .unwrap_err();
        assert_eq!(
            crate::models::unique_violation_field(&err).as_deref(),
            Some("username")
        );
    }

    #[tokio::test]
    async fn test_update_only_touches_given_fields() {
        let pool = test_pool().await;
        let user = User::create(&pool, new_user("alice", "alice@example.com"))
            .await
            .unwrap();

        let updated = User::update(
            &pool,
            user.id,
            UpdateUser {
                skills: Some(Some("first aid".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.username, "alice");
        assert_eq!(updated.skills.as_deref(), Some("first aid"));
        assert_eq!(updated.profile_picture, DEFAULT_PROFILE_PICTURE);
    }

    #[tokio::test]
    async fn test_update_missing_user_returns_none() {
        let pool = test_pool().await;
        let result = User::update(
            &pool,
            Uuid::new_v4(),
            UpdateUser {
                username: Some("ghost".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(result.is_none());
    }
}
