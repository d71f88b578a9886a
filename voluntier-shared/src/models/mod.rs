/// Database models for VolunTier
///
/// Each model owns its table's queries. Relationships are plain foreign-key
/// ids resolved through these functions; no model holds references to another.
///
/// # Models
///
/// - `user`: Accounts and profile data
/// - `project`: Volunteer initiatives with a single owner
/// - `post`: Recruitment listings attached to a project
/// - `application`: Pending requests to join a project
/// - `membership`: Accepted applicants of a project
/// - `session`: Server-side login sessions
/// - `pagination`: Page requests and result pages shared by all listings

pub mod application;
pub mod membership;
pub mod pagination;
pub mod post;
pub mod project;
pub mod session;
pub mod user;

/// Extracts the column behind a unique constraint violation, if that is what `err` is
///
/// SQLite reports these as `UNIQUE constraint failed: users.email`.
pub fn unique_violation_field(err: &sqlx::Error) -> Option<String> {
    let db_err = err.as_database_error()?;
    if !db_err.is_unique_violation() {
        return None;
    }

    db_err
        .message()
        .rsplit(['.', ' '])
        .next()
        .map(str::to_string)
}

#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    use crate::db::{
        migrations::run_migrations,
        pool::{create_pool, DatabaseConfig},
    };

    let pool = create_pool(DatabaseConfig::in_memory())
        .await
        .expect("in-memory pool");
    run_migrations(&pool).await.expect("migrations");
    pool
}

#[cfg(test)]
pub(crate) async fn test_user(pool: &sqlx::SqlitePool, username: &str) -> user::User {
    user::User::create(
        pool,
        user::CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "hash".to_string(),
        },
    )
    .await
    .expect("test user")
}
