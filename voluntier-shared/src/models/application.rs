/// Application model and database operations
///
/// An application is a request by a user to join a project. It starts
/// `Pending` and is consumed by the owner's decision: accepting adds the
/// applicant to the project's members and deletes the row, rejecting only
/// deletes the row. No history of past decisions is kept.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE applications (
///     id BLOB PRIMARY KEY NOT NULL,
///     user_id BLOB NOT NULL REFERENCES users(id),
///     project_id BLOB NOT NULL REFERENCES projects(id),
///     content TEXT NOT NULL,
///     skills TEXT NOT NULL,
///     status TEXT NOT NULL DEFAULT 'pending',
///     created_at TEXT NOT NULL
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, Sqlite, SqlitePool};
use uuid::Uuid;

use super::pagination::{Page, PageRequest};

const APPLICATION_COLUMNS: &str = "id, user_id, project_id, content, skills, status, created_at";

/// Lifecycle state of an application
///
/// Accepted and Rejected are terminal; the row is deleted in the same step,
/// so stored rows are always Pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Application {
    pub id: Uuid,

    /// The applicant
    pub user_id: Uuid,

    pub project_id: Uuid,
    pub content: String,
    pub skills: String,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

/// An application as shown to the project owner, with the applicant's username
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ApplicationListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub application: Application,
    pub applicant_username: String,
}

#[derive(Debug, Clone)]
pub struct CreateApplication {
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub content: String,
    pub skills: String,
}

impl Application {
    /// Files a new pending application
    ///
    /// Duplicate applications by the same user to the same project are allowed.
    pub async fn create(pool: &SqlitePool, data: CreateApplication) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Application>(&format!(
            "INSERT INTO applications (id, user_id, project_id, content, skills, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING {APPLICATION_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(data.project_id)
        .bind(data.content)
        .bind(data.skills)
        .bind(ApplicationStatus::Pending)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Application>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Deletes an application
    ///
    /// Accepts any executor so it can run inside the acceptance transaction.
    /// Returns true if a row was deleted.
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM applications WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists a project's applications, newest first
    pub async fn list_by_project(
        pool: &SqlitePool,
        project_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<ApplicationListing>, sqlx::Error> {
        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM applications WHERE project_id = ?")
                .bind(project_id)
                .fetch_one(pool)
                .await?;

        let items = sqlx::query_as::<_, ApplicationListing>(
            "SELECT a.id, a.user_id, a.project_id, a.content, a.skills, a.status, a.created_at,
                    u.username AS applicant_username
             FROM applications a
             JOIN users u ON u.id = a.user_id
             WHERE a.project_id = ?1
             ORDER BY a.created_at DESC, a.rowid DESC
             LIMIT ?2 OFFSET ?3",
        )
        .bind(project_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

        Ok(Page::new(items, page, total))
    }
}
