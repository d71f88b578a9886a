/// Project membership (accepted applicants)
///
/// A many-to-many relation between projects and users. Rows are only created
/// when an application is accepted and are never removed.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE project_members (
///     project_id BLOB NOT NULL REFERENCES projects(id),
///     user_id BLOB NOT NULL REFERENCES users(id),
///     joined_at TEXT NOT NULL,
///     PRIMARY KEY (project_id, user_id)
/// );
/// ```
///
/// The composite primary key makes [`Membership::add`] idempotent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, Sqlite, SqlitePool};
use uuid::Uuid;

use super::user::UserProfile;

/// A user's membership in a project
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub joined_at: DateTime<Utc>,
}

impl Membership {
    /// Adds a user to a project's member set
    ///
    /// Accepts any executor so it can run inside the acceptance transaction.
    ///
    /// # Returns
    ///
    /// True if a new membership was inserted, false if the user was already a member
    pub async fn add<'e, E>(executor: E, project_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "INSERT INTO project_members (project_id, user_id, joined_at)
             VALUES (?, ?, ?)
             ON CONFLICT (project_id, user_id) DO NOTHING",
        )
        .bind(project_id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn is_member(
        pool: &SqlitePool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM project_members
                WHERE project_id = ? AND user_id = ?
            )",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Lists every member of a project in the order they joined
    pub async fn list_members(
        pool: &SqlitePool,
        project_id: Uuid,
    ) -> Result<Vec<UserProfile>, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>(
            "SELECT u.id, u.username, u.skills, u.contact_info, u.profile_picture
             FROM project_members m
             JOIN users u ON u.id = m.user_id
             WHERE m.project_id = ?
             ORDER BY m.joined_at ASC, m.rowid ASC",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    pub async fn count_by_project(pool: &SqlitePool, project_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM project_members WHERE project_id = ?")
                .bind(project_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::{CreateProject, Project};
    use crate::models::{test_pool, test_user};

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let pool = test_pool().await;
        let owner = test_user(&pool, "owner").await;
        let member = test_user(&pool, "member").await;
        let project = Project::create(
            &pool,
            CreateProject {
                owner_id: owner.id,
                title: "Food Bank".to_string(),
                description: "Sort donations".to_string(),
                skills_needed: "lifting".to_string(),
            },
        )
        .await
        .unwrap();

        assert!(Membership::add(&pool, project.id, member.id).await.unwrap());
        assert!(!Membership::add(&pool, project.id, member.id).await.unwrap());

        assert_eq!(Membership::count_by_project(&pool, project.id).await.unwrap(), 1);
        assert!(Membership::is_member(&pool, project.id, member.id).await.unwrap());
        assert!(!Membership::is_member(&pool, project.id, owner.id).await.unwrap());

        let members = Membership::list_members(&pool, project.id).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].username, "member");
    }
}
