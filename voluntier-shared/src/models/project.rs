/// Project model and database operations
///
/// A project has exactly one owner, fixed at creation. Accepted applicants are
/// tracked separately in `project_members` (see [`super::membership`]); there
/// is no edit or delete path for projects.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id BLOB PRIMARY KEY NOT NULL,
///     owner_id BLOB NOT NULL REFERENCES users(id),
///     title TEXT NOT NULL,
///     description TEXT NOT NULL,
///     skills_needed TEXT NOT NULL,
///     created_at TEXT NOT NULL
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::pagination::{Page, PageRequest};

const PROJECT_COLUMNS: &str = "id, owner_id, title, description, skills_needed, created_at";

/// A volunteer initiative
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub skills_needed: String,

    /// Server-assigned, set once
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub skills_needed: String,
}

impl Project {
    pub async fn create(pool: &SqlitePool, data: CreateProject) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            "INSERT INTO projects (id, owner_id, title, description, skills_needed, created_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(data.owner_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.skills_needed)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Whether `user_id` owns the project
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    /// Lists projects the user owns or has joined, newest first
    ///
    /// A project appears once even when the user both owns it and is a member.
    pub async fn list_for_user(
        pool: &SqlitePool,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Self>, sqlx::Error> {
        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM projects
             WHERE owner_id = ?1
                OR id IN (SELECT project_id FROM project_members WHERE user_id = ?1)",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        let items = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects
             WHERE owner_id = ?1
                OR id IN (SELECT project_id FROM project_members WHERE user_id = ?1)
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2 OFFSET ?3"
        ))
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

        Ok(Page::new(items, page, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::membership::Membership;
    use crate::models::{test_pool, test_user};

    fn new_project(owner_id: Uuid, title: &str) -> CreateProject {
        CreateProject {
            owner_id,
            title: title.to_string(),
            description: "Pick up litter".to_string(),
            skills_needed: "none".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let pool = test_pool().await;
        let owner = test_user(&pool, "owner").await;

        let project = Project::create(&pool, new_project(owner.id, "Beach Cleanup"))
            .await
            .unwrap();

        let found = Project::find_by_id(&pool, project.id).await.unwrap().unwrap();
        assert_eq!(found, project);
        assert!(found.is_owned_by(owner.id));
    }

    #[tokio::test]
    async fn test_unknown_owner_violates_foreign_key() {
        let pool = test_pool().await;
        let result = Project::create(&pool, new_project(Uuid::new_v4(), "Orphan")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_list_for_user_unions_owned_and_joined() {
        let pool = test_pool().await;
        let alice = test_user(&pool, "alice").await;
        let bob = test_user(&pool, "bob").await;

        let owned = Project::create(&pool, new_project(bob.id, "Owned"))
            .await
            .unwrap();
        let joined = Project::create(&pool, new_project(alice.id, "Joined"))
            .await
            .unwrap();
        Project::create(&pool, new_project(alice.id, "Unrelated"))
            .await
            .unwrap();

        Membership::add(&pool, joined.id, bob.id).await.unwrap();

        let page = Project::list_for_user(&pool, bob.id, PageRequest::default())
            .await
            .unwrap();
        let ids: Vec<Uuid> = page.items.iter().map(|p| p.id).collect();

        assert_eq!(page.total, 2);
        assert_eq!(ids, vec![joined.id, owned.id]);
    }
}
