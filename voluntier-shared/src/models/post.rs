/// Post model and database operations
///
/// Posts are recruitment listings attached to a project. Only the author may
/// edit or delete them; deleting a post cascades to nothing.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE posts (
///     id BLOB PRIMARY KEY NOT NULL,
///     author_id BLOB NOT NULL REFERENCES users(id),
///     project_id BLOB NOT NULL REFERENCES projects(id),
///     title TEXT NOT NULL,
///     content TEXT NOT NULL,
///     skills_needed TEXT NOT NULL,
///     tags TEXT,
///     created_at TEXT NOT NULL
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::pagination::{Page, PageRequest};

const POST_COLUMNS: &str =
    "id, author_id, project_id, title, content, skills_needed, tags, created_at";

const LISTING_COLUMNS: &str = "p.id, p.author_id, p.project_id, p.title, p.content, \
     p.skills_needed, p.tags, p.created_at, u.username AS author_username";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub content: String,
    pub skills_needed: String,
    pub tags: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A post as shown in listings, with its author's username
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PostListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub post: Post,
    pub author_username: String,
}

#[derive(Debug, Clone)]
pub struct CreatePost {
    pub author_id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub content: String,
    pub skills_needed: String,
    pub tags: Option<String>,
}

/// Replacement values for an edit; the creation timestamp never changes
#[derive(Debug, Clone)]
pub struct UpdatePost {
    pub title: String,
    pub content: String,
    pub skills_needed: String,
    pub tags: Option<String>,
}

/// Escapes LIKE wildcards so the query is matched literally
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

impl Post {
    pub async fn create(pool: &SqlitePool, data: CreatePost) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Post>(&format!(
            "INSERT INTO posts (id, author_id, project_id, title, content, skills_needed, tags, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {POST_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(data.author_id)
        .bind(data.project_id)
        .bind(data.title)
        .bind(data.content)
        .bind(data.skills_needed)
        .bind(data.tags)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Post>(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Overwrites the editable fields in place
    ///
    /// Returns None if the post doesn't exist.
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: UpdatePost,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Post>(&format!(
            "UPDATE posts
             SET title = ?, content = ?, skills_needed = ?, tags = ?
             WHERE id = ?
             RETURNING {POST_COLUMNS}"
        ))
        .bind(data.title)
        .bind(data.content)
        .bind(data.skills_needed)
        .bind(data.tags)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Permanently removes a post
    ///
    /// Returns true if a row was deleted.
    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all posts, newest first
    pub async fn list(pool: &SqlitePool, page: PageRequest) -> Result<Page<PostListing>, sqlx::Error> {
        Self::search(pool, "", page).await
    }

    /// Case-insensitive substring search over title, content, skills and tags
    ///
    /// An empty query matches every post. Results are newest first.
    pub async fn search(
        pool: &SqlitePool,
        query: &str,
        page: PageRequest,
    ) -> Result<Page<PostListing>, sqlx::Error> {
        let pattern = like_pattern(query);

        let filter = "p.title LIKE ?1 ESCAPE '\\'
                OR p.content LIKE ?1 ESCAPE '\\'
                OR p.skills_needed LIKE ?1 ESCAPE '\\'
                OR p.tags LIKE ?1 ESCAPE '\\'";

        let (total,): (i64,) =
            sqlx::query_as(&format!("SELECT COUNT(*) FROM posts p WHERE {filter}"))
                .bind(&pattern)
                .fetch_one(pool)
                .await?;

        let items = sqlx::query_as::<_, PostListing>(&format!(
            "SELECT {LISTING_COLUMNS}
             FROM posts p
             JOIN users u ON u.id = p.author_id
             WHERE {filter}
             ORDER BY p.created_at DESC, p.rowid DESC
             LIMIT ?2 OFFSET ?3"
        ))
        .bind(&pattern)
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
    use crate::models::project::{CreateProject, Project};
    use crate::models::{test_pool, test_user};

    async fn setup(pool: &SqlitePool) -> (Uuid, Uuid) {
        let author = test_user(pool, "author").await;
        let project = Project::create(
            pool,
            CreateProject {
                owner_id: author.id,
                title: "Park Restoration".to_string(),
                description: "Plant trees".to_string(),
                skills_needed: "gardening".to_string(),
            },
        )
        .await
        .unwrap();
        (author.id, project.id)
    }

    fn new_post(author_id: Uuid, project_id: Uuid, title: &str, tags: Option<&str>) -> CreatePost {
        CreatePost {
            author_id,
            project_id,
            title: title.to_string(),
            content: "Join us on Saturday".to_string(),
            skills_needed: "shovelling".to_string(),
            tags: tags.map(str::to_string),
        }
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(""), "%%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }

    #[tokio::test]
    async fn test_update_keeps_timestamp() {
        let pool = test_pool().await;
        let (author_id, project_id) = setup(&pool).await;
        let post = Post::create(&pool, new_post(author_id, project_id, "Old", None))
            .await
            .unwrap();

        let updated = Post::update(
            &pool,
            post.id,
            UpdatePost {
                title: "New".to_string(),
                content: "Changed".to_string(),
                skills_needed: "raking".to_string(),
                tags: Some("outdoors".to_string()),
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.title, "New");
        assert_eq!(updated.tags.as_deref(), Some("outdoors"));
        assert_eq!(updated.created_at, post.created_at);
    }

    #[tokio::test]
    async fn test_delete_reports_missing_rows() {
        let pool = test_pool().await;
        let (author_id, project_id) = setup(&pool).await;
        let post = Post::create(&pool, new_post(author_id, project_id, "Gone", None))
            .await
            .unwrap();

        assert!(Post::delete(&pool, post.id).await.unwrap());
        assert!(!Post::delete(&pool, post.id).await.unwrap());
        assert!(Post::find_by_id(&pool, post.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_paginated() {
        let pool = test_pool().await;
        let (author_id, project_id) = setup(&pool).await;

        for i in 0..12 {
            Post::create(&pool, new_post(author_id, project_id, &format!("Post {i}"), None))
                .await
                .unwrap();
        }

        let first = Post::list(&pool, PageRequest::new(1)).await.unwrap();
        assert_eq!(first.total, 12);
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.items[0].post.title, "Post 11");
        assert_eq!(first.items[0].author_username, "author");

        let second = Post::list(&pool, PageRequest::new(2)).await.unwrap();
        assert_eq!(second.items.len(), 2);
        assert_eq!(second.items[1].post.title, "Post 0");

        let beyond = Post::list(&pool, PageRequest::new(5)).await.unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 12);
    }

    #[tokio::test]
    async fn test_search_matches_tags_case_insensitively() {
        let pool = test_pool().await;
        let (author_id, project_id) = setup(&pool).await;

        let tagged = Post::create(&pool, new_post(author_id, project_id, "Weekend", Some("Kayaking")))
            .await
            .unwrap();
        Post::create(&pool, new_post(author_id, project_id, "Weekday", None))
            .await
            .unwrap();

        let results = Post::search(&pool, "kayak", PageRequest::default()).await.unwrap();
        assert_eq!(results.total, 1);
        assert_eq!(results.items[0].post.id, tagged.id);

        let none = Post::search(&pool, "100%", PageRequest::default()).await.unwrap();
        assert_eq!(none.total, 0);
    }
}
