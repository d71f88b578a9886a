/// Projects, posts and the listings built from them

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::error::{ServiceError, ServiceResult};
use crate::auth::{authorization::authored_post, identity::AuthContext};
use crate::models::pagination::{Page, PageRequest};
use crate::models::post::{CreatePost, Post, PostListing, UpdatePost};
use crate::models::project::{CreateProject, Project};

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ProjectInput {
    #[validate(length(min = 1, message = "This field is required."))]
    pub title: String,

    #[validate(length(min = 1, message = "This field is required."))]
    pub description: String,

    #[validate(length(min = 1, message = "This field is required."))]
    pub skills_needed: String,
}

impl ProjectInput {
    fn trimmed(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            skills_needed: self.skills_needed.trim().to_string(),
        }
    }
}

/// Fields of a post, for both creation and editing
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PostInput {
    #[validate(length(min = 1, message = "This field is required."))]
    pub title: String,

    #[validate(length(min = 1, message = "This field is required."))]
    pub content: String,

    #[validate(length(min = 1, message = "This field is required."))]
    pub skills_needed: String,

    pub tags: Option<String>,
}

impl PostInput {
    fn trimmed(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            content: self.content.trim().to_string(),
            skills_needed: self.skills_needed.trim().to_string(),
            tags: self
                .tags
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
        }
    }
}

impl From<Post> for PostInput {
    fn from(post: Post) -> Self {
        Self {
            title: post.title,
            content: post.content,
            skills_needed: post.skills_needed,
            tags: post.tags,
        }
    }
}

/// Newest posts first
pub async fn home(pool: &SqlitePool, page: PageRequest) -> ServiceResult<Page<PostListing>> {
    Ok(Post::list(pool, page).await?)
}

pub async fn create_project(
    pool: &SqlitePool,
    ctx: &AuthContext,
    input: ProjectInput,
) -> ServiceResult<Project> {
    let input = input.trimmed();
    input.validate()?;

    let project = Project::create(
        pool,
        CreateProject {
            owner_id: ctx.user_id,
            title: input.title,
            description: input.description,
            skills_needed: input.skills_needed,
        },
    )
    .await?;

    info!(project_id = %project.id, owner_id = %ctx.user_id, "Project created");
    Ok(project)
}

/// Projects the caller owns or has been accepted into
pub async fn my_projects(
    pool: &SqlitePool,
    ctx: &AuthContext,
    page: PageRequest,
) -> ServiceResult<Page<Project>> {
    Ok(Project::list_for_user(pool, ctx.user_id, page).await?)
}

pub async fn create_post(
    pool: &SqlitePool,
    ctx: &AuthContext,
    project_id: Uuid,
    input: PostInput,
) -> ServiceResult<Post> {
    let input = input.trimmed();
    input.validate()?;

    if Project::find_by_id(pool, project_id).await?.is_none() {
        return Err(ServiceError::not_found("project"));
    }

    let post = Post::create(
        pool,
        CreatePost {
            author_id: ctx.user_id,
            project_id,
            title: input.title,
            content: input.content,
            skills_needed: input.skills_needed,
            tags: input.tags,
        },
    )
    .await?;

    info!(post_id = %post.id, project_id = %project_id, "Post created");
    Ok(post)
}

/// Current values of a post, for the author's edit form
pub async fn post_for_edit(
    pool: &SqlitePool,
    ctx: &AuthContext,
    post_id: Uuid,
) -> ServiceResult<PostInput> {
    let post = authored_post(pool, post_id, ctx.user_id)
        .await
        .inspect_err(|e| deny_log(e, post_id, ctx))?;

    Ok(post.into())
}

/// Overwrites a post's fields; the creation timestamp is kept
pub async fn edit_post(
    pool: &SqlitePool,
    ctx: &AuthContext,
    post_id: Uuid,
    input: PostInput,
) -> ServiceResult<Post> {
    authored_post(pool, post_id, ctx.user_id)
        .await
        .inspect_err(|e| deny_log(e, post_id, ctx))?;

    let input = input.trimmed();
    input.validate()?;

    let post = Post::update(
        pool,
        post_id,
        UpdatePost {
            title: input.title,
            content: input.content,
            skills_needed: input.skills_needed,
            tags: input.tags,
        },
    )
    .await?
    .ok_or_else(|| ServiceError::not_found("post"))?;

    info!(post_id = %post_id, "Post updated");
    Ok(post)
}

pub async fn delete_post(pool: &SqlitePool, ctx: &AuthContext, post_id: Uuid) -> ServiceResult<()> {
    authored_post(pool, post_id, ctx.user_id)
        .await
        .inspect_err(|e| deny_log(e, post_id, ctx))?;

    if !Post::delete(pool, post_id).await? {
        return Err(ServiceError::not_found("post"));
    }

    info!(post_id = %post_id, "Post deleted");
    Ok(())
}

fn deny_log(err: &crate::auth::authorization::AuthzError, post_id: Uuid, ctx: &AuthContext) {
    if matches!(err, crate::auth::authorization::AuthzError::NotOwner(_)) {
        warn!(post_id = %post_id, user_id = %ctx.user_id, "Post change denied: not the author");
    }
}
