/// Ownership checks for mutating operations
///
/// VolunTier has no roles. Two rules cover every protected mutation:
///
/// 1. Only a post's **author** may edit or delete it
/// 2. Only a project's **owner** may see its applications and members, or
///    accept and reject applicants
///
/// The loaders here fetch the resource and apply the rule in one step, so a
/// handler either gets the resource back or a reason it can't have it.
///
/// # Example
///
/// ```no_run
/// use voluntier_shared::auth::authorization::{owned_project, AuthzError};
/// use sqlx::SqlitePool;
/// use uuid::Uuid;
///
/// async fn list_applicants(pool: &SqlitePool, user: Uuid, project: Uuid) -> Result<(), AuthzError> {
///     let project = owned_project(pool, project, user).await?;
///     println!("{} is yours", project.title);
///     Ok(())
/// }
/// ```

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{post::Post, project::Project};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// The resource doesn't exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The resource exists but belongs to someone else
    #[error("Not authorized to modify this {0}")]
    NotOwner(&'static str),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Checks that `user_id` wrote `post`
pub fn require_post_author(post: &Post, user_id: Uuid) -> Result<(), AuthzError> {
    if post.author_id == user_id {
        Ok(())
    } else {
        Err(AuthzError::NotOwner("post"))
    }
}

/// Checks that `user_id` owns `project`
pub fn require_project_owner(project: &Project, user_id: Uuid) -> Result<(), AuthzError> {
    if project.is_owned_by(user_id) {
        Ok(())
    } else {
        Err(AuthzError::NotOwner("project"))
    }
}

/// Loads a post the user is allowed to modify
pub async fn authored_post(
    pool: &SqlitePool,
    post_id: Uuid,
    user_id: Uuid,
) -> Result<Post, AuthzError> {
    let post = Post::find_by_id(pool, post_id)
        .await?
        .ok_or(AuthzError::NotFound("post"))?;

    require_post_author(&post, user_id)?;
    Ok(post)
}

/// Loads a project the user owns
pub async fn owned_project(
    pool: &SqlitePool,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<Project, AuthzError> {
    let project = Project::find_by_id(pool, project_id)
        .await?
        .ok_or(AuthzError::NotFound("project"))?;

    require_project_owner(&project, user_id)?;
    Ok(project)
}
