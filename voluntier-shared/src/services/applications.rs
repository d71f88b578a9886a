/// Applying to projects and the owner's decisions
///
/// An application is created Pending and consumed by exactly one decision.
/// Accepting inserts the membership and deletes the application in one
/// transaction; rejecting only deletes it. Nothing is archived.

use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::error::{ServiceError, ServiceResult};
use crate::auth::{
    authorization::{owned_project, AuthzError},
    identity::AuthContext,
};
use crate::models::application::{
    Application, ApplicationListing, ApplicationStatus, CreateApplication,
};
use crate::models::membership::Membership;
use crate::models::pagination::{Page, PageRequest};
use crate::models::project::Project;
use crate::models::user::UserProfile;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ApplicationInput {
    #[validate(length(min = 1, message = "This field is required."))]
    pub content: String,

    #[validate(length(min = 1, message = "This field is required."))]
    pub skills: String,
}

/// Files a pending application
///
/// Repeat applications by the same user are accepted. Owners cannot apply
/// to their own project.
pub async fn apply(
    pool: &SqlitePool,
    ctx: &AuthContext,
    project_id: Uuid,
    input: ApplicationInput,
) -> ServiceResult<Application> {
    let input = ApplicationInput {
        content: input.content.trim().to_string(),
        skills: input.skills.trim().to_string(),
    };
    input.validate()?;

    let project = Project::find_by_id(pool, project_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("project"))?;

    if project.owner_id == ctx.user_id {
        warn!(project_id = %project_id, user_id = %ctx.user_id, "Owner tried to apply to own project");
        return Err(ServiceError::Forbidden);
    }

    let application = Application::create(
        pool,
        CreateApplication {
            user_id: ctx.user_id,
            project_id,
            content: input.content,
            skills: input.skills,
        },
    )
    .await?;

    info!(application_id = %application.id, project_id = %project_id, "Application submitted");
    Ok(application)
}

/// Loads an application of a project the caller owns
async fn pending_for_owner(
    pool: &SqlitePool,
    ctx: &AuthContext,
    project_id: Uuid,
    application_id: Uuid,
) -> ServiceResult<(Project, Application)> {
    let project = owned(pool, ctx, project_id).await?;

    let application = Application::find_by_id(pool, application_id)
        .await?
        .filter(|a| a.project_id == project_id)
        .ok_or_else(|| ServiceError::not_found("application"))?;

    Ok((project, application))
}

async fn owned(pool: &SqlitePool, ctx: &AuthContext, project_id: Uuid) -> ServiceResult<Project> {
    owned_project(pool, project_id, ctx.user_id).await.map_err(|e| {
        if matches!(e, AuthzError::NotOwner(_)) {
            warn!(project_id = %project_id, user_id = %ctx.user_id, "Project access denied: not the owner");
        }
        e.into()
    })
}

/// Accepts an application, making the applicant a member
///
/// Membership insertion is idempotent. An application filed by the owner
/// is consumed without granting membership. Returns the consumed application
/// with its final status.
pub async fn accept(
    pool: &SqlitePool,
    ctx: &AuthContext,
    project_id: Uuid,
    application_id: Uuid,
) -> ServiceResult<Application> {
    let (project, mut application) = pending_for_owner(pool, ctx, project_id, application_id).await?;

    let mut tx = pool.begin().await?;

    let joined = if application.user_id == project.owner_id {
        false
    } else {
        Membership::add(&mut *tx, project_id, application.user_id).await?
    };

    // Someone else decided first; dropping the transaction rolls back
    if !Application::delete(&mut *tx, application_id).await? {
        return Err(ServiceError::not_found("application"));
    }

    tx.commit().await?;

    info!(
        application_id = %application_id,
        project_id = %project_id,
        user_id = %application.user_id,
        new_member = joined,
        "Application accepted"
    );

    application.status = ApplicationStatus::Accepted;
    Ok(application)
}

/// Rejects an application; the record is deleted and no membership changes
pub async fn reject(
    pool: &SqlitePool,
    ctx: &AuthContext,
    project_id: Uuid,
    application_id: Uuid,
) -> ServiceResult<Application> {
    let (_, mut application) = pending_for_owner(pool, ctx, project_id, application_id).await?;

    if !Application::delete(pool, application_id).await? {
        return Err(ServiceError::not_found("application"));
    }

    info!(application_id = %application_id, project_id = %project_id, "Application rejected");

    application.status = ApplicationStatus::Rejected;
    Ok(application)
}

/// Pending applications to the caller's project, newest first
pub async fn view_applications(
    pool: &SqlitePool,
    ctx: &AuthContext,
    project_id: Uuid,
    page: PageRequest,
) -> ServiceResult<Page<ApplicationListing>> {
    owned(pool, ctx, project_id).await?;
    Ok(Application::list_by_project(pool, project_id, page).await?)
}

/// Every member of the caller's project
pub async fn view_members(
    pool: &SqlitePool,
    ctx: &AuthContext,
    project_id: Uuid,
) -> ServiceResult<Vec<UserProfile>> {
    owned(pool, ctx, project_id).await?;
    Ok(Membership::list_members(pool, project_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::CreateProject;
    use crate::models::{test_pool, test_user};
    use crate::services::content::my_projects;

    fn ctx(user_id: Uuid) -> AuthContext {
        AuthContext {
            user_id,
            token_hash: "unused".to_string(),
            persistent: false,
        }
    }

    fn input(skills: &str) -> ApplicationInput {
        ApplicationInput {
            content: "I'd love to help".to_string(),
            skills: skills.to_string(),
        }
    }

    async fn beach_cleanup(pool: &SqlitePool, owner: Uuid) -> Project {
        Project::create(
            pool,
            CreateProject {
                owner_id: owner,
                title: "Beach Cleanup".to_string(),
                description: "Saturday morning on the shore".to_string(),
                skills_needed: "kayaking".to_string(),
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_accept_scenario() {
        let pool = test_pool().await;
        let a = ctx(test_user(&pool, "alice").await.id);
        let b = ctx(test_user(&pool, "bob").await.id);
        let project = beach_cleanup(&pool, a.user_id).await;

        let application = apply(&pool, &b, project.id, input("kayaking")).await.unwrap();
        assert_eq!(application.status, ApplicationStatus::Pending);

        let decided = accept(&pool, &a, project.id, application.id).await.unwrap();
        assert_eq!(decided.status, ApplicationStatus::Accepted);

        let members = view_members(&pool, &a, project.id).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].id, b.user_id);
        assert!(Application::find_by_id(&pool, application.id).await.unwrap().is_none());

        let projects = my_projects(&pool, &b, PageRequest::default()).await.unwrap();
        assert_eq!(projects.items.len(), 1);
        assert_eq!(projects.items[0].title, "Beach Cleanup");

        // Owner is not a member through ownership
        assert!(!Membership::is_member(&pool, project.id, a.user_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_accept_is_atomic() {
        let pool = test_pool().await;
        let a = ctx(test_user(&pool, "alice").await.id);
        let b = ctx(test_user(&pool, "bob").await.id);
        let project = beach_cleanup(&pool, a.user_id).await;
        let application = apply(&pool, &b, project.id, input("kayaking")).await.unwrap();

        // Fail the second statement of the transaction
        sqlx::query(
            "CREATE TRIGGER fail_application_delete BEFORE DELETE ON applications
             BEGIN SELECT RAISE(ABORT, 'simulated failure'); END",
        )
        .execute(&pool)
        .await
        .unwrap();

        let result = accept(&pool, &a, project.id, application.id).await;
        assert!(matches!(result, Err(ServiceError::Database(_))));

        assert!(!Membership::is_member(&pool, project.id, b.user_id).await.unwrap());
        assert!(Application::find_by_id(&pool, application.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_repeat_accept_keeps_single_membership() {
        let pool = test_pool().await;
        let a = ctx(test_user(&pool, "alice").await.id);
        let b = ctx(test_user(&pool, "bob").await.id);
        let project = beach_cleanup(&pool, a.user_id).await;

        let first = apply(&pool, &b, project.id, input("kayaking")).await.unwrap();
        let second = apply(&pool, &b, project.id, input("rowing")).await.unwrap();

        accept(&pool, &a, project.id, first.id).await.unwrap();
        accept(&pool, &a, project.id, second.id).await.unwrap();

        assert_eq!(Membership::count_by_project(&pool, project.id).await.unwrap(), 1);

        // Already consumed
        assert!(matches!(
            accept(&pool, &a, project.id, first.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_reject_only_deletes() {
        let pool = test_pool().await;
        let a = ctx(test_user(&pool, "alice").await.id);
        let b = ctx(test_user(&pool, "bob").await.id);
        let project = beach_cleanup(&pool, a.user_id).await;
        let application = apply(&pool, &b, project.id, input("kayaking")).await.unwrap();

        let decided = reject(&pool, &a, project.id, application.id).await.unwrap();
        assert_eq!(decided.status, ApplicationStatus::Rejected);
        assert!(Application::find_by_id(&pool, application.id).await.unwrap().is_none());
        assert_eq!(Membership::count_by_project(&pool, project.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_owner_guards() {
        let pool = test_pool().await;
        let a = ctx(test_user(&pool, "alice").await.id);
        let b = ctx(test_user(&pool, "bob").await.id);
        let project = beach_cleanup(&pool, a.user_id).await;
        let other = beach_cleanup(&pool, a.user_id).await;
        let application = apply(&pool, &b, project.id, input("kayaking")).await.unwrap();

        assert!(matches!(
            accept(&pool, &b, project.id, application.id).await,
            Err(ServiceError::Forbidden)
        ));
        assert!(matches!(
            reject(&pool, &b, project.id, application.id).await,
            Err(ServiceError::Forbidden)
        ));
        assert!(matches!(
            view_applications(&pool, &b, project.id, PageRequest::default()).await,
            Err(ServiceError::Forbidden)
        ));
        assert!(matches!(
            view_members(&pool, &b, project.id).await,
            Err(ServiceError::Forbidden)
        ));

        // Application belongs to a different project
        assert!(matches!(
            accept(&pool, &a, other.id, application.id).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            apply(&pool, &b, Uuid::new_v4(), input("kayaking")).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(Application::find_by_id(&pool, application.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_owner_never_joins_own_project() {
        let pool = test_pool().await;
        let a = ctx(test_user(&pool, "alice").await.id);
        let project = beach_cleanup(&pool, a.user_id).await;

        assert!(matches!(
            apply(&pool, &a, project.id, input("kayaking")).await,
            Err(ServiceError::Forbidden)
        ));
        assert_eq!(
            view_applications(&pool, &a, project.id, PageRequest::default())
                .await
                .unwrap()
                .total,
            0
        );

        // A row filed by the owner outside apply is consumed without membership
        let own = Application::create(
            &pool,
            CreateApplication {
                user_id: a.user_id,
                project_id: project.id,
                content: "Helping myself".to_string(),
                skills: "kayaking".to_string(),
            },
        )
        .await
        .unwrap();

        let decided = accept(&pool, &a, project.id, own.id).await.unwrap();
        assert_eq!(decided.status, ApplicationStatus::Accepted);
        assert!(Application::find_by_id(&pool, own.id).await.unwrap().is_none());
        assert!(!Membership::is_member(&pool, project.id, a.user_id).await.unwrap());
        assert!(view_members(&pool, &a, project.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_view_applications_is_scoped_to_project() {
        let pool = test_pool().await;
        let a = ctx(test_user(&pool, "alice").await.id);
        let b = ctx(test_user(&pool, "bob").await.id);
        let project = beach_cleanup(&pool, a.user_id).await;
        let other = beach_cleanup(&pool, a.user_id).await;

        apply(&pool, &b, project.id, input("kayaking")).await.unwrap();
        apply(&pool, &b, other.id, input("rowing")).await.unwrap();

        let page = view_applications(&pool, &a, project.id, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].application.skills, "kayaking");
        assert_eq!(page.items[0].applicant_username, "bob");
    }
}
