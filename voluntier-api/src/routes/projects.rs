/// Project endpoints
///
/// - `POST /create_project` - New project owned by the caller
/// - `GET  /my_projects?page=` - Projects the caller owns or joined
/// - `POST /project/:project_id/apply` - Apply to join
/// - `GET|POST /project/:project_id/:application_id/accept` - Owner accepts
/// - `GET|POST /project/:project_id/:application_id/reject` - Owner rejects
/// - `GET  /project/:project_id/view_applications?page=` - Owner only
/// - `GET  /project/:project_id/view_members` - Owner only

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use uuid::Uuid;
use voluntier_shared::{
    auth::identity::AuthContext,
    models::{
        application::ApplicationListing, pagination::Page, project::Project, user::UserProfile,
    },
    services::{
        applications::{self, ApplicationInput},
        content::{self, ProjectInput},
    },
};

use super::{parse_id, PageQuery};
use crate::{app::AppState, error::ApiResult};

fn applications_location(project_id: Uuid) -> String {
    format!("/project/{}/view_applications", project_id)
}

pub async fn create_project(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Form(input): Form<ProjectInput>,
) -> ApiResult<Response> {
    content::create_project(&state.db, &ctx, input).await?;
    Ok(Redirect::to("/home").into_response())
}

pub async fn my_projects(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Page<Project>>> {
    Ok(Json(content::my_projects(&state.db, &ctx, query.request()).await?))
}

pub async fn apply(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(project_id): Path<String>,
    Form(input): Form<ApplicationInput>,
) -> ApiResult<Response> {
    let project_id = parse_id(&project_id, "project")?;

    applications::apply(&state.db, &ctx, project_id, input).await?;
    Ok(Redirect::to("/home").into_response())
}

pub async fn accept(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path((project_id, application_id)): Path<(String, String)>,
) -> ApiResult<Response> {
    let project_id = parse_id(&project_id, "project")?;
    let application_id = parse_id(&application_id, "application")?;

    applications::accept(&state.db, &ctx, project_id, application_id).await?;
    Ok(Redirect::to(&applications_location(project_id)).into_response())
}

pub async fn reject(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path((project_id, application_id)): Path<(String, String)>,
) -> ApiResult<Response> {
    let project_id = parse_id(&project_id, "project")?;
    let application_id = parse_id(&application_id, "application")?;

    applications::reject(&state.db, &ctx, project_id, application_id).await?;
    Ok(Redirect::to(&applications_location(project_id)).into_response())
}

pub async fn view_applications(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(project_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Page<ApplicationListing>>> {
    let project_id = parse_id(&project_id, "project")?;
    let page = applications::view_applications(&state.db, &ctx, project_id, query.request()).await?;
    Ok(Json(page))
}

pub async fn view_members(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<Vec<UserProfile>>> {
    let project_id = parse_id(&project_id, "project")?;
    Ok(Json(applications::view_members(&state.db, &ctx, project_id).await?))
}
