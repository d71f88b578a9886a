/// Post endpoints
///
/// - `GET  /`, `/home?page=` - Newest posts, 10 per page
/// - `GET  /search?query=&page=` - Post search
/// - `POST /create_post/:project_id` - New post under a project
/// - `GET  /post/:post_id/edit` - Current fields, author only
/// - `POST /post/:post_id/edit` - Overwrite fields, author only
/// - `GET|POST /post/:post_id/delete` - Remove, author only

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use serde::Deserialize;
use voluntier_shared::{
    auth::identity::AuthContext,
    models::{pagination::Page, post::PostListing},
    services::{
        content::{self, PostInput},
        search as post_search,
    },
};

use super::{parse_id, PageQuery};
use crate::{app::AppState, error::ApiResult};

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub page: Option<String>,
}

pub async fn home(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Page<PostListing>>> {
    Ok(Json(content::home(&state.db, query.request()).await?))
}

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Page<PostListing>>> {
    let page = PageQuery { page: query.page }.request();
    let results = post_search::search(&state.db, query.query.as_deref(), page).await?;
    Ok(Json(results))
}

pub async fn create_post(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(project_id): Path<String>,
    Form(input): Form<PostInput>,
) -> ApiResult<Response> {
    let project_id = parse_id(&project_id, "project")?;

    content::create_post(&state.db, &ctx, project_id, input).await?;
    Ok(Redirect::to("/home").into_response())
}

pub async fn edit_post_form(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(post_id): Path<String>,
) -> ApiResult<Json<PostInput>> {
    let post_id = parse_id(&post_id, "post")?;
    Ok(Json(content::post_for_edit(&state.db, &ctx, post_id).await?))
}

pub async fn edit_post(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(post_id): Path<String>,
    Form(input): Form<PostInput>,
) -> ApiResult<Response> {
    let post_id = parse_id(&post_id, "post")?;

    content::edit_post(&state.db, &ctx, post_id, input).await?;
    Ok(Redirect::to("/home").into_response())
}

pub async fn delete_post(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(post_id): Path<String>,
) -> ApiResult<Response> {
    let post_id = parse_id(&post_id, "post")?;

    content::delete_post(&state.db, &ctx, post_id).await?;
    Ok(Redirect::to("/home").into_response())
}
