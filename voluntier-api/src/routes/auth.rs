/// Authentication endpoints
///
/// - `POST /register` - Create an account, then go to the login page
/// - `GET  /login` - Login form metadata (where the user will land)
/// - `POST /login` - Open a session and set the session cookie
/// - `GET|POST /logout` - End the session and clear the cookie
///
/// Already-authenticated callers of register/login are sent home.

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use serde::{Deserialize, Serialize};
use voluntier_shared::{
    auth::identity::{AuthContext, SessionCookie},
    services::accounts::{self, LoginInput, RegisterInput},
};

use crate::{
    app::AppState,
    error::ApiResult,
    middleware::identity::is_safe_next,
};

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

impl NextQuery {
    /// The post-login destination, if it is a safe local path
    fn safe_next(&self) -> Option<&str> {
        self.next.as_deref().filter(|next| is_safe_next(next))
    }
}

#[derive(Debug, Serialize)]
pub struct LoginPage {
    /// Where a successful login will redirect
    pub next: String,
}

pub async fn register(
    State(state): State<AppState>,
    identity: Option<Extension<AuthContext>>,
    Form(input): Form<RegisterInput>,
) -> ApiResult<Response> {
    if identity.is_some() {
        return Ok(Redirect::to("/home").into_response());
    }

    accounts::register(&state.db, input).await?;
    Ok(Redirect::to("/login").into_response())
}

pub async fn login_page(
    identity: Option<Extension<AuthContext>>,
    Query(query): Query<NextQuery>,
) -> Response {
    if identity.is_some() {
        return Redirect::to("/home").into_response();
    }

    Json(LoginPage {
        next: query.safe_next().unwrap_or("/home").to_string(),
    })
    .into_response()
}

pub async fn login(
    State(state): State<AppState>,
    identity: Option<Extension<AuthContext>>,
    Query(query): Query<NextQuery>,
    Form(input): Form<LoginInput>,
) -> ApiResult<Response> {
    if identity.is_some() {
        return Ok(Redirect::to("/home").into_response());
    }

    let outcome = accounts::login(&state.db, input, state.config.session_policy()).await?;

    let cookie = SessionCookie::issue(outcome.token, outcome.cookie_max_age)
        .secure(state.config.api.production)
        .header_value();
    let target = query.safe_next().unwrap_or("/home");

    Ok(([(header::SET_COOKIE, cookie)], Redirect::to(target)).into_response())
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<Response> {
    accounts::logout(&state.db, &ctx).await?;

    let cookie = SessionCookie::clear()
        .secure(state.config.api.production)
        .header_value();

    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/home")).into_response())
}
