/// Identity resolution and the login requirement
///
/// [`resolve_identity`] runs on every request: a valid `voluntier_session`
/// cookie puts an [`AuthContext`] into the request extensions, anything else
/// leaves the request anonymous. [`require_login`] guards routes that need an
/// identity and sends anonymous callers to the login page, remembering where
/// they were going.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;
use voluntier_shared::{
    auth::identity::{resolve_session, session_token_from_header, AuthContext},
    services::require_login as required_identity,
};

use crate::{app::AppState, error::ApiError};

pub async fn resolve_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(session_token_from_header)
        .map(str::to_string);

    if let Some(token) = token {
        match resolve_session(&state.db, &token).await? {
            Some(ctx) => {
                request.extensions_mut().insert(ctx);
            }
            None => debug!("Ignoring unknown or expired session cookie"),
        }
    }

    Ok(next.run(request).await)
}

pub async fn require_login(request: Request, next: Next) -> Response {
    let identity = request.extensions().get::<AuthContext>().cloned();

    match required_identity(identity) {
        Ok(_) => next.run(request).await,
        Err(_) => {
            let next_path = request
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| "/".to_string());

            ApiError::LoginRequired { next: next_path }.into_response()
        }
    }
}

/// Whether `next` is a same-site path that is safe to redirect to
pub fn is_safe_next(next: &str) -> bool {
    next.starts_with('/')
        && !next.starts_with("//")
        && !next.contains('\\')
        && !next.contains("://")
        && !next.chars().any(char::is_control)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next() {
        assert!(is_safe_next("/account"));
        assert!(is_safe_next("/project/1/view_members?page=2"));

        assert!(!is_safe_next(""));
        assert!(!is_safe_next("account"));
        assert!(!is_safe_next("//evil.example.com"));
        assert!(!is_safe_next("/\\evil.example.com"));
        assert!(!is_safe_next("https://evil.example.com"));
        assert!(!is_safe_next("/redirect?to=https://evil.example.com"));
        assert!(!is_safe_next("/\r\nSet-Cookie: x=1"));
    }
}
