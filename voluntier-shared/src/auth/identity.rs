/// Request identity and the session cookie
///
/// Every request is either anonymous or carries an [`AuthContext`] resolved
/// from the `voluntier_session` cookie. Resolution looks the token digest up
/// in the `sessions` table, so a logged-out or expired session never resolves.
///
/// # Example
///
/// ```no_run
/// use voluntier_shared::auth::identity::{resolve_session, session_token_from_header};
/// use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool) -> Result<(), sqlx::Error> {
/// let header = "theme=dark; voluntier_session=abc";
/// if let Some(token) = session_token_from_header(header) {
///     let identity = resolve_session(&pool, token).await?;
///     println!("authenticated: {}", identity.is_some());
/// }
/// # Ok(())
/// # }
/// ```

use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::session_token::{digest_session_token, is_well_formed};
use crate::models::session::Session;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "voluntier_session";

/// Identity of an authenticated request
///
/// Inserted into request extensions by the identity middleware. Anonymous
/// requests carry no `AuthContext`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthContext {
    /// Authenticated user
    pub user_id: Uuid,

    /// Digest of the session token, used to end the session on logout
    #[serde(skip_serializing)]
    pub token_hash: String,

    /// Whether the session was created with "remember me"
    pub persistent: bool,
}

impl AuthContext {
    pub fn from_session(session: &Session) -> Self {
        Self {
            user_id: session.user_id,
            token_hash: session.token_hash.clone(),
            persistent: session.persistent,
        }
    }
}

/// Resolves a raw session token into an identity
///
/// Returns `Ok(None)` for malformed, unknown or expired tokens.
pub async fn resolve_session(
    pool: &SqlitePool,
    token: &str,
) -> Result<Option<AuthContext>, sqlx::Error> {
    if !is_well_formed(token) {
        return Ok(None);
    }

    let digest = digest_session_token(token);
    let session = Session::find_active(pool, &digest).await?;

    Ok(session.as_ref().map(AuthContext::from_session))
}

/// Extracts the session token from a `Cookie` header value
pub fn session_token_from_header(header: &str) -> Option<&str> {
    cookie_value(header, SESSION_COOKIE)
}

/// Finds a cookie by name in a `Cookie` header value
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// Builder for the session `Set-Cookie` header value
#[derive(Debug, Clone)]
pub struct SessionCookie {
    value: String,
    max_age: Option<i64>,
    secure: bool,
}

impl SessionCookie {
    /// Cookie carrying a freshly issued token
    ///
    /// Without `max_age` the cookie lasts for the browser session.
    pub fn issue(token: impl Into<String>, max_age: Option<chrono::Duration>) -> Self {
        Self {
            value: token.into(),
            max_age: max_age.map(|d| d.num_seconds()),
            secure: false,
        }
    }

    /// Cookie that removes the session cookie from the browser
    pub fn clear() -> Self {
        Self {
            value: String::new(),
            max_age: Some(0),
            secure: false,
        }
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn header_value(&self) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE, self.value
        );

        if let Some(max_age) = self.max_age {
            cookie.push_str(&format!("; Max-Age={}", max_age));
        }

        if self.secure {
            cookie.push_str("; Secure");
        }

        cookie
    }
}
