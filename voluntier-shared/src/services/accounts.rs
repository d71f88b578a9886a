/// Registration, login, logout and account management
///
/// Registration never logs the new user in. Login issues a server-side
/// session and hands the raw token back for the cookie; only its digest is
/// stored. Account edits always target the caller's own row.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::error::{FieldError, ServiceError, ServiceResult};
use crate::auth::{
    identity::AuthContext,
    password::{hash_password, verify_password},
    session_token::generate_session_token,
};
use crate::models::session::{CreateSession, Session};
use crate::models::unique_violation_field;
use crate::models::user::{CreateUser, UpdateUser, User};
use crate::storage::PictureStore;

const USERNAME_TAKEN: &str = "That username is taken. Please choose a different one.";
const EMAIL_TAKEN: &str = "That email is taken. Please choose a different one.";

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterInput {
    #[validate(length(min = 2, max = 15, message = "Field must be between 2 and 15 characters long."))]
    pub username: String,

    #[validate(email(message = "Invalid email address."))]
    pub email: String,

    #[validate(length(min = 1, message = "This field is required."))]
    pub password: String,

    pub confirm_password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginInput {
    #[validate(email(message = "Invalid email address."))]
    pub email: String,

    #[validate(length(min = 1, message = "This field is required."))]
    pub password: String,

    /// Checkbox value; any value other than an explicit "off" means checked
    pub remember: Option<String>,
}

impl LoginInput {
    pub fn remember(&self) -> bool {
        match self.remember.as_deref() {
            None => false,
            Some(v) => !matches!(v.trim().to_ascii_lowercase().as_str(), "" | "false" | "0" | "off" | "n"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct AccountInput {
    #[validate(length(min = 2, max = 15, message = "Field must be between 2 and 15 characters long."))]
    pub username: String,

    pub skills: Option<String>,
    pub contact_info: Option<String>,
}

/// A picture file as received from the account form
#[derive(Debug, Clone)]
pub struct PictureUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Session lifetimes
#[derive(Debug, Clone, Copy)]
pub struct SessionPolicy {
    /// Server-side lifetime of a browser-session login
    pub session_ttl: Duration,

    /// Lifetime of a "remember me" login, also used as the cookie Max-Age
    pub remember_ttl: Duration,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            session_ttl: Duration::hours(24),
            remember_ttl: Duration::days(30),
        }
    }
}

/// A freshly established login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,

    /// Raw token for the session cookie
    pub token: String,

    /// Cookie Max-Age; None for a browser-session cookie
    pub cookie_max_age: Option<Duration>,
}

/// Data pre-populating the account form
#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub skills: Option<String>,
    pub contact_info: Option<String>,
    pub profile_picture: String,
}

impl From<User> for AccountView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            skills: user.skills,
            contact_info: user.contact_info,
            profile_picture: user.profile_picture,
        }
    }
}

/// Creates an account
///
/// # Errors
///
/// `Validation` for malformed fields, a password confirmation mismatch or a
/// username/email that already exists.
pub async fn register(pool: &SqlitePool, input: RegisterInput) -> ServiceResult<User> {
    let input = RegisterInput {
        username: input.username.trim().to_string(),
        email: input.email.trim().to_string(),
        ..input
    };

    let mut errors = match input.validate() {
        Ok(()) => Vec::new(),
        Err(e) => super::error::field_errors(&e),
    };

    if input.password != input.confirm_password {
        errors.push(FieldError::new("confirm_password", "Field must be equal to password."));
    }
    if User::find_by_username(pool, &input.username).await?.is_some() {
        errors.push(FieldError::new("username", USERNAME_TAKEN));
    }
    if User::find_by_email(pool, &input.email).await?.is_some() {
        errors.push(FieldError::new("email", EMAIL_TAKEN));
    }

    if !errors.is_empty() {
        return Err(ServiceError::Validation(errors));
    }

    let password_hash = hash_password(&input.password)?;

    let user = User::create(
        pool,
        CreateUser {
            username: input.username,
            email: input.email,
            password_hash,
        },
    )
    .await
    .map_err(taken_or_database)?;

    info!(user_id = %user.id, username = %user.username, "User registered");
    Ok(user)
}

/// Verifies credentials and opens a session
///
/// The `remember` flag only changes how long the session lasts.
pub async fn login(
    pool: &SqlitePool,
    input: LoginInput,
    policy: SessionPolicy,
) -> ServiceResult<LoginOutcome> {
    input.validate()?;
    let remember = input.remember();

    let Some(user) = User::find_by_email(pool, input.email.trim()).await? else {
        warn!("Login failed: unknown email");
        return Err(ServiceError::Auth);
    };

    if !verify_password(&input.password, &user.password_hash)? {
        warn!(user_id = %user.id, "Login failed: wrong password");
        return Err(ServiceError::Auth);
    }

    let (token, token_hash) = generate_session_token();
    let ttl = if remember {
        policy.remember_ttl
    } else {
        policy.session_ttl
    };

    Session::create(
        pool,
        CreateSession {
            token_hash,
            user_id: user.id,
            persistent: remember,
            ttl,
        },
    )
    .await?;

    info!(user_id = %user.id, remember, "User logged in");

    Ok(LoginOutcome {
        user,
        token,
        cookie_max_age: remember.then_some(policy.remember_ttl),
    })
}

/// Ends the caller's session
pub async fn logout(pool: &SqlitePool, ctx: &AuthContext) -> ServiceResult<()> {
    Session::delete(pool, &ctx.token_hash).await?;
    info!(user_id = %ctx.user_id, "User logged out");
    Ok(())
}

/// The caller's own account
pub async fn account(pool: &SqlitePool, ctx: &AuthContext) -> ServiceResult<AccountView> {
    let user = User::find_by_id(pool, ctx.user_id)
        .await?
        .ok_or(ServiceError::Unauthorized)?;

    Ok(user.into())
}

/// Updates the caller's profile and, optionally, their picture
///
/// A new picture is stored before the row is updated; the previous one is
/// removed only once the update has succeeded.
pub async fn edit_account(
    pool: &SqlitePool,
    pictures: &PictureStore,
    ctx: &AuthContext,
    input: AccountInput,
    picture: Option<PictureUpload>,
) -> ServiceResult<AccountView> {
    let input = AccountInput {
        username: input.username.trim().to_string(),
        ..input
    };
    input.validate()?;

    let current = User::find_by_id(pool, ctx.user_id)
        .await?
        .ok_or(ServiceError::Unauthorized)?;

    if input.username != current.username
        && User::find_by_username(pool, &input.username).await?.is_some()
    {
        return Err(ServiceError::field("username", USERNAME_TAKEN));
    }

    let new_picture = match picture {
        Some(upload) => Some(pictures.save(upload.bytes, &upload.filename).await?),
        None => None,
    };

    let update = UpdateUser {
        username: Some(input.username),
        skills: input.skills.map(Some),
        contact_info: input.contact_info.map(Some),
        profile_picture: new_picture.clone(),
    };

    let updated = match User::update(pool, ctx.user_id, update).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            discard_picture(pictures, new_picture.as_deref()).await;
            return Err(ServiceError::Unauthorized);
        }
        Err(e) => {
            discard_picture(pictures, new_picture.as_deref()).await;
            return Err(taken_or_database(e));
        }
    };

    if new_picture.is_some() && current.profile_picture != updated.profile_picture {
        if let Err(e) = pictures.delete(&current.profile_picture).await {
            warn!(picture = %current.profile_picture, error = %e, "Failed to remove old profile picture");
        }
    }

    info!(user_id = %updated.id, "Account updated");
    Ok(updated.into())
}

async fn discard_picture(pictures: &PictureStore, name: Option<&str>) {
    if let Some(name) = name {
        if let Err(e) = pictures.delete(name).await {
            warn!(picture = %name, error = %e, "Failed to discard unused profile picture");
        }
    }
}

/// Turns a lost uniqueness race into the same message the pre-checks give
fn taken_or_database(err: sqlx::Error) -> ServiceError {
    match unique_violation_field(&err).as_deref() {
        Some("username") => ServiceError::field("username", USERNAME_TAKEN),
        Some("email") => ServiceError::field("email", EMAIL_TAKEN),
        _ => ServiceError::Database(err),
    }
}
