/// API route handlers
///
/// Handlers are thin: extract, call one workflow operation, shape the
/// response. Mutations answer with a `303 See Other` redirect; reads answer
/// with JSON.
///
/// - `health`: Health check endpoint
/// - `auth`: Register, login, logout
/// - `account`: Account view and edit
/// - `posts`: Home listing, search, post create/edit/delete
/// - `projects`: Projects, applications and members

pub mod account;
pub mod auth;
pub mod health;
pub mod posts;
pub mod projects;

use serde::Deserialize;
use uuid::Uuid;
use voluntier_shared::models::pagination::PageRequest;

use crate::error::{ApiError, ApiResult};

/// `?page=` query; anything unparseable means page 1
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn request(&self) -> PageRequest {
        PageRequest::parse(self.page.as_deref())
    }
}

/// Parses an id path segment; a malformed id is as unknown as a missing one
pub(crate) fn parse_id(raw: &str, what: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(format!("{} not found", what)))
}
