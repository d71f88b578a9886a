/// Workflow operations
///
/// Each operation takes the persistence handle and, where it needs one, the
/// caller's [`AuthContext`] as explicit parameters, and returns a
/// [`ServiceResult`]. Handlers never touch the models directly.
///
/// # Modules
///
/// - [`accounts`]: register, login, logout, account view and edit
/// - [`content`]: projects, posts, home listing, my projects
/// - [`applications`]: apply, accept, reject, applications and members
/// - [`search`]: post search

pub mod accounts;
pub mod applications;
pub mod content;
pub mod error;
pub mod search;

pub use error::{FieldError, ServiceError, ServiceResult};

use crate::auth::identity::AuthContext;

/// Turns an optional identity into a required one
pub fn require_login(identity: Option<AuthContext>) -> ServiceResult<AuthContext> {
    identity.ok_or(ServiceError::Unauthorized)
}
