/// Error taxonomy shared by all workflow operations

use serde::Serialize;
use validator::ValidationErrors;

use crate::auth::{authorization::AuthzError, password::PasswordError};
use crate::storage::StorageError;

/// Message used for every failed login, whichever credential was wrong
pub const LOGIN_FAILED: &str = "Login unsuccessful. Please check email and password";

/// A single field-level validation message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Flattens `validator` output into field errors, ordered by field name
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Invalid value".to_string()),
            })
        })
        .collect();

    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Input rejected before anything was written
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// Bad credentials
    #[error("{}", LOGIN_FAILED)]
    Auth,

    /// No identity on an operation that needs one
    #[error("Please log in to access this page")]
    Unauthorized,

    /// Authenticated, but not the owner or author
    #[error("You are not allowed to do that")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Storage error: {0}")]
    Storage(StorageError),
}

impl ServiceError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    pub fn not_found(what: &str) -> Self {
        Self::NotFound(what.to_string())
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(field_errors(&errors))
    }
}

impl From<AuthzError> for ServiceError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::NotFound(what) => Self::not_found(what),
            AuthzError::NotOwner(_) => Self::Forbidden,
            AuthzError::DatabaseError(e) => Self::Database(e),
        }
    }
}

/// Bad uploads are the caller's fault and surface on the `picture` field
impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UnsupportedExtension => {
                Self::field("picture", "File does not have an approved extension: jpg, png")
            }
            StorageError::InvalidImage(_) => Self::field("picture", "File is not a valid image"),
            other => Self::Storage(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Form {
        #[validate(length(min = 2, max = 15, message = "Field must be between 2 and 15 characters long."))]
        username: String,
        #[validate(email(message = "Invalid email address."))]
        email: String,
    }

    #[test]
    fn test_field_errors_are_sorted_and_keep_messages() {
        let errors = Form {
            username: "x".to_string(),
            email: "nope".to_string(),
        }
        .validate()
        .unwrap_err();

        let fields = field_errors(&errors);
        assert_eq!(
            fields,
            vec![
                FieldError::new("email", "Invalid email address."),
                FieldError::new("username", "Field must be between 2 and 15 characters long."),
            ]
        );
    }

    #[test]
    fn test_authz_mapping() {
        assert!(matches!(
            ServiceError::from(AuthzError::NotOwner("post")),
            ServiceError::Forbidden
        ));
        assert!(matches!(
            ServiceError::from(AuthzError::NotFound("project")),
            ServiceError::NotFound(ref what) if what == "project"
        ));
    }

    #[test]
    fn test_bad_upload_is_validation() {
        match ServiceError::from(StorageError::UnsupportedExtension) {
            ServiceError::Validation(errors) => assert_eq!(errors[0].field, "picture"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
