/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`session_token`]: Session token generation and digests
/// - [`identity`]: The resolved identity of a request and session cookie helpers
/// - [`authorization`]: Ownership and authorship checks for mutations
///
/// # Example
///
/// ```no_run
/// use voluntier_shared::auth::password::{hash_password, verify_password};
/// use voluntier_shared::auth::session_token::generate_session_token;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let (token, digest) = generate_session_token();
/// assert_ne!(token, digest);
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod identity;
pub mod password;
pub mod session_token;
