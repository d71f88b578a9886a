/// Middleware for the API server
///
/// - `identity`: Session cookie resolution and the login requirement
/// - `security`: Security response headers

pub mod identity;
pub mod security;
