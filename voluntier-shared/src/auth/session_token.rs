/// Session token generation
///
/// Tokens are 32 random base62 characters (about 190 bits). The raw token is
/// only ever sent to the browser; the database stores its SHA-256 hex digest.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of a session token (characters)
pub const SESSION_TOKEN_LENGTH: usize = 32;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generates a new session token
///
/// # Returns
///
/// Tuple of (plaintext_token, sha256_digest)
pub fn generate_session_token() -> (String, String) {
    let mut rng = rand::thread_rng();
    let token: String = (0..SESSION_TOKEN_LENGTH)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();
    let digest = digest_session_token(&token);

    (token, digest)
}

/// SHA-256 hex digest of a token, as stored in the `sessions` table
pub fn digest_session_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Cheap shape check before touching the database
pub fn is_well_formed(token: &str) -> bool {
    token.len() == SESSION_TOKEN_LENGTH && token.bytes().all(|b| b.is_ascii_alphanumeric())
}
