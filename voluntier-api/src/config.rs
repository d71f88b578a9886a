/// Configuration management for the API server
///
/// Loaded once at startup from environment variables (and `.env` when
/// present), then shared read-only through `AppState`.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: SQLite connection string (default: sqlite://voluntier.db)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `API_PRODUCTION`: Enables HSTS and `Secure` cookies (default: false)
/// - `CORS_ORIGINS`: Comma separated origins, `*` for any (default: *)
/// - `SESSION_TTL_HOURS`: Lifetime of a normal login (default: 24)
/// - `REMEMBER_DAYS`: Lifetime of a "remember me" login (default: 30)
/// - `PICTURE_DIR`: Where profile pictures are stored (default: static/profile_pictures)
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use voluntier_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use voluntier_shared::services::accounts::SessionPolicy;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub storage: StorageConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Production mode: HSTS header and `Secure` session cookies
    pub production: bool,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Session lifetimes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub ttl_hours: i64,
    pub remember_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding uploaded profile pictures
    pub picture_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                production: false,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: "sqlite://voluntier.db".to_string(),
                max_connections: 10,
            },
            session: SessionConfig {
                ttl_hours: 24,
                remember_days: 30,
            },
            storage: StorageConfig {
                picture_dir: "static/profile_pictures".to_string(),
            },
        }
    }
}

/// Reads and parses a variable, falling back to `default` when unset
fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to a value that doesn't parse or
    /// a session lifetime isn't positive.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect::<Vec<_>>()
            })
            .unwrap_or(defaults.api.cors_origins);

        let config = Self {
            api: ApiConfig {
                host: env::var("API_HOST").unwrap_or(defaults.api.host),
                port: env_or("API_PORT", defaults.api.port)?,
                production: env_or("API_PRODUCTION", defaults.api.production)?,
                cors_origins,
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(defaults.database.url),
                max_connections: env_or(
                    "DATABASE_MAX_CONNECTIONS",
                    defaults.database.max_connections,
                )?,
            },
            session: SessionConfig {
                ttl_hours: env_or("SESSION_TTL_HOURS", defaults.session.ttl_hours)?,
                remember_days: env_or("REMEMBER_DAYS", defaults.session.remember_days)?,
            },
            storage: StorageConfig {
                picture_dir: env::var("PICTURE_DIR").unwrap_or(defaults.storage.picture_dir),
            },
        };

        if config.session.ttl_hours <= 0 || config.session.remember_days <= 0 {
            anyhow::bail!("SESSION_TTL_HOURS and REMEMBER_DAYS must be positive");
        }

        Ok(config)
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    pub fn session_policy(&self) -> SessionPolicy {
        SessionPolicy {
            session_ttl: chrono::Duration::hours(self.session.ttl_hours),
            remember_ttl: chrono::Duration::days(self.session.remember_days),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let mut config = Config::default();
        config.api.host = "127.0.0.1".to_string();
        config.api.port = 3000;

        assert_eq!(config.bind_address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_session_policy() {
        let policy = Config::default().session_policy();
        assert_eq!(policy.session_ttl, chrono::Duration::hours(24));
        assert_eq!(policy.remember_ttl, chrono::Duration::days(30));
    }

    #[test]
    fn test_env_or_falls_back_when_unset() {
        let port: u16 = env_or("VOLUNTIER_TEST_UNSET_VARIABLE", 8080).unwrap();
        assert_eq!(port, 8080);
    }
}
