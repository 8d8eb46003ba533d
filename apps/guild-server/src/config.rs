//! Server configuration.
//!
//! All secrets come from environment variables, read once at startup:
//!
//! ```bash
//! GUILD_ADMIN_KEY=...            # static admin key (required)
//! GUILD_ADMIN_JWT_SECRET=...     # admin session signing secret (required)
//! GUILD_MEMBER_JWT_SECRET=...    # member session signing secret (required)
//! GUILD_MEMBER_SECRET_SALT=...   # member secret hashing salt (optional; a
//!                                # built-in fallback is used, with a warning)
//! GUILD_FRONTEND_URL=...         # base url for invite links
//! DATABASE_URL=sqlite://...      # sqlite database url
//! ```

use std::env;

use thiserror::Error;

const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Static admin key checked at admin login.
    pub admin_key: String,
    /// Signing secret for admin session tokens.
    pub admin_jwt_secret: String,
    /// Signing secret for member session tokens.
    pub member_jwt_secret: String,
    /// Salt for member secret hashing; None falls back to the built-in
    /// default (degraded, warned about at startup).
    pub member_secret_salt: Option<String>,
    /// Base url used to build invitation links.
    pub frontend_url: String,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            admin_key: require("GUILD_ADMIN_KEY")?,
            admin_jwt_secret: require("GUILD_ADMIN_JWT_SECRET")?,
            member_jwt_secret: require("GUILD_MEMBER_JWT_SECRET")?,
            member_secret_salt: env::var("GUILD_MEMBER_SECRET_SALT")
                .ok()
                .filter(|s| !s.is_empty()),
            frontend_url: env::var("GUILD_FRONTEND_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string()),
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or(ConfigError::MissingEnvVar(name))
}
