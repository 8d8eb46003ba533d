//! Admin authentication: static key check + signed admin sessions.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::AuthError;

/// Admin session validity, in seconds (12 hours).
pub const ADMIN_TOKEN_TTL_SECS: i64 = 12 * 60 * 60;

/// Claims carried by an admin session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
}

/// Successful admin login: the session token and its validity in seconds.
#[derive(Debug, Clone)]
pub struct AdminLogin {
    pub token: String,
    pub expires_in: i64,
}

/// Verifies the static admin key and issues/validates admin sessions.
///
/// Holds no mutable state; both secrets are fixed at construction.
pub struct AdminAuth {
    admin_key: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AdminAuth {
    /// Fails if either secret is empty.
    pub fn new(admin_key: &str, jwt_secret: &str) -> Result<Self, AuthError> {
        if admin_key.is_empty() {
            return Err(AuthError::MissingSecret("admin key"));
        }
        if jwt_secret.is_empty() {
            return Err(AuthError::MissingSecret("admin JWT secret"));
        }
        Ok(Self {
            admin_key: admin_key.to_string(),
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
        })
    }

    /// Exchange the admin key for a signed session token.
    pub fn login(&self, provided_key: &str) -> Result<AdminLogin, AuthError> {
        if provided_key.is_empty() || provided_key != self.admin_key {
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now().timestamp();
        let claims = AdminClaims {
            sub: "admin".to_string(),
            token_type: "admin".to_string(),
            iat: now,
            exp: now + ADMIN_TOKEN_TTL_SECS,
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| AuthError::InvalidCredentials)?;

        Ok(AdminLogin {
            token,
            expires_in: ADMIN_TOKEN_TTL_SECS,
        })
    }

    /// Verify signature, expiry and token type; returns the decoded claims.
    pub fn verify_token(&self, token: &str) -> Result<AdminClaims, AuthError> {
        let data = jsonwebtoken::decode::<AdminClaims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| AuthError::InvalidToken)?;

        if data.claims.token_type != "admin" {
            return Err(AuthError::InvalidToken);
        }

        Ok(data.claims)
    }
}
