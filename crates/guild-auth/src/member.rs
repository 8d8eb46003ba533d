//! Member authentication: secret generation/hashing + signed member sessions.

use chrono::Utc;
use hmac::{Hmac, Mac};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// Member session validity, in seconds (7 days).
pub const MEMBER_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Fallback salt used when no salt is configured.
///
/// A deployment running on this value has predictable secret hashes; the
/// server logs a warning at startup when it is in effect.
pub const DEFAULT_SECRET_SALT: &str = "member-secret-salt";

/// Claims carried by a member session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberClaims {
    /// Member id.
    pub sub: String,
    pub email: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
}

/// Generates and hashes member secrets, issues/validates member sessions.
pub struct MemberAuth {
    secret_salt: String,
    default_salt: bool,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl MemberAuth {
    /// Fails if the JWT secret is empty. A missing salt falls back to
    /// [`DEFAULT_SECRET_SALT`]; check [`MemberAuth::has_default_salt`] and
    /// warn loudly when that happens.
    pub fn new(jwt_secret: &str, secret_salt: Option<String>) -> Result<Self, AuthError> {
        if jwt_secret.is_empty() {
            return Err(AuthError::MissingSecret("member JWT secret"));
        }
        let default_salt = secret_salt.is_none();
        Ok(Self {
            secret_salt: secret_salt.unwrap_or_else(|| DEFAULT_SECRET_SALT.to_string()),
            default_salt,
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
        })
    }

    /// Whether the hashing salt is the built-in fallback.
    pub fn has_default_salt(&self) -> bool {
        self.default_salt
    }

    /// Generate a member's plaintext credential: 16 random bytes, hex.
    ///
    /// Shown to the member exactly once at registration.
    pub fn generate_secret(&self) -> String {
        let mut bytes = [0u8; 16];
        rand::rng().fill(&mut bytes[..]);
        hex::encode(bytes)
    }

    /// Deterministic keyed hash of a secret (HMAC-SHA256 under the salt).
    /// Used both to store and to verify.
    pub fn hash_secret(&self, secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret_salt.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(secret.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Issue a signed member session for the given member id and email.
    pub fn generate_token(&self, member_id: &str, email: &str) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = MemberClaims {
            sub: member_id.to_string(),
            email: email.to_string(),
            token_type: "member".to_string(),
            iat: now,
            exp: now + MEMBER_TOKEN_TTL_SECS,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| AuthError::InvalidToken)
    }

    /// Verify signature, expiry and token type; returns the decoded claims.
    ///
    /// The caller is responsible for checking that the member behind
    /// `claims.sub` still exists.
    pub fn verify_token(&self, token: &str) -> Result<MemberClaims, AuthError> {
        let data = jsonwebtoken::decode::<MemberClaims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| AuthError::InvalidToken)?;

        if data.claims.token_type != "member" {
            return Err(AuthError::InvalidToken);
        }

        Ok(data.claims)
    }
}
