//! Authentication services for the guild admission platform.
//!
//! Two stateless services built on HS256 session tokens: [`AdminAuth`]
//! verifies a static admin key and issues short-lived admin sessions;
//! [`MemberAuth`] generates/hashes member secrets and issues member
//! sessions. Store-backed checks (loading the member behind a session)
//! live in the server, not here.

use thiserror::Error;

mod admin;
mod member;
mod token;

pub use admin::{AdminAuth, AdminClaims, AdminLogin};
pub use member::{MemberAuth, MemberClaims, DEFAULT_SECRET_SALT};
pub use token::generate_invite_token;

/// Uniform error type for both authentication services.
///
/// Verification failures are deliberately undifferentiated: callers must
/// not learn whether a credential was malformed, expired, or mis-typed.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0} must not be empty")]
    MissingSecret(&'static str),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid or expired token")]
    InvalidToken,
}
