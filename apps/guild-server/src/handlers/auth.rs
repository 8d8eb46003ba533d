//! Login handlers for the two principal roles.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use guild_storage::{MemberSummary, Store};

use crate::error::ApiError;
use crate::handlers::members::MemberSummaryView;
use crate::server::GuildServer;

/// Single message for every member credential failure; callers must not
/// learn whether the email or the secret was wrong.
const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginResponse {
    pub token: String,
    pub expires_in: i64,
}

#[derive(Debug, Deserialize)]
pub struct MemberLoginRequest {
    pub email: String,
    pub secret: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberLoginResponse {
    pub token: String,
    pub member: MemberSummaryView,
}

/// POST /admin/auth/login — exchange the admin key for a session.
pub async fn admin_login(
    State(server): State<GuildServer>,
    Json(req): Json<AdminLoginRequest>,
) -> Result<Json<AdminLoginResponse>, ApiError> {
    if req.key.is_empty() {
        return Err(ApiError::validation("The admin key is required"));
    }

    let login = server
        .admin_auth
        .login(&req.key)
        .map_err(|_| ApiError::unauthorized("Invalid admin key"))?;

    Ok(Json(AdminLoginResponse {
        token: login.token,
        expires_in: login.expires_in,
    }))
}

/// POST /members/auth/login — email + one-time-issued secret.
pub async fn member_login(
    State(server): State<GuildServer>,
    Json(req): Json<MemberLoginRequest>,
) -> Result<Json<MemberLoginResponse>, ApiError> {
    if req.email.is_empty() || req.secret.is_empty() {
        return Err(ApiError::validation("Email and secret are required"));
    }

    let member = server
        .store
        .get_member_by_email(&req.email)
        .await?
        .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;

    if member.auth_secret_hash.is_empty()
        || server.member_auth.hash_secret(&req.secret) != member.auth_secret_hash
    {
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let token = server
        .member_auth
        .generate_token(&member.id.0.to_string(), &member.email)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(MemberLoginResponse {
        token,
        member: MemberSummaryView::from(&MemberSummary::from(&member)),
    }))
}
