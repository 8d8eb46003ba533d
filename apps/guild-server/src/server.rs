//! Shared server state and the authentication gate in front of handlers.

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::routing::{get, patch, post};
use axum::Router;
use uuid::Uuid;

use guild_auth::{AdminAuth, AdminClaims, MemberAuth};
use guild_storage::{MemberId, MemberSummary, Store, StoreError};

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::handlers;

/// Message used for every session-token failure, regardless of cause.
const INVALID_SESSION: &str = "Invalid or expired token";

#[derive(Clone)]
pub struct GuildServer {
    pub store: Arc<dyn Store>,
    pub admin_auth: Arc<AdminAuth>,
    pub member_auth: Arc<MemberAuth>,
    pub frontend_url: String,
}

impl GuildServer {
    pub fn new(store: Arc<dyn Store>, config: &ServerConfig) -> Result<Self, guild_auth::AuthError> {
        let admin_auth = AdminAuth::new(&config.admin_key, &config.admin_jwt_secret)?;
        let member_auth = MemberAuth::new(
            &config.member_jwt_secret,
            config.member_secret_salt.clone(),
        )?;
        Ok(Self {
            store,
            admin_auth: Arc::new(admin_auth),
            member_auth: Arc::new(member_auth),
            frontend_url: config.frontend_url.clone(),
        })
    }

    /// Require a valid admin session; returns the decoded claims.
    pub fn require_admin(&self, headers: &HeaderMap) -> Result<AdminClaims, ApiError> {
        let token = bearer_token(headers)?;
        self.admin_auth
            .verify_token(token)
            .map_err(|_| ApiError::unauthorized(INVALID_SESSION))
    }

    /// Require a valid member session and resolve the acting member.
    ///
    /// Every failure mode (bad signature, expiry, wrong token type, member
    /// deleted since issuance) collapses into the same Unauthorized.
    pub async fn authenticate_member(
        &self,
        headers: &HeaderMap,
    ) -> Result<MemberSummary, ApiError> {
        let token = bearer_token(headers)?;
        let claims = self
            .member_auth
            .verify_token(token)
            .map_err(|_| ApiError::unauthorized(INVALID_SESSION))?;

        let member_id = Uuid::try_parse(&claims.sub)
            .map(MemberId)
            .map_err(|_| ApiError::unauthorized(INVALID_SESSION))?;

        let member = self
            .store
            .get_member(&member_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => ApiError::unauthorized(INVALID_SESSION),
                e => ApiError::from(e),
            })?;

        Ok(MemberSummary::from(&member))
    }

    /// Build the registration link carried by an approval response.
    pub fn invite_link(&self, token: &str) -> String {
        format!("{}/register/{}", self.frontend_url.trim_end_matches('/'), token)
    }
}

/// Pull the bearer token out of the Authorization header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Missing authorization header"))?;

    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Invalid authorization header"))?;

    Ok(token)
}

/// Wire every route of the HTTP surface to its handler.
pub fn build_router(server: GuildServer) -> Router {
    Router::new()
        .route(
            "/applications",
            post(handlers::applications::create).get(handlers::applications::list),
        )
        .route("/applications/{id}", get(handlers::applications::get_one))
        .route(
            "/applications/{id}/approve",
            post(handlers::applications::approve),
        )
        .route(
            "/applications/{id}/reject",
            post(handlers::applications::reject),
        )
        .route("/invitations/{token}", get(handlers::invitations::validate))
        .route(
            "/members",
            post(handlers::members::register).get(handlers::members::list),
        )
        .route("/members/directory", get(handlers::members::directory))
        .route("/members/{id}", get(handlers::members::get_one))
        .route("/members/auth/login", post(handlers::auth::member_login))
        .route(
            "/indications",
            post(handlers::indications::create).get(handlers::indications::list),
        )
        .route(
            "/indications/{id}/status",
            patch(handlers::indications::update_status),
        )
        .route("/admin/dashboard", get(handlers::dashboard::performance))
        .route("/admin/auth/login", post(handlers::auth::admin_login))
        .route("/healthz", get(healthz))
        .with_state(server)
}

async fn healthz() -> &'static str {
    "ok"
}
