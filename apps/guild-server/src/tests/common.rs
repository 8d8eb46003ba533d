//! Common test helpers for server tests.
//!
//! Provides a test server over in-memory SQLite, bearer-header builders for
//! both roles, and shortcuts that walk the submit → approve → register flow.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use guild_store_sqlite::SqliteStore;

use crate::config::ServerConfig;
use crate::handlers::applications::{
    approve, create as create_application, ApproveApplicationResponse, CreateApplicationRequest,
};
use crate::handlers::members::{register, RegisterMemberRequest, RegisterMemberResponse};
use crate::server::GuildServer;

pub const TEST_ADMIN_KEY: &str = "test-admin-key";

pub fn test_config() -> ServerConfig {
    ServerConfig {
        admin_key: TEST_ADMIN_KEY.to_string(),
        admin_jwt_secret: "test-admin-jwt-secret".to_string(),
        member_jwt_secret: "test-member-jwt-secret".to_string(),
        member_secret_salt: Some("test-salt".to_string()),
        frontend_url: "http://localhost:3000".to_string(),
    }
}

/// Test helper: Create a GuildServer with in-memory SQLite
pub async fn create_test_server() -> GuildServer {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    GuildServer::new(store, &test_config()).unwrap()
}

/// Test helper: Authorization headers carrying the given bearer token
pub fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, format!("Bearer {token}").parse().unwrap());
    headers
}

/// Test helper: headers for a freshly logged-in admin session
pub fn admin_headers(server: &GuildServer) -> HeaderMap {
    let login = server.admin_auth.login(TEST_ADMIN_KEY).unwrap();
    bearer(&login.token)
}

/// Test helper: submit a valid application, returning its id
pub async fn submit_application(server: &GuildServer, email: &str, name: &str) -> String {
    let (status, Json(resp)) = create_application(
        State(server.clone()),
        Json(CreateApplicationRequest {
            full_name: name.to_string(),
            email: email.to_string(),
            company: "Acme".to_string(),
            why_participate:
                "I want to meet other members and exchange qualified business introductions."
                    .to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    resp.id
}

/// Test helper: approve an application as admin, returning the response
pub async fn approve_application(
    server: &GuildServer,
    application_id: &str,
) -> ApproveApplicationResponse {
    let Json(resp) = approve(
        State(server.clone()),
        admin_headers(server),
        Path(application_id.to_string()),
    )
    .await
    .unwrap();
    resp
}

/// Test helper: walk the full admission flow for a fresh member.
/// Returns the registration response (member summary, session token, secret).
pub async fn register_member(
    server: &GuildServer,
    email: &str,
    name: &str,
) -> RegisterMemberResponse {
    let application_id = submit_application(server, email, name).await;
    let approval = approve_application(server, &application_id).await;
    let (status, Json(resp)) = register(
        State(server.clone()),
        Json(RegisterMemberRequest {
            token: approval.token,
            phone: None,
            position: None,
            company_description: None,
            linkedin_url: None,
        }),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    resp
}
