//! Member handlers: registration, admin listings, public directory.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use guild_storage::{CreateMemberParams, Member, MemberId, MemberSummary, Store, StoreError};

use crate::error::ApiError;
use crate::handlers::applications::ApplicationRecord;
use crate::handlers::invitations::validate_invitation;
use crate::server::GuildServer;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummaryView {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub company: String,
}

impl From<&MemberSummary> for MemberSummaryView {
    fn from(summary: &MemberSummary) -> Self {
        Self {
            id: summary.id.0.to_string(),
            full_name: summary.full_name.clone(),
            email: summary.email.clone(),
            company: summary.company.clone(),
        }
    }
}

/// Public-safe member record for admin listings; never carries the secret
/// hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRecord {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub company: String,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Member> for MemberRecord {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id.0.to_string(),
            full_name: member.full_name.clone(),
            email: member.email.clone(),
            company: member.company.clone(),
            position: member.position.clone(),
            phone: member.phone.clone(),
            linkedin_url: member.linkedin_url.clone(),
            created_at: member.created_at.to_rfc3339(),
            updated_at: member.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterMemberRequest {
    pub token: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub company_description: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterMemberResponse {
    pub message: String,
    pub member: MemberSummaryView,
    /// Member session token.
    pub token: String,
    /// One-time plaintext secret; never stored or shown again.
    pub auth_secret: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDetail {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub company: String,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub company_description: Option<String>,
    pub linkedin_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub application: ApplicationRecord,
}

/// POST /members — public; redeems a valid invitation token.
pub async fn register(
    State(server): State<GuildServer>,
    Json(req): Json<RegisterMemberRequest>,
) -> Result<(StatusCode, Json<RegisterMemberResponse>), ApiError> {
    let (invitation, application) = validate_invitation(&server, &req.token).await?;

    if server
        .store
        .get_member_by_application(&application.id)
        .await?
        .is_some()
    {
        return Err(already_registered());
    }

    let auth_secret = server.member_auth.generate_secret();
    let auth_secret_hash = server.member_auth.hash_secret(&auth_secret);

    let member = server
        .store
        .create_member(&CreateMemberParams {
            application_id: application.id.clone(),
            full_name: application.full_name.clone(),
            email: application.email.clone(),
            company: application.company.clone(),
            phone: req.phone,
            position: req.position,
            company_description: req.company_description,
            linkedin_url: req.linkedin_url,
            auth_secret_hash,
        })
        .await
        .map_err(|e| match e {
            // The one-member-per-application index caught a concurrent redeem.
            StoreError::AlreadyExists => already_registered(),
            e => e.into(),
        })?;

    server.store.mark_invitation_used(&invitation.token).await?;

    let token = server
        .member_auth
        .generate_token(&member.id.0.to_string(), &member.email)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    info!(member_id = %member.id.0, "member registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterMemberResponse {
            message: "Registration completed successfully!".to_string(),
            member: MemberSummaryView::from(&MemberSummary::from(&member)),
            token,
            auth_secret,
        }),
    ))
}

/// GET /members — admin listing, newest-first.
pub async fn list(
    State(server): State<GuildServer>,
    headers: HeaderMap,
) -> Result<Json<Vec<MemberRecord>>, ApiError> {
    server.require_admin(&headers)?;
    let members = server.store.list_members().await?;
    Ok(Json(members.iter().map(MemberRecord::from).collect()))
}

/// GET /members/{id} — admin; includes the source application.
pub async fn get_one(
    State(server): State<GuildServer>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<MemberDetail>, ApiError> {
    server.require_admin(&headers)?;

    let id = Uuid::try_parse(&id)
        .map(MemberId)
        .map_err(|_| member_not_found())?;
    let member = server.store.get_member(&id).await.map_err(|e| match e {
        StoreError::NotFound => member_not_found(),
        e => e.into(),
    })?;
    let application = server.store.get_application(&member.application_id).await?;

    Ok(Json(MemberDetail {
        id: member.id.0.to_string(),
        full_name: member.full_name,
        email: member.email,
        company: member.company,
        phone: member.phone,
        position: member.position,
        company_description: member.company_description,
        linkedin_url: member.linkedin_url,
        created_at: member.created_at.to_rfc3339(),
        updated_at: member.updated_at.to_rfc3339(),
        application: ApplicationRecord::from(&application),
    }))
}

/// GET /members/directory — any authenticated member; names only.
pub async fn directory(
    State(server): State<GuildServer>,
    headers: HeaderMap,
) -> Result<Json<Vec<MemberSummaryView>>, ApiError> {
    server.authenticate_member(&headers).await?;
    let directory = server.store.list_directory().await?;
    Ok(Json(directory.iter().map(MemberSummaryView::from).collect()))
}

fn already_registered() -> ApiError {
    ApiError::validation("A member is already registered for this application")
}

fn member_not_found() -> ApiError {
    ApiError::not_found("Member not found")
}
