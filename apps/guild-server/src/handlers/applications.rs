//! Application handlers: submit, list, fetch, approve, reject.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use guild_auth::generate_invite_token;
use guild_storage::{
    Application, ApplicationId, ApplicationStatus, CreateApplicationParams, InvitationToken,
    Store, StoreError,
};

use crate::error::ApiError;
use crate::handlers::members::MemberRecord;
use crate::server::GuildServer;

const INVITATION_EXPIRATION_DAYS: i64 = 7;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    pub full_name: String,
    pub email: String,
    pub company: String,
    pub why_participate: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationResponse {
    pub id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub company: String,
    pub why_participate: String,
    pub status: String,
    pub created_at: String,
    pub reviewed_at: Option<String>,
    pub rejection_reason: Option<String>,
}

impl From<&Application> for ApplicationRecord {
    fn from(application: &Application) -> Self {
        Self {
            id: application.id.0.to_string(),
            full_name: application.full_name.clone(),
            email: application.email.clone(),
            company: application.company.clone(),
            why_participate: application.why_participate.clone(),
            status: application.status.as_str().to_string(),
            created_at: application.created_at.to_rfc3339(),
            reviewed_at: application.reviewed_at.map(|t| t.to_rfc3339()),
            rejection_reason: application.rejection_reason.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationTokenView {
    pub token: String,
    pub application_id: String,
    pub expires_at: String,
    pub used: bool,
    pub created_at: String,
}

impl From<&InvitationToken> for InvitationTokenView {
    fn from(invitation: &InvitationToken) -> Self {
        Self {
            token: invitation.token.clone(),
            application_id: invitation.application_id.0.to_string(),
            expires_at: invitation.expires_at.to_rfc3339(),
            used: invitation.used,
            created_at: invitation.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDetail {
    #[serde(flatten)]
    pub application: ApplicationRecord,
    pub invitation_token: Option<InvitationTokenView>,
    pub member: Option<MemberRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveApplicationResponse {
    pub token: String,
    pub invite_link: String,
    pub expires_at: String,
    pub message: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct RejectApplicationRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RejectApplicationResponse {
    pub message: String,
}

/// POST /applications — public submission.
pub async fn create(
    State(server): State<GuildServer>,
    Json(req): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<CreateApplicationResponse>), ApiError> {
    validate_create(&req)?;

    // Pre-check for a friendly message; the unique index is the real guard.
    if server
        .store
        .get_application_by_email(&req.email)
        .await?
        .is_some()
    {
        return Err(duplicate_email());
    }

    let application = server
        .store
        .create_application(&CreateApplicationParams {
            full_name: req.full_name,
            email: req.email,
            company: req.company,
            why_participate: req.why_participate,
        })
        .await
        .map_err(|e| match e {
            StoreError::AlreadyExists => duplicate_email(),
            e => e.into(),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(CreateApplicationResponse {
            id: application.id.0.to_string(),
            status: application.status.as_str().to_string(),
            message: "Application submitted successfully! Await approval.".to_string(),
        }),
    ))
}

#[derive(Debug, Deserialize, Default)]
pub struct ListApplicationsQuery {
    pub status: Option<String>,
}

/// GET /applications?status= — admin listing, newest-first.
pub async fn list(
    State(server): State<GuildServer>,
    headers: HeaderMap,
    Query(query): Query<ListApplicationsQuery>,
) -> Result<Json<Vec<ApplicationRecord>>, ApiError> {
    server.require_admin(&headers)?;

    let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) => Some(
            raw.to_uppercase()
                .parse::<ApplicationStatus>()
                .map_err(|_| ApiError::validation("Invalid application status"))?,
        ),
    };

    let applications = server.store.list_applications(status).await?;
    Ok(Json(
        applications.iter().map(ApplicationRecord::from).collect(),
    ))
}

/// GET /applications/{id} — admin fetch, with invitation token and member.
pub async fn get_one(
    State(server): State<GuildServer>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ApplicationDetail>, ApiError> {
    server.require_admin(&headers)?;
    let id = parse_application_id(&id)?;

    let application = server
        .store
        .get_application(&id)
        .await
        .map_err(application_not_found)?;
    let invitation = server.store.get_invitation_for_application(&id).await?;
    let member = server.store.get_member_by_application(&id).await?;

    Ok(Json(ApplicationDetail {
        application: ApplicationRecord::from(&application),
        invitation_token: invitation.as_ref().map(InvitationTokenView::from),
        member: member.as_ref().map(MemberRecord::from),
    }))
}

/// POST /applications/{id}/approve — admin; mints the invitation token.
pub async fn approve(
    State(server): State<GuildServer>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ApproveApplicationResponse>, ApiError> {
    server.require_admin(&headers)?;
    let id = parse_application_id(&id)?;

    let application = server
        .store
        .get_application(&id)
        .await
        .map_err(application_not_found)?;
    if application.status != ApplicationStatus::Pending {
        return Err(not_pending("approved"));
    }

    let token = generate_invite_token();
    let expires_at = Utc::now() + Duration::days(INVITATION_EXPIRATION_DAYS);

    let invitation = server
        .store
        .approve_application(&id, &token, expires_at)
        .await
        .map_err(|e| match e {
            // Lost the race against another reviewer; same answer as the guard.
            StoreError::Conflict => not_pending("approved"),
            e => e.into(),
        })?;

    info!(application_id = %id.0, "application approved");

    Ok(Json(ApproveApplicationResponse {
        invite_link: server.invite_link(&invitation.token),
        token: invitation.token,
        expires_at: invitation.expires_at.to_rfc3339(),
        message: "Application approved successfully!".to_string(),
    }))
}

/// POST /applications/{id}/reject — admin; reason is optional.
pub async fn reject(
    State(server): State<GuildServer>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Option<Json<RejectApplicationRequest>>,
) -> Result<Json<RejectApplicationResponse>, ApiError> {
    server.require_admin(&headers)?;
    let id = parse_application_id(&id)?;
    let reason = body.and_then(|Json(b)| b.reason);

    let application = server
        .store
        .get_application(&id)
        .await
        .map_err(application_not_found)?;
    if application.status != ApplicationStatus::Pending {
        return Err(not_pending("rejected"));
    }

    server
        .store
        .reject_application(&id, reason.as_deref())
        .await
        .map_err(|e| match e {
            StoreError::Conflict => not_pending("rejected"),
            e => e.into(),
        })?;

    info!(application_id = %id.0, "application rejected");

    Ok(Json(RejectApplicationResponse {
        message: "Application rejected".to_string(),
    }))
}

pub(crate) fn parse_application_id(raw: &str) -> Result<ApplicationId, ApiError> {
    Uuid::try_parse(raw)
        .map(ApplicationId)
        .map_err(|_| ApiError::not_found("Application not found"))
}

fn application_not_found(e: StoreError) -> ApiError {
    match e {
        StoreError::NotFound => ApiError::not_found("Application not found"),
        e => e.into(),
    }
}

fn duplicate_email() -> ApiError {
    ApiError::validation("An application with this email already exists")
}

fn not_pending(action: &str) -> ApiError {
    ApiError::validation(format!("Only pending applications can be {action}"))
}

fn validate_create(req: &CreateApplicationRequest) -> Result<(), ApiError> {
    if req.full_name.trim().chars().count() < 3 {
        return Err(ApiError::validation(
            "Full name must be at least 3 characters",
        ));
    }
    if !is_valid_email(&req.email) {
        return Err(ApiError::validation("Invalid email address"));
    }
    if req.company.trim().chars().count() < 2 {
        return Err(ApiError::validation(
            "Company name must be at least 2 characters",
        ));
    }
    if req.why_participate.trim().chars().count() < 50 {
        return Err(ApiError::validation(
            "Please explain in more detail (minimum 50 characters)",
        ));
    }
    Ok(())
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
