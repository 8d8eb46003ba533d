//! Invitation handlers: public token validation.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use guild_storage::{Application, InvitationToken, Store, StoreError};

use crate::error::ApiError;
use crate::server::GuildServer;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitedApplication {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub company: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateInvitationResponse {
    pub valid: bool,
    pub application: InvitedApplication,
}

/// Shared invitation check: NotFound if absent, Validation if consumed or
/// expired. Member registration reuses this so its failures are identical.
pub(crate) async fn validate_invitation(
    server: &GuildServer,
    token: &str,
) -> Result<(InvitationToken, Application), ApiError> {
    let invitation = server
        .store
        .get_invitation_by_token(token)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::not_found("Invitation token not found"),
            e => e.into(),
        })?;

    if invitation.used {
        return Err(ApiError::validation(
            "Invitation token has already been used",
        ));
    }
    if Utc::now() > invitation.expires_at {
        return Err(ApiError::validation("Invitation token has expired"));
    }

    let application = server
        .store
        .get_application(&invitation.application_id)
        .await?;

    Ok((invitation, application))
}

/// GET /invitations/{token} — public; the token itself is the credential.
pub async fn validate(
    State(server): State<GuildServer>,
    Path(token): Path<String>,
) -> Result<Json<ValidateInvitationResponse>, ApiError> {
    let (_invitation, application) = validate_invitation(&server, &token).await?;

    Ok(Json(ValidateInvitationResponse {
        valid: true,
        application: InvitedApplication {
            id: application.id.0.to_string(),
            full_name: application.full_name,
            email: application.email,
            company: application.company,
        },
    }))
}
