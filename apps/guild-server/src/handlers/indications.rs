//! Indication handlers: create, list own, recipient-only status updates.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use guild_storage::{
    CreateIndicationParams, IndicationId, IndicationStatus, IndicationWithMembers, MemberId,
    Store, StoreError,
};

use crate::error::ApiError;
use crate::handlers::members::MemberSummaryView;
use crate::server::GuildServer;

const MAX_CONTACT_INFO_LEN: usize = 255;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIndicationRequest {
    pub target_member_id: String,
    pub contact_info: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateIndicationStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicationView {
    pub id: String,
    pub contact_info: String,
    pub description: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    pub from_member: MemberSummaryView,
    pub to_member: MemberSummaryView,
}

impl From<&IndicationWithMembers> for IndicationView {
    fn from(row: &IndicationWithMembers) -> Self {
        Self {
            id: row.indication.id.0.to_string(),
            contact_info: row.indication.contact_info.clone(),
            description: row.indication.description.clone(),
            status: row.indication.status.as_str().to_string(),
            created_at: row.indication.created_at.to_rfc3339(),
            updated_at: row.indication.updated_at.to_rfc3339(),
            from_member: MemberSummaryView::from(&row.from_member),
            to_member: MemberSummaryView::from(&row.to_member),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MemberIndicationsResponse {
    pub created: Vec<IndicationView>,
    pub received: Vec<IndicationView>,
}

/// POST /indications — acting member introduces a target member.
pub async fn create(
    State(server): State<GuildServer>,
    headers: HeaderMap,
    Json(req): Json<CreateIndicationRequest>,
) -> Result<(StatusCode, Json<IndicationView>), ApiError> {
    let acting = server.authenticate_member(&headers).await?;

    let target_id = Uuid::try_parse(&req.target_member_id)
        .map(MemberId)
        .map_err(|_| ApiError::validation("Invalid target member id"))?;

    let contact_info = req.contact_info.trim();
    if contact_info.is_empty() {
        return Err(ApiError::validation("Contact info must not be empty"));
    }
    if contact_info.chars().count() > MAX_CONTACT_INFO_LEN {
        return Err(ApiError::validation(
            "Contact info must be at most 255 characters",
        ));
    }
    let description = req.description.trim();
    if description.is_empty() {
        return Err(ApiError::validation("Description must not be empty"));
    }

    if acting.id == target_id {
        return Err(ApiError::validation(
            "You cannot send an indication to yourself",
        ));
    }

    server
        .store
        .get_member(&target_id)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::not_found("Target member not found"),
            e => e.into(),
        })?;

    let indication = server
        .store
        .create_indication(&CreateIndicationParams {
            from_member_id: acting.id.clone(),
            to_member_id: target_id,
            contact_info: contact_info.to_string(),
            description: description.to_string(),
        })
        .await?;

    let with_members = server
        .store
        .get_indication_with_members(&indication.id)
        .await?;

    Ok((StatusCode::CREATED, Json(IndicationView::from(&with_members))))
}

/// GET /indications — the acting member's sent and received lists.
pub async fn list(
    State(server): State<GuildServer>,
    headers: HeaderMap,
) -> Result<Json<MemberIndicationsResponse>, ApiError> {
    let acting = server.authenticate_member(&headers).await?;

    let created = server.store.list_indications_from(&acting.id).await?;
    let received = server.store.list_indications_to(&acting.id).await?;

    Ok(Json(MemberIndicationsResponse {
        created: created.iter().map(IndicationView::from).collect(),
        received: received.iter().map(IndicationView::from).collect(),
    }))
}

/// PATCH /indications/{id}/status — recipient-only.
pub async fn update_status(
    State(server): State<GuildServer>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<UpdateIndicationStatusRequest>,
) -> Result<Json<IndicationView>, ApiError> {
    let acting = server.authenticate_member(&headers).await?;

    let new_status = req
        .status
        .parse::<IndicationStatus>()
        .map_err(|_| ApiError::validation("Invalid indication status"))?;

    let id = Uuid::try_parse(&id)
        .map(IndicationId)
        .map_err(|_| indication_not_found())?;
    let indication = server.store.get_indication(&id).await.map_err(|e| match e {
        StoreError::NotFound => indication_not_found(),
        e => e.into(),
    })?;

    if indication.to_member_id != acting.id {
        if indication.from_member_id == acting.id {
            return Err(ApiError::forbidden(
                "Only the member who received the indication can update its status",
            ));
        }
        return Err(ApiError::forbidden(
            "You do not have access to this indication",
        ));
    }

    server.store.update_indication_status(&id, new_status).await?;
    let with_members = server.store.get_indication_with_members(&id).await?;

    Ok(Json(IndicationView::from(&with_members)))
}

fn indication_not_found() -> ApiError {
    ApiError::not_found("Indication not found")
}
