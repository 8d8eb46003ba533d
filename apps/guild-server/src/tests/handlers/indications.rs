//! Indication handler tests.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::ApiError;
use crate::handlers::indications::{
    create, list, update_status, CreateIndicationRequest, UpdateIndicationStatusRequest,
};
use crate::handlers::members::RegisterMemberResponse;
use crate::server::GuildServer;
use crate::tests::common::*;

async fn two_members(server: &GuildServer) -> (RegisterMemberResponse, RegisterMemberResponse) {
    let ana = register_member(server, "ana@x.com", "Ana").await;
    let bruno = register_member(server, "bruno@x.com", "Bruno").await;
    (ana, bruno)
}

fn indication_request(target_id: &str) -> CreateIndicationRequest {
    CreateIndicationRequest {
        target_member_id: target_id.to_string(),
        contact_info: "  maria@acme.com  ".to_string(),
        description: " Potential supplier for your new plant ".to_string(),
    }
}

#[tokio::test]
async fn test_create_trims_and_attaches_summaries() {
    let server = create_test_server().await;
    let (ana, bruno) = two_members(&server).await;

    let (status, Json(view)) = create(
        State(server.clone()),
        bearer(&ana.token),
        Json(indication_request(&bruno.member.id)),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(view.status, "NEW");
    assert_eq!(view.contact_info, "maria@acme.com");
    assert_eq!(view.description, "Potential supplier for your new plant");
    assert_eq!(view.from_member.id, ana.member.id);
    assert_eq!(view.to_member.id, bruno.member.id);
}

#[tokio::test]
async fn test_create_rejects_self_indication() {
    let server = create_test_server().await;
    let (ana, _) = two_members(&server).await;

    let err = create(
        State(server.clone()),
        bearer(&ana.token),
        Json(indication_request(&ana.member.id)),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn test_create_unknown_target_not_found() {
    let server = create_test_server().await;
    let (ana, _) = two_members(&server).await;

    let err = create(
        State(server.clone()),
        bearer(&ana.token),
        Json(indication_request(&uuid::Uuid::now_v7().to_string())),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_create_validates_fields() {
    let server = create_test_server().await;
    let (ana, bruno) = two_members(&server).await;

    let mut blank_contact = indication_request(&bruno.member.id);
    blank_contact.contact_info = "   ".to_string();
    assert!(matches!(
        create(State(server.clone()), bearer(&ana.token), Json(blank_contact))
            .await
            .unwrap_err(),
        ApiError::Validation(_)
    ));

    let mut long_contact = indication_request(&bruno.member.id);
    long_contact.contact_info = "x".repeat(256);
    assert!(matches!(
        create(State(server.clone()), bearer(&ana.token), Json(long_contact))
            .await
            .unwrap_err(),
        ApiError::Validation(_)
    ));

    let bad_target = indication_request("not-a-uuid");
    assert!(matches!(
        create(State(server.clone()), bearer(&ana.token), Json(bad_target))
            .await
            .unwrap_err(),
        ApiError::Validation(_)
    ));
}

#[tokio::test]
async fn test_list_splits_created_and_received() {
    let server = create_test_server().await;
    let (ana, bruno) = two_members(&server).await;

    create(
        State(server.clone()),
        bearer(&ana.token),
        Json(indication_request(&bruno.member.id)),
    )
    .await
    .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    create(
        State(server.clone()),
        bearer(&bruno.token),
        Json(indication_request(&ana.member.id)),
    )
    .await
    .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    create(
        State(server.clone()),
        bearer(&ana.token),
        Json(indication_request(&bruno.member.id)),
    )
    .await
    .unwrap();

    let Json(for_ana) = list(State(server.clone()), bearer(&ana.token))
        .await
        .unwrap();
    assert_eq!(for_ana.created.len(), 2);
    assert_eq!(for_ana.received.len(), 1);
    // Newest first.
    assert!(for_ana.created[0].created_at > for_ana.created[1].created_at);

    let Json(for_bruno) = list(State(server.clone()), bearer(&bruno.token))
        .await
        .unwrap();
    assert_eq!(for_bruno.created.len(), 1);
    assert_eq!(for_bruno.received.len(), 2);
}

#[tokio::test]
async fn test_update_status_recipient_can_set_any_value() {
    let server = create_test_server().await;
    let (ana, bruno) = two_members(&server).await;

    let (_, Json(view)) = create(
        State(server.clone()),
        bearer(&ana.token),
        Json(indication_request(&bruno.member.id)),
    )
    .await
    .unwrap();

    // No transition graph: every value is reachable from every other.
    for status in ["IN_CONTACT", "CLOSED", "DECLINED", "NEW"] {
        let Json(updated) = update_status(
            State(server.clone()),
            bearer(&bruno.token),
            Path(view.id.clone()),
            Json(UpdateIndicationStatusRequest {
                status: status.to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(updated.status, status);
    }
}

#[tokio::test]
async fn test_update_status_sender_and_stranger_forbidden() {
    let server = create_test_server().await;
    let (ana, bruno) = two_members(&server).await;
    let carla = register_member(&server, "carla@x.com", "Carla").await;

    let (_, Json(view)) = create(
        State(server.clone()),
        bearer(&ana.token),
        Json(indication_request(&bruno.member.id)),
    )
    .await
    .unwrap();

    let sender = update_status(
        State(server.clone()),
        bearer(&ana.token),
        Path(view.id.clone()),
        Json(UpdateIndicationStatusRequest {
            status: "CLOSED".to_string(),
        }),
    )
    .await
    .unwrap_err();
    let stranger = update_status(
        State(server.clone()),
        bearer(&carla.token),
        Path(view.id.clone()),
        Json(UpdateIndicationStatusRequest {
            status: "CLOSED".to_string(),
        }),
    )
    .await
    .unwrap_err();

    // Both are 403, with distinct messages for sender vs unrelated member.
    assert_eq!(sender.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(stranger.status_code(), StatusCode::FORBIDDEN);
    assert_ne!(sender.to_string(), stranger.to_string());
}

#[tokio::test]
async fn test_update_status_unknown_indication_not_found() {
    let server = create_test_server().await;
    let (ana, _) = two_members(&server).await;

    let err = update_status(
        State(server.clone()),
        bearer(&ana.token),
        Path(uuid::Uuid::now_v7().to_string()),
        Json(UpdateIndicationStatusRequest {
            status: "CLOSED".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_update_status_invalid_value() {
    let server = create_test_server().await;
    let (ana, bruno) = two_members(&server).await;

    let (_, Json(view)) = create(
        State(server.clone()),
        bearer(&ana.token),
        Json(indication_request(&bruno.member.id)),
    )
    .await
    .unwrap();

    let err = update_status(
        State(server.clone()),
        bearer(&bruno.token),
        Path(view.id),
        Json(UpdateIndicationStatusRequest {
            status: "in_contact".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}
