//! Application handler tests.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Duration, Utc};

use crate::error::ApiError;
use crate::handlers::applications::{
    approve, create, get_one, list, reject, CreateApplicationRequest, ListApplicationsQuery,
    RejectApplicationRequest,
};
use crate::tests::common::*;

fn valid_request(email: &str) -> CreateApplicationRequest {
    CreateApplicationRequest {
        full_name: "Ana Silva".to_string(),
        email: email.to_string(),
        company: "Acme".to_string(),
        why_participate:
            "I want to meet other members and exchange qualified business introductions."
                .to_string(),
    }
}

#[tokio::test]
async fn test_create_returns_pending() {
    let server = create_test_server().await;
    let (status, Json(resp)) = create(State(server.clone()), Json(valid_request("ana@x.com")))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(resp.status, "PENDING");
    assert!(!resp.id.is_empty());
}

#[tokio::test]
async fn test_create_rejects_duplicate_email() {
    let server = create_test_server().await;
    submit_application(&server, "ana@x.com", "Ana").await;

    let err = create(State(server.clone()), Json(valid_request("ana@x.com")))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_validates_fields() {
    let server = create_test_server().await;

    let mut short_name = valid_request("a@x.com");
    short_name.full_name = "Al".to_string();
    assert!(matches!(
        create(State(server.clone()), Json(short_name)).await.unwrap_err(),
        ApiError::Validation(_)
    ));

    let mut bad_email = valid_request("a@x.com");
    bad_email.email = "not-an-email".to_string();
    assert!(matches!(
        create(State(server.clone()), Json(bad_email)).await.unwrap_err(),
        ApiError::Validation(_)
    ));

    let mut short_company = valid_request("a@x.com");
    short_company.company = "A".to_string();
    assert!(matches!(
        create(State(server.clone()), Json(short_company)).await.unwrap_err(),
        ApiError::Validation(_)
    ));

    let mut short_reason = valid_request("a@x.com");
    short_reason.why_participate = "too short".to_string();
    assert!(matches!(
        create(State(server.clone()), Json(short_reason)).await.unwrap_err(),
        ApiError::Validation(_)
    ));
}

#[tokio::test]
async fn test_list_requires_admin() {
    let server = create_test_server().await;

    let err = list(
        State(server.clone()),
        HeaderMap::new(),
        Query(ListApplicationsQuery::default()),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

    let err = list(
        State(server.clone()),
        bearer("garbage-token"),
        Query(ListApplicationsQuery::default()),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_orders_and_filters_case_insensitively() {
    let server = create_test_server().await;
    let first = submit_application(&server, "a@x.com", "Ana").await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = submit_application(&server, "b@x.com", "Bruno").await;
    approve_application(&server, &second).await;

    let Json(all) = list(
        State(server.clone()),
        admin_headers(&server),
        Query(ListApplicationsQuery::default()),
    )
    .await
    .unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, second);
    assert_eq!(all[1].id, first);

    let Json(pending) = list(
        State(server.clone()),
        admin_headers(&server),
        Query(ListApplicationsQuery {
            status: Some("pending".to_string()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, first);

    let err = list(
        State(server.clone()),
        admin_headers(&server),
        Query(ListApplicationsQuery {
            status: Some("bogus".to_string()),
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn test_approve_mints_token_and_link() {
    let server = create_test_server().await;
    let id = submit_application(&server, "ana@x.com", "Ana").await;

    let approval = approve_application(&server, &id).await;
    assert!(!approval.token.is_empty());
    assert!(approval
        .invite_link
        .ends_with(&format!("/register/{}", approval.token)));

    let expires_at = DateTime::parse_from_rfc3339(&approval.expires_at).unwrap();
    let expected = Utc::now() + Duration::days(7);
    let delta = (expires_at.with_timezone(&Utc) - expected).num_seconds().abs();
    assert!(delta < 60, "expiry should be ~7 days out, delta={delta}s");
}

#[tokio::test]
async fn test_approve_requires_pending() {
    let server = create_test_server().await;
    let id = submit_application(&server, "ana@x.com", "Ana").await;
    approve_application(&server, &id).await;

    let err = approve(
        State(server.clone()),
        admin_headers(&server),
        Path(id.clone()),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn test_approve_unknown_id_not_found() {
    let server = create_test_server().await;
    let err = approve(
        State(server.clone()),
        admin_headers(&server),
        Path(uuid::Uuid::now_v7().to_string()),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_reject_stores_reason_and_guards() {
    let server = create_test_server().await;
    let id = submit_application(&server, "ana@x.com", "Ana").await;

    reject(
        State(server.clone()),
        admin_headers(&server),
        Path(id.clone()),
        Some(Json(RejectApplicationRequest {
            reason: Some("not a fit".to_string()),
        })),
    )
    .await
    .unwrap();

    let Json(detail) = get_one(
        State(server.clone()),
        admin_headers(&server),
        Path(id.clone()),
    )
    .await
    .unwrap();
    assert_eq!(detail.application.status, "REJECTED");
    assert_eq!(
        detail.application.rejection_reason.as_deref(),
        Some("not a fit")
    );
    assert!(detail.application.reviewed_at.is_some());

    // Terminal: a second review attempt fails.
    let err = reject(
        State(server.clone()),
        admin_headers(&server),
        Path(id.clone()),
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    let err = approve(State(server.clone()), admin_headers(&server), Path(id))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn test_reject_without_body_leaves_reason_null() {
    let server = create_test_server().await;
    let id = submit_application(&server, "ana@x.com", "Ana").await;

    reject(
        State(server.clone()),
        admin_headers(&server),
        Path(id.clone()),
        None,
    )
    .await
    .unwrap();

    let Json(detail) = get_one(State(server.clone()), admin_headers(&server), Path(id))
        .await
        .unwrap();
    assert!(detail.application.rejection_reason.is_none());
}

#[tokio::test]
async fn test_get_one_includes_invitation_and_member() {
    let server = create_test_server().await;
    let registration = register_member(&server, "ana@x.com", "Ana Silva").await;

    // Find the application back through the member record.
    let Json(all) = list(
        State(server.clone()),
        admin_headers(&server),
        Query(ListApplicationsQuery::default()),
    )
    .await
    .unwrap();
    let application_id = all[0].id.clone();

    let Json(detail) = get_one(
        State(server.clone()),
        admin_headers(&server),
        Path(application_id),
    )
    .await
    .unwrap();
    assert_eq!(detail.application.status, "APPROVED");
    let invitation = detail.invitation_token.unwrap();
    assert!(invitation.used);
    let member = detail.member.unwrap();
    assert_eq!(member.id, registration.member.id);
}

#[tokio::test]
async fn test_get_one_unknown_not_found() {
    let server = create_test_server().await;
    let err = get_one(
        State(server.clone()),
        admin_headers(&server),
        Path("not-a-uuid".to_string()),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}
