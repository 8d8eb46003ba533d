//! Dashboard handler tests.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::DateTime;

use crate::handlers::dashboard::performance;
use crate::handlers::indications::{create, CreateIndicationRequest};
use crate::tests::common::*;

#[tokio::test]
async fn test_requires_admin() {
    let server = create_test_server().await;
    let err = performance(State(server.clone()), HeaderMap::new())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_empty_platform_metrics() {
    let server = create_test_server().await;
    let Json(dashboard) = performance(State(server.clone()), admin_headers(&server))
        .await
        .unwrap();
    assert_eq!(dashboard.active_members.value, 0);
    assert!(!dashboard.active_members.is_mock);
    assert_eq!(dashboard.indications_this_month.value, 0);
    assert!(!dashboard.indications_this_month.is_mock);
    assert_eq!(dashboard.thank_yous_this_month.value, 0);
    assert!(dashboard.thank_yous_this_month.is_mock);
    assert!(DateTime::parse_from_rfc3339(&dashboard.generated_at).is_ok());
}

#[tokio::test]
async fn test_counts_members_and_current_month_indications() {
    let server = create_test_server().await;
    let ana = register_member(&server, "ana@x.com", "Ana").await;
    let bruno = register_member(&server, "bruno@x.com", "Bruno").await;

    create(
        State(server.clone()),
        bearer(&ana.token),
        Json(CreateIndicationRequest {
            target_member_id: bruno.member.id.clone(),
            contact_info: "maria@acme.com".to_string(),
            description: "An introduction".to_string(),
        }),
    )
    .await
    .unwrap();

    let Json(dashboard) = performance(State(server.clone()), admin_headers(&server))
        .await
        .unwrap();
    assert_eq!(dashboard.active_members.value, 2);
    assert_eq!(dashboard.indications_this_month.value, 1);
    assert_eq!(dashboard.thank_yous_this_month.value, 0);
    assert!(dashboard.thank_yous_this_month.is_mock);
}
