//! Admin dashboard: simple aggregate counts for the current period.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{Datelike, TimeZone, Utc};
use serde::Serialize;

use guild_storage::Store;

use crate::error::ApiError;
use crate::server::GuildServer;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetric {
    pub value: i64,
    pub is_mock: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceDashboard {
    pub active_members: DashboardMetric,
    pub indications_this_month: DashboardMetric,
    pub thank_yous_this_month: DashboardMetric,
    pub generated_at: String,
}

/// GET /admin/dashboard
pub async fn performance(
    State(server): State<GuildServer>,
    headers: HeaderMap,
) -> Result<Json<PerformanceDashboard>, ApiError> {
    server.require_admin(&headers)?;

    let now = Utc::now();
    let start_of_month = Utc
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .expect("first instant of a month is unambiguous in UTC");

    let active_members = server.store.count_members().await?;
    let indications_this_month = server.store.count_indications_since(start_of_month).await?;

    // There is no thank-you feature yet; the metric stays mocked until it
    // exists.
    Ok(Json(PerformanceDashboard {
        active_members: DashboardMetric {
            value: active_members,
            is_mock: false,
        },
        indications_this_month: DashboardMetric {
            value: indications_this_month,
            is_mock: false,
        },
        thank_yous_this_month: DashboardMetric {
            value: 0,
            is_mock: true,
        },
        generated_at: now.to_rfc3339(),
    }))
}
