use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::CheckConfig;
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::status::{Incident, ServiceStatus, ServiceSummary};

/// Gates and status pages read 200 as "serve traffic", 503 as "something is down".
pub fn http_status_for(overall: ServiceStatus) -> StatusCode {
    match overall {
        ServiceStatus::Operational | ServiceStatus::Degraded | ServiceStatus::Maintenance => {
            StatusCode::OK
        }
        ServiceStatus::PartialOutage | ServiceStatus::MajorOutage | ServiceStatus::Unknown => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

fn cache_control(max_age_secs: u64) -> (header::HeaderName, String) {
    (header::CACHE_CONTROL, format!("public, max-age={}", max_age_secs))
}

/// GET /status
pub async fn get_status(State(state): State<AppState>) -> Response {
    let summary = state.aggregator.status_summary();
    (
        http_status_for(summary.overall_status),
        [cache_control(state.http.cache_max_age_secs)],
        Json(summary),
    )
        .into_response()
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactSummary {
    pub status: ServiceStatus,
    pub uptime: f64,
    pub last_check: Option<DateTime<Utc>>,
    pub services_operational: usize,
    pub services_total: usize,
}

/// GET /status/summary
pub async fn get_summary(State(state): State<AppState>) -> Json<CompactSummary> {
    let summary = state.aggregator.status_summary();
    Json(CompactSummary {
        status: summary.overall_status,
        uptime: summary.uptime_overall,
        last_check: summary.last_check,
        services_operational: summary.service_count.operational,
        services_total: summary.service_count.total,
    })
}

/// GET /status/service/{name}
pub async fn get_service(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ServiceSummary>, ApiError> {
    state
        .aggregator
        .service(&name)
        .map(|entry| Json(ServiceSummary::from(&entry)))
        .ok_or(ApiError::NotFound {
            message: "Service not found".to_string(),
            code: "SERVICE_NOT_FOUND",
        })
}

#[derive(Debug, Deserialize)]
pub struct IncidentQuery {
    pub limit: Option<usize>,
    pub resolved: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct IncidentList {
    pub count: usize,
    pub incidents: Vec<Incident>,
}

/// GET /status/incidents?limit=&resolved=
pub async fn get_incidents(
    State(state): State<AppState>,
    Query(query): Query<IncidentQuery>,
) -> Json<IncidentList> {
    let incidents = state
        .aggregator
        .incidents(query.limit.unwrap_or(20), query.resolved);
    Json(IncidentList {
        count: incidents.len(),
        incidents,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceUptime {
    pub name: String,
    pub display_name: String,
    pub uptime: f64,
    pub avg_response_time_ms: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UptimeReport {
    pub overall: f64,
    pub by_group: BTreeMap<String, Vec<ServiceUptime>>,
    /// Counters run since process start.
    pub period: &'static str,
}

/// GET /status/uptime
pub async fn get_uptime(State(state): State<AppState>) -> Json<UptimeReport> {
    let summary = state.aggregator.status_summary();
    let by_group = summary
        .services
        .into_iter()
        .map(|(group, services)| {
            let uptimes = services
                .into_iter()
                .map(|s| ServiceUptime {
                    name: s.name,
                    display_name: s.display_name,
                    uptime: s.uptime,
                    avg_response_time_ms: s.avg_response_time_ms,
                })
                .collect();
            (group, uptimes)
        })
        .collect();

    Json(UptimeReport {
        overall: summary.uptime_overall,
        by_group,
        period: "since start",
    })
}

fn badge_style(status: ServiceStatus) -> (&'static str, &'static str) {
    match status {
        ServiceStatus::Operational => ("#4ade80", "operational"),
        ServiceStatus::Degraded => ("#fbbf24", "degraded"),
        ServiceStatus::PartialOutage => ("#f97316", "partial outage"),
        ServiceStatus::MajorOutage => ("#ef4444", "outage"),
        ServiceStatus::Maintenance => ("#6366f1", "maintenance"),
        ServiceStatus::Unknown => ("#9ca3af", "unknown"),
    }
}

pub fn render_badge(status: ServiceStatus) -> String {
    let (color, label) = badge_style(status);
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="120" height="20">
  <linearGradient id="b" x2="0" y2="100%">
    <stop offset="0" stop-color="#bbb" stop-opacity=".1"/>
    <stop offset="1" stop-opacity=".1"/>
  </linearGradient>
  <mask id="a">
    <rect width="120" height="20" rx="3" fill="#fff"/>
  </mask>
  <g mask="url(#a)">
    <rect width="50" height="20" fill="#555"/>
    <rect x="50" width="70" height="20" fill="{color}"/>
    <rect width="120" height="20" fill="url(#b)"/>
  </g>
  <g fill="#fff" text-anchor="middle" font-family="DejaVu Sans,Verdana,Geneva,sans-serif" font-size="11">
    <text x="25" y="15" fill="#010101" fill-opacity=".3">status</text>
    <text x="25" y="14">status</text>
    <text x="84" y="15" fill="#010101" fill-opacity=".3">{label}</text>
    <text x="84" y="14">{label}</text>
  </g>
</svg>"##
    )
}

/// GET /status/badge
pub async fn get_badge(State(state): State<AppState>) -> Response {
    let status = state.aggregator.status_summary().overall_status;
    (
        [
            (header::CONTENT_TYPE, "image/svg+xml".to_string()),
            cache_control(state.http.badge_max_age_secs),
        ],
        render_badge(status),
    )
        .into_response()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MaintenanceRequest {
    pub active: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MaintenanceResponse {
    pub success: bool,
    pub service: String,
    pub maintenance: bool,
}

/// POST /status/maintenance/{name}
pub async fn set_maintenance(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<MaintenanceRequest>,
) -> Result<Json<MaintenanceResponse>, ApiError> {
    state.aggregator.set_maintenance(&name, body.active)?;
    Ok(Json(MaintenanceResponse {
        success: true,
        service: name,
        maintenance: body.active,
    }))
}

/// How long a forced check may take under the current check settings.
pub fn forced_check_deadline(checks: &CheckConfig) -> Duration {
    checks.max_check_duration() + Duration::from_secs(5)
}

/// POST /status/health-check
///
/// The cycle runs on its own task, so a dropped request does not abort it.
pub async fn force_check(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let deadline = forced_check_deadline(&state.aggregator.check_config());
    let aggregator = state.aggregator.clone();
    let cycle = tokio::spawn(async move { aggregator.check_all().await });

    match tokio::time::timeout(deadline, cycle).await {
        Ok(Ok(())) => Ok(Json(serde_json::json!({
            "success": true,
            "message": "Health check completed",
            "timestamp": Utc::now(),
        }))),
        Ok(Err(e)) => Err(ApiError::Internal(format!("health check cycle failed: {}", e))),
        Err(_) => Err(ApiError::Timeout),
    }
}
