//! Status summary assembly.
//!
//! Pure reduction over registry snapshots; nothing here touches shared state.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::status::incidents::Incident;
use crate::status::registry::ServiceEntry;
use crate::status::types::ServiceStatus;
use crate::status::uptime::round_percent;

/// Public view of one service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSummary {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub group: String,
    pub status: ServiceStatus,
    pub response_time_ms: Option<u64>,
    pub last_check: Option<DateTime<Utc>>,
    /// Percentage, two decimals.
    pub uptime: f64,
    pub avg_response_time_ms: u64,
    pub critical: bool,
}

impl From<&ServiceEntry> for ServiceSummary {
    fn from(entry: &ServiceEntry) -> Self {
        Self {
            name: entry.definition.name.clone(),
            display_name: entry.definition.display_name.clone(),
            description: entry.definition.description.clone(),
            group: entry.definition.group.clone(),
            status: entry.state.status,
            response_time_ms: entry.state.response_time_ms,
            last_check: entry.state.last_check,
            uptime: round_percent(entry.uptime.uptime_percent()),
            avg_response_time_ms: entry.uptime.avg_response_time_ms(),
            critical: entry.definition.critical,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ServiceCount {
    pub total: usize,
    pub operational: usize,
    pub degraded: usize,
    /// Partial plus major outages.
    pub outage: usize,
}

/// Consolidated status report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    pub overall_status: ServiceStatus,
    /// When the last full poll cycle settled.
    pub last_check: Option<DateTime<Utc>>,
    /// Group name to services, in registration order within each group.
    pub services: BTreeMap<String, Vec<ServiceSummary>>,
    pub service_count: ServiceCount,
    pub recent_incidents: Vec<Incident>,
    /// Unweighted mean of per-service uptime, two decimals.
    pub uptime_overall: f64,
}

impl StatusSummary {
    pub fn build(
        entries: &[ServiceEntry],
        recent_incidents: Vec<Incident>,
        last_check: Option<DateTime<Utc>>,
    ) -> Self {
        let overall_status = ServiceStatus::overall(entries.iter().map(|e| e.state.status));

        let mut count = ServiceCount {
            total: entries.len(),
            ..Default::default()
        };
        let mut services: BTreeMap<String, Vec<ServiceSummary>> = BTreeMap::new();
        let mut uptime_sum = 0.0;

        for entry in entries {
            match entry.state.status {
                ServiceStatus::Operational => count.operational += 1,
                ServiceStatus::Degraded => count.degraded += 1,
                ServiceStatus::PartialOutage | ServiceStatus::MajorOutage => count.outage += 1,
                ServiceStatus::Maintenance | ServiceStatus::Unknown => {}
            }
            uptime_sum += entry.uptime.uptime_percent();
            services
                .entry(entry.definition.group.clone())
                .or_default()
                .push(ServiceSummary::from(entry));
        }

        let uptime_overall = if entries.is_empty() {
            100.0
        } else {
            round_percent(uptime_sum / entries.len() as f64)
        };

        Self {
            overall_status,
            last_check,
            services,
            service_count: count,
            recent_incidents,
            uptime_overall,
        }
    }

    /// Find one service across all groups.
    pub fn service(&self, name: &str) -> Option<&ServiceSummary> {
        self.services.values().flatten().find(|s| s.name == name)
    }
}
