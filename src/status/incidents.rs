//! Incident log.
//!
//! # Responsibilities
//! - Decide whether a status change is an incident
//! - Keep incidents most-recent-first
//! - Drop incidents older than the retention window
//!
//! # Design Decisions
//! - Pruning happens while recording, there is no sweep timer
//! - Incidents reference services by name so they outlive deregistration

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::status::types::{ServiceDefinition, ServiceStatus};

/// A recorded status transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    /// UUIDv7, so ids sort by creation time.
    pub id: Uuid,
    pub service_name: String,
    pub service_display_name: String,
    pub previous_status: ServiceStatus,
    pub new_status: ServiceStatus,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    /// True iff the service became operational.
    pub resolved: bool,
}

impl Incident {
    pub fn new(
        service: &ServiceDefinition,
        previous_status: ServiceStatus,
        new_status: ServiceStatus,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            service_name: service.name.clone(),
            service_display_name: service.display_name.clone(),
            previous_status,
            new_status,
            timestamp,
            message: new_status.transition_message(&service.name),
            resolved: new_status == ServiceStatus::Operational,
        }
    }
}

/// A check-driven change is an incident unless nothing changed or the
/// service was still at its unclassified baseline.
pub fn is_incident(previous: ServiceStatus, new: ServiceStatus) -> bool {
    previous != new && previous != ServiceStatus::Unknown
}

/// Bounded-retention, most-recent-first incident history.
#[derive(Debug, Clone)]
pub struct IncidentLog {
    entries: Vec<Incident>,
    retention: Duration,
}

impl IncidentLog {
    pub fn new(retention_days: u32) -> Self {
        Self {
            entries: Vec::new(),
            retention: Duration::days(i64::from(retention_days)),
        }
    }

    pub fn set_retention_days(&mut self, retention_days: u32) {
        self.retention = Duration::days(i64::from(retention_days));
    }

    /// Prepend an incident and prune everything outside the retention window.
    pub fn push(&mut self, incident: Incident) {
        let cutoff = incident.timestamp - self.retention;
        self.entries.insert(0, incident);
        self.entries.retain(|i| i.timestamp > cutoff);
    }

    /// Up to `limit` incidents, most recent first.
    pub fn recent(&self, limit: usize) -> Vec<Incident> {
        self.entries.iter().take(limit).cloned().collect()
    }

    /// Up to `limit` incidents, optionally filtered by resolution.
    pub fn query(&self, limit: usize, resolved: Option<bool>) -> Vec<Incident> {
        self.entries
            .iter()
            .filter(|i| resolved.map_or(true, |r| i.resolved == r))
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
