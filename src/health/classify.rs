//! Probe outcome classification.
//!
//! # Rules
//! ```text
//! 2xx, latency >  degraded threshold → Degraded
//! 2xx, latency <= degraded threshold → Operational   (failures reset)
//! non-2xx                            → PartialOutage (failures + 1)
//! unreachable after all attempts     → MajorOutage   (failures + 1, no latency)
//! ```
//!
//! Any received response counts toward uptime; only unreachable checks do not.
//!
//! A service in maintenance keeps its status and failure counter; only the
//! observational fields are refreshed.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::status::types::{ServiceState, ServiceStatus};

/// What a probe observed.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// An HTTP response arrived.
    Responded {
        status_code: u16,
        /// Measured from the start of the first attempt.
        latency_ms: u64,
        /// Parsed body, or an empty object if it was not JSON.
        body: Value,
    },
    /// Every attempt failed at the network level or timed out.
    Unreachable { error: String, attempts: u32 },
}

/// The state change a probe outcome implies.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub status: ServiceStatus,
    pub response_time_ms: Option<u64>,
    pub last_error: Option<String>,
    pub health_data: Option<Value>,
    /// Counts toward uptime: any received response.
    pub success: bool,
    /// The response was 2xx.
    pub healthy: bool,
    /// Latency fed to the uptime tracker.
    pub latency_ms: u64,
}

pub fn classify(outcome: &ProbeOutcome, degraded_threshold_ms: u64) -> Classification {
    match outcome {
        ProbeOutcome::Responded { status_code, latency_ms, body } => {
            let healthy = (200..300).contains(status_code);
            let (status, last_error) = if !healthy {
                (ServiceStatus::PartialOutage, Some(format!("HTTP {}", status_code)))
            } else if *latency_ms > degraded_threshold_ms {
                (ServiceStatus::Degraded, None)
            } else {
                (ServiceStatus::Operational, None)
            };
            Classification {
                status,
                response_time_ms: Some(*latency_ms),
                last_error,
                health_data: Some(body.clone()),
                success: true,
                healthy,
                latency_ms: *latency_ms,
            }
        }
        ProbeOutcome::Unreachable { error, .. } => Classification {
            status: ServiceStatus::MajorOutage,
            response_time_ms: None,
            last_error: Some(error.clone()),
            health_data: None,
            success: false,
            healthy: false,
            latency_ms: 0,
        },
    }
}

impl Classification {
    /// Write this classification into `state` and return the status it had before.
    pub fn apply(&self, state: &mut ServiceState, completed_at: DateTime<Utc>) -> ServiceStatus {
        let previous = state.status;

        if previous != ServiceStatus::Maintenance {
            state.status = self.status;
            match self.status {
                ServiceStatus::Operational => state.consecutive_failures = 0,
                ServiceStatus::PartialOutage | ServiceStatus::MajorOutage => {
                    state.consecutive_failures = state.consecutive_failures.saturating_add(1)
                }
                _ => {}
            }
        }

        state.response_time_ms = self.response_time_ms;
        state.last_error = self.last_error.clone();
        state.last_check = Some(completed_at);
        if let Some(data) = &self.health_data {
            state.health_data = data.clone();
        }

        previous
    }
}
