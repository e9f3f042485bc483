//! Core status types shared by the registry, the check path and the summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::config::ServiceConfig;

/// Current health classification of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    /// Registered but not yet classified by a check.
    Unknown,
    Operational,
    /// Healthy but slower than the degraded threshold.
    Degraded,
    /// Responded with a non-2xx status.
    PartialOutage,
    /// Unreachable after every attempt.
    MajorOutage,
    /// Manual override; the poll loop never clears it.
    Maintenance,
}

impl ServiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceStatus::Unknown => "unknown",
            ServiceStatus::Operational => "operational",
            ServiceStatus::Degraded => "degraded",
            ServiceStatus::PartialOutage => "partial_outage",
            ServiceStatus::MajorOutage => "major_outage",
            ServiceStatus::Maintenance => "maintenance",
        }
    }

    pub fn is_outage(self) -> bool {
        matches!(self, ServiceStatus::PartialOutage | ServiceStatus::MajorOutage)
    }

    /// Reduce a set of per-service statuses to one system status.
    ///
    /// First match wins: major outage, partial outage, degraded, maintenance,
    /// all operational, otherwise unknown. An empty set is operational.
    pub fn overall<I>(statuses: I) -> ServiceStatus
    where
        I: IntoIterator<Item = ServiceStatus>,
    {
        let mut major = false;
        let mut partial = false;
        let mut degraded = false;
        let mut maintenance = false;
        let mut all_operational = true;

        for status in statuses {
            match status {
                ServiceStatus::MajorOutage => major = true,
                ServiceStatus::PartialOutage => partial = true,
                ServiceStatus::Degraded => degraded = true,
                ServiceStatus::Maintenance => maintenance = true,
                ServiceStatus::Operational => continue,
                ServiceStatus::Unknown => {}
            }
            all_operational = false;
        }

        if major {
            ServiceStatus::MajorOutage
        } else if partial {
            ServiceStatus::PartialOutage
        } else if degraded {
            ServiceStatus::Degraded
        } else if maintenance {
            ServiceStatus::Maintenance
        } else if all_operational {
            ServiceStatus::Operational
        } else {
            ServiceStatus::Unknown
        }
    }

    /// Human-readable incident message for a service entering this status.
    pub fn transition_message(self, service_name: &str) -> String {
        match self {
            ServiceStatus::Operational => format!("{} is now operational", service_name),
            ServiceStatus::Degraded => {
                format!("{} is experiencing degraded performance", service_name)
            }
            ServiceStatus::PartialOutage => {
                format!("{} is experiencing a partial outage", service_name)
            }
            ServiceStatus::MajorOutage => {
                format!("{} is experiencing a major outage", service_name)
            }
            ServiceStatus::Maintenance => format!("{} is under maintenance", service_name),
            ServiceStatus::Unknown => format!("{} status changed", service_name),
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static configuration of a registered service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDefinition {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub health_url: String,
    pub critical: bool,
    pub group: String,
}

impl ServiceDefinition {
    /// A critical service in the default "core" group, displayed under its own name.
    pub fn new(name: impl Into<String>, health_url: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            description: String::new(),
            health_url: health_url.into(),
            critical: true,
            group: "core".to_string(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_critical(mut self, critical: bool) -> Self {
        self.critical = critical;
        self
    }
}

impl From<&ServiceConfig> for ServiceDefinition {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            name: config.name.clone(),
            display_name: config
                .display_name
                .clone()
                .unwrap_or_else(|| config.name.clone()),
            description: config.description.clone(),
            health_url: config.health_url.clone(),
            critical: config.critical,
            group: config.group.clone(),
        }
    }
}

/// Mutable, check-driven state of a registered service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceState {
    pub status: ServiceStatus,
    /// `None` while unknown or in major outage.
    pub response_time_ms: Option<u64>,
    pub last_check: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
    /// Body returned by the service's health endpoint, never interpreted.
    pub health_data: Value,
}

impl Default for ServiceState {
    fn default() -> Self {
        Self {
            status: ServiceStatus::Unknown,
            response_time_ms: None,
            last_check: None,
            last_error: None,
            consecutive_failures: 0,
            health_data: Value::Object(Default::default()),
        }
    }
}
