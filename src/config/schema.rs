//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the aggregator.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the status aggregator.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Listener configuration for the status API.
    pub listener: ListenerConfig,

    /// Poll loop and probe settings.
    pub checks: CheckConfig,

    /// Incident log settings.
    pub incidents: IncidentConfig,

    /// Status API settings.
    pub http: HttpConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Monitored services.
    pub services: Vec<ServiceConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3100").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3100".to_string(),
        }
    }
}

/// Poll loop and probe configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Seconds between poll cycles.
    pub interval_secs: u64,

    /// Per-attempt probe timeout in milliseconds.
    pub timeout_ms: u64,

    /// Retries after a network-level failure (total attempts = retries + 1).
    pub retries: u32,

    /// Pause between attempts in milliseconds.
    pub retry_delay_ms: u64,

    /// A 2xx slower than this is classified as degraded.
    pub degraded_threshold_ms: u64,

    /// User-Agent header sent with every probe.
    pub user_agent: String,
}

impl CheckConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Worst-case wall time of one check: every attempt times out and every pause is taken.
    pub fn max_check_duration(&self) -> Duration {
        let attempts = u64::from(self.retries) + 1;
        let pauses = u64::from(self.retries);
        // Jitter adds at most a tenth of each pause.
        Duration::from_millis(
            self.timeout_ms.saturating_mul(attempts)
                + self.retry_delay_ms.saturating_mul(pauses) * 11 / 10,
        )
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            timeout_ms: 5_000,
            retries: 2,
            retry_delay_ms: 1_000,
            degraded_threshold_ms: 200,
            user_agent: concat!("status-aggregator/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Incident log configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IncidentConfig {
    /// Incidents older than this are pruned when a new one is recorded.
    pub retention_days: u32,

    /// Number of incidents included in the status summary.
    pub recent_limit: usize,
}

impl Default for IncidentConfig {
    fn default() -> Self {
        Self {
            retention_days: 30,
            recent_limit: 10,
        }
    }
}

/// Status API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// `Cache-Control: max-age` for status responses.
    pub cache_max_age_secs: u64,

    /// `Cache-Control: max-age` for the SVG badge.
    pub badge_max_age_secs: u64,

    /// Bearer token for maintenance and forced checks. Admin routes are closed when unset.
    pub admin_api_key: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            cache_max_age_secs: 30,
            badge_max_age_secs: 60,
            admin_api_key: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9100".to_string(),
        }
    }
}

/// A monitored service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Unique service identifier.
    pub name: String,

    /// Human-readable name (defaults to `name`).
    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub description: String,

    /// URL probed with a plain GET.
    pub health_url: String,

    /// Whether the service is critical to the platform (default: true).
    #[serde(default = "default_critical")]
    pub critical: bool,

    /// Summary group (default: "core").
    #[serde(default = "default_group")]
    pub group: String,
}

fn default_critical() -> bool {
    true
}

fn default_group() -> String {
    "core".to_string()
}
