//! Rolling uptime counters.
//!
//! Counters only grow for the life of the process. The derived figures guard
//! against division by zero: no checks means 100% uptime, no successes means
//! an average latency of 0.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UptimeCounters {
    pub checks_total: u64,
    pub checks_succeeded: u64,
    /// Sum of latencies over successful checks only.
    pub total_response_time_ms: u64,
}

impl UptimeCounters {
    pub fn record_outcome(&mut self, success: bool, latency_ms: u64) {
        self.checks_total += 1;
        if success {
            self.checks_succeeded += 1;
            self.total_response_time_ms = self.total_response_time_ms.saturating_add(latency_ms);
        }
    }

    pub fn uptime_percent(&self) -> f64 {
        if self.checks_total == 0 {
            return 100.0;
        }
        self.checks_succeeded as f64 / self.checks_total as f64 * 100.0
    }

    /// Average latency of successful checks, rounded to whole milliseconds.
    pub fn avg_response_time_ms(&self) -> u64 {
        if self.checks_succeeded == 0 {
            return 0;
        }
        (self.total_response_time_ms as f64 / self.checks_succeeded as f64).round() as u64
    }
}

/// Round a percentage to two decimals for reporting.
pub fn round_percent(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
