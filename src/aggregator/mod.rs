//! Service status aggregator.
//!
//! # Data Flow
//! ```text
//! scheduler.rs (interval)
//!     → check_all: one task per service, joined at cycle end
//!         → health::probe → health::classify
//!         → registry entry updated (state + uptime + incident, one lock)
//!     → last cycle timestamp
//!
//! HTTP / callers:
//!     → status_summary (snapshot, read-only)
//!     → set_maintenance (manual override)
//! ```
//!
//! # Design Decisions
//! - One instance owns its registry; handles are cheap clones of an `Arc`
//! - Each check runs in its own task so a panic stays with that service
//! - Check settings live behind `ArcSwap` so a reload applies from the next check

pub mod scheduler;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use arc_swap::{ArcSwap, ArcSwapOption};
use chrono::{DateTime, Utc};
use tokio::task::JoinSet;

use crate::config::{AggregatorConfig, CheckConfig, IncidentConfig};
use crate::error::AggregatorError;
use crate::health::{classify, HealthProbe};
use crate::observability::metrics;
use crate::status::incidents::{is_incident, Incident, IncidentLog};
use crate::status::{Registry, ServiceDefinition, ServiceEntry, ServiceStatus, StatusSummary};

use self::scheduler::PollHandle;

/// Handle to a running or idle aggregator.
#[derive(Clone)]
pub struct Aggregator {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Registry,
    incidents: Mutex<IncidentLog>,
    checks: ArcSwap<CheckConfig>,
    incident_config: ArcSwap<IncidentConfig>,
    probe: HealthProbe,
    last_cycle: ArcSwapOption<DateTime<Utc>>,
    poll: Mutex<Option<PollHandle>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Aggregator {
    /// Create an empty aggregator.
    pub fn new(checks: CheckConfig, incidents: IncidentConfig) -> Result<Self, AggregatorError> {
        let probe = HealthProbe::new()?;
        Ok(Self {
            inner: Arc::new(Inner {
                registry: Registry::new(),
                incidents: Mutex::new(IncidentLog::new(incidents.retention_days)),
                checks: ArcSwap::from_pointee(checks),
                incident_config: ArcSwap::from_pointee(incidents),
                probe,
                last_cycle: ArcSwapOption::empty(),
                poll: Mutex::new(None),
            }),
        })
    }

    /// Create an aggregator and register every configured service.
    pub fn from_config(config: &AggregatorConfig) -> Result<Self, AggregatorError> {
        let aggregator = Self::new(config.checks.clone(), config.incidents.clone())?;
        for service in &config.services {
            aggregator.register_service(ServiceDefinition::from(service));
        }
        Ok(aggregator)
    }

    /// Register a service, or replace its configuration if already known.
    ///
    /// Uptime counters survive re-registration. A check already in flight
    /// finishes against the old configuration.
    pub fn register_service(&self, definition: ServiceDefinition) {
        let name = definition.name.clone();
        let group = definition.group.clone();
        if self.inner.registry.register(definition) {
            tracing::info!(service = %name, group = %group, "Registered service");
        } else {
            tracing::info!(service = %name, group = %group, "Updated service configuration");
        }
    }

    /// Remove a service and its counters. Its incidents are kept.
    pub fn deregister_service(&self, name: &str) -> bool {
        let removed = self.inner.registry.deregister(name).is_some();
        if removed {
            tracing::info!(service = %name, "Deregistered service");
        }
        removed
    }

    /// Apply a reloaded configuration.
    ///
    /// Services are synced to the file and check settings swapped. The poll
    /// interval is fixed when the loop starts.
    pub fn reload(&self, config: &AggregatorConfig) {
        for service in &config.services {
            self.register_service(ServiceDefinition::from(service));
        }
        for name in self.inner.registry.names() {
            if !config.services.iter().any(|s| s.name == name) {
                self.deregister_service(&name);
            }
        }

        if self.inner.checks.load().interval_secs != config.checks.interval_secs {
            tracing::warn!(
                interval_secs = config.checks.interval_secs,
                "Poll interval changes take effect after restart"
            );
        }
        self.inner.checks.store(Arc::new(config.checks.clone()));
        lock(&self.inner.incidents).set_retention_days(config.incidents.retention_days);
        self.inner.incident_config.store(Arc::new(config.incidents.clone()));

        tracing::info!(services = config.services.len(), "Configuration reloaded");
    }

    /// Current check settings.
    pub fn check_config(&self) -> Arc<CheckConfig> {
        self.inner.checks.load_full()
    }

    /// Probe one service and record the result.
    pub async fn check_service(&self, name: &str) -> Result<ServiceStatus, AggregatorError> {
        let definition = self
            .inner
            .registry
            .definition(name)
            .ok_or_else(|| AggregatorError::UnknownService(name.to_string()))?;
        Ok(self.run_check(definition).await.unwrap_or(ServiceStatus::Unknown))
    }

    /// Probe every registered service concurrently and wait for all of them.
    pub async fn check_all(&self) {
        let started = Instant::now();
        let mut checks = JoinSet::new();

        for entry in self.inner.registry.snapshot() {
            let this = self.clone();
            checks.spawn(async move { this.run_check(entry.definition).await });
        }

        let count = checks.len();
        while let Some(result) = checks.join_next().await {
            if let Err(e) = result {
                tracing::error!(error = %e, "Health check task failed");
            }
        }

        self.inner.last_cycle.store(Some(Arc::new(Utc::now())));
        metrics::record_cycle(started.elapsed());
        tracing::debug!(services = count, elapsed_ms = started.elapsed().as_millis() as u64, "Poll cycle complete");
    }

    /// Returns the resulting status, or `None` if the service went away mid-check.
    async fn run_check(&self, definition: ServiceDefinition) -> Option<ServiceStatus> {
        let settings = self.inner.checks.load_full();
        let outcome = self
            .inner
            .probe
            .probe(&definition.name, &definition.health_url, &settings)
            .await;
        let classification = classify(&outcome, settings.degraded_threshold_ms);

        let applied = self.inner.registry.update(&definition.name, |entry| {
            let now = Utc::now();
            let previous = classification.apply(&mut entry.state, now);
            entry
                .uptime
                .record_outcome(classification.success, classification.latency_ms);

            let current = entry.state.status;
            if is_incident(previous, current) {
                let incident = Incident::new(&entry.definition, previous, current, now);
                lock(&self.inner.incidents).push(incident);
            }
            (previous, current)
        });

        let Some((previous, current)) = applied else {
            tracing::debug!(service = %definition.name, "Service deregistered during check, result dropped");
            return None;
        };

        metrics::record_check(
            &definition.name,
            current,
            classification.healthy,
            classification.response_time_ms,
        );
        if is_incident(previous, current) {
            metrics::record_incident(&definition.name, current);
            tracing::info!(service = %definition.name, from = %previous, to = %current, "Status change");
        }
        Some(current)
    }

    /// Enter or leave maintenance.
    ///
    /// Entering always records an incident. Leaving resets the service to
    /// unknown so the next check has to establish a real status; it is a
    /// no-op for a service that is not in maintenance.
    pub fn set_maintenance(&self, name: &str, active: bool) -> Result<(), AggregatorError> {
        let change = self
            .inner
            .registry
            .update(name, |entry| {
                let previous = entry.state.status;
                let next = match (active, previous) {
                    (true, ServiceStatus::Maintenance) => return None,
                    (true, _) => ServiceStatus::Maintenance,
                    (false, ServiceStatus::Maintenance) => ServiceStatus::Unknown,
                    (false, _) => return None,
                };

                entry.state.status = next;
                if next == ServiceStatus::Unknown {
                    entry.state.response_time_ms = None;
                    entry.state.consecutive_failures = 0;
                }
                let incident = Incident::new(&entry.definition, previous, next, Utc::now());
                lock(&self.inner.incidents).push(incident);
                Some((previous, next))
            })
            .ok_or_else(|| AggregatorError::UnknownService(name.to_string()))?;

        if let Some((previous, next)) = change {
            metrics::record_incident(name, next);
            tracing::info!(service = %name, from = %previous, to = %next, active, "Maintenance toggled");
        }
        Ok(())
    }

    /// Snapshot of the whole system. Never fails; an empty registry is operational.
    pub fn status_summary(&self) -> StatusSummary {
        let entries = self.inner.registry.snapshot();
        let limit = self.inner.incident_config.load().recent_limit;
        let recent = lock(&self.inner.incidents).recent(limit);
        StatusSummary::build(&entries, recent, self.last_cycle())
    }

    /// Incident history, most recent first, optionally filtered by resolution.
    pub fn incidents(&self, limit: usize, resolved: Option<bool>) -> Vec<Incident> {
        lock(&self.inner.incidents).query(limit, resolved)
    }

    /// Copy of one service's record.
    pub fn service(&self, name: &str) -> Option<ServiceEntry> {
        self.inner.registry.get(name)
    }

    pub fn uptime_percent(&self, name: &str) -> Option<f64> {
        self.inner.registry.get(name).map(|e| e.uptime.uptime_percent())
    }

    pub fn avg_response_time_ms(&self, name: &str) -> Option<u64> {
        self.inner.registry.get(name).map(|e| e.uptime.avg_response_time_ms())
    }

    /// When the last full poll cycle settled.
    pub fn last_cycle(&self) -> Option<DateTime<Utc>> {
        self.inner.last_cycle.load_full().map(|t| *t)
    }

    pub fn service_count(&self) -> usize {
        self.inner.registry.len()
    }
}
