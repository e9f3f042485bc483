//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (interval, timeout, retention > 0)
//! - Detect duplicate or empty service names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Health URLs are not parsed here; a bad URL shows up as an outage at check time

use std::collections::HashSet;
use std::fmt;

use crate::config::schema::AggregatorConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    ZeroInterval,
    ZeroTimeout,
    ZeroRetention,
    EmptyServiceName,
    DuplicateService(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::ZeroInterval => write!(f, "checks.interval_secs must be greater than 0"),
            ValidationError::ZeroTimeout => write!(f, "checks.timeout_ms must be greater than 0"),
            ValidationError::ZeroRetention => {
                write!(f, "incidents.retention_days must be greater than 0")
            }
            ValidationError::EmptyServiceName => write!(f, "service name must not be empty"),
            ValidationError::DuplicateService(name) => {
                write!(f, "service '{}' is defined more than once", name)
            }
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AggregatorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.checks.interval_secs == 0 {
        errors.push(ValidationError::ZeroInterval);
    }
    if config.checks.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if config.incidents.retention_days == 0 {
        errors.push(ValidationError::ZeroRetention);
    }

    let mut seen = HashSet::new();
    for service in &config.services {
        if service.name.trim().is_empty() {
            errors.push(ValidationError::EmptyServiceName);
        } else if !seen.insert(service.name.as_str()) {
            errors.push(ValidationError::DuplicateService(service.name.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
