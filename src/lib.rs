//! Service Status Aggregator Library
//!
//! Polls a registry of backend services, classifies their health, records
//! status-change incidents and serves a consolidated status report.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod status;

pub use aggregator::Aggregator;
pub use config::AggregatorConfig;
pub use error::AggregatorError;
pub use http::StatusServer;
pub use status::{Incident, ServiceDefinition, ServiceStatus, StatusSummary};
