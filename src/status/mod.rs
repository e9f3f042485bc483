//! Status domain model.
//!
//! # Data Flow
//! ```text
//! registry.rs  (name → definition + state + uptime counters)
//!     ↑ check results applied per entry
//!     ↓ snapshots
//! summary.rs   (overall status, grouping, counts)
//!
//! incidents.rs (transition log, most-recent-first, lazily pruned)
//! uptime.rs    (monotonic counters and derived percentages)
//! ```

pub mod incidents;
pub mod registry;
pub mod summary;
pub mod types;
pub mod uptime;

pub use incidents::{Incident, IncidentLog};
pub use registry::{Registry, ServiceEntry};
pub use summary::{ServiceCount, ServiceSummary, StatusSummary};
pub use types::{ServiceDefinition, ServiceState, ServiceStatus};
pub use uptime::UptimeCounters;
