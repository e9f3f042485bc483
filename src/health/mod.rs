//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Check of one service:
//!     probe.rs (timed GET, retries on network failure)
//!     → ProbeOutcome (responded / unreachable)
//!     → classify.rs (status, latency, error, uptime outcome)
//!     → applied to the registry entry by the aggregator
//! ```
//!
//! # Design Decisions
//! - Probing and classification are separate so the rules are testable offline
//! - No error leaves this module; every failure is a classification

pub mod classify;
pub mod probe;

pub use classify::{classify, Classification, ProbeOutcome};
pub use probe::HealthProbe;
