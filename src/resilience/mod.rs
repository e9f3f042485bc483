//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Health probe:
//!     → per-attempt timeout (health/probe.rs, tokio::time::timeout)
//!     → On network failure: retry.rs (budget check, jittered pause)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every probe attempt has a deadline
//! - A timed-out attempt is dropped, which cancels the in-flight request

pub mod retry;

pub use retry::RetryPolicy;
