//! Status API subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP request
//!     → server.rs (Axum router, trace + timeout layers)
//!     → auth.rs (admin routes only)
//!     → handlers.rs (read summary / toggle maintenance / force a cycle)
//!     → error.rs (ApiError → JSON error body)
//! ```
//!
//! # Design Decisions
//! - Read routes never fail; the aggregator always has a last-known state
//! - Outages surface as 503 with the full body so gates and humans share one endpoint

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, AppState, StatusServer};
