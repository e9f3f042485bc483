//! Active health probing.
//!
//! # Responsibilities
//! - Issue a timed GET against a service's health URL
//! - Retry network-level failures within the retry budget
//! - Parse the body best-effort
//!
//! # Design Decisions
//! - The per-attempt deadline wraps the request future; dropping it on timeout
//!   aborts the connection instead of leaving it running in the background
//! - A received response ends the attempt loop whatever its status code
//! - Unparseable URLs fail immediately; retrying cannot fix them

use std::time::{Duration, Instant};
use reqwest::header::{ACCEPT, USER_AGENT};
use serde_json::Value;
use tokio::time;
use url::Url;

use crate::config::CheckConfig;
use crate::health::classify::ProbeOutcome;
use crate::resilience::RetryPolicy;

/// HTTP prober shared by every check.
#[derive(Debug, Clone)]
pub struct HealthProbe {
    client: reqwest::Client,
}

impl HealthProbe {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .no_proxy()
            .pool_max_idle_per_host(0)
            .build()?;
        Ok(Self { client })
    }

    /// Probe `health_url` with the given settings. Never fails; failures are outcomes.
    pub async fn probe(&self, service: &str, health_url: &str, settings: &CheckConfig) -> ProbeOutcome {
        let start = Instant::now();

        let url = match Url::parse(health_url) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(service = %service, url = %health_url, error = %e, "Invalid health URL");
                return ProbeOutcome::Unreachable {
                    error: format!("invalid health URL: {}", e),
                    attempts: 1,
                };
            }
        };

        let policy = RetryPolicy::from(settings);
        let timeout = settings.timeout();
        let mut attempts = 0;

        loop {
            attempts += 1;

            match self.attempt(url.clone(), settings, timeout).await {
                Ok(response) => {
                    let status_code = response.status().as_u16();
                    let latency_ms = start.elapsed().as_millis() as u64;
                    let body = read_body(response, timeout).await;
                    tracing::debug!(service = %service, status = status_code, latency_ms, "Health probe answered");
                    return ProbeOutcome::Responded { status_code, latency_ms, body };
                }
                Err(error) => {
                    tracing::warn!(service = %service, attempt = attempts, error = %error, "Health probe failed");
                    if !policy.should_retry(attempts) {
                        return ProbeOutcome::Unreachable { error, attempts };
                    }
                    time::sleep(policy.pause()).await;
                }
            }
        }
    }

    async fn attempt(
        &self,
        url: Url,
        settings: &CheckConfig,
        timeout: Duration,
    ) -> Result<reqwest::Response, String> {
        let request = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, settings.user_agent.as_str())
            .send();

        match time::timeout(timeout, request).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(describe(&e)),
            Err(_) => Err(format!("timed out after {}ms", timeout.as_millis())),
        }
    }
}

/// Read and parse a body; anything that is not JSON becomes `{}`.
async fn read_body(response: reqwest::Response, timeout: Duration) -> Value {
    match time::timeout(timeout, response.bytes()).await {
        Ok(Ok(bytes)) => parse_body(&bytes),
        _ => empty_object(),
    }
}

fn parse_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap_or_else(|_| empty_object())
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

fn describe(error: &reqwest::Error) -> String {
    if error.is_connect() {
        format!("connection failed: {}", error)
    } else if error.is_timeout() {
        format!("timed out: {}", error)
    } else {
        error.to_string()
    }
}
