//! End-to-end aggregator behaviour against mock backends.

use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;
use status_aggregator::config::{CheckConfig, IncidentConfig};
use status_aggregator::{Aggregator, ServiceDefinition, ServiceStatus};

mod common;
use common::{health_url, Reply};

/// Short timeouts so outage paths finish quickly.
fn fast_checks() -> CheckConfig {
    CheckConfig {
        interval_secs: 1,
        timeout_ms: 200,
        retries: 2,
        retry_delay_ms: 20,
        degraded_threshold_ms: 200,
        ..Default::default()
    }
}

fn aggregator(checks: CheckConfig) -> Aggregator {
    Aggregator::new(checks, IncidentConfig::default()).unwrap()
}

#[tokio::test]
async fn healthy_and_timed_out_services_after_one_cycle() {
    let a = common::start_mock_backend(r#"{"status":"ok"}"#).await;
    let b = common::start_hanging_backend().await;

    let agg = aggregator(fast_checks());
    agg.register_service(ServiceDefinition::new("svc-a", health_url(a)));
    agg.register_service(ServiceDefinition::new("svc-b", health_url(b)));

    agg.check_all().await;

    let svc_a = agg.service("svc-a").unwrap();
    assert_eq!(svc_a.state.status, ServiceStatus::Operational);
    assert_eq!(svc_a.state.health_data, json!({ "status": "ok" }));
    assert!(svc_a.state.response_time_ms.is_some());

    let svc_b = agg.service("svc-b").unwrap();
    assert_eq!(svc_b.state.status, ServiceStatus::MajorOutage);
    assert_eq!(svc_b.state.response_time_ms, None);
    assert!(svc_b.state.last_error.as_deref().unwrap().contains("timed out"));
    assert_eq!(svc_b.state.consecutive_failures, 1);

    let summary = agg.status_summary();
    assert_eq!(summary.overall_status, ServiceStatus::MajorOutage);
    assert_eq!(summary.service_count.outage, 1);
    assert_eq!(summary.service_count.operational, 1);
    assert!(summary.last_check.is_some());

    // Both services started at unknown, so neither first classification is an incident.
    assert!(agg.incidents(10, None).is_empty());
    assert_eq!(agg.uptime_percent("svc-a"), Some(100.0));
    assert_eq!(agg.uptime_percent("svc-b"), Some(0.0));
}

#[tokio::test]
async fn outage_and_recovery_record_two_incidents() {
    let code = Arc::new(AtomicU16::new(200));
    let c = code.clone();
    let addr = common::start_programmable_backend(move || {
        let c = c.clone();
        async move { Reply::status(c.load(Ordering::SeqCst)) }
    })
    .await;

    let agg = aggregator(fast_checks());
    agg.register_service(ServiceDefinition::new("svc-a", health_url(addr)));

    agg.check_all().await;
    assert_eq!(agg.service("svc-a").unwrap().state.status, ServiceStatus::Operational);

    code.store(500, Ordering::SeqCst);
    agg.check_all().await;
    let entry = agg.service("svc-a").unwrap();
    assert_eq!(entry.state.status, ServiceStatus::PartialOutage);
    assert_eq!(entry.state.consecutive_failures, 1);

    code.store(200, Ordering::SeqCst);
    agg.check_all().await;
    let entry = agg.service("svc-a").unwrap();
    assert_eq!(entry.state.status, ServiceStatus::Operational);
    assert_eq!(entry.state.consecutive_failures, 0);

    let incidents = agg.incidents(10, None);
    assert_eq!(incidents.len(), 2);
    assert_eq!(incidents[0].previous_status, ServiceStatus::PartialOutage);
    assert_eq!(incidents[0].new_status, ServiceStatus::Operational);
    assert!(incidents[0].resolved);
    assert_eq!(incidents[1].new_status, ServiceStatus::PartialOutage);
    assert!(!incidents[1].resolved);

    let uptime = agg.service("svc-a").unwrap().uptime;
    // The 500 was still an answer, so it counts toward uptime.
    assert_eq!(uptime.checks_total, 3);
    assert_eq!(uptime.checks_succeeded, 3);
}

#[tokio::test]
async fn slow_success_is_degraded() {
    let addr = common::start_programmable_backend(|| async {
        Reply::slow(Duration::from_millis(150))
    })
    .await;

    let agg = aggregator(CheckConfig {
        degraded_threshold_ms: 50,
        timeout_ms: 2_000,
        ..fast_checks()
    });
    agg.register_service(ServiceDefinition::new("slow", health_url(addr)));

    assert_eq!(agg.check_service("slow").await.unwrap(), ServiceStatus::Degraded);
    let entry = agg.service("slow").unwrap();
    assert!(entry.state.response_time_ms.unwrap() >= 150);
    assert_eq!(entry.uptime.checks_succeeded, 1);
    assert_eq!(agg.status_summary().overall_status, ServiceStatus::Degraded);
}

#[tokio::test]
async fn malformed_body_is_an_empty_object() {
    let addr = common::start_mock_backend("<html>fine</html>").await;

    let agg = aggregator(fast_checks());
    agg.register_service(ServiceDefinition::new("html", health_url(addr)));

    assert_eq!(agg.check_service("html").await.unwrap(), ServiceStatus::Operational);
    assert_eq!(agg.service("html").unwrap().state.health_data, json!({}));
}

#[tokio::test]
async fn invalid_url_is_a_major_outage() {
    let agg = aggregator(fast_checks());
    agg.register_service(ServiceDefinition::new("typo", "htp:/nowhere"));
    agg.register_service(ServiceDefinition::new("garbage", "::not a url::"));

    agg.check_all().await;

    for name in ["typo", "garbage"] {
        let entry = agg.service(name).unwrap();
        assert_eq!(entry.state.status, ServiceStatus::MajorOutage, "{}", name);
        assert!(entry.state.last_error.is_some());
    }
}

#[tokio::test]
async fn slow_services_do_not_serialize_the_cycle() {
    let agg = aggregator(CheckConfig {
        timeout_ms: 300,
        retries: 0,
        ..fast_checks()
    });
    for i in 0..4 {
        let addr = common::start_hanging_backend().await;
        agg.register_service(ServiceDefinition::new(format!("hang-{}", i), health_url(addr)));
    }
    let ok = common::start_mock_backend("{}").await;
    agg.register_service(ServiceDefinition::new("ok", health_url(ok)));

    let started = Instant::now();
    agg.check_all().await;
    let elapsed = started.elapsed();

    // Serial checks would take at least 4 × 300ms.
    assert!(elapsed < Duration::from_millis(900), "cycle took {:?}", elapsed);
    assert_eq!(agg.service("ok").unwrap().state.status, ServiceStatus::Operational);
    assert_eq!(agg.status_summary().service_count.outage, 4);
}

#[tokio::test]
async fn maintenance_survives_poll_cycles() {
    let addr = common::start_programmable_backend(|| async { Reply::status(503) }).await;

    let agg = aggregator(fast_checks());
    agg.register_service(ServiceDefinition::new("svc-a", health_url(addr)));
    agg.check_all().await;
    assert_eq!(agg.service("svc-a").unwrap().state.status, ServiceStatus::PartialOutage);

    agg.set_maintenance("svc-a", true).unwrap();
    agg.check_all().await;
    agg.check_all().await;

    let entry = agg.service("svc-a").unwrap();
    assert_eq!(entry.state.status, ServiceStatus::Maintenance);
    assert_eq!(entry.uptime.checks_total, 3);
    assert_eq!(agg.status_summary().overall_status, ServiceStatus::Maintenance);

    let incidents = agg.incidents(10, None);
    assert_eq!(incidents.len(), 1);
    assert_eq!(incidents[0].previous_status, ServiceStatus::PartialOutage);
    assert_eq!(incidents[0].new_status, ServiceStatus::Maintenance);

    agg.set_maintenance("svc-a", false).unwrap();
    assert_eq!(agg.service("svc-a").unwrap().state.status, ServiceStatus::Unknown);

    // Re-established from scratch: unknown → partial outage is not an incident.
    agg.check_all().await;
    assert_eq!(agg.service("svc-a").unwrap().state.status, ServiceStatus::PartialOutage);
    assert_eq!(agg.incidents(10, None).len(), 2);
}

#[tokio::test]
async fn consecutive_failures_accumulate_until_success() {
    let code = Arc::new(AtomicU16::new(502));
    let c = code.clone();
    let addr = common::start_programmable_backend(move || {
        let c = c.clone();
        async move { Reply::status(c.load(Ordering::SeqCst)) }
    })
    .await;

    let agg = aggregator(fast_checks());
    agg.register_service(ServiceDefinition::new("flaky", health_url(addr)));

    for _ in 0..3 {
        agg.check_service("flaky").await.unwrap();
    }
    assert_eq!(agg.service("flaky").unwrap().state.consecutive_failures, 3);

    code.store(200, Ordering::SeqCst);
    agg.check_service("flaky").await.unwrap();
    assert_eq!(agg.service("flaky").unwrap().state.consecutive_failures, 0);
}

#[tokio::test]
async fn stopped_loop_issues_no_new_cycles() {
    let addr = common::start_mock_backend("{}").await;

    let agg = aggregator(fast_checks());
    agg.register_service(ServiceDefinition::new("svc-a", health_url(addr)));

    assert!(agg.start());
    let deadline = Instant::now() + Duration::from_secs(3);
    while agg.last_cycle().is_none() && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(agg.last_cycle().is_some());

    agg.shutdown().await;
    agg.stop();
    let checks = agg.service("svc-a").unwrap().uptime.checks_total;

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(agg.service("svc-a").unwrap().uptime.checks_total, checks);
    assert!(!agg.is_running());
}

#[tokio::test]
async fn reads_during_a_cycle_see_whole_records() {
    let addr = common::start_programmable_backend(|| async {
        Reply::slow(Duration::from_millis(50))
    })
    .await;

    let agg = aggregator(fast_checks());
    for i in 0..10 {
        agg.register_service(ServiceDefinition::new(format!("svc-{}", i), health_url(addr)));
    }

    let cycle = {
        let agg = agg.clone();
        tokio::spawn(async move { agg.check_all().await })
    };

    while !cycle.is_finished() {
        let summary = agg.status_summary();
        for service in summary.services.values().flatten() {
            // A classified record always carries its counted check.
            if service.status != ServiceStatus::Unknown {
                assert!(service.last_check.is_some());
                assert!(agg.service(&service.name).unwrap().uptime.checks_total >= 1);
            }
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    cycle.await.unwrap();
    assert_eq!(agg.status_summary().service_count.operational, 10);
}

#[tokio::test]
async fn error_responses_still_count_toward_uptime() {
    let addr = common::start_programmable_backend(|| async { Reply::status(503) }).await;

    let agg = aggregator(fast_checks());
    agg.register_service(ServiceDefinition::new("svc-a", health_url(addr)));

    assert_eq!(agg.check_service("svc-a").await.unwrap(), ServiceStatus::PartialOutage);

    let entry = agg.service("svc-a").unwrap();
    assert_eq!(entry.state.consecutive_failures, 1);
    assert_eq!(entry.uptime.checks_total, 1);
    assert_eq!(entry.uptime.checks_succeeded, 1);
    assert_eq!(agg.uptime_percent("svc-a"), Some(100.0));
    assert_eq!(
        agg.avg_response_time_ms("svc-a"),
        Some(entry.state.response_time_ms.unwrap())
    );
}

#[tokio::test]
async fn retry_that_gets_an_answer_classifies_from_it() {
    let requests = Arc::new(AtomicUsize::new(0));
    let seen = requests.clone();
    let addr = common::start_programmable_backend(move || {
        let seen = seen.clone();
        async move {
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                Reply::Hang
            } else {
                Reply::ok(r#"{"status":"ok"}"#)
            }
        }
    })
    .await;

    let agg = aggregator(CheckConfig {
        timeout_ms: 150,
        retries: 2,
        retry_delay_ms: 20,
        degraded_threshold_ms: 5_000,
        ..fast_checks()
    });
    agg.register_service(ServiceDefinition::new("svc-a", health_url(addr)));

    assert_eq!(agg.check_service("svc-a").await.unwrap(), ServiceStatus::Operational);

    // The answer on the second attempt stops the loop before the third.
    assert_eq!(requests.load(Ordering::SeqCst), 2);
    let entry = agg.service("svc-a").unwrap();
    assert_eq!(entry.state.consecutive_failures, 0);
    assert_eq!(entry.state.last_error, None);
    assert_eq!(entry.state.health_data, json!({ "status": "ok" }));
    // Latency runs from the first attempt, so it includes the timed-out one.
    assert!(entry.state.response_time_ms.unwrap() >= 150);
    assert_eq!(entry.uptime.checks_succeeded, 1);
}
