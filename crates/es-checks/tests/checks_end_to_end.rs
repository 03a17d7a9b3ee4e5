//! End-to-end verdicts for every check against a mock cluster.

use es_checks::checks::{
    CircuitBreakers, ClusterHealth, ClusterStatus, FileDescriptors, HealthLevel, Heap,
};
use es_checks::{run_check, Severity, ThresholdConfig, Verdict};
use es_client::{ConnectionConfig, HttpFetcher};
use std::time::Duration;

use serde_json::json;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

async fn fetcher_with_timeout(server: &MockServer, timeout_secs: u64) -> HttpFetcher {
    let addr = server.address();
    HttpFetcher::new(&ConnectionConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
        timeout_secs,
        ..ConnectionConfig::default()
    })
    .await
    .unwrap()
}

async fn fetcher_for(server: &MockServer) -> HttpFetcher {
    fetcher_with_timeout(server, 5).await
}

async fn mount_json(server: &MockServer, endpoint: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn circuit_breakers_report_tripped_names() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/_nodes/stats",
        json!({ "nodes": {
            "n1": { "breakers": { "fielddata": { "tripped": 2 }, "request": { "tripped": 0 } } },
            "n2": { "breakers": { "parent": { "tripped": 1 } } }
        } }),
    )
    .await;

    let check = CircuitBreakers {
        localhost: false,
        timeout_secs: 30,
    };
    let verdict = run_check(&check, &fetcher_for(&server).await).await;
    assert_eq!(
        verdict.render("ESCircuitBreaker"),
        "ESCircuitBreaker CRITICAL: Circuit Breakers: fielddata, parent tripped!"
    );
    assert_eq!(verdict.severity.exit_code(), 2);
}

#[tokio::test]
async fn cluster_health_yellow_is_warning() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/_cluster/health"))
        .and(query_param("level", "indices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "yellow" })))
        .expect(1)
        .mount(&server)
        .await;

    let check = ClusterHealth {
        level: HealthLevel::Indices,
        timeout_secs: 30,
        ..ClusterHealth::default()
    };
    let verdict = run_check(&check, &fetcher_for(&server).await).await;
    assert_eq!(verdict, Verdict::warning("indices state is Yellow"));
}

#[tokio::test]
async fn cluster_status_reports_observed_status_after_wait_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/_cluster/health"))
        .and(query_param("wait_for_status", "green"))
        .and(query_param("timeout", "2s"))
        .respond_with(
            ResponseTemplate::new(408).set_body_json(json!({ "status": "red", "timed_out": true })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let check = ClusterStatus {
        master_only: false,
        status_timeout: Some(2),
        timeout_secs: 30,
    };
    let verdict = run_check(&check, &fetcher_for(&server).await).await;
    assert_eq!(verdict, Verdict::critical("Cluster is red"));
}

#[tokio::test]
async fn cluster_status_on_non_master_skips_health() {
    let server = MockServer::start().await;
    mount_json(&server, "/_nodes/_local/stats", json!({ "nodes": { "data-1": {} } })).await;
    mount_json(
        &server,
        "/_cluster/state/master_node",
        json!({ "master_node": "master-1" }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/_cluster/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "red" })))
        .expect(0)
        .mount(&server)
        .await;

    let check = ClusterStatus {
        master_only: true,
        status_timeout: None,
        timeout_secs: 30,
    };
    let verdict = run_check(&check, &fetcher_for(&server).await).await;
    assert_eq!(verdict, Verdict::ok("not the master"));
}

#[tokio::test]
async fn file_descriptors_on_old_server_use_nodes_info() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/_cluster/stats",
        json!({ "nodes": { "versions": ["1.7.6"] } }),
    )
    .await;
    mount_json(
        &server,
        "/_nodes/stats",
        json!({ "nodes": { "n1": { "process": { "open_file_descriptors": 920 } } } }),
    )
    .await;
    mount_json(
        &server,
        "/_nodes",
        json!({ "nodes": { "n1": { "process": { "max_file_descriptors": 1000 } } } }),
    )
    .await;

    let verdict = run_check(&FileDescriptors::default(), &fetcher_for(&server).await).await;
    assert_eq!(
        verdict,
        Verdict::critical("fd usage 92% exceeds 90% (920/1000)")
    );
}

#[tokio::test]
async fn heap_percentage_mode() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/_cluster/stats",
        json!({ "nodes": {
            "versions": ["7.10.2"],
            "jvm": { "mem": { "heap_used_in_bytes": 750, "heap_max_in_bytes": 1000 } }
        } }),
    )
    .await;

    let check = Heap {
        thresholds: ThresholdConfig::percentage(Some(70), Some(90)),
        timeout_secs: 30,
    };
    let verdict = run_check(&check, &fetcher_for(&server).await).await;
    assert_eq!(
        verdict,
        Verdict::warning("Heap used in bytes 750 (75% full)")
    );
}

#[tokio::test]
async fn server_errors_are_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/_cluster/stats"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let verdict = run_check(&Heap::default(), &fetcher_for(&server).await).await;
    assert_eq!(verdict.severity, Severity::Unknown);
    assert!(verdict.message.contains("500"));
}

#[tokio::test]
async fn slow_cluster_is_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/_cluster/stats"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "nodes": { "versions": ["7.10.2"] } }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let check = Heap {
        timeout_secs: 1,
        ..Heap::default()
    };
    let verdict = run_check(&check, &fetcher_with_timeout(&server, 1).await).await;
    assert_eq!(
        verdict,
        Verdict::unknown("Request failed: Request timed out after 1 seconds")
    );
    assert_eq!(verdict.severity.exit_code(), 3);
}
