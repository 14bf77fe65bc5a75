//! Startup ordering and graceful shutdown of the full two-listener process.

mod common;

use std::time::Duration;

use gatehouse::client::GatehouseClient;
use gatehouse::{
    Config, DrainOutcome, GatehouseError, Handlers, Lifecycle, Phase, Running, ShutdownReport,
};
use serde_json::{Value, json};
use tokio::sync::oneshot;

async fn start(config: Config, handlers: Handlers) -> Running {
    match Lifecycle::new(config, handlers).start().await {
        Ok(running) => running,
        Err(e) => panic!("startup failed: {e}"),
    }
}

fn completed() -> ShutdownReport {
    ShutdownReport {
        http: DrainOutcome::Completed,
        rpc: DrainOutcome::Completed,
    }
}

#[tokio::test]
async fn startup_runs_every_phase_in_order() {
    let dir = tempfile::tempdir().unwrap();
    common::write_docs(dir.path());
    let running = start(common::test_config(dir.path()), Handlers::default()).await;

    assert_eq!(
        running.phases(),
        &[
            Phase::Bind,
            Phase::ServeRpc,
            Phase::BridgeDial,
            Phase::Register,
            Phase::ServeHttp
        ]
    );
    assert_ne!(running.rpc_addr().port(), 0);
    assert_ne!(running.http_addr().port(), 0);
    assert_eq!(running.shutdown().await, completed());
}

#[tokio::test]
async fn both_protocols_answer_once_started() {
    let dir = tempfile::tempdir().unwrap();
    common::write_docs(dir.path());
    let running = start(common::test_config(dir.path()), Handlers::default()).await;
    let base = format!("http://{}", running.http_addr());
    let http = reqwest::Client::new();

    let reply: Value = http
        .post(format!("{base}/v1/greet"))
        .json(&json!({ "name": "World" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reply, json!({ "message": "World world" }));

    let health = http.get(format!("{base}/healthz")).send().await.unwrap();
    assert_eq!(health.status(), reqwest::StatusCode::OK);

    let docs = http
        .get(format!("{base}/docs/swagger.json"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(docs, common::SWAGGER_JSON);

    let rpc = GatehouseClient::connect(format!("http://{}", running.rpc_addr()))
        .await
        .unwrap();
    assert_eq!(rpc.greet("Gatehouse").await.unwrap(), "Gatehouse world");
    drop(rpc);

    assert_eq!(running.shutdown().await, completed());
}

#[tokio::test]
async fn empty_healthz_path_disables_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = common::test_config(dir.path());
    config.gateway.healthz_path = String::new();
    let running = start(config, Handlers::default()).await;

    let response = reqwest::get(format!("http://{}/healthz", running.http_addr()))
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    running.shutdown().await;
}

#[tokio::test]
async fn http_listener_closes_after_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let running = start(common::test_config(dir.path()), Handlers::default()).await;
    let http_addr = running.http_addr();
    let rpc_addr = running.rpc_addr();

    assert_eq!(running.shutdown().await, completed());

    assert!(tokio::net::TcpStream::connect(http_addr).await.is_err());
    assert!(tokio::net::TcpStream::connect(rpc_addr).await.is_err());
}

#[tokio::test]
async fn in_flight_http_request_finishes_during_drain() {
    let dir = tempfile::tempdir().unwrap();
    let running = start(
        common::test_config(dir.path()),
        common::slow_handlers(Duration::from_millis(500)),
    )
    .await;
    let url = format!("http://{}/v1/greet", running.http_addr());

    let pending = tokio::spawn(async move {
        reqwest::Client::new()
            .post(url)
            .json(&json!({ "name": "World" }))
            .send()
            .await
            .unwrap()
            .json::<Value>()
            .await
            .unwrap()
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(running.shutdown().await, completed());
    assert_eq!(pending.await.unwrap(), json!({ "message": "World world" }));
}

#[tokio::test]
async fn rpc_drain_is_bounded() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = common::test_config(dir.path());
    config.server.shutdown.rpc_grace_secs = 1;
    let running = start(config, common::slow_handlers(Duration::from_secs(30))).await;

    let client = GatehouseClient::connect(format!("http://{}", running.rpc_addr()))
        .await
        .unwrap();
    let pending = tokio::spawn(async move { client.greet("World").await });
    tokio::time::sleep(Duration::from_millis(100)).await;

    let report = running.shutdown().await;
    assert_eq!(report.http, DrainOutcome::Completed);
    assert_eq!(report.rpc, DrainOutcome::TimedOut);
    pending.abort();
}

#[tokio::test]
async fn occupied_rpc_port_fails_at_bind() {
    let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut config = common::test_config(dir.path());
    config.server.rpc_address = taken.local_addr().unwrap().to_string();

    let err = Lifecycle::new(config, Handlers::default()).start().await.err();
    assert!(matches!(err, Some(GatehouseError::Bind { .. })));
}

#[tokio::test]
async fn occupied_http_port_fails_after_rpc_started() {
    let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let taken_addr = taken.local_addr().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut config = common::test_config(dir.path());
    config.server.http_address = taken_addr.to_string();

    let err = Lifecycle::new(config, Handlers::default()).start().await.err();
    match err {
        Some(GatehouseError::Bind { addr, .. }) => assert_eq!(addr, taken_addr),
        other => panic!("expected bind error, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_address_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = common::test_config(dir.path());
    config.server.rpc_address = "not-an-address".to_string();

    let err = Lifecycle::new(config, Handlers::default()).start().await.err();
    assert!(matches!(err, Some(GatehouseError::Configuration(_))));
}

#[tokio::test]
async fn run_drains_when_signal_fires() {
    let dir = tempfile::tempdir().unwrap();
    let lifecycle = Lifecycle::new(common::test_config(dir.path()), Handlers::default());
    let (fire, signal) = oneshot::channel::<()>();

    let run = tokio::spawn(lifecycle.run(async move {
        let _ = signal.await;
    }));
    tokio::time::sleep(Duration::from_millis(200)).await;
    fire.send(()).unwrap();

    assert_eq!(run.await.unwrap().unwrap(), completed());
}
