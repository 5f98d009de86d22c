// End-to-end poll cycles against a stub Airbyte API served on an ephemeral
// port: token exchange, the four list fetches, and every collector.

use airbyte_exporter::config::Config;
use airbyte_exporter::metrics::Metrics;
use airbyte_exporter::poller::Poller;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

async fn spawn_stub(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn test_config(addr: SocketAddr) -> Config {
    Config {
        api_url: format!("http://{addr}"),
        metrics_port: 0,
        update_interval_seconds: 1,
        client_id: "test-client".to_string(),
        client_secret: "test-secret".to_string(),
    }
}

async fn token_handler() -> Json<Value> {
    Json(json!({"access_token": "stub-token", "expires_in": 180}))
}

fn data(items: Value) -> Json<Value> {
    Json(json!({ "data": items }))
}

#[tokio::test]
async fn test_full_poll_cycle() {
    let app = Router::new()
        .route("/applications/token", post(token_handler))
        .route(
            "/jobs",
            get(|| async {
                data(json!([
                    {
                        "connectionId": "c1", "jobType": "sync", "status": "succeeded",
                        "bytesSynced": 100, "rowsSynced": 10, "duration": "PT30S",
                        "lastUpdatedAt": "2023-01-01T00:00:00Z"
                    },
                    {"status": "running"},
                    {"status": "pending"}
                ]))
            }),
        )
        .route(
            "/connections",
            get(|| async {
                data(json!([
                    {"connectionId": "c1", "name": "Foo", "status": "active",
                     "sourceId": "s1", "destinationId": "d1"}
                ]))
            }),
        )
        .route(
            "/destinations",
            get(|| async { data(json!([{}, {}, {}, {}, {}])) }),
        )
        .route("/sources", get(|| async { data(json!([{}])) }));

    let addr = spawn_stub(app).await;
    let metrics = Arc::new(Metrics::new().unwrap());
    let mut poller = Poller::new(&test_config(addr), Arc::clone(&metrics)).unwrap();

    poller.poll_once().await.unwrap();

    assert_eq!(metrics.active_connections.get(), 1);
    assert_eq!(metrics.num_running_jobs.get(), 1);
    assert_eq!(metrics.num_pending_jobs.get(), 1);
    assert_eq!(metrics.num_successful_syncs.get(), 1);
    assert_eq!(metrics.total_bytes_synced.get(), 100);
    assert_eq!(metrics.total_rows_synced.get(), 10);
    assert_eq!(metrics.avg_successful_sync_duration.get(), 30.0);
    assert_eq!(metrics.num_destinations.get(), 5);
    assert_eq!(metrics.num_sources.get(), 1);
    assert_eq!(
        metrics
            .last_successful_sync_timestamp
            .with_label_values(&["c1", "Foo"])
            .get(),
        1672531200
    );
}

#[tokio::test]
async fn test_failed_endpoint_degrades_to_empty_without_aborting_cycle() {
    let app = Router::new()
        .route("/applications/token", post(token_handler))
        .route(
            "/jobs",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response() }),
        )
        .route("/connections", get(|| async { data(json!([])) }))
        .route("/destinations", get(|| async { data(json!([{}, {}])) }))
        .route("/sources", get(|| async { data(json!([])) }));

    let addr = spawn_stub(app).await;
    let metrics = Arc::new(Metrics::new().unwrap());
    let mut poller = Poller::new(&test_config(addr), Arc::clone(&metrics)).unwrap();

    // Jobs endpoint failing must not fail the cycle
    poller.poll_once().await.unwrap();

    assert_eq!(metrics.num_running_jobs.get(), 0);
    assert_eq!(metrics.num_destinations.get(), 2);
}

#[tokio::test]
async fn test_token_failure_aborts_cycle() {
    let app = Router::new()
        .route(
            "/applications/token",
            post(|| async { (StatusCode::UNAUTHORIZED, "bad credentials").into_response() }),
        )
        .route("/destinations", get(|| async { data(json!([{}])) }));

    let addr = spawn_stub(app).await;
    let metrics = Arc::new(Metrics::new().unwrap());
    let mut poller = Poller::new(&test_config(addr), Arc::clone(&metrics)).unwrap();

    let result = poller.poll_once().await;
    assert!(result.is_err());
    // Nothing was fetched or written
    assert_eq!(metrics.num_destinations.get(), 0);
}

#[tokio::test]
async fn test_connection_removed_between_cycles_resolves_unknown() {
    let cycle = Arc::new(AtomicUsize::new(0));

    async fn connections_handler(State(cycle): State<Arc<AtomicUsize>>) -> Json<Value> {
        if cycle.fetch_add(1, Ordering::SeqCst) == 0 {
            data(json!([{"connectionId": "c1", "name": "Foo", "status": "active"}]))
        } else {
            data(json!([]))
        }
    }

    let app = Router::new()
        .route("/applications/token", post(token_handler))
        .route(
            "/jobs",
            get(|| async {
                data(json!([
                    {"connectionId": "c1", "jobType": "sync", "status": "succeeded",
                     "lastUpdatedAt": "2023-01-01T00:00:00Z"}
                ]))
            }),
        )
        .route("/connections", get(connections_handler))
        .route("/destinations", get(|| async { data(json!([])) }))
        .route("/sources", get(|| async { data(json!([])) }))
        .with_state(Arc::clone(&cycle));

    let addr = spawn_stub(app).await;
    let metrics = Arc::new(Metrics::new().unwrap());
    let mut poller = Poller::new(&test_config(addr), Arc::clone(&metrics)).unwrap();

    poller.poll_once().await.unwrap();
    assert_eq!(
        metrics
            .last_successful_sync_timestamp
            .with_label_values(&["c1", "Foo"])
            .get(),
        1672531200
    );

    // c1 disappears; the same job now labels its connection as unknown
    poller.poll_once().await.unwrap();
    assert_eq!(metrics.active_connections.get(), 0);
    assert_eq!(
        metrics
            .last_successful_sync_timestamp
            .with_label_values(&["c1", "unknown"])
            .get(),
        1672531200
    );
}
