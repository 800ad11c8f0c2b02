//! A stub coordinator served on a random local port.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use m4db_client::{CoordinatorClient, RetryPolicy};
use serde_json::{json, Value};

/// Unique id the stub knows about; every other id is a 404.
pub const KNOWN_ID: &str = "0f3a9c2e-1b4d-4e8f-9a01-23456789abcd";

#[derive(Default)]
pub struct Stub {
    /// Number of requests to answer with 503 before behaving.
    pub failures: AtomicU32,
    pub hits: AtomicU32,
    pub last_body: Mutex<Option<Value>>,
}

impl Stub {
    fn fail_once(&self) -> bool {
        self.hits.fetch_add(1, Ordering::SeqCst);
        self.failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

type Reply = (StatusCode, Json<Value>);

fn unavailable() -> Reply {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({"error": "busy", "code": "UNAVAILABLE"})),
    )
}

async fn running_status(State(stub): State<Arc<Stub>>, Path(id): Path<String>) -> Reply {
    if stub.fail_once() {
        return unavailable();
    }
    if id != KNOWN_ID {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "model not found", "code": "NOT_FOUND"})),
        );
    }
    (StatusCode::OK, Json(json!({"return": "finished"})))
}

async fn set_running_status(State(stub): State<Arc<Stub>>, Json(body): Json<Value>) -> Reply {
    if stub.fail_once() {
        return unavailable();
    }
    *stub.last_body.lock().unwrap() = Some(body.clone());
    if let Some(expected) = body.get("expected-running-status") {
        if expected != "not-run" {
            return (
                StatusCode::CONFLICT,
                Json(json!({"error": "model is not-run", "code": "CONFLICT"})),
            );
        }
    }
    (
        StatusCode::OK,
        Json(json!({"return": body["new-running-status"]})),
    )
}

async fn set_quants(State(stub): State<Arc<Stub>>, Json(body): Json<Value>) -> Reply {
    if stub.fail_once() {
        return unavailable();
    }
    *stub.last_body.lock().unwrap() = Some(body.clone());
    let mut quants = body.as_object().cloned().unwrap_or_default();
    quants.remove("unique-id");
    (StatusCode::OK, Json(json!({"return": quants})))
}

/// Start the stub and return its base URL.
pub async fn spawn_stub(stub: Arc<Stub>) -> String {
    let app = Router::new()
        .route("/is-alive", get(|| async { Json(json!({"return": true})) }))
        .route("/model/{id}/running-status", get(running_status))
        .route("/model/set-running-status", post(set_running_status))
        .route("/model/set-quants", post(set_quants))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn client(base_url: &str, max_retries: u32) -> CoordinatorClient {
    let retry = RetryPolicy {
        max_retries,
        initial_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(20),
        ..Default::default()
    };
    CoordinatorClient::new(base_url, retry, Duration::from_secs(5)).unwrap()
}
