//! Shared test harness: an axum mock of the remote cluster-management
//! API plus a fully wired client core pointed at it.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::{mpsc, Mutex};

use client::api::ApiClient;
use client::notify::{Notifier, Toast};
use client::scheduler::RefreshScheduler;
use client::session::SessionStore;
use client::storage::ClientStorage;
use client::store::TopologyStore;
use common::config::AppConfig;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "secret";
pub const TOKEN: &str = "tok-123";

/// Behavior switches and request log of the mock backend.
pub struct MockState {
    /// Delay applied to the servers route, in milliseconds.
    pub servers_delay_ms: AtomicU64,
    /// When set, the servers route answers 500.
    pub fail_servers: AtomicBool,
    /// When set, every authenticated route answers 401.
    pub expire_all: AtomicBool,
    /// When set, the login routes answer 429.
    pub rate_limit_login: AtomicBool,
    /// When set, action routes answer 500.
    pub fail_actions: AtomicBool,
    /// Request log: path and arrival instant.
    pub hits: Mutex<Vec<(String, Instant)>>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            servers_delay_ms: AtomicU64::new(0),
            fail_servers: AtomicBool::new(false),
            expire_all: AtomicBool::new(false),
            rate_limit_login: AtomicBool::new(false),
            fail_actions: AtomicBool::new(false),
            hits: Mutex::new(Vec::new()),
        }
    }
}

impl MockState {
    async fn record(&self, path: String) {
        self.hits.lock().await.push((path, Instant::now()));
    }

    /// Arrival instants of every hit on the given path.
    pub async fn hits_on(&self, path: &str) -> Vec<Instant> {
        self.hits
            .lock()
            .await
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, at)| *at)
            .collect()
    }

    /// Number of hits on the given path.
    pub async fn count(&self, path: &str) -> usize {
        self.hits_on(path).await.len()
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        if self.expire_all.load(Ordering::SeqCst) {
            return false;
        }
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(|v| v == format!("Bearer {TOKEN}"))
            .unwrap_or(false)
    }
}

/// The running mock backend.
pub struct MockBackend {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Binds the mock backend on an ephemeral port.
pub async fn spawn_backend() -> MockBackend {
    let state = Arc::new(MockState::default());
    let app = router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock backend");
    let addr = listener.local_addr().expect("local addr");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve mock backend");
    });
    MockBackend {
        addr,
        state,
        handle,
    }
}

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/login-git", post(login))
        .route("/api/clusters", get(clusters))
        .route("/api/monitor", get(monitor))
        .route("/api/clusters/{name}", get(cluster_detail))
        .route("/api/clusters/{name}/topology/servers", get(servers))
        .route("/api/clusters/{name}/topology/proxies", get(proxies))
        .route("/api/clusters/{name}/topology/slaves", get(slaves))
        .route("/api/clusters/{name}/topology/alerts", get(alerts))
        .route("/api/clusters/{name}/topology/master", get(master))
        .route("/api/clusters/{name}/actions/{action}", get(cluster_action))
        .route(
            "/api/clusters/{name}/servers/{id}/actions/{action}",
            get(server_action),
        )
        .with_state(state)
}

async fn login(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.record("/api/login".to_string()).await;
    if state.rate_limit_login.load(Ordering::SeqCst) {
        return (StatusCode::TOO_MANY_REQUESTS, Json(json!({})));
    }
    let username = body.get("username").and_then(Value::as_str);
    let password = body.get("password").and_then(Value::as_str);
    if username == Some(USERNAME) && password == Some(PASSWORD) {
        (StatusCode::OK, Json(json!({ "token": TOKEN })))
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({})))
    }
}

async fn clusters(State(state): State<Arc<MockState>>, headers: HeaderMap) -> impl IntoResponse {
    state.record("/api/clusters".to_string()).await;
    if !state.authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    (
        StatusCode::OK,
        Json(json!([
            { "name": "prod", "topology": "master-slave", "db_servers": ["db1:3306", "db2:3306"] },
            { "name": "staging", "topology": "master-slave", "is_down": true },
        ])),
    )
}

async fn monitor(State(state): State<Arc<MockState>>, headers: HeaderMap) -> impl IntoResponse {
    state.record("/api/monitor".to_string()).await;
    if !state.authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    (
        StatusCode::OK,
        Json(json!({ "version": "2.3.0", "uptime": "10h", "clusters": ["prod", "staging"] })),
    )
}

async fn cluster_detail(
    State(state): State<Arc<MockState>>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    state.record(format!("/api/clusters/{name}")).await;
    if !state.authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    (
        StatusCode::OK,
        Json(json!({
            "name": name,
            "topology": "master-slave",
            "tags": ["ssl"],
            "master": "db1:3306",
        })),
    )
}

async fn servers(
    State(state): State<Arc<MockState>>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    state
        .record(format!("/api/clusters/{name}/topology/servers"))
        .await;
    let delay = state.servers_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    if !state.authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    if state.fail_servers.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({})));
    }
    (
        StatusCode::OK,
        Json(json!([
            { "id": 1, "host": "db1", "port": 3306, "state": "Master" },
            { "id": 2, "host": "db2", "port": 3306, "state": "Slave", "is_slave": true },
        ])),
    )
}

async fn proxies(
    State(state): State<Arc<MockState>>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    state
        .record(format!("/api/clusters/{name}/topology/proxies"))
        .await;
    if !state.authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    (
        StatusCode::OK,
        Json(json!([
            { "id": 1, "kind": "haproxy", "host": "lb1", "port": 3307, "state": "running" },
        ])),
    )
}

async fn slaves(
    State(state): State<Arc<MockState>>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    state
        .record(format!("/api/clusters/{name}/topology/slaves"))
        .await;
    if !state.authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    (
        StatusCode::OK,
        Json(json!([
            { "id": 2, "host": "db2", "port": 3306, "state": "Slave", "is_slave": true },
        ])),
    )
}

async fn alerts(
    State(state): State<Arc<MockState>>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    state
        .record(format!("/api/clusters/{name}/topology/alerts"))
        .await;
    if !state.authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    (
        StatusCode::OK,
        Json(json!({
            "errors": [],
            "warnings": [ { "server": "db2:3306", "desc": "replication lag" } ],
        })),
    )
}

async fn master(
    State(state): State<Arc<MockState>>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    state
        .record(format!("/api/clusters/{name}/topology/master"))
        .await;
    if !state.authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    (
        StatusCode::OK,
        Json(json!({ "id": 1, "host": "db1", "port": 3306, "state": "Master" })),
    )
}

async fn cluster_action(
    State(state): State<Arc<MockState>>,
    Path((name, action)): Path<(String, String)>,
    headers: HeaderMap,
) -> impl IntoResponse {
    state
        .record(format!("/api/clusters/{name}/actions/{action}"))
        .await;
    if !state.authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    if state.fail_actions.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({})));
    }
    (StatusCode::OK, Json(json!({})))
}

async fn server_action(
    State(state): State<Arc<MockState>>,
    Path((name, id, action)): Path<(String, u64, String)>,
    headers: HeaderMap,
) -> impl IntoResponse {
    state
        .record(format!("/api/clusters/{name}/servers/{id}/actions/{action}"))
        .await;
    if !state.authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    if state.fail_actions.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({})));
    }
    (StatusCode::OK, Json(json!({})))
}

/// A fully wired client core pointed at the mock backend.
pub struct Harness {
    pub api: Arc<ApiClient>,
    pub store: Arc<TopologyStore>,
    pub session: Arc<SessionStore>,
    pub scheduler: Arc<RefreshScheduler>,
    pub storage: ClientStorage,
    pub notifier: Notifier,
    pub toasts: mpsc::Receiver<Toast>,
}

impl Harness {
    /// Drains the toast channel without waiting.
    pub fn drain_toasts(&mut self) -> Vec<Toast> {
        let mut toasts = Vec::new();
        while let Ok(toast) = self.toasts.try_recv() {
            toasts.push(toast);
        }
        toasts
    }
}

/// Configuration pointing at the mock backend, with an isolated storage
/// directory per test.
pub fn test_config(addr: SocketAddr, tag: &str) -> AppConfig {
    let mut config = AppConfig::load_with_service("test");
    config.api_url = format!("http://{addr}");
    config.request_timeout_secs = 10;
    config.storage_dir =
        std::env::temp_dir().join(format!("clusterdash-it-{tag}-{}", std::process::id()));
    config
}

/// Builds the full client core against the backend, without logging in.
pub fn build_harness(backend: &MockBackend, tag: &str) -> Harness {
    let config = test_config(backend.addr, tag);
    let api = Arc::new(ApiClient::new(&config).expect("api client"));
    let store = Arc::new(TopologyStore::new());
    let (notifier, toasts) = Notifier::channel();
    let storage = ClientStorage::new(&config.storage_dir);
    // Start every test from a clean slate even when a tag is reused.
    let _ = storage.update(|state| *state = Default::default());
    let session = Arc::new(SessionStore::new(
        api.clone(),
        store.clone(),
        storage.clone(),
        notifier.clone(),
    ));
    let scheduler = Arc::new(RefreshScheduler::new(
        api.clone(),
        store.clone(),
        session.clone(),
        storage.clone(),
    ));
    Harness {
        api,
        store,
        session,
        scheduler,
        storage,
        notifier,
        toasts,
    }
}

/// Builds the harness and logs in with the accepted credentials.
pub async fn logged_in_harness(backend: &MockBackend, tag: &str) -> Harness {
    let harness = build_harness(backend, tag);
    harness
        .session
        .login(USERNAME, PASSWORD)
        .await
        .expect("login");
    harness
}
