// Shared harness: a mock access controller and a portal instance, each on an ephemeral port.
use async_trait::async_trait;
use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use portal_server::domain::{AuditRecord, AuditStore, StorageError};
use portal_server::interface_adapters::clients::controller::{
    ControllerSessionClient, ControllerSettings,
};
use portal_server::interface_adapters::state::AppState;
use portal_server::interface_adapters::stores::SystemClock;
use portal_server::interface_adapters::views::AskamaRenderer;
use portal_server::use_cases::{AuditRecorder, PortalWorkflow, SiteSettings};
use secrecy::Secret;
use std::{
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

pub const PAGE_TITLE: &str = "Lobby Guest Wi-Fi";

// Controller stand-in: answers login with a session cookie and records every call.
#[derive(Clone)]
pub struct MockController {
    pub authorize_status: StatusCode,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockController {
    pub fn new(authorize_status: StatusCode) -> Self {
        Self {
            authorize_status,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    fn record(&self, call: &str) {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(call.to_string());
    }
}

async fn login(State(mock): State<MockController>) -> impl IntoResponse {
    mock.record("login");
    (
        StatusCode::OK,
        [(header::SET_COOKIE, "unifises=it-session; Path=/")],
    )
}

async fn stamgr(State(mock): State<MockController>, headers: HeaderMap) -> StatusCode {
    let has_session = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("unifises=it-session"));
    mock.record("stamgr");
    if !has_session {
        return StatusCode::UNAUTHORIZED;
    }
    mock.authorize_status
}

async fn logout(State(mock): State<MockController>) -> StatusCode {
    mock.record("logout");
    StatusCode::OK
}

// In-memory audit store shared between the portal and the test body.
#[derive(Clone, Default)]
pub struct MemoryAuditStore {
    records: Arc<Mutex<Vec<AuditRecord>>>,
}

impl MemoryAuditStore {
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().expect("records mutex poisoned").clone()
    }

    // The audit write is detached from the response, so poll for it.
    pub async fn wait_for(&self, count: usize) -> Vec<AuditRecord> {
        for _ in 0..100 {
            let records = self.records();
            if records.len() >= count {
                return records;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.records()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn append(&self, record: AuditRecord) -> Result<(), StorageError> {
        self.records
            .lock()
            .expect("records mutex poisoned")
            .push(record);
        Ok(())
    }

    async fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AuditRecord>, StorageError> {
        Ok(self
            .records()
            .into_iter()
            .filter(|record| record.timestamp >= from && record.timestamp <= to)
            .collect())
    }
}

pub struct Harness {
    pub portal_url: String,
    pub controller: MockController,
    pub store: MemoryAuditStore,
}

async fn bind_ephemeral() -> (tokio::net::TcpListener, String) {
    // Bind to an ephemeral port to avoid collisions with local services.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");
    (listener, format!("http://{addr}"))
}

// Start a mock controller and a portal wired to it; both live for the test's runtime.
pub async fn start(authorize_status: StatusCode) -> Harness {
    let controller = MockController::new(authorize_status);
    let controller_app = Router::new()
        .route("/api/login", post(login))
        .route("/api/s/{site}/cmd/stamgr", post(stamgr))
        .route("/logout", get(logout))
        .with_state(controller.clone());
    let (controller_listener, controller_url) = bind_ephemeral().await;
    tokio::spawn(async move {
        let _ = axum::serve(controller_listener, controller_app).await;
    });

    let store = MemoryAuditStore::default();
    let workflow = PortalWorkflow {
        site: Arc::new(SiteSettings {
            site: "default".to_string(),
            title: PAGE_TITLE.to_string(),
            intro: "Welcome.".to_string(),
            terms: "Use the network responsibly.".to_string(),
            default_redirect_url: "https://example.com/".to_string(),
        }),
        authorizer: Arc::new(ControllerSessionClient::new(ControllerSettings {
            base_url: controller_url,
            username: "admin".to_string(),
            password: Secret::new("hunter2".to_string()),
            site: "default".to_string(),
            session_minutes: 60,
            request_timeout: Duration::from_secs(2),
            insecure_skip_verify: false,
        })),
        renderer: Arc::new(AskamaRenderer),
        recorder: AuditRecorder {
            store: Arc::new(store.clone()),
            clock: Arc::new(SystemClock),
            write_timeout: Duration::from_secs(2),
        },
    };
    let state = Arc::new(AppState { workflow });

    let (portal_listener, portal_url) = bind_ephemeral().await;
    tokio::spawn(async move {
        let asset_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets");
        portal_server::run(portal_listener, state, &asset_dir)
            .await
            .expect("portal failed");
    });

    Harness {
        portal_url,
        controller,
        store,
    }
}
