//! Shared utilities for gateway integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tokio::net::TcpListener;

use ocr_gateway::config::GatewayConfig;
use ocr_gateway::http::HttpServer;
use ocr_gateway::lifecycle::Shutdown;

/// Behavior of the stub OCR backend for one test.
#[derive(Clone)]
pub enum StubBehavior {
    /// Respond with a fixed status and JSON body.
    Fixed { status: u16, body: &'static str },
    /// Sleep before responding (timeout injection).
    Delayed { delay: Duration },
    /// Read the uploaded file part and echo its content back as JSON.
    EchoUpload,
}

#[derive(Clone)]
struct StubState {
    behavior: StubBehavior,
    calls: Arc<AtomicU32>,
}

/// A running stub backend.
pub struct StubBackend {
    pub addr: SocketAddr,
    calls: Arc<AtomicU32>,
}

impl StubBackend {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// How many times the gateway has called /ocr/extract.
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Start a stub backend on an ephemeral port.
pub async fn start_stub_backend(behavior: StubBehavior) -> StubBackend {
    let calls = Arc::new(AtomicU32::new(0));
    let state = StubState {
        behavior,
        calls: calls.clone(),
    };
    let app = Router::new()
        .route("/ocr/extract", post(stub_extract))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    StubBackend { addr, calls }
}

async fn stub_extract(State(state): State<StubState>, mut multipart: Multipart) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);

    match state.behavior {
        StubBehavior::Fixed { status, body } => (
            StatusCode::from_u16(status).unwrap(),
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        StubBehavior::Delayed { delay } => {
            tokio::time::sleep(delay).await;
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                r#"{"blocks":[]}"#,
            )
                .into_response()
        }
        StubBehavior::EchoUpload => {
            let mut content = Vec::new();
            let mut filename = String::new();
            while let Some(mut field) = multipart.next_field().await.unwrap() {
                if field.name() != Some("file") {
                    continue;
                }
                filename = field.file_name().unwrap_or("").to_string();
                while let Some(chunk) = field.chunk().await.unwrap() {
                    content.extend_from_slice(&chunk);
                }
            }
            Json(serde_json::json!({
                "filename": filename,
                "content": String::from_utf8_lossy(&content),
            }))
            .into_response()
        }
    }
}

/// Gateway config pointed at a stub backend, quiet for tests.
pub fn test_config(backend_base: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.upstream.base_url = backend_base.to_string();
    config.observability.metrics_enabled = false;
    config
}

/// Spawn the gateway on an ephemeral port.
pub async fn start_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let server = HttpServer::new(config).unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}

/// Client that ignores any proxy configured in the environment.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Multipart form with one `file` part, the shape the mobile client sends.
#[allow(dead_code)]
pub fn pdf_upload(content: Vec<u8>) -> reqwest::multipart::Form {
    let part = reqwest::multipart::Part::bytes(content)
        .file_name("scan.pdf")
        .mime_str("application/pdf")
        .unwrap();
    reqwest::multipart::Form::new().part("file", part)
}

/// Extract URL on a running gateway.
#[allow(dead_code)]
pub fn extract_url(addr: SocketAddr) -> String {
    format!("http://{addr}/ocr/extract")
}
