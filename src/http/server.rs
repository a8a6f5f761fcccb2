//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the relay and health handlers
//! - Wire up middleware (tracing, request ID, timeout, body limit)
//! - Bind the server to a listener with graceful shutdown
//! - Record per-request metrics

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::forward::ForwardingClient;
use crate::forward::client::ForwardError;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::observability::metrics;
use crate::relay;
use crate::SERVICE_NAME;

/// Hard cap applied by the body-limit layer on top of the file cap,
/// leaving room for multipart framing. The relay enforces the precise
/// file limit; this layer only stops runaway bodies.
const BODY_LIMIT_MARGIN: usize = 1024 * 1024;

/// Application state injected into handlers.
///
/// Both members are immutable after startup and shared by reference;
/// handling logic never reads ambient global state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub forwarder: Arc<ForwardingClient>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ForwardError> {
        let forwarder = Arc::new(ForwardingClient::new(&config.upstream, &config.timeouts)?);
        let state = AppState {
            config: Arc::new(config.clone()),
            forwarder,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let body_limit =
            config.limits.max_upload_bytes as usize + BODY_LIMIT_MARGIN;

        // Outermost first: the request ID exists before anything logs it.
        Router::new()
            .route("/ocr/extract", post(extract_handler))
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http())
                    .layer(propagate_request_id_layer())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    )))
                    .layer(DefaultBodyLimit::disable())
                    .layer(RequestBodyLimitLayer::new(body_limit)),
            )
    }

    /// Run the server, accepting connections on the given listener until
    /// the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Main relay handler: one inbound upload in, exactly one response out.
async fn extract_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let start = Instant::now();
    let request_id = request_id(&headers);

    let outcome = relay::handle(&state, &request_id, &headers, multipart).await;

    let status = outcome.status();
    metrics::record_request(outcome.label(), status.as_u16(), start);
    tracing::info!(
        request_id = %request_id,
        status = %status,
        outcome = outcome.label(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Upload handled"
    );

    outcome.into_response()
}

/// Unconditional liveness probe.
async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "service": SERVICE_NAME }))
}
