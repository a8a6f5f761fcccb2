//! Outcome classification and response mapping.
//!
//! # Responsibilities
//! - Define the closed set of per-request outcomes
//! - Map each outcome to exactly one HTTP response
//! - Synthesize stable error bodies for local and transport failures
//!
//! # Design Decisions
//! - The mapping is an exhaustive match over a tagged enum, never ad hoc
//!   probing of error fields
//! - Backend responses (2xx and non-2xx alike) pass through verbatim;
//!   the backend's diagnosis is authoritative
//! - The caller sees one shape for every transport-level cause; only the
//!   status distinguishes timeout (504) from unreachable (502)

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde_json::json;

/// Message used in every synthesized transport-failure body.
pub const PROXY_FAILED_MESSAGE: &str = "OCR proxy failed";

/// How the upstream call failed at the transport level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Connection refused, reset, DNS failure, or any other I/O error.
    Unreachable,
    /// The bounded upstream timeout elapsed.
    Timeout,
}

impl TransportKind {
    /// Classify a reqwest error into the two transport categories.
    pub fn classify(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            TransportKind::Timeout
        } else {
            TransportKind::Unreachable
        }
    }
}

/// The closed set of outcomes a single inbound upload can produce.
///
/// Exactly one of these is emitted per request; the `IntoResponse`
/// implementation below is the only place outcomes become HTTP.
#[derive(Debug)]
pub enum GatewayOutcome {
    /// Backend returned 2xx; status and body pass through verbatim.
    Success {
        status: StatusCode,
        content_type: Option<String>,
        body: Bytes,
    },
    /// Backend was reachable but returned non-2xx; passed through unchanged.
    UpstreamError {
        status: StatusCode,
        content_type: Option<String>,
        body: Bytes,
    },
    /// Backend unreachable or timed out; synthesized 502/504.
    TransportError { kind: TransportKind, detail: String },
    /// Missing or malformed file part; never forwarded.
    BadRequest { error: String },
    /// Declared or actual upload size exceeds the cap; never forwarded.
    PayloadTooLarge { limit_bytes: u64 },
    /// Unexpected failure while staging or streaming. The cause is logged
    /// at the failure site; the caller gets a generic body.
    Internal,
}

impl GatewayOutcome {
    /// Status code this outcome maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayOutcome::Success { status, .. } => *status,
            GatewayOutcome::UpstreamError { status, .. } => *status,
            GatewayOutcome::TransportError { kind, .. } => match kind {
                TransportKind::Unreachable => StatusCode::BAD_GATEWAY,
                TransportKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
            },
            GatewayOutcome::BadRequest { .. } => StatusCode::BAD_REQUEST,
            GatewayOutcome::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayOutcome::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable label for metrics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            GatewayOutcome::Success { .. } => "success",
            GatewayOutcome::UpstreamError { .. } => "upstream_error",
            GatewayOutcome::TransportError { .. } => "transport_error",
            GatewayOutcome::BadRequest { .. } => "bad_request",
            GatewayOutcome::PayloadTooLarge { .. } => "payload_too_large",
            GatewayOutcome::Internal => "internal_error",
        }
    }
}

impl IntoResponse for GatewayOutcome {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            GatewayOutcome::Success {
                content_type, body, ..
            }
            | GatewayOutcome::UpstreamError {
                content_type, body, ..
            } => {
                let content_type =
                    content_type.unwrap_or_else(|| "application/json".to_string());
                (status, [(header::CONTENT_TYPE, content_type)], body).into_response()
            }
            GatewayOutcome::TransportError { detail, .. } => (
                status,
                Json(json!({ "message": PROXY_FAILED_MESSAGE, "detail": detail })),
            )
                .into_response(),
            GatewayOutcome::BadRequest { error } => {
                (status, Json(json!({ "error": error }))).into_response()
            }
            GatewayOutcome::PayloadTooLarge { .. } => {
                (status, Json(json!({ "error": "file too large" }))).into_response()
            }
            GatewayOutcome::Internal => {
                (status, Json(json!({ "error": "internal error" }))).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_is_stable() {
        let timeout = GatewayOutcome::TransportError {
            kind: TransportKind::Timeout,
            detail: "deadline elapsed".into(),
        };
        assert_eq!(timeout.status(), StatusCode::GATEWAY_TIMEOUT);

        let unreachable = GatewayOutcome::TransportError {
            kind: TransportKind::Unreachable,
            detail: "connection refused".into(),
        };
        assert_eq!(unreachable.status(), StatusCode::BAD_GATEWAY);

        let missing = GatewayOutcome::BadRequest {
            error: "file required".into(),
        };
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let oversized = GatewayOutcome::PayloadTooLarge {
            limit_bytes: 1024,
        };
        assert_eq!(oversized.status(), StatusCode::PAYLOAD_TOO_LARGE);

        assert_eq!(
            GatewayOutcome::Internal.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn upstream_status_passes_through() {
        let outcome = GatewayOutcome::UpstreamError {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            content_type: Some("application/json".into()),
            body: Bytes::from_static(br#"{"error":"bad pdf"}"#),
        };
        assert_eq!(outcome.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(outcome.label(), "upstream_error");
    }
}
