//! Outbound multipart client for the OCR/NLP backend.
//!
//! # Responsibilities
//! - Reproduce the staged upload as an outbound multipart body
//! - Preserve the original filename and content-type on the part
//! - Classify every result into the closed outcome set
//!
//! # Design Decisions
//! - Memory staging forwards the buffer without copying; disk staging
//!   streams the temp file instead of rereading it into memory
//! - The backend's status and body pass through verbatim in both the
//!   2xx and non-2xx cases

use axum::http::StatusCode;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use thiserror::Error;
use tokio_util::io::ReaderStream;
use url::Url;

use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::http::request::X_REQUEST_ID;
use crate::http::response::{GatewayOutcome, TransportKind};
use crate::relay::handler::{UploadMetadata, FILE_FIELD};
use crate::relay::staging::StagedUpload;

/// Backend path the gateway forwards to.
pub const EXTRACT_PATH: &str = "/ocr/extract";

/// Errors constructing the client or an outbound part.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid upstream base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    #[error("failed to reopen staged upload: {0}")]
    Reopen(#[from] std::io::Error),

    #[error("invalid content type '{content_type}'")]
    ContentType { content_type: String },
}

/// Client that relays staged uploads to the backend.
///
/// Holds a pooled `reqwest::Client`; one instance is shared across all
/// handling flows via `Arc`.
#[derive(Debug)]
pub struct ForwardingClient {
    http: reqwest::Client,
    extract_url: Url,
}

impl ForwardingClient {
    /// Build a client for the configured backend and timeouts.
    pub fn new(upstream: &UpstreamConfig, timeouts: &TimeoutConfig) -> Result<Self, ForwardError> {
        let base = Url::parse(&upstream.base_url)?;
        let extract_url = base.join(EXTRACT_PATH)?;

        let http = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(timeouts.connect_secs))
            .timeout(std::time::Duration::from_secs(timeouts.upstream_secs))
            .build()
            .map_err(ForwardError::Client)?;

        Ok(Self { http, extract_url })
    }

    /// URL the client forwards to.
    pub fn extract_url(&self) -> &Url {
        &self.extract_url
    }

    /// Send the staged upload to the backend, once, and classify the result.
    ///
    /// Borrows the staged upload; the caller keeps ownership so the bytes
    /// outlive the outbound call.
    pub async fn forward(
        &self,
        staged: &StagedUpload,
        metadata: &UploadMetadata,
        request_id: &str,
    ) -> GatewayOutcome {
        let part = match self.build_part(staged, metadata) {
            Ok(part) => part,
            Err(err) => {
                tracing::error!(
                    request_id = %request_id,
                    error = %err,
                    "Failed to build outbound multipart part"
                );
                return GatewayOutcome::Internal;
            }
        };
        let form = Form::new().part(FILE_FIELD, part);

        let result = self
            .http
            .post(self.extract_url.clone())
            .header(X_REQUEST_ID, request_id)
            .multipart(form)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(err) => return self.transport_error(&err, request_id),
        };

        let status = StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        // Reading the body can still fail transport-level (reset mid-stream,
        // timeout while draining).
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(err) => return self.transport_error(&err, request_id),
        };

        if status.is_success() {
            GatewayOutcome::Success {
                status,
                content_type,
                body,
            }
        } else {
            tracing::warn!(
                request_id = %request_id,
                status = %status,
                "Backend returned an error, passing through"
            );
            GatewayOutcome::UpstreamError {
                status,
                content_type,
                body,
            }
        }
    }

    fn build_part(
        &self,
        staged: &StagedUpload,
        metadata: &UploadMetadata,
    ) -> Result<Part, ForwardError> {
        let part = match staged {
            StagedUpload::Memory(bytes) => {
                // Bytes clones are reference-counted, not copies.
                Part::stream_with_length(reqwest::Body::from(bytes.clone()), bytes.len() as u64)
            }
            StagedUpload::Disk(disk) => {
                let file = tokio::fs::File::from_std(disk.reopen()?);
                let stream = ReaderStream::new(file);
                Part::stream_with_length(reqwest::Body::wrap_stream(stream), disk.len())
            }
        };

        part.file_name(metadata.filename.clone())
            .mime_str(&metadata.content_type)
            .map_err(|_| ForwardError::ContentType {
                content_type: metadata.content_type.clone(),
            })
    }

    fn transport_error(&self, err: &reqwest::Error, request_id: &str) -> GatewayOutcome {
        let kind = TransportKind::classify(err);
        tracing::warn!(
            request_id = %request_id,
            url = %self.extract_url,
            kind = ?kind,
            error = %err,
            "Upstream call failed"
        );
        GatewayOutcome::TransportError {
            kind,
            detail: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{TimeoutConfig, UpstreamConfig};

    fn client_for(base_url: &str) -> ForwardingClient {
        let upstream = UpstreamConfig {
            base_url: base_url.to_string(),
        };
        ForwardingClient::new(&upstream, &TimeoutConfig::default()).unwrap()
    }

    #[test]
    fn extract_url_is_joined_onto_the_base() {
        let client = client_for("http://ocr-nlp:8000");
        assert_eq!(client.extract_url().as_str(), "http://ocr-nlp:8000/ocr/extract");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let upstream = UpstreamConfig {
            base_url: "not a url".to_string(),
        };
        let err = ForwardingClient::new(&upstream, &TimeoutConfig::default()).unwrap_err();
        assert!(matches!(err, ForwardError::BaseUrl(_)));
    }

    #[tokio::test]
    async fn unreachable_backend_classifies_as_transport_error() {
        // Reserve a port, then close it so nothing is listening.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(&format!("http://{addr}"));
        let staged = StagedUpload::Memory(bytes::Bytes::from_static(b"content"));
        let metadata = UploadMetadata {
            filename: "scan.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            size: 7,
        };

        let outcome = client.forward(&staged, &metadata, "test-request").await;
        match outcome {
            GatewayOutcome::TransportError { kind, .. } => {
                assert_eq!(kind, TransportKind::Unreachable);
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }
}
