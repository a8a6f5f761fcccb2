//! Inbound upload handling.
//!
//! # Responsibilities
//! - Validate that exactly one `file` part is present
//! - Enforce the upload size cap before and while staging
//! - Stage the file and delegate to the forwarding client
//! - Translate local failures into the outcome taxonomy
//!
//! # Design Decisions
//! - Validation failures resolve locally; the forwarding client is never
//!   invoked for a request that fails validation
//! - The declared Content-Length is checked before any bytes are staged;
//!   a request lying about its length is cut off as soon as the running
//!   total crosses the cap
//! - Fields other than `file` are skipped for forward compatibility

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::{header, HeaderMap};
use thiserror::Error;

use crate::http::response::GatewayOutcome;
use crate::http::server::AppState;
use crate::relay::staging::{StagedUpload, StagingBuffer};

/// Field name the client must use for the uploaded file. The outbound
/// part is named identically.
pub const FILE_FIELD: &str = "file";

/// Multipart framing overhead tolerated on top of the file cap when
/// checking the declared Content-Length.
const DECLARED_SIZE_MARGIN: u64 = 8 * 1024;

/// Fallbacks when the client omits part metadata.
const DEFAULT_FILENAME: &str = "upload";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Metadata describing a staged upload, preserved on the outbound part.
#[derive(Debug, Clone)]
pub struct UploadMetadata {
    pub filename: String,
    pub content_type: String,
    pub size: u64,
}

/// Local failures while terminating the inbound request.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("file required")]
    MissingFile,

    #[error("upload exceeds the {limit} byte cap")]
    TooLarge { limit: u64 },

    #[error("malformed multipart request: {0}")]
    Malformed(#[source] MultipartError),

    #[error("failed to stage upload: {0}")]
    Staging(#[from] std::io::Error),
}

impl RelayError {
    fn into_outcome(self) -> GatewayOutcome {
        match self {
            RelayError::MissingFile => GatewayOutcome::BadRequest {
                error: "file required".to_string(),
            },
            RelayError::TooLarge { limit } => GatewayOutcome::PayloadTooLarge {
                limit_bytes: limit,
            },
            RelayError::Malformed(_) => GatewayOutcome::BadRequest {
                error: "malformed multipart request".to_string(),
            },
            RelayError::Staging(_) => GatewayOutcome::Internal,
        }
    }
}

/// Terminate one inbound upload: validate, stage, forward, classify.
///
/// Always returns exactly one outcome; staged bytes are released before
/// this function returns.
pub async fn handle(
    state: &AppState,
    request_id: &str,
    headers: &HeaderMap,
    multipart: Multipart,
) -> GatewayOutcome {
    match stage_and_forward(state, request_id, headers, multipart).await {
        Ok(outcome) => outcome,
        Err(err) => {
            match &err {
                RelayError::Staging(io) => {
                    tracing::error!(request_id = %request_id, error = %io, "Staging failed");
                }
                other => {
                    tracing::debug!(request_id = %request_id, error = %other, "Upload rejected");
                }
            }
            err.into_outcome()
        }
    }
}

async fn stage_and_forward(
    state: &AppState,
    request_id: &str,
    headers: &HeaderMap,
    mut multipart: Multipart,
) -> Result<GatewayOutcome, RelayError> {
    let limit = state.config.limits.max_upload_bytes;

    // Reject declared-oversize requests before staging a single byte.
    if let Some(declared) = content_length(headers) {
        if declared > limit.saturating_add(DECLARED_SIZE_MARGIN) {
            return Err(RelayError::TooLarge { limit });
        }
    }

    let mut staged: Option<(StagedUpload, UploadMetadata)> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(RelayError::Malformed)?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .unwrap_or(DEFAULT_FILENAME)
            .to_string();
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let mut buffer = StagingBuffer::create(&state.config.limits).await?;
        while let Some(chunk) = field.chunk().await.map_err(RelayError::Malformed)? {
            if buffer.len() + chunk.len() as u64 > limit {
                return Err(RelayError::TooLarge { limit });
            }
            buffer.push_chunk(&chunk).await?;
        }

        let upload = buffer.finish().await?;
        let metadata = UploadMetadata {
            filename,
            content_type,
            size: upload.len(),
        };
        staged = Some((upload, metadata));
        break;
    }

    let Some((upload, metadata)) = staged else {
        return Err(RelayError::MissingFile);
    };

    tracing::debug!(
        request_id = %request_id,
        filename = %metadata.filename,
        content_type = %metadata.content_type,
        size = metadata.size,
        "Upload staged, forwarding"
    );

    // The staged handle stays alive across the outbound call and drops
    // when this function returns.
    Ok(state.forwarder.forward(&upload, &metadata, request_id).await)
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}
