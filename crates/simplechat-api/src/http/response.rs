//! Envelope format for error responses.
//!
//! ```json
//! {
//!   "data": null,
//!   "meta": { "request_id": "...", "timestamp": "..." },
//!   "errors": [{ "code": "INVALID_SESSION", "message": "..." }]
//! }
//! ```
//!
//! Successful `/chatbot` replies stay a bare `{"message": ...}` object so the
//! page script can read them directly.

use serde::Serialize;

/// Envelope wrapping an API payload or its errors.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// The main response payload; `null` on error.
    pub data: Option<T>,

    /// Request metadata.
    pub meta: ApiMeta,

    /// Error list (empty on success).
    pub errors: Vec<ApiErrorDetail>,
}

/// Metadata included in every envelope.
#[derive(Debug, Serialize)]
pub struct ApiMeta {
    /// Unique request identifier for correlating logs.
    pub request_id: String,
    /// RFC 3339 timestamp of the response.
    pub timestamp: String,
}

/// Individual error detail.
#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ApiResponse<()> {
    /// Create an error envelope (no data).
    pub fn error(code: &str, message: &str, request_id: String) -> Self {
        Self {
            data: None,
            meta: ApiMeta {
                request_id,
                timestamp: chrono::Utc::now().to_rfc3339(),
            },
            errors: vec![ApiErrorDetail {
                code: code.to_string(),
                message: message.to_string(),
            }],
        }
    }
}
