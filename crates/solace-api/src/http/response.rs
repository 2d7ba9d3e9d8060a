//! Envelope response format for all API responses.
//!
//! Every response is wrapped in a consistent envelope:
//! ```json
//! {
//!   "data": { ... },
//!   "meta": { "request_id": "...", "timestamp": "..." },
//!   "errors": []
//! }
//! ```

use serde::Serialize;
use uuid::Uuid;

/// Envelope wrapping all API data.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// The main response payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Request metadata.
    pub meta: ApiMeta,

    /// Error list (empty on success).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ApiErrorDetail>,
}

/// Metadata included in every response.
#[derive(Debug, Serialize)]
pub struct ApiMeta {
    /// Unique request identifier for tracing.
    pub request_id: String,
    /// ISO-8601 timestamp of the response.
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

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response with data.
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            meta: ApiMeta::new(),
            errors: Vec::new(),
        }
    }
}

impl ApiResponse<()> {
    /// Create an error response with a single error detail and no data.
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self {
            data: None,
            meta: ApiMeta::new(),
            errors: vec![ApiErrorDetail::new(code, message)],
        }
    }
}

impl ApiMeta {
    fn new() -> Self {
        Self {
            request_id: Uuid::now_v7().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl ApiErrorDetail {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}
