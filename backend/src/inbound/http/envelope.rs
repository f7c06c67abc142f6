//! Uniform JSON envelope wrapping every API response body.
//!
//! ```json
//! { "success": true, "data": 1 }
//! { "success": false, "error": "employee with name Pupkin already exists" }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Structured failure details, such as per-field validation errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl<T> ApiEnvelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            details: None,
        }
    }

    pub fn failure(message: impl Into<String>, details: Option<Value>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            details,
        }
    }
}

impl ApiEnvelope<()> {
    /// Success without a payload, used by deletes.
    pub fn empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            details: None,
        }
    }
}
