use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Failure body returned by the backend on non-2xx responses.
///
/// `detail` is usually a string, but request-validation failures carry a
/// structured list instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub detail: Value,
}

impl ApiErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Value::String(detail.into()),
        }
    }

    pub fn message(&self) -> String {
        match &self.detail {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }

    /// Extracts the backend detail from a raw response body, if there is one.
    pub fn from_body(body: &str) -> Option<Self> {
        let parsed = serde_json::from_str::<Self>(body).ok()?;
        if parsed.detail.is_null() {
            return None;
        }
        Some(parsed)
    }
}
