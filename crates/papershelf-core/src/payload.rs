//! Normalization of backend error bodies.
//!
//! The backend is not consistent about error shapes: FastAPI's
//! `HTTPException` produces `{"detail": ...}`, some handlers return
//! `{"message": ...}`, proxies return plain text, and validation failures
//! carry a `detail` array.

use serde_json::Value;

/// An error body, classified by shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorPayload {
    /// A bare string, either plain text or a JSON string literal.
    Text(String),
    /// `{"detail": ...}`
    Detail(String),
    /// `{"message": ...}`
    Message(String),
    /// Anything else, kept as the raw body.
    Unknown(String),
}

impl ErrorPayload {
    /// Classify a raw response body.
    pub fn from_body(body: &str) -> Self {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Self::Unknown(String::new());
        }
        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::String(s)) => Self::Text(s),
            Ok(Value::Object(map)) => {
                if let Some(detail) = map.get("detail").filter(|v| !v.is_null()) {
                    Self::Detail(value_text(detail))
                } else if let Some(message) = map.get("message").filter(|v| !v.is_null()) {
                    Self::Message(value_text(message))
                } else {
                    Self::Unknown(trimmed.to_string())
                }
            }
            Ok(_) => Self::Unknown(trimmed.to_string()),
            Err(_) => Self::Text(trimmed.to_string()),
        }
    }

    /// The string to show the user.
    pub fn display(&self) -> String {
        match self {
            Self::Text(s) | Self::Detail(s) | Self::Message(s) | Self::Unknown(s) => s.clone(),
        }
    }
}

/// Strings are used as-is; structured values (e.g. a list of validation
/// errors) are rendered as compact JSON.
fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
