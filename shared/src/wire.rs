//! Wire contract between the widget endpoint and its pollers.
//!
//! Every successful response is a JSON object carrying a `hash` field plus
//! widget-specific payload fields. Error responses carry an `error` object
//! with a message and a type name.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Field injected into every successful widget payload.
pub const HASH_FIELD: &str = "hash";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorBody {
    pub message: String,
    pub r#type: String,
}

/// `{"error": {"message": ..., "type": ...}}`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>, r#type: impl Into<String>) -> Self {
        ErrorEnvelope {
            error: ErrorBody {
                message: message.into(),
                r#type: r#type.into(),
            },
        }
    }
}

/// Fingerprint of a widget payload: hex SHA-256 of its canonical JSON
/// serialization. `serde_json` object keys are ordered, so equal payloads
/// hash equally regardless of construction order.
pub fn payload_hash(payload: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.to_string().as_bytes());
    hex_digest(hasher)
}

/// Cache keys for assembled URLs use the same digest.
pub fn url_hash(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex_digest(hasher)
}

fn hex_digest(hasher: Sha256) -> String {
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
