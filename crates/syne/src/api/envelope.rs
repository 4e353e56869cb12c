//! The `{code, data, message}` wrapper around every backend response.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::error::{ApiError, DEFAULT_FAILURE_MESSAGE};

/// Envelope codes that mean success.
pub const SUCCESS_CODES: [i64; 2] = [200, 0];

/// Wire shape. `code` is required; a body without an integer code is not
/// an envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct RawEnvelope {
    pub code: i64,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub message: Option<String>,
}

/// A decoded envelope: success carrying data, or a business failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Success { data: Value, message: Option<String> },
    Failure { code: i64, message: String },
}

impl Envelope {
    pub fn parse(body: &str) -> Result<Self, ApiError> {
        let raw: RawEnvelope = serde_json::from_str(body)
            .map_err(|e| ApiError::Decode(format!("not a response envelope: {}", e)))?;
        Ok(Self::from(raw))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success { .. })
    }

    /// Unwraps the data as `T`, or turns a failure into
    /// [`ApiError::Business`].
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        match self {
            Envelope::Success { data, .. } => serde_json::from_value(data)
                .map_err(|e| ApiError::Decode(format!("unexpected data shape: {}", e))),
            Envelope::Failure { code, message } => Err(ApiError::Business { code, message }),
        }
    }
}

impl From<RawEnvelope> for Envelope {
    fn from(raw: RawEnvelope) -> Self {
        if SUCCESS_CODES.contains(&raw.code) {
            Envelope::Success {
                data: raw.data,
                message: raw.message,
            }
        } else {
            Envelope::Failure {
                code: raw.code,
                message: raw
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
            }
        }
    }
}
