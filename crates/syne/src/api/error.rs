use std::fmt;

use super::envelope::RawEnvelope;

/// Everything a call through [`super::ApiClient`] can fail with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The server answered with an envelope whose code is not a success code.
    Business { code: i64, message: String },
    /// Non-2xx HTTP status.
    Status { status: u16, message: String },
    /// No response was received.
    Network(String),
    /// The overall request deadline passed.
    Timeout,
    /// The request could not be built.
    Request(String),
    /// The body was not a well-formed envelope or its data had the wrong shape.
    Decode(String),
}

pub const DEFAULT_FAILURE_MESSAGE: &str = "Request failed";
pub const NETWORK_MESSAGE: &str = "Network error, please check your connection";
pub const TIMEOUT_MESSAGE: &str = "The request timed out";

impl ApiError {
    /// Fixed user-facing text for the statuses the backend is known to use.
    pub fn status_message(status: u16) -> Option<&'static str> {
        match status {
            400 => Some("Invalid request parameters"),
            401 => Some("Unauthorized, please sign in"),
            403 => Some("Access denied"),
            404 => Some("The requested resource does not exist"),
            500 => Some("Internal server error"),
            502 => Some("Bad gateway"),
            503 => Some("Service temporarily unavailable"),
            504 => Some("Gateway timeout"),
            _ => None,
        }
    }

    /// Maps a failed HTTP status to an error. Unlisted statuses use the
    /// envelope message from the body when there is one.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = match Self::status_message(status) {
            Some(message) => message.to_string(),
            None => serde_json::from_str::<RawEnvelope>(body)
                .ok()
                .and_then(|envelope| envelope.message)
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| format!("{} ({})", DEFAULT_FAILURE_MESSAGE, status)),
        };
        ApiError::Status { status, message }
    }

    /// Text suitable for a transient notice.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Business { message, .. } | ApiError::Status { message, .. } => {
                message.clone()
            }
            ApiError::Network(_) => NETWORK_MESSAGE.to_string(),
            ApiError::Timeout => TIMEOUT_MESSAGE.to_string(),
            ApiError::Request(reason) | ApiError::Decode(reason) => {
                if reason.is_empty() {
                    DEFAULT_FAILURE_MESSAGE.to_string()
                } else {
                    reason.clone()
                }
            }
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401, .. })
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Business { code, ref message } => {
                write!(f, "Business error {}: {}", code, message)
            }
            Self::Status { status, ref message } => write!(f, "HTTP {}: {}", status, message),
            Self::Network(ref reason) => write!(f, "{}: {}", NETWORK_MESSAGE, reason),
            Self::Timeout => write!(f, "{}", TIMEOUT_MESSAGE),
            Self::Request(ref reason) => write!(f, "Request error: {}", reason),
            Self::Decode(ref reason) => write!(f, "Malformed response: {}", reason),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_builder() {
            ApiError::Request(e.to_string())
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Network(e.to_string())
        }
    }
}
