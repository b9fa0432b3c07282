// How api-level failures surface to consumers.
//
// Nothing above this crate sees reqwest or serde errors raw; every failure
// folds into CoreError here so frontends branch on domain meaning instead
// of HTTP detail.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Cannot connect to NVR at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("NVR authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    /// Setup reached the NVR but the first camera poll failed. Retryable.
    #[error("NVR not ready: {reason}")]
    NotReady { reason: String },

    #[error("NVR request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Lookup ───────────────────────────────────────────────────────
    #[error("Camera not found: {identifier}")]
    CameraNotFound { identifier: String },

    // ── Operations ───────────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Operation failed: {message}")]
    OperationFailed { message: String },

    /// Unexpected NVR response that fits no more specific variant.
    #[error("NVR error: {message}")]
    Api { message: String, status: Option<u16> },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<uprotect_api::Error> for CoreError {
    fn from(err: uprotect_api::Error) -> Self {
        match err {
            uprotect_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            uprotect_api::Error::SessionExpired => CoreError::AuthenticationFailed {
                message: "session expired -- log in again".into(),
            },
            uprotect_api::Error::NotAuthorized { message } => CoreError::PermissionDenied {
                message: if message.is_empty() {
                    "the account may not perform this operation".into()
                } else {
                    message
                },
            },
            uprotect_api::Error::Transport(ref e) if e.is_timeout() => {
                CoreError::Timeout { timeout_secs: 0 }
            }
            uprotect_api::Error::Transport(ref e) if e.is_connect() => {
                CoreError::ConnectionFailed {
                    url: e
                        .url()
                        .map(|u| u.to_string())
                        .unwrap_or_else(|| "<unknown>".into()),
                    reason: e.to_string(),
                }
            }
            uprotect_api::Error::Transport(e) => CoreError::Api {
                message: e.to_string(),
                status: e.status().map(|s| s.as_u16()),
            },
            uprotect_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            uprotect_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid NVR URL: {e}"),
            },
            // Tls errors only arise while building the client from config
            // (CA file unreadable or malformed).
            uprotect_api::Error::Tls(message) => CoreError::Config { message },
            uprotect_api::Error::Nvr { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            uprotect_api::Error::Deserialization { message, .. } => {
                CoreError::Internal(format!("unexpected NVR payload: {message}"))
            }
        }
    }
}
