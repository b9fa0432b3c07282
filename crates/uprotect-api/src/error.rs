use thiserror::Error;

/// Failures from the Protect NVR API surface.
///
/// `uprotect-core` folds these into its own error type before they reach
/// consumers; the variants here stay close to the wire so that mapping can
/// tell auth expiry from permission problems and flaky transport.
#[derive(Debug, Error)]
pub enum Error {
    // ── Sessions ────────────────────────────────────────────────────
    /// Login rejected: bad credentials, a locked account, or a cloud-only
    /// (Ubiquiti SSO) account that cannot use the local API.
    #[error("NVR login failed: {message}")]
    Authentication { message: String },

    /// The account is valid but may not perform the operation (HTTP 403),
    /// e.g. a viewer changing recording settings.
    #[error("Not authorized: {message}")]
    NotAuthorized { message: String },

    /// The session cookie or bearer token is no longer accepted (HTTP 401).
    #[error("Protect session expired -- log in again")]
    SessionExpired,

    // ── Connectivity ────────────────────────────────────────────────
    /// Connection-level failure out of reqwest.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Bad URL, usually a malformed NVR address from config.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The NVR did not answer within the configured deadline.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Certificate or handshake problem.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── NVR responses ───────────────────────────────────────────────
    /// Any other non-success status, with a snippet of the body.
    #[error("NVR error (HTTP {status}): {message}")]
    Nvr { status: u16, message: String },

    /// The NVR answered 2xx but the JSON didn't match our payload types.
    #[error("Failed to decode NVR response: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// True when a fresh login would likely clear the error.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::SessionExpired)
    }

    /// True for failures where the next poll may simply succeed, like an
    /// NVR rebooting (5xx) or a dropped connection.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Nvr { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
