//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use uprotect_config::ConfigError;
use uprotect_core::CoreError;

/// Process exit codes. The ladder is stable so scripts can rely on it;
/// codes without a current producer stay reserved.
#[allow(dead_code)]
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Reaching the NVR ─────────────────────────────────────────────

    #[error("Could not connect to NVR at {url}")]
    #[diagnostic(
        code(uprotect::connection_failed),
        help(
            "Check that the NVR is powered on and reachable.\n\
             URL: {url}\n\
             Try: uprotect nvr info --insecure"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("NVR is not ready: {reason}")]
    #[diagnostic(
        code(uprotect::nvr_not_ready),
        help(
            "The NVR accepted the login but the first camera poll failed.\n\
             It may still be starting up; try again shortly."
        )
    )]
    NvrNotReady { reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(uprotect::timeout),
        help("Increase --timeout or check NVR responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Accounts ─────────────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(uprotect::auth_failed),
        help(
            "Verify the username and password for your local Protect account.\n\
             Cloud (Ubiquiti SSO) accounts cannot log in directly; create a\n\
             local user on the NVR instead.\n\
             Run: uprotect config set-password <profile>"
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(uprotect::no_credentials),
        help(
            "Configure credentials with: uprotect config init\n\
             Or set UPROTECT_USERNAME and UPROTECT_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    #[error("Permission denied: {message}")]
    #[diagnostic(
        code(uprotect::permission_denied),
        help(
            "The account can log in but may not perform this operation.\n\
             Viewer accounts cannot change camera settings; use a local\n\
             account with administrator access on the NVR."
        )
    )]
    PermissionDenied { message: String },

    // ── Cameras ──────────────────────────────────────────────────────

    #[error("Camera '{identifier}' not found")]
    #[diagnostic(
        code(uprotect::camera_not_found),
        help("Run: uprotect cameras list to see available cameras")
    )]
    CameraNotFound { identifier: String },

    // ── NVR responses ────────────────────────────────────────────────

    #[error("NVR request failed: {message}")]
    #[diagnostic(code(uprotect::api_error))]
    ApiError {
        message: String,
        status: Option<u16>,
    },

    // ── Flags & config ───────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(uprotect::validation))]
    Validation { field: String, reason: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(uprotect::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: uprotect config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(uprotect::no_config),
        help(
            "Create one with: uprotect config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(uprotect::config),
        help("Inspect the effective configuration with: uprotect config show")
    )]
    ConfigInvalid { message: String },

    // ── Prompts ──────────────────────────────────────────────────────

    #[error("Operation '{action}' requires confirmation")]
    #[diagnostic(
        code(uprotect::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// The process exit code this error terminates with.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::NvrNotReady { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NoCredentials { .. } => exit_code::AUTH,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::CameraNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Mapping from the lower layers ────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed {
                    url,
                    source: reason.into(),
                }
            }

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::PermissionDenied { message } => CliError::PermissionDenied { message },

            CoreError::NotReady { reason } => CliError::NvrNotReady { reason },

            CoreError::Timeout { timeout_secs: seconds } => CliError::Timeout { seconds },

            CoreError::CameraNotFound { identifier } => CliError::CameraNotFound { identifier },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::OperationFailed { message } => CliError::ApiError {
                message,
                status: None,
            },

            CoreError::Api { message, status } => CliError::ApiError { message, status },

            CoreError::Config { message } => CliError::ConfigInvalid { message },

            CoreError::Internal(message) => CliError::ApiError {
                message,
                status: None,
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::ConfigInvalid {
                message: other.to_string(),
            },
        }
    }
}
