// TLS and timeout settings for the NVR connection.
//
// Every Protect session is cookie-backed (UniFi OS sets a TOKEN cookie at
// login, CloudKey firmware a session cookie), so `build_client` always
// enables the cookie store instead of exposing a jar to callers.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::Error;

pub(crate) const USER_AGENT: &str = concat!("uprotect/", env!("CARGO_PKG_VERSION"));

/// How the NVR's TLS certificate is checked.
#[derive(Debug, Clone)]
pub enum TlsMode {
    /// Verify against the system certificate store.
    System,
    /// Verify against a single CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate. Consoles ship self-signed certs, so this
    /// is the common case on a LAN.
    DangerAcceptInvalid,
}

/// Connection settings shared by every request the client makes.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::DangerAcceptInvalid,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build the session `reqwest::Client` with cookies, timeout, and TLS
    /// applied.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .cookie_store(true);

        let builder = match &self.tls {
            TlsMode::System => builder,
            TlsMode::CustomCa(path) => {
                let pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let ca = reqwest::Certificate::from_pem(&pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder.add_root_certificate(ca)
            }
            TlsMode::DangerAcceptInvalid => builder.danger_accept_invalid_certs(true),
        };

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}
