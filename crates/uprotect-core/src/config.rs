// ── Connection settings ──
//
// How to reach a Protect NVR: credential data and connection tuning,
// no disk I/O. The CLI builds a `ConnectConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// Default cadence of the camera refresh loop.
///
/// Protect event state (motion in progress, doorbell rings) is only as
/// fresh as the last poll, so this is deliberately short.
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(2);

/// How the HTTPS connection to the NVR is verified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// Verify against the system trust store.
    SystemDefaults,
    /// Trust a specific CA bundle on disk.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs). Default for local NVRs.
    #[default]
    DangerAcceptInvalid,
}

/// Everything needed to open a session with one NVR.
///
/// Built by the CLI, passed to `ProtectInstance::connect` -- core never
/// reads config files.
#[derive(Debug, Clone)]
pub struct ConnectConfig {
    /// NVR URL (e.g., `https://192.168.1.1`).
    pub url: Url,
    /// Local Protect account name.
    pub username: String,
    pub password: SecretString,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// How often the coordinator polls the NVR.
    pub scan_interval: Duration,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            url: "https://192.168.1.1"
                .parse()
                .expect("default URL is valid"),
            username: String::new(),
            password: SecretString::from(String::new()),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            scan_interval: DEFAULT_SCAN_INTERVAL,
        }
    }
}
