//! Configuration for the uprotect CLI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `uprotect_core::ConnectConfig`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use uprotect_core::{ConnectConfig, DEFAULT_SCAN_INTERVAL, TlsVerification};

/// Keyring service name under which passwords are stored.
const KEYRING_SERVICE: &str = "uprotect";

/// Profile used when neither `--profile` nor `default_profile` says otherwise.
pub const DEFAULT_PROFILE: &str = "default";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("keyring access failed: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named NVR profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.to_owned()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_insecure")]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Camera poll interval in seconds.
    #[serde(default = "default_scan_interval")]
    pub scan_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: default_insecure(),
            timeout: default_timeout(),
            scan_interval: default_scan_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_insecure() -> bool {
    // NVRs ship self-signed certs; verification is opt-in.
    true
}
fn default_timeout() -> u64 {
    30
}
fn default_scan_interval() -> u64 {
    DEFAULT_SCAN_INTERVAL.as_secs()
}

/// A named NVR profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// NVR base URL, e.g. "https://192.168.1.1" for a UniFi OS console or
    /// "https://cloudkey:7443" for standalone Protect.
    pub nvr: String,

    /// Local NVR account username.
    pub username: Option<String>,

    /// Password (plaintext -- prefer keyring or `UPROTECT_PASSWORD`).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to a custom CA certificate; always wins over `insecure`.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification. Defaults to on; set to `false` to verify
    /// against the system store.
    pub insecure: Option<bool>,

    /// Request timeout in seconds.
    pub timeout: Option<u64>,

    /// Camera poll interval in seconds.
    pub scan_interval: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Canonical location of the config file (XDG on Linux, the platform
/// equivalent elsewhere).
pub fn config_path() -> PathBuf {
    match ProjectDirs::from("com", "uprotect", "uprotect") {
        Some(dirs) => dirs.config_dir().join("config.toml"),
        None => fallback_config_dir().join("config.toml"),
    }
}

fn fallback_config_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map_or_else(|| PathBuf::from("."), PathBuf::from)
        .join(".config")
        .join("uprotect")
}

// ── Load & save ─────────────────────────────────────────────────────

/// Read the merged configuration from the canonical path plus any
/// `UPROTECT_*` environment overrides.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Read the merged configuration from a specific file.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("UPROTECT_").split("_"))
        .extract()
        .map_err(Into::into)
}

/// Read the merged configuration, falling back to built-in defaults when
/// the file is absent or broken.
#[must_use]
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_else(|_| Config::default())
}

/// Write `cfg` as pretty TOML to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

/// Write `cfg` as pretty TOML to `path`, creating parent directories
/// as needed.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(cfg)?)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve username + password for a profile.
///
/// The username comes from the profile, then `UPROTECT_USERNAME`. The
/// password is tried in order: the env var named by the profile's
/// `password_env`, `UPROTECT_PASSWORD`, the system keyring, plaintext
/// in the profile.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<(String, SecretString), ConfigError> {
    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var("UPROTECT_USERNAME").ok())
        .ok_or_else(|| no_credentials(profile_name))?;

    env_password(profile)
        .or_else(|| keyring_password(profile_name))
        .or_else(|| profile.password.clone())
        .map(|pw| (username, SecretString::from(pw)))
        .ok_or_else(|| no_credentials(profile_name))
}

fn env_password(profile: &Profile) -> Option<String> {
    profile
        .password_env
        .as_deref()
        .and_then(|name| std::env::var(name).ok())
        .or_else(|| std::env::var("UPROTECT_PASSWORD").ok())
}

fn keyring_password(profile_name: &str) -> Option<String> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name)).ok()?;
    entry.get_password().ok()
}

fn no_credentials(profile: &str) -> ConfigError {
    ConfigError::NoCredentials {
        profile: profile.into(),
    }
}

/// Store a password for a profile in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name))?;
    entry.set_password(password)?;
    Ok(())
}

fn keyring_user(profile_name: &str) -> String {
    format!("{profile_name}/password")
}

// ── Profile → ConnectConfig ─────────────────────────────────────────

/// Build a `ConnectConfig` from a profile.
pub fn profile_to_connect_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<ConnectConfig, ConfigError> {
    let url: url::Url = profile.nvr.parse().map_err(|_| ConfigError::Validation {
        field: "nvr".into(),
        reason: format!("invalid URL: {}", profile.nvr),
    })?;

    let (username, password) = resolve_credentials(profile, profile_name)?;

    let tls = if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else if profile.insecure.unwrap_or(true) {
        TlsVerification::DangerAcceptInvalid
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(ConnectConfig {
        url,
        username,
        password,
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or_else(default_timeout)),
        scan_interval: profile
            .scan_interval
            .map_or(DEFAULT_SCAN_INTERVAL, Duration::from_secs),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn profile(nvr: &str) -> Profile {
        Profile {
            nvr: nvr.to_owned(),
            username: Some("admin".to_owned()),
            password: Some("hunter2".to_owned()),
            ..Profile::default()
        }
    }

    #[test]
    fn test_load_config_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "home"

[defaults]
output = "json"

[profiles.home]
nvr = "https://192.168.1.1"
username = "admin"
scan_interval = 5
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("home"));
        assert_eq!(cfg.defaults.output, "json");
        // Unset defaults keep their built-in values.
        assert_eq!(cfg.defaults.timeout, 30);
        assert_eq!(cfg.defaults.scan_interval, 2);

        let home = &cfg.profiles["home"];
        assert_eq!(home.nvr, "https://192.168.1.1");
        assert_eq!(home.username.as_deref(), Some("admin"));
        assert_eq!(home.scan_interval, Some(5));
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert("home".into(), profile("https://nvr.local:7443"));

        save_config_to(&cfg, &path).unwrap();
        let reloaded = load_config_from(&path).unwrap();

        assert_eq!(reloaded.default_profile.as_deref(), Some(DEFAULT_PROFILE));
        assert_eq!(reloaded.profiles["home"].nvr, "https://nvr.local:7443");
        assert_eq!(
            reloaded.profiles["home"].password.as_deref(),
            Some("hunter2")
        );
    }

    #[test]
    fn test_profile_resolves_plaintext_password() {
        let p = profile("https://192.168.1.1");
        let cfg = profile_to_connect_config(&p, "home").unwrap();

        assert_eq!(cfg.url.as_str(), "https://192.168.1.1/");
        assert_eq!(cfg.username, "admin");
        assert_eq!(cfg.password.expose_secret(), "hunter2");
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert_eq!(cfg.scan_interval, DEFAULT_SCAN_INTERVAL);
        assert_eq!(cfg.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn test_ca_cert_wins_over_insecure_default() {
        let mut p = profile("https://192.168.1.1");
        p.ca_cert = Some("/etc/ssl/nvr-ca.pem".into());

        let cfg = profile_to_connect_config(&p, "home").unwrap();
        assert_eq!(
            cfg.tls,
            TlsVerification::CustomCa("/etc/ssl/nvr-ca.pem".into())
        );
    }

    #[test]
    fn test_explicit_secure_uses_system_store() {
        let mut p = profile("https://192.168.1.1");
        p.insecure = Some(false);

        let cfg = profile_to_connect_config(&p, "home").unwrap();
        assert_eq!(cfg.tls, TlsVerification::SystemDefaults);
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let p = profile("not a url");
        let err = profile_to_connect_config(&p, "home").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "nvr"));
    }

    #[test]
    fn test_missing_username_is_no_credentials() {
        let p = Profile {
            nvr: "https://192.168.1.1".to_owned(),
            ..Profile::default()
        };
        let err = resolve_credentials(&p, "home").unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials { ref profile } if profile == "home"));
    }

    #[test]
    fn test_unset_password_env_falls_through_to_plaintext() {
        // The named env var is consulted first; when it is not set,
        // resolution continues down the chain.
        let mut p = profile("https://192.168.1.1");
        p.password_env = Some("UPROTECT_TEST_UNSET_VAR".to_owned());

        let (_, password) = resolve_credentials(&p, "home").unwrap();
        assert_eq!(password.expose_secret(), "hunter2");
    }
}
