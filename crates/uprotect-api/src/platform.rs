// NVR platform detection
//
// Protect runs in two very different hosting modes: behind the UniFi OS
// reverse proxy on consoles (UDM-Pro, UNVR, CloudKey Gen2+ with UniFi OS),
// and as a standalone service on port 7443 on older CloudKey firmware.
// URL prefixes and the whole auth flow differ between the two.

use tracing::debug;
use url::Url;

use crate::error::Error;

/// The hosting platform of the Protect NVR.
///
/// Determines URL prefixes, login paths, and the auth strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NvrPlatform {
    /// UniFi OS console (UDM-Pro, UNVR, updated CloudKey) -- port 443,
    /// `/proxy/protect/` prefix, cookie session plus CSRF token.
    UnifiOs,
    /// Standalone Protect on CloudKey Gen2+ firmware before UniFi OS --
    /// port 7443, no prefix, bearer token auth.
    CloudKey,
}

impl NvrPlatform {
    /// The path prefix for Protect API endpoints.
    ///
    /// On UniFi OS the Protect application sits behind the proxy at
    /// `/proxy/protect`; standalone instances serve from the root.
    pub fn api_prefix(&self) -> &'static str {
        match self {
            Self::UnifiOs => "/proxy/protect",
            Self::CloudKey => "",
        }
    }

    /// The login endpoint path.
    pub fn login_path(&self) -> &'static str {
        match self {
            Self::UnifiOs => "/api/auth/login",
            Self::CloudKey => "/api/auth",
        }
    }

    /// The logout endpoint path.
    ///
    /// Returns `None` for [`CloudKey`](Self::CloudKey): bearer tokens are
    /// not revocable through the standalone API, the client just drops them.
    pub fn logout_path(&self) -> Option<&'static str> {
        match self {
            Self::UnifiOs => Some("/api/auth/logout"),
            Self::CloudKey => None,
        }
    }

    /// The TCP port the platform usually serves on.
    pub fn default_port(&self) -> u16 {
        match self {
            Self::UnifiOs => 443,
            Self::CloudKey => 7443,
        }
    }

    /// Auto-detect the platform by probing the controller root.
    ///
    /// UniFi OS consoles answer every request with an `x-csrf-token`
    /// response header; standalone CloudKey firmware never sets it.
    /// Connection-level failure is an error (wrong host or port).
    pub async fn detect(base_url: &Url) -> Result<NvrPlatform, Error> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(Error::Transport)?;

        debug!("probing NVR platform at {}", base_url);

        let resp = http
            .get(base_url.clone())
            .send()
            .await
            .map_err(Error::Transport)?;

        if resp.headers().contains_key("x-csrf-token") {
            debug!("detected UniFi OS console");
            Ok(NvrPlatform::UnifiOs)
        } else {
            debug!("detected standalone CloudKey NVR");
            Ok(NvrPlatform::CloudKey)
        }
    }
}
