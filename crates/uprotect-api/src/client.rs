// Protect API HTTP client
//
// Wraps `reqwest::Client` with Protect-specific URL construction and
// platform-aware path prefixing. Endpoint groups (auth, bootstrap,
// cameras, events) are implemented as inherent methods via separate
// files to keep this module focused on transport mechanics.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use bytes::Bytes;
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::platform::NvrPlatform;
use crate::transport::TransportConfig;

/// Fallback request timeout for clients built without a [`TransportConfig`].
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Raw HTTP client for the UniFi Protect NVR API.
///
/// Handles platform-aware path prefixing (`/proxy/protect` on UniFi OS),
/// CSRF token rotation, bearer tokens on standalone CloudKey firmware,
/// and the short-lived access key the snapshot endpoints require.
pub struct ProtectClient {
    http: reqwest::Client,
    base_url: Url,
    platform: NvrPlatform,
    timeout: Duration,
    /// UniFi OS CSRF token. Mutating requests through `/proxy/protect/`
    /// must echo it back; the NVR may hand out a fresh one on any reply.
    csrf: RwLock<Option<String>>,
    /// Bearer token issued by standalone CloudKey firmware at login.
    bearer: RwLock<Option<String>>,
    /// Snapshot access key with its fetch time. Valid for ten minutes.
    pub(crate) access_key: RwLock<Option<(String, Instant)>>,
}

impl ProtectClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// The `base_url` should be the NVR root, e.g. `https://192.168.1.1`
    /// for a console or `https://cloudkey:7443` for standalone Protect.
    pub fn new(
        base_url: Url,
        platform: NvrPlatform,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            platform,
            timeout: transport.timeout,
            csrf: RwLock::new(None),
            bearer: RwLock::new(None),
            access_key: RwLock::new(None),
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// Use this when you already have a client with a session cookie in
    /// its jar, or in tests where TLS and timeouts don't matter.
    pub fn with_client(http: reqwest::Client, base_url: Url, platform: NvrPlatform) -> Self {
        Self {
            http,
            base_url,
            platform,
            timeout: DEFAULT_TIMEOUT,
            csrf: RwLock::new(None),
            bearer: RwLock::new(None),
            access_key: RwLock::new(None),
        }
    }

    /// Raw `reqwest` handle, for auth flows that bypass the JSON helpers.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The NVR root URL this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The detected NVR platform.
    pub fn platform(&self) -> NvrPlatform {
        self.platform
    }

    // ── Token management ─────────────────────────────────────────────

    /// Store the CSRF token captured from login response headers.
    pub(crate) fn set_csrf_token(&self, token: String) {
        debug!("storing CSRF token");
        *self.csrf.write().expect("csrf token lock") = Some(token);
    }

    /// Store the bearer token from a standalone CloudKey login.
    pub(crate) fn set_bearer_token(&self, token: String) {
        debug!("storing bearer token");
        *self.bearer.write().expect("bearer token lock") = Some(token);
    }

    /// Drop all cached auth material (logout).
    pub(crate) fn clear_tokens(&self) {
        *self.csrf.write().expect("csrf token lock") = None;
        *self.bearer.write().expect("bearer token lock") = None;
        *self.access_key.write().expect("access key lock") = None;
    }

    /// UniFi OS rotates CSRF tokens mid-session; adopt whatever the
    /// response carries so the next mutating request stays valid.
    fn adopt_rotated_csrf(&self, headers: &reqwest::header::HeaderMap) {
        let rotated = ["x-updated-csrf-token", "x-csrf-token"]
            .into_iter()
            .find_map(|name| headers.get(name)?.to_str().ok());

        if let Some(token) = rotated {
            trace!("CSRF token rotated by the NVR");
            *self.csrf.write().expect("csrf token lock") = Some(token.to_owned());
        }
    }

    /// Attach whichever auth material the session has to a request.
    fn apply_auth(&self, mut builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = self.bearer.read().expect("bearer token lock").as_deref() {
            builder = builder.bearer_auth(token);
        }
        if let Some(token) = self.csrf.read().expect("csrf token lock").as_deref() {
            builder = builder.header("X-CSRF-Token", token);
        }
        builder
    }

    // ── URLs ─────────────────────────────────────────────────────────

    /// Absolute URL for a Protect API path: root, platform prefix, then
    /// `/api/{path}`. On UniFi OS: `https://host/proxy/protect/api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Url {
        let root = self.base_url.as_str().trim_end_matches('/');
        let prefix = self.platform.api_prefix().trim_end_matches('/');
        Url::parse(&format!("{root}{prefix}/api/{path}")).expect("URL from validated parts")
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {url}");

        let resp = self
            .apply_auth(self.http.get(url))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let body = self.check_response(resp).await?.text().await?;
        decode_body(body)
    }

    /// Send a GET request and return the raw body bytes (JPEG payloads).
    pub(crate) async fn get_bytes(&self, url: Url) -> Result<Bytes, Error> {
        debug!("GET {url}");

        let resp = self
            .apply_auth(self.http.get(url))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        Ok(self.check_response(resp).await?.bytes().await?)
    }

    /// Send a PATCH request with a JSON body, discarding the response body.
    pub(crate) async fn patch_json<B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<(), Error> {
        debug!("PATCH {url}");

        let resp = self
            .apply_auth(self.http.patch(url).json(body))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        self.check_response(resp).await?;
        Ok(())
    }

    /// Send a POST request with no body, decoding the JSON response.
    pub(crate) async fn post_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("POST {url}");

        let resp = self
            .apply_auth(self.http.post(url))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let body = self.check_response(resp).await?.text().await?;
        decode_body(body)
    }

    /// Turn error statuses into typed errors, passing success through for
    /// the body read. CSRF rotation is captured first on every response.
    async fn check_response(&self, resp: reqwest::Response) -> Result<reqwest::Response, Error> {
        self.adopt_rotated_csrf(resp.headers());

        match resp.status() {
            StatusCode::UNAUTHORIZED => Err(Error::SessionExpired),
            StatusCode::FORBIDDEN => Err(Error::NotAuthorized {
                message: snippet(&resp.text().await.unwrap_or_default()),
            }),
            status if !status.is_success() => Err(Error::Nvr {
                status: status.as_u16(),
                message: snippet(&resp.text().await.unwrap_or_default()),
            }),
            _ => Ok(resp),
        }
    }

    /// Convert reqwest send failures, surfacing timeouts distinctly.
    fn map_send_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(e)
        }
    }
}

/// Decode a JSON body, keeping a short preview in the error so a schema
/// mismatch is debuggable without dumping the whole bootstrap.
fn decode_body<T: DeserializeOwned>(body: String) -> Result<T, Error> {
    match serde_json::from_str(&body) {
        Ok(value) => Ok(value),
        Err(e) => {
            let message = format!("{e} (body starts: {:?})", snippet(&body));
            Err(Error::Deserialization { message, body })
        }
    }
}

/// First 200 chars of a body, cut on a char boundary. Error context only;
/// NVR error bodies are JSON blobs and occasionally not UTF-8-friendly.
fn snippet(body: &str) -> String {
    body.chars().take(200).collect()
}
