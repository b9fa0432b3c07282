// Protect authentication
//
// UniFi OS consoles use a cookie session plus CSRF token; standalone
// CloudKey firmware returns a bearer token in the login response's
// `Authorization` header. Snapshot endpoints additionally want a
// short-lived access key fetched after login.

use std::time::{Duration, Instant};

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;

use crate::client::ProtectClient;
use crate::error::Error;
use crate::types::AccessKeyResponse;

/// Snapshot access keys expire server-side; refresh before that happens.
const ACCESS_KEY_TTL: Duration = Duration::from_secs(10 * 60);

/// Body of the login request. Protect expects camelCase keys;
/// `rememberMe` asks for a long-lived session so a polling client is not
/// logged out between refresh cycles.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    remember_me: bool,
}

impl ProtectClient {
    /// Authenticate with the NVR using username/password.
    ///
    /// The login endpoint differs by platform:
    /// - UniFi OS: `POST /api/auth/login` (session cookie + CSRF header)
    /// - CloudKey: `POST /api/auth` (bearer token in `Authorization`)
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self
            .base_url()
            .join(self.platform().login_path())
            .map_err(Error::InvalidUrl)?;

        debug!("logging in at {}", url);

        let payload = LoginRequest {
            username,
            password: password.expose_secret(),
            remember_me: true,
        };
        let resp = self.http().post(url).json(&payload).send().await?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::Authentication {
                message: "too many login attempts, the NVR is rate limiting this account".into(),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login rejected (HTTP {status}): {body}"),
            });
        }

        self.adopt_login_tokens(resp.headers());
        debug!("login successful");
        Ok(())
    }

    /// Pull session material out of the login response headers.
    ///
    /// UniFi OS answers with a CSRF token the proxy wants echoed on every
    /// mutating request; standalone CloudKey firmware hands back a bearer
    /// token instead. A response may carry either or neither (the cookie
    /// jar alone is enough for reads on UniFi OS).
    fn adopt_login_tokens(&self, headers: &reqwest::header::HeaderMap) {
        // HeaderMap lookups are case-insensitive.
        if let Some(token) = headers.get("x-csrf-token").and_then(|v| v.to_str().ok()) {
            self.set_csrf_token(token.to_owned());
        }

        if let Some(token) = headers
            .get(reqwest::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
        {
            self.set_bearer_token(token.to_owned());
        }
    }

    /// End the current session.
    ///
    /// UniFi OS has a logout endpoint; standalone CloudKey bearer tokens
    /// cannot be revoked, so the client just drops its cached auth material.
    pub async fn logout(&self) -> Result<(), Error> {
        if let Some(logout_path) = self.platform().logout_path() {
            let url = self
                .base_url()
                .join(logout_path)
                .map_err(Error::InvalidUrl)?;

            debug!("logging out at {}", url);
            self.http().post(url).send().await?;
        }

        self.clear_tokens();
        debug!("logout complete");
        Ok(())
    }

    /// Return a valid snapshot access key, fetching a fresh one when the
    /// cached key is missing or older than its ten-minute lifetime.
    pub async fn ensure_access_key(&self) -> Result<String, Error> {
        if let Some(key) = self.cached_access_key() {
            return Ok(key);
        }

        debug!("requesting fresh snapshot access key");
        let resp: AccessKeyResponse = self.post_json(self.api_url("auth/access-key")).await?;

        let mut guard = self.access_key.write().expect("access key lock");
        *guard = Some((resp.access_key.clone(), Instant::now()));
        Ok(resp.access_key)
    }

    fn cached_access_key(&self) -> Option<String> {
        let guard = self.access_key.read().expect("access key lock");
        let (key, fetched_at) = guard.as_ref()?;
        (fetched_at.elapsed() < ACCESS_KEY_TTL).then(|| key.clone())
    }
}
