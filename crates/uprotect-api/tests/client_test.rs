#![allow(clippy::unwrap_used)]
// End-to-end tests for `ProtectClient` against a wiremock NVR.

use chrono::{TimeZone, Utc};
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

use uprotect_api::{Error, NvrPlatform, ProtectClient};

// ── Mock NVR scaffolding ────────────────────────────────────────────

/// A wiremock server standing in for the NVR, plus a client pointed at
/// it. Standalone CloudKey platform, so paths carry no `/proxy/protect`.
async fn mock_nvr() -> (MockServer, ProtectClient) {
    let nvr = MockServer::start().await;
    let url: Url = nvr.uri().parse().unwrap();
    let client = ProtectClient::with_client(reqwest::Client::new(), url, NvrPlatform::CloudKey);
    (nvr, client)
}

fn get(route: &str) -> MockBuilder {
    Mock::given(method("GET")).and(path(route))
}

fn post(route: &str) -> MockBuilder {
    Mock::given(method("POST")).and(path(route))
}

fn patch(route: &str) -> MockBuilder {
    Mock::given(method("PATCH")).and(path(route))
}

fn ok_json(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

fn password(raw: &str) -> SecretString {
    SecretString::from(raw.to_owned())
}

fn bootstrap_body() -> serde_json::Value {
    json!({
        "nvr": {
            "id": "nvr001",
            "name": "Garage NVR",
            "type": "UCK-G2-PLUS",
            "version": "1.13.3",
            "firmwareVersion": "2.0.24",
            "host": "192.168.1.10",
            "ports": { "rtsp": 7447 }
        },
        "cameras": [{
            "id": "5f9a0b1c2d3e4f5a6b7c8d9e",
            "name": "Front Door",
            "type": "UVC G4 Doorbell",
            "state": "CONNECTED",
            "upSince": 1_600_000_000_000_i64,
            "lastMotion": 1_600_000_500_000_i64,
            "lastRing": 1_600_000_600_000_i64,
            "recordingSettings": { "mode": "motion" },
            "ispSettings": { "irLedMode": "auto" },
            "channels": [
                { "id": 0, "isRtspEnabled": false },
                { "id": 1, "isRtspEnabled": true, "rtspAlias": "abcDEF123" }
            ]
        }]
    })
}

// ── Login & session ─────────────────────────────────────────────────

#[tokio::test]
async fn test_login_captures_bearer_token() {
    let (nvr, client) = mock_nvr().await;

    post("/api/auth")
        .respond_with(ResponseTemplate::new(200).insert_header("Authorization", "jwt-abc123"))
        .mount(&nvr)
        .await;

    // Subsequent requests must carry the captured token.
    get("/api/bootstrap")
        .and(header("Authorization", "Bearer jwt-abc123"))
        .respond_with(ok_json(bootstrap_body()))
        .mount(&nvr)
        .await;

    client
        .login("admin", &password("test-password"))
        .await
        .unwrap();

    let bootstrap = client.bootstrap().await.unwrap();
    assert_eq!(bootstrap.nvr.id, "nvr001");
}

#[tokio::test]
async fn test_login_rejected() {
    let (nvr, client) = mock_nvr().await;

    post("/api/auth")
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&nvr)
        .await;

    let err = client
        .login("admin", &password("wrong-password"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, Error::Authentication { .. }),
        "a 401 login should map to Authentication, got: {err:?}"
    );
}

// ── Bootstrap ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_bootstrap_decode() {
    let (nvr, client) = mock_nvr().await;

    get("/api/bootstrap")
        .respond_with(ok_json(bootstrap_body()))
        .mount(&nvr)
        .await;

    let bootstrap = client.bootstrap().await.unwrap();

    assert_eq!(bootstrap.nvr.name.as_deref(), Some("Garage NVR"));
    assert_eq!(bootstrap.nvr.ports.as_ref().and_then(|p| p.rtsp), Some(7447));
    assert_eq!(bootstrap.cameras.len(), 1);

    let camera = &bootstrap.cameras[0];
    assert_eq!(camera.id, "5f9a0b1c2d3e4f5a6b7c8d9e");
    assert_eq!(camera.camera_type.as_deref(), Some("UVC G4 Doorbell"));
    assert_eq!(camera.state.as_deref(), Some("CONNECTED"));
    assert_eq!(camera.last_motion, Some(1_600_000_500_000));
    assert_eq!(
        camera.recording_settings.as_ref().and_then(|r| r.mode.as_deref()),
        Some("motion")
    );
    assert_eq!(camera.channels.len(), 2);
    assert!(camera.channels[1].is_rtsp_enabled);
    assert_eq!(camera.channels[1].rtsp_alias.as_deref(), Some("abcDEF123"));
}

#[tokio::test]
async fn test_unifi_os_path_prefix() {
    let nvr = MockServer::start().await;
    let url: Url = nvr.uri().parse().unwrap();
    let client = ProtectClient::with_client(reqwest::Client::new(), url, NvrPlatform::UnifiOs);

    get("/proxy/protect/api/bootstrap")
        .respond_with(ok_json(bootstrap_body()))
        .mount(&nvr)
        .await;

    let bootstrap = client.bootstrap().await.unwrap();
    assert_eq!(bootstrap.nvr.id, "nvr001");
}

// ── Snapshots ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_snapshot_fetches_access_key_once() {
    let (nvr, client) = mock_nvr().await;

    post("/api/auth/access-key")
        .respond_with(ok_json(json!({ "accessKey": "key-777" })))
        .expect(1)
        .mount(&nvr)
        .await;

    get("/api/cameras/cam01/snapshot")
        .and(query_param("accessKey", "key-777"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\xff\xd8jpeg".to_vec()))
        .expect(2)
        .mount(&nvr)
        .await;

    let first = client.get_snapshot_image("cam01").await.unwrap();
    assert_eq!(&first[..2], b"\xff\xd8");

    // Second snapshot reuses the cached key (mock expects one key fetch).
    let second = client.get_snapshot_image("cam01").await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_thumbnail_dimensions() {
    let (nvr, client) = mock_nvr().await;

    post("/api/auth/access-key")
        .respond_with(ok_json(json!({ "accessKey": "key-1" })))
        .mount(&nvr)
        .await;

    get("/api/thumbnails/e-42")
        .and(query_param("w", "640"))
        .and(query_param("h", "360"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\xff\xd8thumb".to_vec()))
        .mount(&nvr)
        .await;

    let bytes = client.get_thumbnail("e-42", 640).await.unwrap();
    assert_eq!(&bytes[..2], b"\xff\xd8");
}

// ── Camera settings ─────────────────────────────────────────────────

#[tokio::test]
async fn test_set_recording_mode_patch_body() {
    let (nvr, client) = mock_nvr().await;

    patch("/api/cameras/cam01")
        .and(body_partial_json(json!({
            "recordingSettings": { "mode": "never" }
        })))
        .respond_with(ok_json(json!({})))
        .expect(1)
        .mount(&nvr)
        .await;

    client.set_recording_mode("cam01", "never").await.unwrap();
}

#[tokio::test]
async fn test_set_ir_mode_patch_body() {
    let (nvr, client) = mock_nvr().await;

    patch("/api/cameras/cam01")
        .and(body_partial_json(json!({
            "ispSettings": { "irLedMode": "autoFilterOnly" }
        })))
        .respond_with(ok_json(json!({})))
        .expect(1)
        .mount(&nvr)
        .await;

    client.set_ir_mode("cam01", "autoFilterOnly").await.unwrap();
}

// ── Events ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_events_in_window() {
    let (nvr, client) = mock_nvr().await;

    let start = Utc.timestamp_millis_opt(1_600_000_000_000).unwrap();
    let end = Utc.timestamp_millis_opt(1_600_000_030_000).unwrap();

    get("/api/events")
        .and(query_param("start", "1600000000000"))
        .and(query_param("end", "1600000030000"))
        .respond_with(ok_json(json!([
            {
                "id": "evt1",
                "type": "motion",
                "camera": "cam01",
                "start": 1_600_000_010_000_i64,
                "end": null,
                "score": 67,
                "thumbnail": "e-evt1"
            },
            {
                "id": "evt2",
                "type": "ring",
                "camera": "cam02",
                "start": 1_600_000_020_000_i64,
                "end": 1_600_000_021_000_i64
            }
        ])))
        .mount(&nvr)
        .await;

    let events = client.list_events(start, end).await.unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event_type.as_deref(), Some("motion"));
    assert_eq!(events[0].end, None);
    assert_eq!(events[0].score, Some(67));
    assert_eq!(events[1].event_type.as_deref(), Some("ring"));
}

// ── Error mapping ───────────────────────────────────────────────────

#[tokio::test]
async fn test_expired_session() {
    let (nvr, client) = mock_nvr().await;

    get("/api/bootstrap")
        .respond_with(ResponseTemplate::new(401))
        .mount(&nvr)
        .await;

    let err = client.bootstrap().await.unwrap_err();
    assert!(
        matches!(err, Error::SessionExpired),
        "a 401 should map to SessionExpired, got: {err:?}"
    );
}

#[tokio::test]
async fn test_not_authorized_on_settings_patch() {
    let (nvr, client) = mock_nvr().await;

    // Viewer accounts can read everything but not change settings.
    patch("/api/cameras/cam01")
        .respond_with(ResponseTemplate::new(403).set_body_string("permission denied"))
        .mount(&nvr)
        .await;

    match client.set_recording_mode("cam01", "never").await {
        Err(Error::NotAuthorized { ref message }) => {
            assert!(message.contains("permission denied"));
        }
        other => panic!("expected NotAuthorized, got: {other:?}"),
    }
}

#[test]
fn test_error_classification() {
    assert!(Error::SessionExpired.is_auth_expired());
    let login = Error::Authentication {
        message: "denied".into(),
    };
    assert!(login.is_auth_expired());

    let rebooting = Error::Nvr {
        status: 503,
        message: String::new(),
    };
    assert!(rebooting.is_transient());
    assert!(!rebooting.is_auth_expired());

    let forbidden = Error::NotAuthorized {
        message: String::new(),
    };
    assert!(!forbidden.is_transient());
    assert!(!forbidden.is_auth_expired());

    let timeout = Error::Timeout { timeout_secs: 30 };
    assert!(timeout.is_transient());
}

#[tokio::test]
async fn test_nvr_error_with_body_preview() {
    let (nvr, client) = mock_nvr().await;

    get("/api/bootstrap")
        .respond_with(ResponseTemplate::new(500).set_body_string("internal failure"))
        .mount(&nvr)
        .await;

    match client.bootstrap().await {
        Err(Error::Nvr { status, ref message }) => {
            assert_eq!(status, 500);
            assert!(message.contains("internal failure"));
        }
        other => panic!("expected Nvr error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_deserialization_error_keeps_body() {
    let (nvr, client) = mock_nvr().await;

    get("/api/bootstrap")
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&nvr)
        .await;

    match client.bootstrap().await {
        Err(Error::Deserialization { ref body, .. }) => {
            assert_eq!(body, "not json");
        }
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}
