//! NVR command handlers.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::Tabled;
use uprotect_core::ProtectInstance;
use uprotect_core::convert::timestamp;
use uprotect_core::events::EventPayload;

use crate::cli::{GlobalOpts, NvrArgs, NvrCommand};
use crate::error::CliError;
use crate::output;

// ── Views ───────────────────────────────────────────────────────────

/// NVR identity plus a little connection health.
#[derive(Serialize)]
struct NvrView {
    id: String,
    name: String,
    model: Option<String>,
    version: Option<String>,
    host: Option<String>,
    rtsp_port: u16,
    cameras: usize,
    last_refresh_ok: bool,
}

impl NvrView {
    fn capture(instance: &ProtectInstance) -> Self {
        let nvr = instance.nvr();
        Self {
            id: nvr.id.clone(),
            name: nvr.name.clone(),
            model: nvr.model.clone(),
            version: nvr.version.clone(),
            host: nvr.host.clone(),
            rtsp_port: nvr.rtsp_port,
            cameras: instance.coordinator().data().len(),
            last_refresh_ok: instance.coordinator().last_update_success(),
        }
    }
}

fn nvr_detail(v: &NvrView) -> String {
    [
        format!("ID:        {}", v.id),
        format!("Name:      {}", v.name),
        format!("Model:     {}", v.model.as_deref().unwrap_or("-")),
        format!("Version:   {}", v.version.as_deref().unwrap_or("-")),
        format!("Host:      {}", v.host.as_deref().unwrap_or("-")),
        format!("RTSP port: {}", v.rtsp_port),
        format!("Cameras:   {}", v.cameras),
        format!(
            "Refresh:   {}",
            if v.last_refresh_ok { "ok" } else { "failing" }
        ),
    ]
    .join("\n")
}

/// One raw NVR event, camera id resolved to a name when possible.
#[derive(Serialize)]
struct EventView {
    id: String,
    kind: String,
    camera: String,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    score: Option<u16>,
}

impl EventView {
    fn capture(event: &EventPayload, names: &HashMap<&str, &str>) -> Self {
        let camera = event
            .camera
            .as_deref()
            .map(|id| (*names.get(id).unwrap_or(&id)).to_owned())
            .unwrap_or_else(|| "-".to_owned());
        Self {
            id: event.id.clone().unwrap_or_default(),
            kind: event.event_type.clone().unwrap_or_else(|| "?".to_owned()),
            camera,
            start: timestamp(event.start),
            end: timestamp(event.end),
            score: event.score,
        }
    }
}

#[derive(Tabled)]
struct EventRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Camera")]
    camera: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Ended")]
    ended: String,
}

impl From<&EventView> for EventRow {
    fn from(v: &EventView) -> Self {
        Self {
            time: output::ts(v.start),
            kind: v.kind.clone(),
            camera: v.camera.clone(),
            score: v.score.map_or_else(|| "-".to_owned(), |s| s.to_string()),
            ended: output::ts(v.end),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    instance: &ProtectInstance,
    args: NvrArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        NvrCommand::Info => {
            let view = NvrView::capture(instance);
            let out = output::render_single(global.output, &view, nvr_detail, |v| v.id.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        NvrCommand::Events { last } => {
            // Clamped to a year so absurd --last values cannot overflow the
            // time math; the NVR retains far less than that anyway.
            let secs = i64::try_from(last).unwrap_or(i64::MAX).min(365 * 24 * 3600);
            let events = instance.recent_events(chrono::Duration::seconds(secs)).await?;

            let cameras = instance.coordinator().data();
            let names: HashMap<&str, &str> = cameras
                .iter()
                .map(|c| (c.id.as_str(), c.name.as_str()))
                .collect();

            let views: Vec<EventView> = events
                .iter()
                .map(|e| EventView::capture(e, &names))
                .collect();
            let out = output::render_list(global.output, &views, |v| EventRow::from(v), |v| {
                v.id.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
